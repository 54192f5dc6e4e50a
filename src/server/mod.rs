//! HTTP request layer
//!
//! Decodes requests, calls the services and maps their results to status
//! codes and JSON bodies.

pub mod body;
mod error;
#[allow(clippy::module_inception)]
mod server;
mod songs;
mod state;
mod users;

pub use error::ApiError;
pub use server::{Server, make_app};
pub use state::AppState;
