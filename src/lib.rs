//! Music store: songs, users and liked songs over a key-value store

pub mod config;
pub mod encoding;
pub mod error;
pub mod model;
pub mod protocol;
pub mod repository;
pub mod server;
pub mod service;
pub mod store;

pub use error::{Error, Result};
