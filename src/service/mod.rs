//! Operations consumed by the request layer
//!
//! Services forward to the repositories. The only logic of its own is the
//! like/unlike cycle in [`UserService`].

mod keyed_lock;
mod song_service;
mod user_service;

use derive_more::Display;

pub use keyed_lock::{KeyGuard, KeyedLocks};
pub use song_service::SongService;
pub use user_service::UserService;

/// Result of a successful mutating operation.
///
/// `AlreadyLiked` and `NotLiked` are expected business results, not faults:
/// nothing was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Outcome {
  #[display("success")]
  Success,
  #[display("Song already liked")]
  AlreadyLiked,
  #[display("Song was not liked")]
  NotLiked,
}
