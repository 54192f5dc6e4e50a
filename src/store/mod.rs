//! Key-value storage backends
//!
//! Every record lives in one flat key space. Backends only move bytes; the
//! meaning of keys and values belongs to the repositories above them.

mod connection;
mod memory;
mod redis;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::MemoryStore;
pub use redis::RedisStore;

use crate::protocol::ParseError;

/// Failures talking to the backing store
#[derive(Debug, Error)]
pub enum StoreError {
  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),

  #[error("{op} timed out after {millis}ms")]
  Timeout { op: &'static str, millis: u128 },

  #[error("server replied with error: {0}")]
  Server(String),

  #[error("protocol error: {0}")]
  Protocol(String),

  #[error("timed out waiting for a free connection")]
  PoolTimeout,

  #[error("connection closed by server")]
  ConnectionClosed,

  #[error("store is closed")]
  Closed,

  #[error("lock poisoned")]
  LockPoisoned,
}

impl From<ParseError> for StoreError {
  fn from(err: ParseError) -> Self {
    StoreError::Protocol(err.to_string())
  }
}

/// Minimal key-value contract the repositories are written against.
///
/// Each call is one round-trip; nothing here retries.
#[async_trait]
pub trait KvStore: Send + Sync {
  /// Returns `None` when the key does not exist
  async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

  /// Overwrites any existing value
  async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError>;

  /// Deleting a missing key is not an error
  async fn delete(&self, key: &str) -> Result<(), StoreError>;

  /// All keys starting with `prefix`, in no particular order
  async fn keys_by_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError>;

  /// Release backend resources; calls made afterwards may fail
  async fn close(&self) -> Result<(), StoreError> {
    Ok(())
  }
}
