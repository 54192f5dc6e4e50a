#![allow(dead_code)]

pub mod fake_redis;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use music_store::store::{KvStore, MemoryStore, StoreError};

/// Memory store whose reads take a while, so concurrent
/// read-modify-write cycles overlap the way they do against a remote store
pub struct SlowReadStore {
  inner: MemoryStore,
  delay: Duration,
}

impl SlowReadStore {
  pub fn new(delay: Duration) -> Arc<Self> {
    Arc::new(Self {
      inner: MemoryStore::new(),
      delay,
    })
  }
}

#[async_trait]
impl KvStore for SlowReadStore {
  async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
    let value = self.inner.get(key).await?;
    tokio::time::sleep(self.delay).await;
    Ok(value)
  }

  async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
    self.inner.set(key, value).await
  }

  async fn delete(&self, key: &str) -> Result<(), StoreError> {
    self.inner.delete(key).await
  }

  async fn keys_by_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
    self.inner.keys_by_prefix(prefix).await
  }
}

/// Store whose every call fails, as if the server were unreachable
pub struct DownStore;

#[async_trait]
impl KvStore for DownStore {
  async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, StoreError> {
    Err(StoreError::ConnectionClosed)
  }

  async fn set(&self, _key: &str, _value: Vec<u8>) -> Result<(), StoreError> {
    Err(StoreError::ConnectionClosed)
  }

  async fn delete(&self, _key: &str) -> Result<(), StoreError> {
    Err(StoreError::ConnectionClosed)
  }

  async fn keys_by_prefix(&self, _prefix: &str) -> Result<Vec<String>, StoreError> {
    Err(StoreError::ConnectionClosed)
  }
}
