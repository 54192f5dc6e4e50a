use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::{KvStore, StoreError};

/// In-memory key-value store
pub struct MemoryStore {
  data: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
  /// Create a new empty store
  pub fn new() -> Self {
    Self {
      data: RwLock::new(HashMap::new()),
    }
  }

  /// Number of keys currently held
  pub fn len(&self) -> usize {
    self.data.read().map(|data| data.len()).unwrap_or(0)
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

impl Default for MemoryStore {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait]
impl KvStore for MemoryStore {
  async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
    let data = self.data.read().map_err(|_| StoreError::LockPoisoned)?;
    Ok(data.get(key).cloned())
  }

  async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
    let mut data = self.data.write().map_err(|_| StoreError::LockPoisoned)?;
    data.insert(key.to_string(), value);
    Ok(())
  }

  async fn delete(&self, key: &str) -> Result<(), StoreError> {
    let mut data = self.data.write().map_err(|_| StoreError::LockPoisoned)?;
    data.remove(key);
    Ok(())
  }

  async fn keys_by_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
    let data = self.data.read().map_err(|_| StoreError::LockPoisoned)?;
    Ok(
      data
        .keys()
        .filter(|key| key.starts_with(prefix))
        .cloned()
        .collect(),
    )
  }
}
