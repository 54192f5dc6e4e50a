use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per key, created on first use and evicted once unused.
///
/// Holding the guard for a key serializes every other `lock` on the same
/// key inside this process. Distinct keys never contend.
#[derive(Default)]
pub struct KeyedLocks {
  locks: DashMap<String, Arc<Mutex<()>>>,
}

pub struct KeyGuard<'a> {
  owner: &'a KeyedLocks,
  key: String,
  guard: Option<OwnedMutexGuard<()>>,
}

impl KeyedLocks {
  pub fn new() -> Self {
    Self::default()
  }

  pub async fn lock(&self, key: &str) -> KeyGuard<'_> {
    let mutex = self.locks.entry(key.to_string()).or_default().clone();
    // built before waiting so a cancelled wait still evicts on drop
    let mut key_guard = KeyGuard {
      owner: self,
      key: key.to_string(),
      guard: None,
    };
    key_guard.guard = Some(mutex.lock_owned().await);
    key_guard
  }

  /// Keys that currently have a holder or a waiter
  pub fn active(&self) -> usize {
    self.locks.len()
  }
}

impl Drop for KeyGuard<'_> {
  fn drop(&mut self) {
    drop(self.guard.take());
    // only the map itself still references the mutex: nobody holds or awaits it
    self
      .owner
      .locks
      .remove_if(&self.key, |_, mutex| Arc::strong_count(mutex) == 1);
  }
}
