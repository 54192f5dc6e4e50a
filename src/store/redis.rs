use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, info, warn};

use super::connection::Connection;
use super::{KvStore, StoreError};
use crate::config::StoreConfig;
use crate::protocol::{Command, Value, prefix_pattern};

/// Redis-backed store with a bounded connection pool.
///
/// Constructed once at startup and shared by reference; `close` drains the
/// pool and makes every later call fail with `StoreError::Closed`.
pub struct RedisStore {
  config: StoreConfig,
  idle: Mutex<Vec<Connection>>,
  permits: Arc<Semaphore>,
}

/// A connection checked out of the pool, returned on drop unless broken
struct Pooled<'a> {
  store: &'a RedisStore,
  conn: Option<Connection>,
  _permit: OwnedSemaphorePermit,
}

impl Pooled<'_> {
  async fn request(&mut self, cmd: &Command) -> Result<Value, StoreError> {
    let Some(conn) = self.conn.as_mut() else {
      return Err(StoreError::ConnectionClosed);
    };
    let result = conn.request(cmd).await;
    match &result {
      // the stream is still in sync after an error reply
      Ok(_) | Err(StoreError::Server(_)) => {}
      Err(err) => {
        warn!(command = cmd.name(), error = %err, "discarding broken store connection");
        self.conn = None;
      }
    }
    result
  }
}

impl Drop for Pooled<'_> {
  fn drop(&mut self) {
    if let Some(conn) = self.conn.take() {
      if self.store.permits.is_closed() {
        return;
      }
      // the caller gave up mid-request; its reply would reach the next one
      if !conn.is_idle() {
        debug!("dropping store connection with an unread reply");
        return;
      }
      if let Ok(mut idle) = self.store.idle.lock() {
        idle.push(conn);
      }
    }
  }
}

impl RedisStore {
  /// Build the pool and verify the server answers PING
  pub async fn connect(config: StoreConfig) -> Result<Self, StoreError> {
    let store = Self::new(config);
    store.ping().await?;
    info!(address = %store.config.address, database = store.config.database, "Successfully connected to Redis");
    Ok(store)
  }

  /// Build the pool without dialing; connections are opened on demand
  pub fn new(config: StoreConfig) -> Self {
    let permits = Arc::new(Semaphore::new(config.pool_size.max(1)));
    Self {
      config,
      idle: Mutex::new(Vec::new()),
      permits,
    }
  }

  pub async fn ping(&self) -> Result<(), StoreError> {
    let mut conn = self.acquire().await?;
    match conn.request(&Command::Ping).await? {
      Value::SimpleString(s) if s == "PONG" => Ok(()),
      other => Err(unexpected("PING", &other)),
    }
  }

  /// Number of idle pooled connections
  pub fn idle_connections(&self) -> usize {
    self.idle.lock().map(|idle| idle.len()).unwrap_or(0)
  }

  async fn acquire(&self) -> Result<Pooled<'_>, StoreError> {
    let limit = self.config.pool_timeout();
    let permit = match tokio::time::timeout(limit, self.permits.clone().acquire_owned()).await {
      Ok(Ok(permit)) => permit,
      Ok(Err(_)) => return Err(StoreError::Closed),
      Err(_) => return Err(StoreError::PoolTimeout),
    };

    let reused = self
      .idle
      .lock()
      .map_err(|_| StoreError::LockPoisoned)?
      .pop();
    let conn = match reused {
      Some(conn) => conn,
      None => Connection::open(&self.config).await?,
    };

    Ok(Pooled {
      store: self,
      conn: Some(conn),
      _permit: permit,
    })
  }

  async fn execute(&self, cmd: Command) -> Result<Value, StoreError> {
    let mut conn = self.acquire().await?;
    conn.request(&cmd).await
  }
}

fn unexpected(op: &str, reply: &Value) -> StoreError {
  StoreError::Protocol(format!("unexpected reply to {}: {:?}", op, reply))
}

/// Split a SCAN reply into the next cursor and the batch of keys
fn parse_scan_reply(reply: Value) -> Result<(u64, Vec<String>), StoreError> {
  let mut items = match reply {
    Value::Array(Some(items)) => items,
    other => return Err(unexpected("SCAN", &other)),
  };
  if items.len() != 2 {
    return Err(unexpected("SCAN", &Value::Array(Some(items))));
  }
  let batch = items.pop();
  let cursor = items
    .pop()
    .as_ref()
    .and_then(Value::as_bytes)
    .and_then(atoi::atoi::<u64>)
    .ok_or_else(|| StoreError::Protocol("SCAN cursor is not a number".to_string()))?;

  let keys = match batch {
    Some(Value::Array(Some(keys))) => keys
      .iter()
      .map(|key| {
        key
          .as_bytes()
          .map(|bytes| String::from_utf8_lossy(bytes).to_string())
          .ok_or_else(|| unexpected("SCAN", key))
      })
      .collect::<Result<Vec<_>, _>>()?,
    Some(Value::Array(None)) => Vec::new(),
    other => {
      return Err(StoreError::Protocol(format!(
        "SCAN batch is not an array: {:?}",
        other
      )));
    }
  };
  Ok((cursor, keys))
}

#[async_trait]
impl KvStore for RedisStore {
  async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
    match self.execute(Command::Get { key: key.to_string() }).await? {
      Value::BulkString(value) => Ok(value),
      other => Err(unexpected("GET", &other)),
    }
  }

  async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
    match self
      .execute(Command::Set {
        key: key.to_string(),
        value,
      })
      .await?
    {
      Value::SimpleString(_) => Ok(()),
      other => Err(unexpected("SET", &other)),
    }
  }

  async fn delete(&self, key: &str) -> Result<(), StoreError> {
    match self.execute(Command::Del { key: key.to_string() }).await? {
      Value::Integer(removed) => {
        debug!(key, removed, "deleted key");
        Ok(())
      }
      other => Err(unexpected("DEL", &other)),
    }
  }

  async fn keys_by_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
    let pattern = prefix_pattern(prefix);
    let mut conn = self.acquire().await?;
    let mut cursor = 0;
    // SCAN may report a key more than once
    let mut keys = BTreeSet::new();
    loop {
      let reply = conn
        .request(&Command::Scan {
          cursor,
          pattern: pattern.clone(),
          count: self.config.scan_count,
        })
        .await?;
      let (next, batch) = parse_scan_reply(reply)?;
      keys.extend(batch);
      if next == 0 {
        break;
      }
      cursor = next;
    }
    Ok(keys.into_iter().collect())
  }

  async fn close(&self) -> Result<(), StoreError> {
    self.permits.close();
    let drained: Vec<Connection> = {
      let mut idle = self.idle.lock().map_err(|_| StoreError::LockPoisoned)?;
      idle.drain(..).collect()
    };
    let count = drained.len();
    for conn in drained {
      if let Err(e) = conn.shutdown().await {
        warn!(error = %e, "failed to shut down store connection");
      }
    }
    info!(connections = count, "Redis connection closed");
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_scan_reply() {
    let reply = Value::Array(Some(vec![
      Value::bulk("42"),
      Value::Array(Some(vec![Value::bulk("song:a"), Value::bulk("song:b")])),
    ]));
    let (cursor, keys) = parse_scan_reply(reply).unwrap();
    assert_eq!(cursor, 42);
    assert_eq!(keys, vec!["song:a".to_string(), "song:b".to_string()]);
  }

  #[test]
  fn test_parse_scan_reply_empty_batch() {
    let reply = Value::Array(Some(vec![Value::bulk("0"), Value::Array(Some(vec![]))]));
    assert_eq!(parse_scan_reply(reply).unwrap(), (0, vec![]));
  }

  #[test]
  fn test_parse_scan_reply_rejects_bad_shapes() {
    assert!(matches!(
      parse_scan_reply(Value::ok()),
      Err(StoreError::Protocol(_))
    ));
    assert!(matches!(
      parse_scan_reply(Value::Array(Some(vec![Value::bulk("x"), Value::Array(None)]))),
      Err(StoreError::Protocol(_))
    ));
  }

  #[tokio::test]
  async fn test_closed_store_rejects_calls() {
    let store = RedisStore::new(StoreConfig::default());
    store.close().await.unwrap();
    assert!(matches!(store.get("song:a").await, Err(StoreError::Closed)));
  }

  #[tokio::test]
  async fn test_unreachable_server() {
    // nothing listens on port 1
    let config = StoreConfig {
      address: "127.0.0.1:1".to_string(),
      dial_timeout_ms: 500,
      ..StoreConfig::default()
    };
    let store = RedisStore::new(config);
    assert!(store.get("song:a").await.is_err());
  }
}
