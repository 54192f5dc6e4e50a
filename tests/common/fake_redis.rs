//! In-process Redis stand-in speaking RESP over TCP.
//!
//! Implements just the commands the store client sends: PING, AUTH,
//! SELECT, GET, SET, DEL and a paginated SCAN.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use music_store::protocol::{Parser, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

#[derive(Default)]
struct Shared {
  data: Mutex<HashMap<String, Vec<u8>>>,
  commands: Mutex<Vec<String>>,
  get_delays: Mutex<HashMap<String, Duration>>,
  connections: AtomicUsize,
}

pub struct FakeRedis {
  addr: SocketAddr,
  shared: Arc<Shared>,
  handle: JoinHandle<()>,
}

impl FakeRedis {
  /// Start listening on an ephemeral port; `password` enables AUTH checks
  pub async fn start(password: Option<&str>) -> Self {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shared = Arc::new(Shared::default());
    let password = password.map(str::to_string);

    let accept_shared = shared.clone();
    let handle = tokio::spawn(async move {
      loop {
        let Ok((stream, _)) = listener.accept().await else {
          break;
        };
        accept_shared.connections.fetch_add(1, Ordering::SeqCst);
        let shared = accept_shared.clone();
        let password = password.clone();
        tokio::spawn(handle_connection(stream, shared, password));
      }
    });

    Self {
      addr,
      shared,
      handle,
    }
  }

  pub fn address(&self) -> String {
    self.addr.to_string()
  }

  /// Write raw bytes, bypassing the client
  pub fn insert_raw(&self, key: &str, value: &[u8]) {
    self
      .shared
      .data
      .lock()
      .unwrap()
      .insert(key.to_string(), value.to_vec());
  }

  pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
    self.shared.data.lock().unwrap().get(key).cloned()
  }

  /// Hold every GET of `key` for `delay` before replying
  pub fn delay_get(&self, key: &str, delay: Duration) {
    self
      .shared
      .get_delays
      .lock()
      .unwrap()
      .insert(key.to_string(), delay);
  }

  /// Command names received so far, in arrival order
  pub fn commands(&self) -> Vec<String> {
    self.shared.commands.lock().unwrap().clone()
  }

  /// Number of TCP connections accepted
  pub fn connections(&self) -> usize {
    self.shared.connections.load(Ordering::SeqCst)
  }
}

impl Drop for FakeRedis {
  fn drop(&mut self) {
    self.handle.abort();
  }
}

async fn handle_connection(mut stream: TcpStream, shared: Arc<Shared>, password: Option<String>) {
  let mut buffer = vec![0u8; 8192];
  let mut pending = Vec::new();
  let mut authenticated = password.is_none();

  loop {
    let n = match stream.read(&mut buffer).await {
      Ok(0) | Err(_) => return,
      Ok(n) => n,
    };
    pending.extend_from_slice(&buffer[..n]);

    let mut processed = 0;
    while let Ok(Some((value, consumed))) = Parser::parse(&pending[processed..]) {
      processed += consumed;
      if let Some(delay) = get_delay(&value, &shared) {
        tokio::time::sleep(delay).await;
      }
      let reply = execute(value, &shared, password.as_deref(), &mut authenticated);
      if stream.write_all(&reply.encode()).await.is_err() {
        return;
      }
    }
    pending.drain(..processed);
  }
}

fn execute(
  value: Value,
  shared: &Shared,
  password: Option<&str>,
  authenticated: &mut bool,
) -> Value {
  let Value::Array(Some(items)) = value else {
    return Value::error("ERR expected array");
  };
  let args: Vec<Vec<u8>> = items
    .iter()
    .filter_map(|item| item.as_bytes().map(<[u8]>::to_vec))
    .collect();
  let Some(name) = args.first() else {
    return Value::error("ERR empty command");
  };
  let name = String::from_utf8_lossy(name).to_uppercase();
  shared.commands.lock().unwrap().push(name.clone());
  let text = |i: usize| String::from_utf8_lossy(&args[i]).to_string();

  if name == "AUTH" {
    return if args.len() == 2 && password == Some(text(1).as_str()) {
      *authenticated = true;
      Value::ok()
    } else {
      Value::error("WRONGPASS invalid username-password pair")
    };
  }
  if !*authenticated {
    return Value::error("NOAUTH Authentication required.");
  }

  let mut data = shared.data.lock().unwrap();
  match (name.as_str(), args.len()) {
    ("PING", 1) => Value::SimpleString("PONG".to_string()),
    ("SELECT", 2) => Value::ok(),
    ("GET", 2) => Value::BulkString(data.get(&text(1)).cloned()),
    ("SET", 3) => {
      data.insert(text(1), args[2].clone());
      Value::ok()
    }
    ("DEL", 2) => Value::Integer(data.remove(&text(1)).map_or(0, |_| 1)),
    ("SCAN", 6) => {
      let cursor: usize = text(1).parse().unwrap_or(0);
      let prefix = unescape_prefix(&text(3));
      let count: usize = text(5).parse().unwrap_or(10).max(1);
      let mut keys: Vec<&String> = data.keys().filter(|k| k.starts_with(&prefix)).collect();
      keys.sort();
      let page: Vec<Value> = keys
        .iter()
        .skip(cursor)
        .take(count)
        .map(|k| Value::bulk(k.as_str()))
        .collect();
      let next = if cursor + count >= keys.len() {
        0
      } else {
        cursor + count
      };
      Value::Array(Some(vec![
        Value::bulk(next.to_string()),
        Value::Array(Some(page)),
      ]))
    }
    _ => Value::error(format!("ERR unknown command '{}'", name)),
  }
}

fn get_delay(value: &Value, shared: &Shared) -> Option<Duration> {
  let Value::Array(Some(items)) = value else {
    return None;
  };
  let [name, key] = items.as_slice() else {
    return None;
  };
  if !name.as_bytes()?.eq_ignore_ascii_case(b"GET") {
    return None;
  }
  let key = String::from_utf8_lossy(key.as_bytes()?).to_string();
  shared.get_delays.lock().unwrap().get(&key).copied()
}

/// `song\:*` style pattern back to the literal prefix
fn unescape_prefix(pattern: &str) -> String {
  let body = pattern.strip_suffix('*').unwrap_or(pattern);
  let mut prefix = String::new();
  let mut chars = body.chars();
  while let Some(c) = chars.next() {
    if c == '\\' {
      if let Some(escaped) = chars.next() {
        prefix.push(escaped);
      }
    } else {
      prefix.push(c);
    }
  }
  prefix
}
