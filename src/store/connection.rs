use std::future::Future;
use std::time::Duration;

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

use super::StoreError;
use crate::config::StoreConfig;
use crate::protocol::{Command, Parser, Value};

/// A single RESP connection to the Redis server
pub(crate) struct Connection {
  stream: TcpStream,
  /// Bytes read but not yet parsed into a reply
  pending: BytesMut,
  /// A command was written and its reply has not been consumed yet
  in_flight: bool,
  read_timeout: Duration,
  write_timeout: Duration,
}

async fn bounded<T, F>(op: &'static str, limit: Duration, fut: F) -> Result<T, StoreError>
where
  F: Future<Output = Result<T, StoreError>>,
{
  match tokio::time::timeout(limit, fut).await {
    Ok(result) => result,
    Err(_) => Err(StoreError::Timeout {
      op,
      millis: limit.as_millis(),
    }),
  }
}

impl Connection {
  /// Dial the server and run the AUTH / SELECT handshake
  pub(crate) async fn open(config: &StoreConfig) -> Result<Self, StoreError> {
    let stream = bounded("dial", config.dial_timeout(), async {
      TcpStream::connect(&config.address)
        .await
        .map_err(StoreError::from)
    })
    .await?;
    stream.set_nodelay(true)?;
    debug!(address = %config.address, "opened store connection");

    let mut conn = Self {
      stream,
      pending: BytesMut::with_capacity(8192),
      in_flight: false,
      read_timeout: config.read_timeout(),
      write_timeout: config.write_timeout(),
    };

    if !config.password.is_empty() {
      conn
        .request(&Command::Auth {
          password: config.password.clone(),
        })
        .await?;
    }
    if config.database != 0 {
      conn
        .request(&Command::Select {
          db: config.database,
        })
        .await?;
    }
    Ok(conn)
  }

  /// Send one command and wait for its reply.
  ///
  /// Error replies from the server become `StoreError::Server`.
  pub(crate) async fn request(&mut self, cmd: &Command) -> Result<Value, StoreError> {
    let frame = cmd.encode();
    self.in_flight = true;
    let write_timeout = self.write_timeout;
    bounded("write", write_timeout, async {
      self.stream.write_all(&frame).await.map_err(StoreError::from)
    })
    .await?;

    let read_timeout = self.read_timeout;
    let reply = bounded("read", read_timeout, self.read_reply()).await?;
    self.in_flight = false;
    match reply {
      Value::Error(msg) => Err(StoreError::Server(msg)),
      reply => Ok(reply),
    }
  }

  /// Whether the stream is between requests and safe to hand to another caller
  pub(crate) fn is_idle(&self) -> bool {
    !self.in_flight
  }

  async fn read_reply(&mut self) -> Result<Value, StoreError> {
    loop {
      let wanted = Parser::frame_len_hint(&self.pending);
      let complete = wanted.is_none_or(|len| self.pending.len() >= len);
      if complete {
        if let Some((value, consumed)) = Parser::parse(&self.pending)? {
          self.pending.advance(consumed);
          return Ok(value);
        }
      } else if let Some(len) = wanted {
        self.pending.reserve(len - self.pending.len());
      }

      if self.stream.read_buf(&mut self.pending).await? == 0 {
        return Err(StoreError::ConnectionClosed);
      }
    }
  }

  pub(crate) async fn shutdown(mut self) -> Result<(), StoreError> {
    self.stream.shutdown().await?;
    Ok(())
  }
}
