//! Record encoding for storage
//!
//! Records are stored as JSON under keys namespaced by entity type, so songs
//! and users share one flat key space without colliding.

use derive_more::Display;
use serde::Serialize;
use serde::de::{Deserialize, DeserializeOwned, Deserializer};
use thiserror::Error;

/// Entity-type tag that prefixes every storage key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Namespace {
  #[display("song")]
  Song,
  #[display("user")]
  User,
}

impl Namespace {
  /// Prefix shared by every key of this namespace, e.g. `song:`
  pub fn prefix(self) -> String {
    format!("{}:", self)
  }

  /// Storage key for the record identified by `id`
  pub fn key(self, id: &str) -> String {
    format!("{}:{}", self, id)
  }

  /// Recover the identifier from a key of this namespace
  pub fn id_of(self, key: &str) -> Option<&str> {
    key.strip_prefix(self.as_str())?.strip_prefix(':')
  }

  fn as_str(self) -> &'static str {
    match self {
      Namespace::Song => "song",
      Namespace::User => "user",
    }
  }
}

/// A record type that can be stored under its own namespace
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + 'static {
  const NAMESPACE: Namespace;

  /// Primary key inside the namespace
  fn id(&self) -> &str;

  fn set_id(&mut self, id: String);

  fn key(&self) -> String {
    Self::NAMESPACE.key(self.id())
  }
}

/// Stored bytes that do not parse as the expected entity
#[derive(Debug, Error)]
#[error("invalid {namespace} record: {source}")]
pub struct DecodeError {
  pub namespace: Namespace,
  #[source]
  pub source: serde_json::Error,
}

/// An entity that could not be turned into bytes
#[derive(Debug, Error)]
#[error("cannot encode {namespace} record: {source}")]
pub struct EncodeError {
  pub namespace: Namespace,
  #[source]
  pub source: serde_json::Error,
}

pub fn encode<E: Entity>(entity: &E) -> Result<Vec<u8>, EncodeError> {
  serde_json::to_vec(entity).map_err(|source| EncodeError {
    namespace: E::NAMESPACE,
    source,
  })
}

pub fn decode<E: Entity>(bytes: &[u8]) -> Result<E, DecodeError> {
  serde_json::from_slice(bytes).map_err(|source| DecodeError {
    namespace: E::NAMESPACE,
    source,
  })
}

/// Accept `null` wherever a list is expected; older writers emitted it for
/// empty lists.
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de>,
{
  Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
