use thiserror::Error;

use crate::encoding::{DecodeError, EncodeError, Namespace};
use crate::store::StoreError;

/// Faults surfaced by repositories and services.
///
/// Expected business results ("already liked", "was not liked") are not
/// errors; see [`crate::service::Outcome`].
#[derive(Debug, Error)]
pub enum Error {
  #[error("{namespace} '{id}' not found")]
  NotFound { namespace: Namespace, id: String },

  #[error("record under '{key}' is corrupt: {source}")]
  Decode {
    key: String,
    #[source]
    source: DecodeError,
  },

  #[error(transparent)]
  Encode(#[from] EncodeError),

  #[error("{namespace} identifier must not be empty")]
  MissingId { namespace: Namespace },

  #[error("store error: {0}")]
  Store(#[from] StoreError),
}

impl Error {
  pub fn is_not_found(&self) -> bool {
    matches!(self, Error::NotFound { .. })
  }
}

pub type Result<T> = std::result::Result<T, Error>;
