use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::{error, warn};

use crate::error::Error;

/// A service failure plus the message shown to the client
#[derive(Debug)]
pub struct ApiError {
  msg: &'static str,
  source: Error,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
  msg: &'a str,
  error: String,
}

impl ApiError {
  pub fn new(msg: &'static str, source: Error) -> Self {
    Self { msg, source }
  }

  /// Returns a closure for `map_err` that attaches `msg`
  pub fn with(msg: &'static str) -> impl FnOnce(Error) -> Self {
    move |source| Self::new(msg, source)
  }

  pub fn status(&self) -> StatusCode {
    match &self.source {
      Error::NotFound { .. } => StatusCode::NOT_FOUND,
      Error::MissingId { .. } => StatusCode::BAD_REQUEST,
      Error::Decode { .. } | Error::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
      Error::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      error!(msg = self.msg, error = %self.source, "request failed");
    } else {
      warn!(msg = self.msg, error = %self.source, "request rejected");
    }
    let body = ErrorBody {
      msg: self.msg,
      error: self.source.to_string(),
    };
    (status, Json(body)).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::encoding::Namespace;
  use crate::store::StoreError;

  #[test]
  fn test_status_mapping() {
    let not_found = ApiError::new(
      "Error getting song",
      Error::NotFound {
        namespace: Namespace::Song,
        id: "x".to_string(),
      },
    );
    assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

    let missing = ApiError::new(
      "Error creating user",
      Error::MissingId {
        namespace: Namespace::User,
      },
    );
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

    let store = ApiError::new("Error deleting song", Error::Store(StoreError::PoolTimeout));
    assert_eq!(store.status(), StatusCode::SERVICE_UNAVAILABLE);
  }
}
