use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::body::HealthBody;
use super::state::AppState;
use super::{songs, users};
use crate::store::KvStore;

fn format_uptime(duration: Duration) -> String {
  let total_seconds = duration.as_secs();

  let days = total_seconds / 86_400;
  let hours = (total_seconds % 86_400) / 3600;
  let minutes = (total_seconds % 3600) / 60;
  let seconds = total_seconds % 60;

  format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn health(State(state): State<AppState>) -> Json<HealthBody> {
  Json(HealthBody {
    status: "ok".to_string(),
    uptime: format_uptime(state.start_time.elapsed()),
  })
}

/// Build the HTTP application over an explicitly provided store
pub fn make_app(store: Arc<dyn KvStore>) -> Router {
  let state = AppState::new(store);
  Router::new()
    .route("/health", get(health))
    .merge(songs::routes())
    .merge(users::routes())
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

/// HTTP server
pub struct Server {
  listener: TcpListener,
  local_addr: SocketAddr,
  app: Router,
}

impl Server {
  /// Bind the listener; the store is shared by every request
  pub async fn bind(addr: &str, store: Arc<dyn KvStore>) -> std::io::Result<Self> {
    let listener = TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;
    info!("HTTP server bound to {}", local_addr);

    Ok(Self {
      listener,
      local_addr,
      app: make_app(store),
    })
  }

  /// Get local listening address
  pub fn local_addr(&self) -> SocketAddr {
    self.local_addr
  }

  /// Serve requests until `shutdown` resolves, then drain in-flight ones
  pub async fn run<F>(self, shutdown: F) -> std::io::Result<()>
  where
    F: Future<Output = ()> + Send + 'static,
  {
    info!("Server started, listening on {}", self.local_addr);
    axum::serve(self.listener, self.app)
      .with_graceful_shutdown(shutdown)
      .await?;
    info!("Server stopped");
    Ok(())
  }
}
