use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use music_store::config::{Backend, Config, LogConfig};
use music_store::server::Server;
use music_store::store::{KvStore, MemoryStore, RedisStore};

#[derive(Parser, Debug)]
#[command(version, about = "HTTP service for songs, users and liked songs")]
struct CliArgs {
  /// TOML configuration file
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// HTTP listening address, overrides the config file
  #[arg(long)]
  server_addr: Option<String>,

  /// Storage backend, overrides the config file
  #[arg(long, value_enum)]
  backend: Option<Backend>,
}

fn init_logging(log: &LogConfig) -> anyhow::Result<()> {
  let filter = tracing_subscriber::EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log.level));
  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_target(true)
    .with_thread_ids(true);

  match &log.file {
    Some(path) => {
      let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file '{}'", path))?;
      builder.with_ansi(false).with_writer(Arc::new(file)).init();
    }
    None => builder.init(),
  }
  Ok(())
}

fn load_config(args: &CliArgs) -> anyhow::Result<Config> {
  let mut config = match &args.config {
    Some(path) => Config::from_file(path)?,
    None => Config::default(),
  };
  config.store.apply_env(|name| std::env::var(name).ok());
  if let Some(addr) = &args.server_addr {
    config.server_addr = addr.clone();
  }
  if let Some(backend) = args.backend {
    config.store.backend = backend;
  }
  Ok(config)
}

async fn open_store(config: &Config) -> anyhow::Result<Arc<dyn KvStore>> {
  let store: Arc<dyn KvStore> = match config.store.backend {
    Backend::Redis => Arc::new(
      RedisStore::connect(config.store.clone())
        .await
        .with_context(|| format!("Failed to connect to Redis at {}", config.store.address))?,
    ),
    Backend::Memory => {
      info!("Using in-memory store, data is lost on exit");
      Arc::new(MemoryStore::new())
    }
  };
  Ok(store)
}

async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(e) = tokio::signal::ctrl_c().await {
      error!("Failed to listen for Ctrl-C: {}", e);
      std::future::pending::<()>().await;
    }
  };

  #[cfg(unix)]
  let terminate = async {
    match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
      Ok(mut signal) => {
        signal.recv().await;
      }
      Err(e) => {
        error!("Failed to listen for SIGTERM: {}", e);
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    _ = ctrl_c => {},
    _ = terminate => {},
  }
  info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let args = CliArgs::parse();
  let config = load_config(&args)?;
  init_logging(&config.log)?;

  info!("Starting music store");
  info!("Version: {}", env!("CARGO_PKG_VERSION"));

  let store = open_store(&config).await?;

  let server = Server::bind(&config.server_addr, store.clone())
    .await
    .with_context(|| format!("Failed to bind {}", config.server_addr))?;
  info!("Server listening on: {}", server.local_addr());

  let served = server.run(shutdown_signal()).await;

  if let Err(e) = store.close().await {
    error!("Error closing store: {}", e);
  }
  served.context("HTTP server failed")?;
  Ok(())
}
