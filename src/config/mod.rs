use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Log configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LogConfig {
  /// Log file path, if not set, logs will be printed to stdout
  pub file: Option<String>,
  /// Log level, default is "info"
  #[serde(default = "default_log_level")]
  pub level: String,
}

fn default_log_level() -> String {
  "info".to_string()
}

impl Default for LogConfig {
  fn default() -> Self {
    Self {
      file: None,
      level: default_log_level(),
    }
  }
}

/// Which key-value backend holds the records
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
  #[default]
  Redis,
  Memory,
}

/// Connection settings for the key-value store
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
  pub backend: Backend,
  /// host:port of the Redis server
  pub address: String,
  /// Empty means no AUTH is sent
  pub password: String,
  /// Logical database index, SELECT is only sent when non-zero
  pub database: u32,
  pub dial_timeout_ms: u64,
  pub read_timeout_ms: u64,
  pub write_timeout_ms: u64,
  /// Maximum number of open connections
  pub pool_size: usize,
  /// How long a caller waits for a free connection
  pub pool_timeout_ms: u64,
  /// COUNT hint for each SCAN round-trip
  pub scan_count: usize,
}

impl Default for StoreConfig {
  fn default() -> Self {
    Self {
      backend: Backend::Redis,
      address: "localhost:6379".to_string(),
      password: String::new(),
      database: 0,
      dial_timeout_ms: 10_000,
      read_timeout_ms: 30_000,
      write_timeout_ms: 30_000,
      pool_size: 10,
      pool_timeout_ms: 30_000,
      scan_count: 100,
    }
  }
}

impl StoreConfig {
  pub fn dial_timeout(&self) -> Duration {
    Duration::from_millis(self.dial_timeout_ms)
  }

  pub fn read_timeout(&self) -> Duration {
    Duration::from_millis(self.read_timeout_ms)
  }

  pub fn write_timeout(&self) -> Duration {
    Duration::from_millis(self.write_timeout_ms)
  }

  pub fn pool_timeout(&self) -> Duration {
    Duration::from_millis(self.pool_timeout_ms)
  }

  /// Apply `REDIS_ADDR` / `REDIS_PASSWORD` overrides from a variable lookup
  pub fn apply_env<F>(&mut self, lookup: F)
  where
    F: Fn(&str) -> Option<String>,
  {
    if let Some(address) = lookup("REDIS_ADDR").filter(|a| !a.is_empty()) {
      self.address = address;
    }
    if let Some(password) = lookup("REDIS_PASSWORD") {
      self.password = password;
    }
  }
}

/// Music store configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
  /// HTTP listening address
  #[serde(default = "default_server_addr")]
  pub server_addr: String,

  /// Log configuration
  #[serde(default)]
  pub log: LogConfig,

  /// Key-value store configuration
  #[serde(default)]
  pub store: StoreConfig,
}

fn default_server_addr() -> String {
  "0.0.0.0:8080".to_string()
}

impl Default for Config {
  fn default() -> Self {
    Self {
      server_addr: default_server_addr(),
      log: LogConfig::default(),
      store: StoreConfig::default(),
    }
  }
}

impl Config {
  /// Load configuration from TOML file
  pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
    let path = path.as_ref();
    let config_str = fs::read_to_string(path)
      .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;
    Self::from_toml(&config_str)
      .map_err(|e| anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e))
  }

  pub fn from_toml(config_str: &str) -> anyhow::Result<Self> {
    let config: Config = toml::from_str(config_str)?;
    config.validate()?;
    Ok(config)
  }

  fn validate(&self) -> anyhow::Result<()> {
    if self.store.pool_size == 0 {
      anyhow::bail!("store.pool_size must be at least 1");
    }
    if self.store.scan_count == 0 {
      anyhow::bail!("store.scan_count must be at least 1");
    }
    Ok(())
  }
}
