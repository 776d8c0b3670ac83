//! Runtime configuration.
//!
//! Read from an optional TOML file, then overridden by `FORCELOG_*`
//! environment variables (`FORCELOG_CRON_SECRET`, `FORCELOG_PORT`, ...).

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use forcelog_api::ApiSettings;
use forcelog_ingest::{DEFAULT_SOURCE_URL, Source};
use serde::Deserialize;

pub const ENV_PREFIX: &str = "FORCELOG";

/// Runtime server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                  String,
  pub port:                  u16,
  pub store_path:            PathBuf,
  /// Bearer secret for `/update-database`. Unset disables the endpoint.
  pub cron_secret:           Option<String>,
  pub source_url:            String,
  pub fetch_timeout_secs:    u64,
  /// Cap on `recent_incidents` in stats responses.
  pub recent_limit:          Option<usize>,
  /// Run a replace-mode refresh this often. Unset disables the scheduler.
  pub refresh_interval_secs: Option<u64>,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                  "127.0.0.1".to_string(),
      port:                  8000,
      store_path:            PathBuf::from("forcelog.db"),
      cron_secret:           None,
      source_url:            DEFAULT_SOURCE_URL.to_string(),
      fetch_timeout_secs:    60,
      recent_limit:          None,
      refresh_interval_secs: None,
    }
  }
}

impl ServerConfig {
  /// Load `file` (if present) and the environment on top of the defaults.
  pub fn load(file: &Path) -> Result<Self, config::ConfigError> {
    Self::from_builder(
      config::Config::builder()
        .add_source(config::File::from(file.to_path_buf()).required(false))
        .add_source(config::Environment::with_prefix(ENV_PREFIX)),
    )
  }

  fn from_builder(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
  ) -> Result<Self, config::ConfigError> {
    let mut cfg: Self = builder.build()?.try_deserialize()?;
    cfg.store_path = expand_tilde(&cfg.store_path);
    Ok(cfg)
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn source(&self) -> Source { Source::from(self.source_url.as_str()) }

  pub fn fetch_timeout(&self) -> Duration { Duration::from_secs(self.fetch_timeout_secs) }

  /// `None` when unset or zero.
  pub fn refresh_interval(&self) -> Option<Duration> {
    self
      .refresh_interval_secs
      .filter(|&secs| secs > 0)
      .map(Duration::from_secs)
  }

  pub fn api_settings(&self) -> ApiSettings {
    ApiSettings {
      cron_secret:  self.cron_secret.clone().filter(|s| !s.is_empty()),
      source:       self.source(),
      recent_limit: self.recent_limit,
    }
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
