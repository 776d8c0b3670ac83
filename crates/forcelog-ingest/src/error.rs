//! Error types for `forcelog-ingest`.
//!
//! Every variant is fatal to the refresh it occurs in. Row-level problems
//! are never errors: they are counted as skipped rows instead.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("fetch failed: {0}")]
  Fetch(#[from] reqwest::Error),

  #[error("upstream returned HTTP {0}")]
  UpstreamStatus(reqwest::StatusCode),

  #[error("cannot read {}: {source}", path.display())]
  ReadFile {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("malformed csv: {0}")]
  Parse(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("a refresh is already in progress")]
  RefreshInProgress,
}

impl Error {
  /// Short machine-readable category, used as a log field.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::Fetch(_) | Self::UpstreamStatus(_) | Self::ReadFile { .. } => "fetch",
      Self::Parse(_) => "parse",
      Self::Store(_) => "store",
      Self::RefreshInProgress => "busy",
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
