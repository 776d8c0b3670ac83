//! Where a refresh reads its CSV from, and the client that reads it.

use std::{fmt, path::PathBuf, time::Duration};

use bytes::Bytes;
use reqwest::Client;

use crate::{Error, Result};

/// The Washington Post fatal police shootings dataset.
pub const DEFAULT_SOURCE_URL: &str = "https://raw.githubusercontent.com/washingtonpost/data-police-shootings/master/fatal-police-shootings-data.csv";

/// Connection establishment never waits longer than this, even when the
/// overall fetch timeout is larger.
const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

// ─── Source ──────────────────────────────────────────────────────────────────

/// A CSV location: an HTTP(S) URL or a local file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
  Url(String),
  File(PathBuf),
}

impl From<&str> for Source {
  /// Strings starting with `http://` or `https://` are URLs; anything else is
  /// a file path.
  fn from(s: &str) -> Self {
    let lower = s.trim_start().to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
      Self::Url(s.trim().to_owned())
    } else {
      Self::File(PathBuf::from(s))
    }
  }
}

impl From<String> for Source {
  fn from(s: String) -> Self { Self::from(s.as_str()) }
}

impl From<PathBuf> for Source {
  fn from(path: PathBuf) -> Self { Self::File(path) }
}

impl fmt::Display for Source {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Url(url) => f.write_str(url),
      Self::File(path) => write!(f, "{}", path.display()),
    }
  }
}

// ─── Fetcher ─────────────────────────────────────────────────────────────────

/// Reads a [`Source`] fully into memory.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Debug, Clone)]
pub struct Fetcher {
  client: Client,
}

impl Fetcher {
  /// `timeout` bounds the whole HTTP exchange, body included.
  pub fn new(timeout: Duration) -> Result<Self> {
    let client = Client::builder()
      .timeout(timeout)
      .connect_timeout(timeout.min(MAX_CONNECT_TIMEOUT))
      .user_agent(concat!("forcelog/", env!("CARGO_PKG_VERSION")))
      .build()?;
    Ok(Self { client })
  }

  pub async fn fetch(&self, source: &Source) -> Result<Bytes> {
    match source {
      Source::Url(url) => {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
          return Err(Error::UpstreamStatus(status));
        }
        Ok(resp.bytes().await?)
      }
      Source::File(path) => tokio::fs::read(path)
        .await
        .map(Bytes::from)
        .map_err(|source| Error::ReadFile { path: path.clone(), source }),
    }
  }
}
