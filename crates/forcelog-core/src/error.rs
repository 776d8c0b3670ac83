//! Error types for `forcelog-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown refresh mode: {0:?} (expected \"replace\" or \"append\")")]
  UnknownRefreshMode(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
