//! Dataset ingestion for forcelog.
//!
//! Fetches the incidents CSV (over HTTP or from disk), normalizes every row
//! with [`forcelog_core::normalize`], and writes the batch into an
//! [`forcelog_core::store::IncidentStore`] in one transaction.
//!
//! ```rust,ignore
//! let pipeline = Pipeline::new(store, Fetcher::new(Duration::from_secs(60))?);
//! let report = pipeline.refresh(&Source::from(url), RefreshMode::Replace).await;
//! ```

pub mod error;
pub mod parse;
pub mod pipeline;
pub mod source;

pub use error::{Error, Result};
pub use pipeline::{IngestReport, Pipeline};
pub use source::{DEFAULT_SOURCE_URL, Fetcher, Source};
