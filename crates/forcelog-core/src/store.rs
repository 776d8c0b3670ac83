//! The `IncidentStore` trait.
//!
//! Implemented by storage backends (e.g. `forcelog-store-sqlite`). The
//! ingestion pipeline and the HTTP layer depend on this abstraction only.

use std::future::Future;

use crate::{
  incident::{Incident, NewIncident, RefreshMode},
  stats::{RaceCount, StatsFilter},
};

/// A consistent read of the incidents table: per-race counts and the
/// matching incidents, taken inside one read transaction.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
  pub race_counts: Vec<RaceCount>,
  /// Newest first: `date` descending (undated last), then `id` descending.
  pub incidents:   Vec<Incident>,
}

/// Abstraction over a forcelog incident store backend.
///
/// Writes happen only in bulk through [`IncidentStore::load`]. All methods
/// return `Send` futures so the trait can be used behind axum handlers.
pub trait IncidentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Write `rows` in a single transaction.
  ///
  /// With [`RefreshMode::Replace`] every existing row is deleted first. If
  /// any insert fails the transaction rolls back and the table is left
  /// exactly as it was. Returns the number of rows inserted.
  fn load(
    &self,
    mode: RefreshMode,
    rows: Vec<NewIncident>,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Number of incidents matching `filter`. Reported after one-shot
  /// imports.
  fn count<'a>(
    &'a self,
    filter: &'a StatsFilter,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + 'a;

  /// Per-race counts and up to `limit` incidents (all when `None`) matching
  /// `filter`.
  fn snapshot<'a>(
    &'a self,
    filter: &'a StatsFilter,
    limit: Option<usize>,
  ) -> impl Future<Output = Result<Snapshot, Self::Error>> + Send + 'a;
}
