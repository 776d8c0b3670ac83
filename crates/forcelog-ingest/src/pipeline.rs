//! The refresh pipeline: fetch → parse → normalize → load.
//!
//! [`Pipeline::refresh`] never fails outright. Every outcome, including a
//! fetch failure or a rolled-back load, comes back as an [`IngestReport`].

use std::sync::Arc;

use forcelog_core::{
  incident::RefreshMode,
  normalize::normalize,
  store::IncidentStore,
};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{Instrument as _, debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::{
  Error, Result,
  parse::parse_csv,
  source::{Fetcher, Source},
};

// ─── Report ──────────────────────────────────────────────────────────────────

/// Summary of one refresh run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestReport {
  pub run_id:         Uuid,
  pub mode:           RefreshMode,
  /// Rows written to the store. Zero whenever `error` is set.
  pub imported_count: u64,
  /// Malformed CSV rows plus rows the normalizer rejected.
  pub skipped_count:  u64,
  pub error:          Option<String>,
}

impl IngestReport {
  pub fn is_success(&self) -> bool { self.error.is_none() }

  fn failed(run_id: Uuid, mode: RefreshMode, err: &Error) -> Self {
    Self {
      run_id,
      mode,
      imported_count: 0,
      skipped_count: 0,
      error: Some(err.to_string()),
    }
  }
}

// ─── Pipeline ────────────────────────────────────────────────────────────────

/// Runs refreshes against one store, at most one at a time.
pub struct Pipeline<S> {
  store:              Arc<S>,
  fetcher:            Fetcher,
  /// Held for the whole run; a second refresh is rejected, not queued.
  pub(crate) running: Mutex<()>,
}

impl<S: IncidentStore> Pipeline<S> {
  pub fn new(store: Arc<S>, fetcher: Fetcher) -> Self {
    Self { store, fetcher, running: Mutex::new(()) }
  }

  pub fn store(&self) -> &Arc<S> { &self.store }

  /// Fetch `source` and write it into the store using `mode`.
  ///
  /// Returns immediately with a [`Error::RefreshInProgress`] report if
  /// another refresh holds the pipeline. A fetch or parse failure leaves the
  /// store untouched; a load failure is rolled back by the store.
  pub async fn refresh(&self, source: &Source, mode: RefreshMode) -> IngestReport {
    let run_id = Uuid::new_v4();
    let span = info_span!("refresh", %run_id, %mode, %source);

    async move {
      match self.run(source, mode).await {
        Ok((imported_count, skipped_count)) => {
          info!(imported_count, skipped_count, "refresh complete");
          IngestReport { run_id, mode, imported_count, skipped_count, error: None }
        }
        Err(e) => {
          error!(kind = e.kind(), error = %e, "refresh failed");
          IngestReport::failed(run_id, mode, &e)
        }
      }
    }
    .instrument(span)
    .await
  }

  async fn run(&self, source: &Source, mode: RefreshMode) -> Result<(u64, u64)> {
    let _running = self.running.try_lock().map_err(|_| Error::RefreshInProgress)?;

    let body = self.fetcher.fetch(source).await?;
    debug!(bytes = body.len(), "fetched csv");
    let parsed = parse_csv(&body)?;

    let mut skipped = parsed.malformed;
    let mut rows = Vec::with_capacity(parsed.records.len());
    for record in parsed.records {
      match normalize(record) {
        Ok(row) => rows.push(row),
        Err(rejection) => {
          skipped += 1;
          debug!(%rejection, "skipping row");
        }
      }
    }
    if skipped > parsed.malformed {
      warn!(rejected = skipped - parsed.malformed, "normalizer rejected rows");
    }

    let imported = self
      .store
      .load(mode, rows)
      .await
      .map_err(|e| Error::Store(Box::new(e)))?;
    Ok((imported, skipped))
  }
}

impl<S: IncidentStore + 'static> Pipeline<S> {
  /// Like [`Pipeline::refresh`], but runs on its own tokio task so the run
  /// completes even if the caller's future is dropped (e.g. an HTTP client
  /// disconnecting mid-refresh).
  pub async fn refresh_detached(
    self: Arc<Self>,
    source: Source,
    mode: RefreshMode,
  ) -> IngestReport {
    let handle = tokio::spawn(async move { self.refresh(&source, mode).await });
    match handle.await {
      Ok(report) => report,
      Err(e) => {
        error!(error = %e, "refresh task did not complete");
        IngestReport {
          run_id: Uuid::nil(),
          mode,
          imported_count: 0,
          skipped_count: 0,
          error: Some(format!("refresh task did not complete: {e}")),
        }
      }
    }
  }
}
