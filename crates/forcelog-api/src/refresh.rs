//! Handler for `GET /update-database`.
//!
//! Requires the cron secret (see [`crate::auth`]). Runs a replace-mode
//! refresh against the configured upstream source. Pipeline failures are
//! reported with `200` and `{"status": "error", "message": ...}`.

use axum::{Json, extract::State};
use forcelog_core::{incident::RefreshMode, store::IncidentStore};
use forcelog_ingest::IngestReport;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, auth::CronAuthorized};

/// Body returned by the refresh trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RefreshResponse {
  Success {
    run_id:        Uuid,
    updated_count: u64,
    skipped_count: u64,
  },
  Error {
    run_id:  Uuid,
    message: String,
  },
}

impl From<IngestReport> for RefreshResponse {
  fn from(report: IngestReport) -> Self {
    match report.error {
      None => Self::Success {
        run_id:        report.run_id,
        updated_count: report.imported_count,
        skipped_count: report.skipped_count,
      },
      Some(message) => Self::Error { run_id: report.run_id, message },
    }
  }
}

/// `GET /update-database` with `Authorization: Bearer <secret>`
pub async fn handler<S>(
  _auth: CronAuthorized,
  State(state): State<AppState<S>>,
) -> Json<RefreshResponse>
where
  S: IncidentStore + 'static,
{
  let report = state
    .pipeline
    .clone()
    .refresh_detached(state.settings.source.clone(), RefreshMode::Replace)
    .await;
  Json(report.into())
}
