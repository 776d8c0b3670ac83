//! Handler for `GET /api/stats` (alias `GET /stats`).
//!
//! | Param   | Default | Notes                               |
//! |---------|---------|-------------------------------------|
//! | `state` | `All`   | Exact state match; `All` = no filter |
//!
//! Always answers `200`. On a store failure the body is
//! `{"error": "...", "stats": [], "recent_incidents": []}`.

use axum::{
  Json,
  extract::{Query, State},
};
use forcelog_core::{
  stats::{StatsFilter, StatsReport, compute_stats},
  store::IncidentStore,
};
use serde::Deserialize;

use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct StatsParams {
  pub state: Option<String>,
}

/// `GET /api/stats[?state=XX]`
pub async fn handler<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<StatsParams>,
) -> Json<StatsReport>
where
  S: IncidentStore + 'static,
{
  let filter = StatsFilter::from_param(params.state.as_deref());
  let report = compute_stats(state.store().as_ref(), &filter, state.settings.recent_limit).await;
  Json(report)
}
