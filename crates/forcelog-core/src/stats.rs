//! Race-distribution statistics over stored incidents.
//!
//! Percentages are rounded half-up to one decimal place using integer
//! arithmetic, so a given set of counts always renders the same way. Groups
//! are ordered by count descending, then race ascending (byte order).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{incident::Incident, store::IncidentStore};

// ─── Filter ──────────────────────────────────────────────────────────────────

/// Restricts the incident set an aggregation runs over.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StatsFilter {
  #[default]
  All,
  /// Exact, case-sensitive match on the `state` column.
  State(String),
}

impl StatsFilter {
  /// Parameter value meaning "no filter".
  pub const ALL: &'static str = "All";

  /// Map an optional request parameter onto a filter. The value is trimmed
  /// the same way stored states are. Absent, blank, and [`StatsFilter::ALL`]
  /// all mean no filtering.
  pub fn from_param(param: Option<&str>) -> Self {
    match param.map(str::trim) {
      None | Some("") | Some(Self::ALL) => Self::All,
      Some(state) => Self::State(state.to_owned()),
    }
  }

  pub fn state(&self) -> Option<&str> {
    match self {
      Self::All => None,
      Self::State(s) => Some(s),
    }
  }
}

// ─── Results ─────────────────────────────────────────────────────────────────

/// Raw group size as returned by a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaceCount {
  pub race:  String,
  pub count: u64,
}

/// One row of the race distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceStat {
  pub race:       String,
  pub count:      u64,
  /// Share of the filtered total, one decimal place.
  pub percentage: f64,
}

/// The full answer to a stats request. On failure `error` is set and both
/// lists are empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsReport {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error:            Option<String>,
  pub stats:            Vec<RaceStat>,
  pub recent_incidents: Vec<Incident>,
}

impl StatsReport {
  pub fn failed(message: impl Into<String>) -> Self {
    Self { error: Some(message.into()), ..Self::default() }
  }
}

// ─── Aggregation ─────────────────────────────────────────────────────────────

/// `round(100 * count / total, 1)`, rounding half up. Zero when `total` is
/// zero.
///
/// Each group is rounded on its own, so a result with `n` groups sums to
/// within `0.05 * n` of 100.0 (sixteen equal groups of 6.25 give 100.8).
pub fn percentage(count: u64, total: u64) -> f64 {
  if total == 0 {
    return 0.0;
  }
  let (count, total) = (u128::from(count), u128::from(total));
  let tenths = (2000 * count + total) / (2 * total);
  tenths as f64 / 10.0
}

/// Merge `counts` by race and turn them into ordered [`RaceStat`]s. Empty
/// input (or an all-zero total) yields an empty list.
pub fn race_stats(counts: impl IntoIterator<Item = RaceCount>) -> Vec<RaceStat> {
  let mut merged: BTreeMap<String, u64> = BTreeMap::new();
  for RaceCount { race, count } in counts {
    *merged.entry(race).or_default() += count;
  }
  let total: u64 = merged.values().sum();
  if total == 0 {
    return Vec::new();
  }

  let mut stats: Vec<RaceStat> = merged
    .into_iter()
    .filter(|(_, count)| *count > 0)
    .map(|(race, count)| RaceStat { race, count, percentage: percentage(count, total) })
    .collect();
  // BTreeMap iteration is already race-ascending; a stable sort keeps that
  // as the tie-break.
  stats.sort_by(|a, b| b.count.cmp(&a.count));
  stats
}

/// Run a stats query against `store`.
///
/// Store failures are logged and turned into [`StatsReport::failed`]; this
/// function never returns an error.
pub async fn compute_stats<S: IncidentStore>(
  store: &S,
  filter: &StatsFilter,
  recent_limit: Option<usize>,
) -> StatsReport {
  match store.snapshot(filter, recent_limit).await {
    Ok(snapshot) => StatsReport {
      error:            None,
      stats:            race_stats(snapshot.race_counts),
      recent_incidents: snapshot.incidents,
    },
    Err(e) => {
      tracing::error!(error = %e, ?filter, "stats query failed");
      StatsReport::failed(e.to_string())
    }
  }
}
