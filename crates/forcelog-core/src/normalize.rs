//! Row normalizer: one raw CSV record in, one [`NewIncident`] out.
//!
//! Only the identifier is mandatory. Every other column may be missing from
//! the file, empty in a given row, or hold a value that fails to parse; such
//! fields fall back to their defaults instead of rejecting the row.

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use crate::incident::{NewIncident, UNKNOWN_RACE};

// ─── Raw record ──────────────────────────────────────────────────────────────

/// A dataset row as read from the CSV, keyed by header name.
///
/// Columns absent from the header deserialize to `None`, as do empty cells.
/// Both the current (`armed_with`, `threat_type`, `flee_status`) and the
/// legacy (`armed`, `threat_level`, `flee`) column names are accepted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawRecord {
  pub id:           Option<String>,
  pub name:         Option<String>,
  pub date:         Option<String>,
  pub race:         Option<String>,
  pub city:         Option<String>,
  pub state:        Option<String>,
  pub armed_with:   Option<String>,
  pub armed:        Option<String>,
  pub body_camera:  Option<String>,
  pub age:          Option<String>,
  pub gender:       Option<String>,
  pub threat_type:  Option<String>,
  pub threat_level: Option<String>,
  pub flee_status:  Option<String>,
  pub flee:         Option<String>,
}

/// Why a single row was skipped. Never fatal to an import.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowRejection {
  #[error("row has no id")]
  MissingId,

  #[error("row id is not an integer: {0:?}")]
  InvalidId(String),
}

// ─── Normalization ───────────────────────────────────────────────────────────

/// Validate `raw` and apply defaults.
pub fn normalize(raw: RawRecord) -> Result<NewIncident, RowRejection> {
  let external_id = parse_id(raw.id.as_deref())?;

  Ok(NewIncident {
    external_id,
    name:        text(raw.name),
    date:        raw.date.as_deref().and_then(parse_date),
    race:        normalize_race(raw.race.as_deref()),
    city:        text(raw.city),
    state:       text(raw.state),
    armed_with:  text(raw.armed_with).or_else(|| text(raw.armed)),
    body_camera: normalize_body_camera(raw.body_camera.as_deref()),
    age:         raw.age.as_deref().and_then(parse_age),
    gender:      text(raw.gender),
    threat_type: text(raw.threat_type).or_else(|| text(raw.threat_level)),
    flee_status: text(raw.flee_status).or_else(|| text(raw.flee)),
  })
}

/// Trimmed race, or [`UNKNOWN_RACE`] when absent or blank.
pub fn normalize_race(raw: Option<&str>) -> String {
  match raw.map(str::trim) {
    Some(race) if !race.is_empty() => race.to_owned(),
    _ => UNKNOWN_RACE.to_owned(),
  }
}

/// `true` iff the trimmed value is `"true"` in any letter case.
pub fn normalize_body_camera(raw: Option<&str>) -> bool {
  raw.is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

/// Integer ids, plus float renderings with no fractional part (`"12.0"`),
/// which some exports produce for integer columns containing gaps.
fn parse_id(raw: Option<&str>) -> Result<i64, RowRejection> {
  let raw = raw.map(str::trim).unwrap_or_default();
  if raw.is_empty() {
    return Err(RowRejection::MissingId);
  }
  if let Ok(id) = raw.parse::<i64>() {
    return Ok(id);
  }
  match raw.parse::<f64>() {
    // 2^53: beyond this an f64 no longer holds every integer exactly.
    Ok(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 9_007_199_254_740_992.0 => {
      Ok(v as i64)
    }
    _ => Err(RowRejection::InvalidId(raw.to_owned())),
  }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
  NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// `"nan"` and `"inf"` parse as floats, so finiteness is checked explicitly.
fn parse_age(raw: &str) -> Option<f64> {
  raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn text(raw: Option<String>) -> Option<String> {
  let raw = raw?;
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    None
  } else if trimmed.len() == raw.len() {
    Some(raw)
  } else {
    Some(trimmed.to_owned())
  }
}
