//! CSV decoding into [`RawRecord`]s.
//!
//! The header row decides whether the resource is usable at all: it must be
//! readable and must name an `id` column. Past the header, a bad row only
//! costs that row.

use std::collections::BTreeSet;

use forcelog_core::normalize::RawRecord;
use tracing::{debug, warn};

use crate::{Error, Result};

pub const ID_COLUMN: &str = "id";

/// Optional fields, each with the header names that can supply it.
const OPTIONAL_FIELDS: &[&[&str]] = &[
  &["name"],
  &["date"],
  &["race"],
  &["city"],
  &["state"],
  &["armed_with", "armed"],
  &["body_camera"],
  &["age"],
  &["gender"],
  &["threat_type", "threat_level"],
  &["flee_status", "flee"],
];

// ─── Columns ─────────────────────────────────────────────────────────────────

/// The set of column names present in a CSV header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Columns(BTreeSet<String>);

impl Columns {
  pub fn from_headers(headers: &csv::StringRecord) -> Self {
    Self(headers.iter().map(str::to_owned).collect())
  }

  pub fn has(&self, name: &str) -> bool { self.0.contains(name) }

  /// Optional fields for which no accepted header name is present. Their
  /// values will be empty in every row.
  pub fn missing_optional(&self) -> Vec<&'static str> {
    OPTIONAL_FIELDS
      .iter()
      .filter(|names| !names.iter().any(|n| self.has(n)))
      .map(|names| names[0])
      .collect()
  }
}

// ─── Parsing ─────────────────────────────────────────────────────────────────

/// Outcome of decoding a whole CSV resource.
#[derive(Debug, Default)]
pub struct ParsedCsv {
  pub columns:   Columns,
  pub records:   Vec<RawRecord>,
  /// Rows that could not be decoded (wrong field count, invalid UTF-8).
  pub malformed: u64,
}

/// Decode `data` as a headed CSV.
///
/// Fails only when the header row is unreadable or lacks an `id` column.
pub fn parse_csv(data: &[u8]) -> Result<ParsedCsv> {
  let mut reader = csv::ReaderBuilder::new()
    .has_headers(true)
    .flexible(false)
    .trim(csv::Trim::Headers)
    .from_reader(data);

  let headers = reader
    .headers()
    .map_err(|e| Error::Parse(format!("unreadable header row: {e}")))?;
  let columns = Columns::from_headers(headers);

  if !columns.has(ID_COLUMN) {
    return Err(Error::Parse(format!("missing required column {ID_COLUMN:?}")));
  }
  for column in columns.missing_optional() {
    warn!(column, "optional column absent from csv; field will be empty");
  }

  let mut parsed = ParsedCsv { columns, ..ParsedCsv::default() };
  for result in reader.deserialize::<RawRecord>() {
    match result {
      Ok(record) => parsed.records.push(record),
      Err(e) => {
        parsed.malformed += 1;
        debug!(line = e.position().map(csv::Position::line), error = %e, "skipping malformed csv row");
      }
    }
  }

  if parsed.malformed > 0 {
    warn!(malformed = parsed.malformed, "skipped malformed csv rows");
  }
  Ok(parsed)
}
