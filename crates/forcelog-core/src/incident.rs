//! Incident types: one stored police-shooting record.
//!
//! Incidents are only ever written in bulk by a refresh; there is no
//! per-record update or delete.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Stored race value for rows whose source race is absent or blank.
pub const UNKNOWN_RACE: &str = "Unknown";

// ─── Incident ────────────────────────────────────────────────────────────────

/// A persisted incident. `id` is assigned by the store; `external_id` is the
/// identifier from the upstream dataset and may repeat across append-mode
/// refreshes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
  pub id:          i64,
  pub external_id: i64,
  pub name:        Option<String>,
  pub date:        Option<NaiveDate>,
  /// Never empty; blank source values are stored as [`UNKNOWN_RACE`].
  pub race:        String,
  pub city:        Option<String>,
  pub state:       Option<String>,
  /// Weapon status. Older dataset revisions call this column `armed`.
  #[serde(alias = "armed")]
  pub armed_with:  Option<String>,
  pub body_camera: bool,
  /// Always finite when present.
  pub age:         Option<f64>,
  pub gender:      Option<String>,
  pub threat_type: Option<String>,
  pub flee_status: Option<String>,
}

// ─── NewIncident ─────────────────────────────────────────────────────────────

/// A normalized incident ready for insertion. Produced by
/// [`crate::normalize::normalize`]; the store assigns `id`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewIncident {
  pub external_id: i64,
  pub name:        Option<String>,
  pub date:        Option<NaiveDate>,
  pub race:        String,
  pub city:        Option<String>,
  pub state:       Option<String>,
  pub armed_with:  Option<String>,
  pub body_camera: bool,
  pub age:         Option<f64>,
  pub gender:      Option<String>,
  pub threat_type: Option<String>,
  pub flee_status: Option<String>,
}

impl NewIncident {
  /// An incident carrying only an identifier, with every optional field
  /// empty and race set to [`UNKNOWN_RACE`].
  pub fn new(external_id: i64) -> Self {
    Self {
      external_id,
      name: None,
      date: None,
      race: UNKNOWN_RACE.to_owned(),
      city: None,
      state: None,
      armed_with: None,
      body_camera: false,
      age: None,
      gender: None,
      threat_type: None,
      flee_status: None,
    }
  }

  /// Attach the store-assigned primary key.
  pub fn with_id(self, id: i64) -> Incident {
    Incident {
      id,
      external_id: self.external_id,
      name:        self.name,
      date:        self.date,
      race:        self.race,
      city:        self.city,
      state:       self.state,
      armed_with:  self.armed_with,
      body_camera: self.body_camera,
      age:         self.age,
      gender:      self.gender,
      threat_type: self.threat_type,
      flee_status: self.flee_status,
    }
  }
}

// ─── RefreshMode ─────────────────────────────────────────────────────────────

/// How a refresh writes into the incidents table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshMode {
  /// Delete every row, then insert the new batch, in one transaction.
  #[default]
  Replace,
  /// Insert the new batch alongside existing rows. No deduplication.
  Append,
}

impl RefreshMode {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Replace => "replace",
      Self::Append => "append",
    }
  }
}

impl fmt::Display for RefreshMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for RefreshMode {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "replace" => Ok(Self::Replace),
      "append" => Ok(Self::Append),
      _ => Err(Error::UnknownRefreshMode(s.to_owned())),
    }
  }
}
