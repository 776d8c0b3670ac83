//! Encoding and decoding helpers between domain types and SQLite columns.
//!
//! Dates are stored as `YYYY-MM-DD` text; booleans as 0/1 integers.

use chrono::NaiveDate;
use forcelog_core::incident::Incident;

use crate::{Error, Result};

/// Column list shared by every incident `SELECT`; order matches
/// [`RawIncident::from_row`].
pub const INCIDENT_COLUMNS: &str = "id, external_id, name, date, race, city, state, armed_with, \
                                    body_camera, age, gender, threat_type, flee_status";

// ─── NaiveDate ───────────────────────────────────────────────────────────────

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// An `incidents` row exactly as read from SQLite.
pub struct RawIncident {
  pub id:          i64,
  pub external_id: i64,
  pub name:        Option<String>,
  pub date:        Option<String>,
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

impl RawIncident {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      external_id: row.get(1)?,
      name:        row.get(2)?,
      date:        row.get(3)?,
      race:        row.get(4)?,
      city:        row.get(5)?,
      state:       row.get(6)?,
      armed_with:  row.get(7)?,
      body_camera: row.get(8)?,
      age:         row.get(9)?,
      gender:      row.get(10)?,
      threat_type: row.get(11)?,
      flee_status: row.get(12)?,
    })
  }

  pub fn into_incident(self) -> Result<Incident> {
    Ok(Incident {
      id:          self.id,
      external_id: self.external_id,
      name:        self.name,
      date:        self.date.as_deref().map(decode_date).transpose()?,
      race:        self.race,
      city:        self.city,
      state:       self.state,
      armed_with:  self.armed_with,
      body_camera: self.body_camera,
      // SQLite stores NaN as NULL already; this also catches infinities.
      age:         self.age.filter(|a| a.is_finite()),
      gender:      self.gender,
      threat_type: self.threat_type,
      flee_status: self.flee_status,
    })
  }
}
