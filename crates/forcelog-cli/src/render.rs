//! Plain-text rendering of a stats report.

use std::fmt::Write as _;

use forcelog_core::{incident::Incident, stats::RaceStat};

const NONE: &str = "-";

/// Race breakdown as an aligned table, largest group first.
pub fn race_table(stats: &[RaceStat]) -> String {
  let width = stats.iter().map(|s| s.race.len()).max().unwrap_or(0).max("RACE".len());
  let mut out = format!("{:<width$}  {:>7}  {:>6}\n", "RACE", "COUNT", "PCT");
  for s in stats {
    let _ = writeln!(out, "{:<width$}  {:>7}  {:>5.1}%", s.race, s.count, s.percentage);
  }
  out
}

/// One line per incident: date, name, age, place, race.
pub fn incident_lines(incidents: &[Incident], limit: usize) -> String {
  let mut out = String::new();
  for i in incidents.iter().take(limit) {
    let date = i.date.map(|d| d.to_string()).unwrap_or_else(|| NONE.to_string());
    let age = i.age.map(|a| format!("{a:.0}")).unwrap_or_else(|| NONE.to_string());
    let place = match (&i.city, &i.state) {
      (Some(c), Some(s)) => format!("{c}, {s}"),
      (Some(x), None) | (None, Some(x)) => x.clone(),
      (None, None) => NONE.to_string(),
    };
    let _ = writeln!(
      out,
      "{date:<10}  {:<28}  {age:>3}  {place:<28}  {}",
      i.name.as_deref().unwrap_or(NONE),
      i.race,
    );
  }
  out
}
