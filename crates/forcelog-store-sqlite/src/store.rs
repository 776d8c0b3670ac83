//! [`SqliteStore`]: the SQLite implementation of [`IncidentStore`].

use std::path::Path;

use forcelog_core::{
  incident::{NewIncident, RefreshMode},
  stats::{RaceCount, StatsFilter},
  store::{IncidentStore, Snapshot},
};

use crate::{
  Error, Result,
  encode::{INCIDENT_COLUMNS, RawIncident, encode_date},
  schema::SCHEMA,
};

/// Every filterable query shares this predicate; `?1` is the state or NULL.
const STATE_PREDICATE: &str = "(?1 IS NULL OR state = ?1)";

// ─── Store ───────────────────────────────────────────────────────────────────

/// An incident store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. All calls
/// are serialized on the connection's thread, so a read issued during a
/// refresh waits for that refresh's transaction to finish and then sees the
/// committed result.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── IncidentStore impl ──────────────────────────────────────────────────────

impl IncidentStore for SqliteStore {
  type Error = Error;

  async fn load(&self, mode: RefreshMode, rows: Vec<NewIncident>) -> Result<u64> {
    let (deleted, inserted) = self
      .conn
      .call(move |conn| {
        // Dropping `tx` on any early return rolls the whole batch back.
        let tx = conn.transaction()?;

        let deleted = match mode {
          RefreshMode::Replace => tx.execute("DELETE FROM incidents", [])?,
          RefreshMode::Append => 0,
        };

        let mut inserted: u64 = 0;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO incidents (
               external_id, name, date, race, city, state, armed_with,
               body_camera, age, gender, threat_type, flee_status
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
          )?;
          for row in &rows {
            stmt.execute(rusqlite::params![
              row.external_id,
              row.name,
              row.date.map(encode_date),
              row.race,
              row.city,
              row.state,
              row.armed_with,
              row.body_camera,
              row.age,
              row.gender,
              row.threat_type,
              row.flee_status,
            ])?;
            inserted += 1;
          }
        }

        tx.commit()?;
        Ok((deleted, inserted))
      })
      .await?;

    tracing::debug!(%mode, deleted, inserted, "incidents table written");
    Ok(inserted)
  }

  async fn count(&self, filter: &StatsFilter) -> Result<u64> {
    let state = filter.state().map(str::to_owned);

    let n: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          &format!("SELECT COUNT(*) FROM incidents WHERE {STATE_PREDICATE}"),
          rusqlite::params![state],
          |row| row.get(0),
        )?)
      })
      .await?;

    Ok(u64::try_from(n).unwrap_or_default())
  }

  async fn snapshot(&self, filter: &StatsFilter, limit: Option<usize>) -> Result<Snapshot> {
    let state = filter.state().map(str::to_owned);
    // SQLite treats a negative LIMIT as "no limit".
    let limit = limit.map_or(-1, |l| i64::try_from(l).unwrap_or(i64::MAX));

    let (counts, raws): (Vec<(String, i64)>, Vec<RawIncident>) = self
      .conn
      .call(move |conn| {
        // One read transaction so counts and listing describe the same rows.
        let tx = conn.transaction()?;

        let counts = {
          let mut stmt = tx.prepare(&format!(
            "SELECT race, COUNT(*) AS n
             FROM incidents
             WHERE {STATE_PREDICATE}
             GROUP BY race
             ORDER BY n DESC, race ASC"
          ))?;
          stmt
            .query_map(rusqlite::params![state], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };

        let raws = {
          let mut stmt = tx.prepare(&format!(
            "SELECT {INCIDENT_COLUMNS}
             FROM incidents
             WHERE {STATE_PREDICATE}
             ORDER BY date IS NULL, date DESC, id DESC
             LIMIT ?2"
          ))?;
          stmt
            .query_map(rusqlite::params![state, limit], RawIncident::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };

        tx.commit()?;
        Ok((counts, raws))
      })
      .await?;

    let race_counts = counts
      .into_iter()
      .map(|(race, n)| RaceCount { race, count: u64::try_from(n).unwrap_or_default() })
      .collect();
    let incidents = raws
      .into_iter()
      .map(RawIncident::into_incident)
      .collect::<Result<_>>()?;

    Ok(Snapshot { race_counts, incidents })
  }
}
