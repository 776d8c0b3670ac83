//! SQL schema for the forcelog SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Rows are only written by bulk refreshes: a replace deletes and
-- repopulates the table inside a single transaction.
CREATE TABLE IF NOT EXISTS incidents (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    external_id  INTEGER NOT NULL,   -- upstream dataset id; not unique
    name         TEXT,
    date         TEXT,               -- YYYY-MM-DD
    race         TEXT    NOT NULL DEFAULT 'Unknown'
                         CHECK (length(trim(race)) > 0),
    city         TEXT,
    state        TEXT,
    armed_with   TEXT,
    body_camera  INTEGER NOT NULL DEFAULT 0
                         CHECK (body_camera IN (0, 1)),
    age          REAL,
    gender       TEXT,
    threat_type  TEXT,
    flee_status  TEXT
);

CREATE INDEX IF NOT EXISTS incidents_state_idx       ON incidents(state);
CREATE INDEX IF NOT EXISTS incidents_race_idx        ON incidents(race);
CREATE INDEX IF NOT EXISTS incidents_date_idx        ON incidents(date);
CREATE INDEX IF NOT EXISTS incidents_external_id_idx ON incidents(external_id);

PRAGMA user_version = 1;
";
