//! Database schema definitions and initialization

use std::{str::FromStr, time::Duration};

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use wppq_core::{Error, Result};

/// Database schema as SQL string - executed once on open
///
/// Timestamps are Unix milliseconds. Ids are rowids, exposed as strings.
pub(crate) const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS phones (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    account_id TEXT NOT NULL,
    number TEXT NOT NULL,
    name TEXT NOT NULL DEFAULT '',
    online INTEGER NOT NULL DEFAULT 0 CHECK(online IN (0, 1)),
    created_at INTEGER NOT NULL,
    last_online_change INTEGER,
    last_online INTEGER,
    last_offline INTEGER,
    deleted INTEGER NOT NULL DEFAULT 0 CHECK(deleted IN (0, 1))
);

CREATE INDEX IF NOT EXISTS idx_phones_account ON phones(account_id, deleted);
CREATE INDEX IF NOT EXISTS idx_phones_number ON phones(number, deleted);

CREATE TABLE IF NOT EXISTS queue_entries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    phone_id INTEGER NOT NULL REFERENCES phones(id),
    account_id TEXT NOT NULL,
    position INTEGER NOT NULL CHECK(position >= 1),
    active INTEGER NOT NULL DEFAULT 1 CHECK(active IN (0, 1)),
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_queue_phone_active ON queue_entries(phone_id, active, position);

CREATE TABLE IF NOT EXISTS attendance_metrics (
    phone_id INTEGER PRIMARY KEY REFERENCES phones(id),
    today_attendances INTEGER NOT NULL,
    total_attendances INTEGER NOT NULL,
    average_wait_minutes REAL NOT NULL,
    last_attendance INTEGER,
    updated_at INTEGER NOT NULL
);
";

/// Create `SQLite` connection pool
pub(crate) async fn create_connection_pool(
    db_url: &str,
    max_connections: u32,
) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(db_url)
        .map_err(|e| Error::config(format!("Invalid database location: {e}")))?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .min_connections(1)
        .connect_with(options)
        .await
        .map_err(|e| Error::collaborator(format!("Failed to connect to database: {e}")))
}

/// Initialize database schema
pub(crate) async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(SCHEMA)
        .execute(pool)
        .await
        .map(|_| ())
        .map_err(|e| Error::collaborator(format!("Failed to initialize schema: {e}")))
}
