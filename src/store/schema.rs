//! SQLite schema creation for the subscription store.

use rusqlite::{Connection, OptionalExtension};

/// Version written to the `metadata` table on every open.
pub const SCHEMA_VERSION: i64 = 1;

/// Creates the database schema for the subscription store.
///
/// This function creates all required tables, indexes, and constraints.
/// It is idempotent - calling it multiple times is safe.
///
/// # Tables Created
/// - `subscriptions` - One row per tracked subscription
/// - `budgets` - Monthly caps, unique per (year, month, currency)
/// - `metadata` - Key/value pairs, including `schema_version`
pub fn create_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS subscriptions (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            cost REAL NOT NULL CHECK (cost > 0),
            billing_cycle TEXT NOT NULL,
            currency TEXT NOT NULL,
            start_date TEXT NOT NULL,
            renewal_date TEXT NOT NULL,
            trial_end_date TEXT,
            payment_method TEXT,
            notes TEXT,
            status TEXT NOT NULL DEFAULT 'active',
            tags TEXT NOT NULL DEFAULT '',
            parent_subscription_id INTEGER REFERENCES subscriptions(id),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            CHECK (renewal_date >= start_date)
        );",
    )?;

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS budgets (
            id INTEGER PRIMARY KEY,
            year INTEGER NOT NULL,
            month INTEGER NOT NULL CHECK (month BETWEEN 1 AND 12),
            currency TEXT NOT NULL,
            amount REAL NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE(year, month, currency)
        );",
    )?;

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS metadata (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );",
    )?;

    conn.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_subscriptions_name ON subscriptions(name COLLATE NOCASE);
         CREATE INDEX IF NOT EXISTS idx_subscriptions_parent ON subscriptions(parent_subscription_id);
         CREATE INDEX IF NOT EXISTS idx_subscriptions_renewal ON subscriptions(renewal_date);",
    )?;

    conn.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES ('schema_version', ?)",
        [SCHEMA_VERSION.to_string()],
    )?;

    Ok(())
}

/// Returns the schema version recorded in the metadata table.
///
/// `None` for a fresh database without a metadata table or version row.
pub fn get_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_metadata: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'metadata')",
        [],
        |row| row.get(0),
    )?;
    if !has_metadata {
        return Ok(None);
    }

    let value: Option<String> = conn
        .query_row(
            "SELECT value FROM metadata WHERE key = 'schema_version'",
            [],
            |row| row.get(0),
        )
        .optional()?;
    value
        .map(|v| {
            v.parse().map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    0,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })
        })
        .transpose()
}
