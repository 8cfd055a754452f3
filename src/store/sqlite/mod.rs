//! SQLite-backed subscription store.

mod connection;
mod repo_impl;


use rusqlite::Connection;

/// SQLite-backed subscription store.
///
/// Owns the database connection for the lifetime of one command.
pub struct SqliteStore {
    pub(crate) conn: Connection,
}
