//! Database schema definitions.
//!
//! Two tables: `directories` holds one identity row per stored path and
//! `env_vars` holds the variables owned by each directory.

use rusqlite::{Connection, Result};

/// The complete SQL schema for the envtamer database.
///
/// Every statement is `IF NOT EXISTS`, so applying it to a populated
/// database is a no-op.
pub const SCHEMA_SQL: &str = r"
-- Directories: one identity record per stored path
CREATE TABLE IF NOT EXISTS directories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    path TEXT NOT NULL UNIQUE,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

-- Env vars: replaced wholesale on every push
CREATE TABLE IF NOT EXISTS env_vars (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    directory_id INTEGER NOT NULL,
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    FOREIGN KEY (directory_id) REFERENCES directories(id) ON DELETE CASCADE,
    UNIQUE(directory_id, key)
);

CREATE INDEX IF NOT EXISTS idx_env_vars_directory ON env_vars(directory_id);
";

/// Apply connection pragmas and create any missing tables.
///
/// # Errors
///
/// Returns an error if a pragma or DDL statement fails.
pub fn apply_schema(conn: &Connection) -> Result<()> {
    // Set pragmas before schema creation
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;

    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
