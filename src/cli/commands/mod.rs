//! Command implementations.

pub mod completions;
pub mod init;
pub mod list;
pub mod pull;
pub mod push;
pub mod version;

use crate::config::resolve_db_path;
use crate::error::{Error, Result};
use crate::storage::SqliteStorage;
use std::path::PathBuf;

/// Open the database for a command that needs an initialized store.
///
/// Unlike `init`, this never creates the database file.
///
/// # Errors
///
/// Returns [`Error::NotInitialized`] if the database file does not exist.
pub fn open_storage(db_path: Option<&PathBuf>) -> Result<SqliteStorage> {
    let db_path = resolve_db_path(db_path.map(PathBuf::as_path))?;

    if !db_path.exists() {
        return Err(Error::NotInitialized);
    }

    SqliteStorage::open(&db_path)
}

/// Reject an env file name that cannot name a file.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if `filename` is empty or only whitespace.
pub fn validate_filename(filename: &str) -> Result<()> {
    if filename.trim().is_empty() {
        return Err(Error::InvalidArgument("--filename must not be empty".to_string()));
    }
    Ok(())
}

/// Render a Unix-millisecond timestamp as RFC 3339.
pub(crate) fn format_timestamp(ts: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ts)
        .map_or_else(|| ts.to_string(), |dt| dt.to_rfc3339())
}
