//! Initialize the envtamer database.
//!
//! `init` is idempotent: it creates the database directory and file if
//! needed and ensures the tables exist. Existing data is never touched,
//! so there is no `--force`.

use crate::config::resolve_db_path;
use crate::error::{Error, Result};
use crate::storage::SqliteStorage;
use colored::Colorize;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Serialize)]
struct InitOutput {
    database: PathBuf,
    created: bool,
}

/// Execute the init command.
///
/// # Errors
///
/// Returns an error if the directory or database cannot be created.
pub fn execute(db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let db_path = resolve_db_path(db_path.map(PathBuf::as_path))?;
    let created = initialize(&db_path)?;

    if json {
        let output = InitOutput {
            database: db_path,
            created,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else if created {
        println!("{}", "Database initialized successfully.".green());
        println!("  Database: {}", db_path.display());
    } else {
        println!("Database already initialized.");
        println!("  Database: {}", db_path.display());
    }

    Ok(())
}

/// Create the database at `db_path` if needed and apply the schema.
///
/// Returns `true` if the file did not exist before.
///
/// # Errors
///
/// Returns [`Error::StorageUnavailable`] if the parent directory or the
/// file cannot be created, and [`Error::Schema`] if table creation fails.
pub fn initialize(db_path: &Path) -> Result<bool> {
    let existed = db_path.exists();

    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::StorageUnavailable {
            path: parent.to_path_buf(),
            reason: e.to_string(),
        })?;
    }

    SqliteStorage::open(db_path)?;

    info!(path = %db_path.display(), created = !existed, "Database ready");
    Ok(!existed)
}
