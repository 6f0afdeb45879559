//! Configuration management.
//!
//! This module resolves where the database lives and normalizes the
//! directory arguments that key stored variable sets.
//!
//! The database is a single global file at `~/.envtamer/envtamer.db`,
//! shared by every project on the machine.

use crate::error::{Error, Result};

use std::path::{Component, Path, PathBuf};

/// Environment variable overriding the database location.
pub const DB_ENV_VAR: &str = "ENVTAMER_DB";

/// Database file name inside the global directory.
pub const DB_FILENAME: &str = "envtamer.db";

/// Env file read by `push` and written by `pull` unless `--filename` is given.
pub const DEFAULT_ENV_FILENAME: &str = ".env";

/// Get the global envtamer directory location (`~/.envtamer/`).
#[must_use]
pub fn global_envtamer_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".envtamer"))
}

/// Resolve the database path.
///
/// Priority:
/// 1. If `explicit_path` is provided, use it directly
/// 2. `ENVTAMER_DB` environment variable
/// 3. Global location: `~/.envtamer/envtamer.db`
///
/// # Errors
///
/// Returns [`Error::Config`] if no home directory can be determined.
pub fn resolve_db_path(explicit_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit_path {
        return Ok(path.to_path_buf());
    }

    if let Ok(db_path) = std::env::var(DB_ENV_VAR) {
        if !db_path.trim().is_empty() {
            return Ok(PathBuf::from(db_path));
        }
    }

    global_envtamer_dir()
        .map(|dir| dir.join(DB_FILENAME))
        .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))
}

/// Resolve a directory argument to the absolute path used as a store key.
///
/// `None` or an empty argument means the current working directory.
///
/// # Errors
///
/// Returns an error if the current working directory cannot be read.
pub fn resolve_directory(arg: Option<&str>) -> Result<String> {
    let cwd = std::env::current_dir()?;
    Ok(resolve_directory_from(&cwd, arg))
}

/// Resolve `arg` against `base`.
///
/// Existing paths are canonicalized (symlinks resolved). Paths that no
/// longer exist on disk are normalized lexically so that `pull` still
/// works for a deleted checkout.
#[must_use]
pub fn resolve_directory_from(base: &Path, arg: Option<&str>) -> String {
    let path = match arg.map(str::trim).filter(|a| !a.is_empty()) {
        Some(a) => base.join(a),
        None => base.to_path_buf(),
    };

    let resolved = std::fs::canonicalize(&path).unwrap_or_else(|_| normalize_lexically(&path));
    resolved.to_string_lossy().into_owned()
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
