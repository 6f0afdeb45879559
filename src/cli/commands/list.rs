//! List stored directories, or the variables stored for one directory.

use super::format_timestamp;
use crate::config::resolve_directory;
use crate::error::Result;
use crate::model::DirectorySummary;
use crate::storage::SqliteStorage;
use colored::Colorize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Serialize)]
struct DirectoryOutput {
    path: String,
    var_count: usize,
    created_at: String,
    updated_at: String,
}

impl From<DirectorySummary> for DirectoryOutput {
    fn from(s: DirectorySummary) -> Self {
        Self {
            path: s.directory.path,
            var_count: s.var_count,
            created_at: format_timestamp(s.directory.created_at),
            updated_at: format_timestamp(s.directory.updated_at),
        }
    }
}

#[derive(Serialize)]
struct DirectoryListOutput {
    directories: Vec<DirectoryOutput>,
    count: usize,
}

#[derive(Serialize)]
struct VarListOutput {
    directory: String,
    variables: BTreeMap<String, String>,
    count: usize,
}

/// Execute the list command.
///
/// # Errors
///
/// Returns an error if the database is not initialized or, when a
/// directory is given, if nothing was pushed for it.
pub fn execute(directory: Option<&str>, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let storage = super::open_storage(db_path)?;

    match directory {
        None => list_directories(&storage, json),
        Some(dir) => {
            let directory = resolve_directory(Some(dir))?;
            list_vars(&storage, directory, json)
        }
    }
}

fn list_directories(storage: &SqliteStorage, json: bool) -> Result<()> {
    if json {
        let directories: Vec<DirectoryOutput> = storage
            .list_directory_summaries()?
            .into_iter()
            .map(DirectoryOutput::from)
            .collect();
        let output = DirectoryListOutput {
            count: directories.len(),
            directories,
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    let directories = storage.list_directories()?;
    if directories.is_empty() {
        println!("No directories stored in the database.");
        return Ok(());
    }

    println!("{}", "Stored directories:".bold());
    for dir in directories {
        println!("{dir}");
    }
    Ok(())
}

fn list_vars(storage: &SqliteStorage, directory: String, json: bool) -> Result<()> {
    // Sorted for stable display
    let variables: BTreeMap<String, String> =
        storage.get_env_vars(&directory)?.into_iter().collect();

    if json {
        let output = VarListOutput {
            directory,
            count: variables.len(),
            variables,
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    if variables.is_empty() {
        println!("No environment variables stored for directory: {directory}");
        return Ok(());
    }

    println!(
        "{} {directory}",
        "Environment variables for directory:".bold()
    );
    for (key, value) in &variables {
        println!("{key}={value}");
    }
    Ok(())
}
