//! Push a local `.env` file into the database.

use crate::cli::PushArgs;
use crate::config::resolve_directory;
use crate::envfile::read_env_file;
use crate::error::Result;
use crate::storage::{SaveSummary, SqliteStorage};
use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Serialize)]
struct PushOutput {
    directory: String,
    file: PathBuf,
    count: usize,
    created: bool,
}

/// Execute the push command.
///
/// # Errors
///
/// Returns an error if the file name is empty, the env file cannot be
/// read, the database is not initialized, or the save transaction fails.
pub fn execute(args: &PushArgs, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    super::validate_filename(&args.filename)?;
    let directory = resolve_directory(args.directory.as_deref())?;
    let env_path = Path::new(&directory).join(&args.filename);
    debug!(directory = %directory, file = %env_path.display(), "Pushing env file");

    let mut storage = super::open_storage(db_path)?;
    let summary = push(&mut storage, &directory, &env_path)?;

    if json {
        let output = PushOutput {
            directory: summary.directory,
            file: env_path,
            count: summary.count,
            created: summary.created,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!(
            "{} {} environment variables for directory: {}",
            "Successfully pushed".green(),
            summary.count,
            summary.directory
        );
    }

    Ok(())
}

/// Parse `env_path` and replace the variables stored for `directory`.
///
/// The file is read completely before the database is touched, so a
/// missing or unreadable file leaves the stored set unchanged.
///
/// # Errors
///
/// Returns [`crate::Error::FileIo`] for file problems and
/// [`crate::Error::Transaction`] if the save fails.
pub fn push(storage: &mut SqliteStorage, directory: &str, env_path: &Path) -> Result<SaveSummary> {
    let vars = read_env_file(env_path)?;
    storage.save_env_vars(directory, &vars)
}
