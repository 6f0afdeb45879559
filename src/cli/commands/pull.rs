//! Pull stored variables into a local `.env` file.

use crate::cli::PullArgs;
use crate::config::resolve_directory;
use crate::envfile::write_env_file;
use crate::error::Result;
use crate::storage::SqliteStorage;
use colored::Colorize;
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Serialize)]
struct PullOutput {
    directory: String,
    file: PathBuf,
    count: usize,
    written: bool,
}

/// Result of a pull.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullOutcome {
    /// The file was written with this many variables.
    Written(usize),
    /// The target existed and the user declined to overwrite it.
    Cancelled,
}

/// Execute the pull command.
///
/// The file is written to the current working directory.
///
/// # Errors
///
/// Returns an error if the file name is empty, the database is not
/// initialized, the directory was never pushed, or the file cannot be
/// written.
pub fn execute(args: &PullArgs, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    super::validate_filename(&args.filename)?;
    let directory = resolve_directory(Some(&args.directory))?;
    let target = Path::new(".").join(&args.filename);
    debug!(directory = %directory, file = %target.display(), "Pulling env file");

    let storage = super::open_storage(db_path)?;
    let outcome = pull(&storage, &directory, &target, |path| {
        if args.yes {
            return Ok(true);
        }
        confirm_overwrite(path, io::stdin().lock(), io::stderr())
    })?;

    if json {
        let (count, written) = match outcome {
            PullOutcome::Written(count) => (count, true),
            PullOutcome::Cancelled => (0, false),
        };
        let output = PullOutput {
            directory,
            file: target,
            count,
            written,
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    match outcome {
        PullOutcome::Written(count) => println!(
            "{} {count} environment variables to file: {}",
            "Successfully pulled".green(),
            target.display()
        ),
        PullOutcome::Cancelled => println!("{}", "Operation cancelled.".yellow()),
    }

    Ok(())
}

/// Load the variables for `directory` and write them to `target`.
///
/// When `target` already exists, `confirm` decides whether it may be
/// overwritten. The lookup happens first, so an unknown directory never
/// triggers a prompt.
///
/// # Errors
///
/// Returns [`crate::Error::DirectoryNotFound`] for an unknown directory,
/// any error from `confirm`, and [`crate::Error::FileIo`] if writing fails.
pub fn pull<F>(storage: &SqliteStorage, directory: &str, target: &Path, confirm: F) -> Result<PullOutcome>
where
    F: FnOnce(&Path) -> Result<bool>,
{
    let vars = storage.get_env_vars(directory)?;

    if target.exists() && !confirm(target)? {
        info!(file = %target.display(), "Overwrite declined");
        return Ok(PullOutcome::Cancelled);
    }

    write_env_file(target, &vars)?;
    Ok(PullOutcome::Written(vars.len()))
}

/// Ask whether `path` may be overwritten.
///
/// Only an answer starting with `y` or `Y` counts as yes; an empty line
/// or end of input means no.
///
/// # Errors
///
/// Returns an error if the prompt cannot be written or the answer read.
pub fn confirm_overwrite<R: BufRead, W: Write>(path: &Path, mut input: R, mut output: W) -> Result<bool> {
    write!(output, "File '{}' already exists. Overwrite? (y/N): ", path.display())?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim_start().to_lowercase().starts_with('y'))
}
