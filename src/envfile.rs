//! `.env` file parsing and serialization.
//!
//! The format is deliberately small: `KEY=VALUE` lines, `#` comments,
//! and one optional layer of single or double quotes around a value.
//! There is no escaping, interpolation, or multiline support.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// Unordered mapping of variable names to values.
pub type EnvMap = HashMap<String, String>;

/// Parse `.env` text into a mapping.
///
/// Blank lines and `#` comments are skipped. Lines without `=` are
/// dropped silently. Later duplicates overwrite earlier ones.
#[must_use]
pub fn parse_str(text: &str) -> EnvMap {
    let mut vars = EnvMap::new();
    for (idx, line) in text.lines().enumerate() {
        parse_line(&mut vars, idx + 1, line);
    }
    vars
}

/// Parse `.env` content from a reader.
///
/// # Errors
///
/// Returns an I/O error if the reader fails or yields invalid UTF-8.
pub fn parse_reader<R: BufRead>(reader: R) -> std::io::Result<EnvMap> {
    let mut vars = EnvMap::new();
    for (idx, line) in reader.lines().enumerate() {
        parse_line(&mut vars, idx + 1, &line?);
    }
    Ok(vars)
}

fn parse_line(vars: &mut EnvMap, line_no: usize, line: &str) {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return;
    }

    let Some((key, value)) = line.split_once('=') else {
        debug!(line = line_no, "Skipping line without '='");
        return;
    };

    vars.insert(key.trim().to_string(), unquote(value.trim()).to_string());
}

/// Strip one layer of matching single or double quotes.
fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() > 1
        && (bytes[0] == b'"' || bytes[0] == b'\'')
        && bytes[0] == bytes[bytes.len() - 1]
    {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// Serialize a mapping to `.env` text.
///
/// Values containing any whitespace, including the Unicode whitespace
/// that parsing trims, are wrapped in double quotes; embedded quote
/// characters are written as-is. Lines are emitted sorted by key so
/// repeated pulls produce identical files.
#[must_use]
pub fn serialize(vars: &EnvMap) -> String {
    let mut keys: Vec<&String> = vars.keys().collect();
    keys.sort();

    let mut out = String::new();
    for key in keys {
        let value = &vars[key];
        if value.contains(char::is_whitespace) {
            out.push_str(&format!("{key}=\"{value}\"\n"));
        } else {
            out.push_str(&format!("{key}={value}\n"));
        }
    }
    out
}

/// Read and parse a `.env` file.
///
/// # Errors
///
/// Returns [`Error::FileIo`] if the file cannot be opened or read.
pub fn read_env_file(path: &Path) -> Result<EnvMap> {
    let file = fs::File::open(path).map_err(|source| Error::FileIo {
        path: path.to_path_buf(),
        source,
    })?;

    let vars = parse_reader(BufReader::new(file)).map_err(|source| Error::FileIo {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(path = %path.display(), count = vars.len(), "Parsed env file");
    Ok(vars)
}

/// Serialize a mapping and write it to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns [`Error::FileIo`] if the file cannot be written.
pub fn write_env_file(path: &Path, vars: &EnvMap) -> Result<()> {
    fs::write(path, serialize(vars)).map_err(|source| Error::FileIo {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(path = %path.display(), count = vars.len(), "Wrote env file");
    Ok(())
}
