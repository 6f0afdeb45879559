//! Error types for envtamer.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=storage, 3=not_found, 4=validation, etc.)
//! - Context-aware recovery hints
//! - Structured JSON output for `--json` consumers

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for envtamer operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
///
/// Each code maps to a SCREAMING_SNAKE string and a category-based
/// exit code. Scripts can match on either.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Storage (exit 2)
    NotInitialized,
    StorageUnavailable,
    SchemaError,
    TransactionError,
    DatabaseError,

    // Not Found (exit 3)
    DirectoryNotFound,

    // Validation (exit 4)
    InvalidArgument,

    // Config (exit 5)
    ConfigError,

    // I/O (exit 6)
    FileIoError,
    IoError,
    JsonError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::StorageUnavailable => "STORAGE_UNAVAILABLE",
            Self::SchemaError => "SCHEMA_ERROR",
            Self::TransactionError => "TRANSACTION_ERROR",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::DirectoryNotFound => "DIRECTORY_NOT_FOUND",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::ConfigError => "CONFIG_ERROR",
            Self::FileIoError => "FILE_IO_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
        }
    }

    /// Category-based exit code (2-6).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::NotInitialized
            | Self::StorageUnavailable
            | Self::SchemaError
            | Self::TransactionError
            | Self::DatabaseError => 2,
            Self::DirectoryNotFound => 3,
            Self::InvalidArgument => 4,
            Self::ConfigError => 5,
            Self::FileIoError | Self::IoError | Self::JsonError => 6,
        }
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in envtamer operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Not initialized: run `envtamer init` first")]
    NotInitialized,

    #[error("Storage unavailable at {}: {reason}", path.display())]
    StorageUnavailable { path: PathBuf, reason: String },

    #[error("Schema error: {0}")]
    Schema(#[source] rusqlite::Error),

    #[error("Transaction `{op}` failed and was rolled back: {source}")]
    Transaction {
        op: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("Failed to access {}: {source}", path.display())]
    FileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::NotInitialized => ErrorCode::NotInitialized,
            Self::StorageUnavailable { .. } => ErrorCode::StorageUnavailable,
            Self::Schema(_) => ErrorCode::SchemaError,
            Self::Transaction { .. } => ErrorCode::TransactionError,
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::DirectoryNotFound { .. } => ErrorCode::DirectoryNotFound,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::FileIo { .. } => ErrorCode::FileIoError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::NotInitialized => {
                Some("Run `envtamer init` to create the database".to_string())
            }

            Self::StorageUnavailable { path, .. } => Some(format!(
                "Check that {} is writable, or pass --db / set ENVTAMER_DB to another location.",
                path.display()
            )),

            Self::DirectoryNotFound { path } => Some(format!(
                "Nothing has been pushed for '{path}'. Use `envtamer list` to see stored directories."
            )),

            Self::FileIo { path, source }
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                Some(format!(
                    "No file at {}. Use --filename to pick a different env file.",
                    path.display()
                ))
            }

            Self::Schema(_)
            | Self::Transaction { .. }
            | Self::Database(_)
            | Self::FileIo { .. }
            | Self::Io(_)
            | Self::Json(_)
            | Self::InvalidArgument(_)
            | Self::Config(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    ///
    /// Includes error code, message, exit code, and optional hint.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}
