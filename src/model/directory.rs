//! Directory model for envtamer.
//!
//! A directory is the partition key for a stored set of environment
//! variables. Its row exists from the first push for that path onward,
//! even when the set is later replaced by an empty one.

use serde::{Deserialize, Serialize};

/// A directory known to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directory {
    /// Row identifier
    pub id: i64,

    /// Absolute path of the directory
    pub path: String,

    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,

    /// Last push timestamp (Unix milliseconds)
    pub updated_at: i64,
}

/// A directory together with the number of variables stored for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectorySummary {
    #[serde(flatten)]
    pub directory: Directory,
    pub var_count: usize,
}
