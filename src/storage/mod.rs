//! SQLite storage layer for envtamer.
//!
//! This module provides the persistence layer using SQLite with:
//! - WAL mode and a busy timeout for concurrent invocations
//! - Transaction discipline for atomic pushes
//!
//! # Submodules
//!
//! - [`schema`] - Database schema definitions
//! - [`sqlite`] - Main SQLite storage implementation

pub mod schema;
pub mod sqlite;

pub use sqlite::{SaveSummary, SqliteStorage};
