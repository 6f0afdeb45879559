//! Data models for envtamer.
//!
//! - Directory
//! - DirectorySummary

pub mod directory;

pub use directory::{Directory, DirectorySummary};
