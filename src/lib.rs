//! envtamer - store and restore `.env` files per project directory.
//!
//! This crate provides the core functionality for the `envtamer` CLI tool.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`envfile`] - `.env` parsing and serialization
//! - [`model`] - Data types (Directory, DirectorySummary)
//! - [`storage`] - SQLite database layer
//! - [`config`] - Database location and directory path resolution
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod envfile;
pub mod error;
pub mod model;
pub mod storage;

pub use envfile::EnvMap;
pub use error::{Error, Result};
