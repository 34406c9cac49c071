//! Breadboard command-line shell.
//!
//! Browses the part catalog and manages stored projects on top of
//! `breadboard-core`.

pub mod cli;
pub mod commands;

use breadboard_core::{ConfigError, StoreError};
use thiserror::Error;

/// Errors surfaced to the command line.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid project file: {0}")]
    Json(#[from] serde_json::Error),
}

pub type AppResult<T> = Result<T, AppError>;

pub use cli::Cli;
pub use commands::{execute, run};
