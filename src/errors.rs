//! Unified application error type.
//! Every layer (db, core, cli) returns AppError so the CLI and the host hook
//! see a single error surface. Subprocess and store failures keep their own
//! enums because the freshness controller treats them differently.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Outcome classification for a failed run of the external tide program.
#[derive(Error, Debug)]
pub enum InvocationError {
    #[error("tide program not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("tide program timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("tide program failed ({status}): {stderr}")]
    ProgramFailed { status: String, stderr: String },

    #[error("failed to start {}: {source}", path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Storage-layer failure. A failed batch is rolled back before this surfaces.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("corrupt row in tide_events: {0}")]
    CorruptRow(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Database-related
    // ---------------------------
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Database migration error: {0}")]
    Migration(String),

    // ---------------------------
    // Tide program + output
    // ---------------------------
    #[error("Invocation error: {0}")]
    Invocation(#[from] InvocationError),

    #[error("Tide output format mismatch: {lines} non-empty line(s), no events parsed")]
    FormatMismatch { lines: usize },

    #[error("Tide output uses ambiguous time zone abbreviation(s) {zones}; no events parsed")]
    AmbiguousZone { zones: String },

    #[error("Tide refresh failed: {0}")]
    RefreshFailed(String),

    // ---------------------------
    // Parsing of user input
    // ---------------------------
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    // ---------------------------
    // Output
    // ---------------------------
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<rusqlite::Error> for AppError {
    fn from(e: rusqlite::Error) -> Self {
        AppError::Store(StoreError::Db(e))
    }
}

pub type AppResult<T> = Result<T, AppError>;
