//! Error types for logstatslib

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while setting up or finishing an analysis run.
///
/// Per-line parse rejections are deliberately *not* represented here; they are
/// recovered inside the pipeline and surface only as diagnostics. See
/// [`crate::parse::ParseError`].
#[derive(Error, Debug)]
pub enum LogStatsError {
    /// Failed to read a log file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Invalid glob pattern
    #[error("invalid glob pattern '{pattern}': {message}")]
    InvalidGlob { pattern: String, message: String },

    /// Path does not exist
    #[error("path does not exist: {0}")]
    PathNotFound(PathBuf),

    /// A `--from`/`--to` bound that is neither a date nor a date-time
    #[error("invalid date '{0}': expected yyyy-mm-dd or yyyy-mm-ddThh:mm:ss")]
    InvalidDate(String),

    /// Failed to persist the rendered report
    #[error("failed to write report to '{path}': {source}")]
    ReportWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
