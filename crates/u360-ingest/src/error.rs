//! Error types for the ingestion pipeline
//!
//! Every variant here is fatal to a run: the orchestrator cancels its
//! siblings and hands the error back to `main`. Per-line decode failures and
//! unmapped codes are deliberately *not* errors (see `extract` and `mapper`).

use thiserror::Error;

/// Result type alias for ingestion operations
pub type Result<T> = std::result::Result<T, IngestError>;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unable to list objects in bucket {bucket:?}: {message}")]
    ObjectStore { bucket: String, message: String },

    #[error("Failed to fetch object {key:?}: {message}")]
    Fetch { key: String, message: String },

    #[error("Line {line} of {key:?} exceeds the {limit} byte line limit")]
    LineTooLong { key: String, line: u64, limit: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Bulk loader rejected request ({status}): {message}")]
    Loader { status: u16, message: String },

    #[error("Worker task failed: {0}")]
    Worker(String),
}

impl IngestError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<tokio::task::JoinError> for IngestError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Worker(err.to_string())
    }
}
