//! Error types for the harvest and reconcile stages.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from a single outbound request.
///
/// Outside the root county fetch these are recoverable: the crawler logs
/// them and skips the affected branch.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Transport error for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },
    #[error("Failed to read body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Errors that abort a pipeline stage.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to fetch root county list: {0}")]
    RootFetch(#[source] FetchError),
    #[error("Failed to parse {what}: {source}")]
    Parse {
        what: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Required input not found: {}", .0.display())]
    MissingInput(PathBuf),
    #[error("Invalid override table {}: {message}", .path.display())]
    Overrides { path: PathBuf, message: String },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
