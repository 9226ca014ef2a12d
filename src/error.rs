//! Error taxonomy for the graph core.
//!
//! Every variant has a degraded mode at its call site; none of them is meant
//! to take the process down.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WeftError {
    /// The snapshot source could not produce a graph.
    #[error("Failed to load graph snapshot: {0}")]
    Acquisition(String),

    /// The remote summarizer failed (transport, status or body).
    #[error("Remote summary unavailable: {0}")]
    RemoteSummary(String),

    /// An import document was rejected. The current snapshot is untouched.
    #[error("Import failed: {0}")]
    Import(String),

    /// Search history could not be read or written.
    #[error("History persistence failed: {0}")]
    Persistence(String),

    /// A tab id supplied by the caller is not in the snapshot.
    #[error("No tab with id {0}")]
    UnknownTab(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, WeftError>;
