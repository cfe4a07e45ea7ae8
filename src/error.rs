//! Error types for taskbook.
//!
//! Lookup misses (unknown task or subtask id, out-of-range reorder index) are
//! reported as distinct variants rather than silent no-ops so callers can
//! render feedback. Storage faults propagate unchanged: swallowing them would
//! let the in-memory collection silently diverge from disk.

use thiserror::Error;

/// Main error type for taskbook operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Subtask not found: {subtask_id} in task {task_id}")]
    SubtaskNotFound { task_id: String, subtask_id: String },

    #[error("Index {index} out of range for collection of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Invalid import document: {0}")]
    InvalidDocument(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Result type alias for taskbook operations
pub type Result<T> = std::result::Result<T, Error>;
