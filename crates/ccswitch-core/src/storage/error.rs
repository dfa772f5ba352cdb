//! Error types for store operations

use std::path::PathBuf;
use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// Another profile already uses the name
    #[error("Profile '{name}' already exists")]
    DuplicateName { name: String },

    /// Index outside the profile list
    #[error("Invalid profile index {index} (store has {len} profiles)")]
    InvalidIndex { index: usize, len: usize },

    /// No profile with the name
    #[error("Profile '{name}' not found")]
    NotFound { name: String },

    /// Input rejected before touching the store
    #[error("Validation error: {0}")]
    Validation(String),

    /// File I/O error
    #[error("I/O error for {path}: {message}")]
    Io { path: PathBuf, message: String },

    /// JSON parse error
    #[error("JSON parse error in {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

impl StoreError {
    /// Get the error code for CLI/API responses
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateName { .. } => "DUPLICATE_NAME",
            Self::InvalidIndex { .. } => "INVALID_INDEX",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Io { .. } => "IO_ERROR",
            Self::Parse { .. } => "PARSE_ERROR",
        }
    }

    pub(crate) fn io(path: &std::path::Path, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}
