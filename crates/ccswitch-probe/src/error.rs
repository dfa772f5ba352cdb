//! Error types for probe orchestration
//!
//! Probe *outcomes* (failed, timeout, error) are data on the profile, not
//! errors; these cover misuse and persistence only.

use ccswitch_core::StoreError;
use thiserror::Error;

/// Errors starting or recording probes
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Invalid profile index {index} (store has {len} profiles)")]
    InvalidIndex { index: usize, len: usize },

    /// A probe for this profile has not come back yet
    #[error("Profile '{name}' is already being tested")]
    AlreadyTesting { name: String },

    /// A batch cannot start while other probes are in flight
    #[error("Probes are already running")]
    Busy,

    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ProbeError {
    /// Get the error code for CLI/API responses
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidIndex { .. } => "INVALID_INDEX",
            Self::AlreadyTesting { .. } | Self::Busy => "BUSY",
            Self::Client(_) => "CLIENT_ERROR",
            Self::Store(e) => e.code(),
        }
    }
}
