//! Error types for activation

use std::path::PathBuf;
use thiserror::Error;

use super::env::EnvScope;
use crate::storage::StoreError;

/// Result type for activation operations
pub type ActivationResult<T> = Result<T, ActivationError>;

/// Errors that can occur while projecting a profile
#[derive(Debug, Error)]
pub enum ActivationError {
    /// The settings file could not be written; the active pointer was not moved
    #[error("Failed to write settings file {path}: {source}")]
    SettingsWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The settings file exists but could not be read back
    #[error("Failed to read settings file {path}: {message}")]
    SettingsRead { path: PathBuf, message: String },

    /// Writing this scope needs administrator/root rights
    #[error("Setting {scope} environment variables requires elevated privileges")]
    ElevationRequired {
        scope: EnvScope,
        #[source]
        source: std::io::Error,
    },

    /// Any other failure writing environment variables
    #[error("Failed to set {scope} environment variables: {source}")]
    Environment {
        scope: EnvScope,
        #[source]
        source: std::io::Error,
    },

    /// Profile lookup or store persistence failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ActivationError {
    /// Get the error code for CLI/API responses
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::SettingsWrite { .. } => "ACTIVATION_FAILED",
            Self::SettingsRead { .. } => "PARSE_ERROR",
            Self::ElevationRequired { .. } => "PERMISSION_DENIED",
            Self::Environment { .. } => "IO_ERROR",
            Self::Store(e) => e.code(),
        }
    }

    /// Whether the caller should retry with elevated privileges
    #[must_use]
    pub fn requires_elevation(&self) -> bool {
        matches!(self, Self::ElevationRequired { .. })
    }

    pub(crate) fn from_env_io(scope: EnvScope, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::PermissionDenied {
            Self::ElevationRequired { scope, source }
        } else {
            Self::Environment { scope, source }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_permission_denied_maps_to_elevation() {
        let err = ActivationError::from_env_io(
            EnvScope::System,
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.requires_elevation());
        assert_eq!(err.code(), "PERMISSION_DENIED");
    }

    #[test]
    fn test_other_io_is_not_elevation() {
        let err = ActivationError::from_env_io(
            EnvScope::User,
            io::Error::new(io::ErrorKind::NotFound, "missing"),
        );
        assert!(!err.requires_elevation());
        assert_eq!(err.code(), "IO_ERROR");
    }
}
