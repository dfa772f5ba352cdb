//! Well-known file locations
//!
//! Everything lives under the user's `.claude` directory except the Unix
//! persistent environment files.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Current profile store file name
pub const STORE_FILE_NAME: &str = "cc_apiswitch_configs.json";

/// Store file name used by older releases
pub const LEGACY_STORE_FILE_NAME: &str = "cc_switcher_configs.json";

/// Settings file read by the Claude CLI
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Optional model catalog
pub const MODEL_CATALOG_FILE_NAME: &str = "cc_apiswitch_models.json";

/// System-wide environment file on Unix
pub const SYSTEM_ENV_FILE: &str = "/etc/environment";

/// Errors resolving application paths
#[derive(Error, Debug)]
pub enum PathError {
    #[error("Could not determine home directory (HOME/USERPROFILE not set)")]
    NoHomeDir,
}

impl PathError {
    /// Get the error code for CLI/API responses
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoHomeDir => "NO_HOME_DIR",
        }
    }
}

/// Resolved locations of every file ccswitch reads or writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    /// `~/.claude`
    pub claude_dir: PathBuf,
    /// Profile store
    pub store_file: PathBuf,
    /// Store file from older releases, migrated on first load
    pub legacy_store_file: PathBuf,
    /// Active settings consumed by the Claude CLI
    pub settings_file: PathBuf,
    /// Optional model catalog for autocomplete
    pub model_catalog_file: PathBuf,
    /// Claude Code session history, one directory per project
    pub projects_dir: PathBuf,
    /// Unix user-persistent environment file (systemd `environment.d`)
    pub user_env_file: PathBuf,
    /// Unix system-persistent environment file
    pub system_env_file: PathBuf,
}

impl AppPaths {
    /// Derive all paths from a home directory
    #[must_use]
    pub fn from_home(home: &Path) -> Self {
        let claude_dir = home.join(".claude");
        Self {
            store_file: claude_dir.join(STORE_FILE_NAME),
            legacy_store_file: claude_dir.join(LEGACY_STORE_FILE_NAME),
            settings_file: claude_dir.join(SETTINGS_FILE_NAME),
            model_catalog_file: claude_dir.join(MODEL_CATALOG_FILE_NAME),
            projects_dir: claude_dir.join("projects"),
            user_env_file: home
                .join(".config")
                .join("environment.d")
                .join("60-ccswitch.conf"),
            system_env_file: PathBuf::from(SYSTEM_ENV_FILE),
            claude_dir,
        }
    }

    /// Resolve paths for the current user
    ///
    /// # Errors
    /// Returns an error if no home directory can be found
    pub fn detect() -> Result<Self, PathError> {
        Ok(Self::from_home(&home_dir()?))
    }
}

/// Locate the user's home directory
///
/// `HOME` wins (so tests and wrappers can redirect it), then `USERPROFILE`,
/// then the platform lookup.
///
/// # Errors
/// Returns an error if none of the sources yields a directory
pub fn home_dir() -> Result<PathBuf, PathError> {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(PathBuf::from)
        .ok()
        .filter(|p| !p.as_os_str().is_empty())
        .or_else(dirs::home_dir)
        .ok_or(PathError::NoHomeDir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_home_layout() {
        let paths = AppPaths::from_home(Path::new("/home/alice"));
        assert_eq!(paths.claude_dir, PathBuf::from("/home/alice/.claude"));
        assert_eq!(
            paths.store_file,
            PathBuf::from("/home/alice/.claude/cc_apiswitch_configs.json")
        );
        assert_eq!(
            paths.legacy_store_file,
            PathBuf::from("/home/alice/.claude/cc_switcher_configs.json")
        );
        assert_eq!(
            paths.settings_file,
            PathBuf::from("/home/alice/.claude/settings.json")
        );
        assert_eq!(
            paths.user_env_file,
            PathBuf::from("/home/alice/.config/environment.d/60-ccswitch.conf")
        );
        assert_eq!(paths.system_env_file, PathBuf::from("/etc/environment"));
    }
}
