//! Activation engine
//!
//! Projects a profile into the external sinks the Claude CLI reads: the
//! settings file and environment variables.

mod env;
mod error;
mod settings;

pub use env::{
    parse_env_line, profile_vars, EnvScope, EnvSnapshot, ENV_AUTH_TOKEN, ENV_BASE_URL, ENV_MODEL,
};
pub use error::{ActivationError, ActivationResult};
pub use settings::ActiveSettings;

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::paths::AppPaths;
use crate::profile::Profile;
use crate::storage::{ProfileStore, StoreError};

/// What an activation wrote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationReport {
    pub profile: String,
    pub settings_file: PathBuf,
}

/// Writes profiles into the settings file and environment scopes
#[derive(Debug, Clone)]
pub struct ActivationEngine {
    settings_file: PathBuf,
    #[cfg_attr(windows, allow(dead_code))]
    user_env_file: PathBuf,
    #[cfg_attr(windows, allow(dead_code))]
    system_env_file: PathBuf,
}

impl ActivationEngine {
    #[must_use]
    pub fn new(paths: &AppPaths) -> Self {
        Self {
            settings_file: paths.settings_file.clone(),
            user_env_file: paths.user_env_file.clone(),
            system_env_file: paths.system_env_file.clone(),
        }
    }

    #[must_use]
    pub fn settings_file(&self) -> &Path {
        &self.settings_file
    }

    /// Write the profile at `index` to the settings file, then mark it active
    ///
    /// The store's active pointer only moves once the file is written.
    ///
    /// # Errors
    /// Returns an error if the index is invalid, the settings file cannot be
    /// written, or the store cannot be saved
    pub fn activate(
        &self,
        store: &mut ProfileStore,
        index: usize,
    ) -> ActivationResult<ActivationReport> {
        let profile = store.get(index).ok_or(StoreError::InvalidIndex {
            index,
            len: store.len(),
        })?;
        let name = profile.name.clone();

        settings::write_settings(&self.settings_file, &ActiveSettings::from_profile(profile))
            .map_err(|source| ActivationError::SettingsWrite {
                path: self.settings_file.clone(),
                source,
            })?;

        store.set_active(&name)?;
        info!(profile = %name, path = %self.settings_file.display(), "activated profile");

        Ok(ActivationReport {
            profile: name,
            settings_file: self.settings_file.clone(),
        })
    }

    /// Set the profile's variables in `scope`
    ///
    /// Persistent scopes also notify the OS so running programs can pick up
    /// the change; a failed notification is only logged.
    ///
    /// # Errors
    /// Returns `ElevationRequired` when the scope needs more privilege, or
    /// `Environment` for any other write failure
    pub fn export_environment(&self, profile: &Profile, scope: EnvScope) -> ActivationResult<()> {
        let vars = profile_vars(profile);
        match scope {
            EnvScope::Process => env::set_process(&vars),
            EnvScope::User | EnvScope::System => {
                self.persist(scope, &vars)
                    .map_err(|e| ActivationError::from_env_io(scope, e))?;
                notify_environment_changed();
            }
        }
        info!(profile = %profile.name, %scope, "exported environment variables");
        Ok(())
    }

    /// The triple currently in the settings file, if the file exists
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed
    pub fn current_settings(&self) -> ActivationResult<Option<ActiveSettings>> {
        settings::read_settings(&self.settings_file)
    }

    /// File a persistent scope writes to (Unix only)
    #[cfg(not(windows))]
    #[must_use]
    pub fn env_file(&self, scope: EnvScope) -> Option<&Path> {
        match scope {
            EnvScope::Process => None,
            EnvScope::User => Some(&self.user_env_file),
            EnvScope::System => Some(&self.system_env_file),
        }
    }

    #[cfg(not(windows))]
    fn persist(&self, scope: EnvScope, vars: &[(&'static str, String)]) -> std::io::Result<()> {
        let path = match scope {
            EnvScope::System => &self.system_env_file,
            _ => &self.user_env_file,
        };
        debug!(path = %path.display(), %scope, "writing environment file");
        env::write_env_file(path, vars)
    }

    #[cfg(windows)]
    #[allow(clippy::unused_self)]
    fn persist(&self, scope: EnvScope, vars: &[(&'static str, String)]) -> std::io::Result<()> {
        debug!(%scope, "writing environment to registry");
        env::registry::write(scope, vars)
    }
}

#[cfg(windows)]
fn notify_environment_changed() {
    if !env::registry::broadcast_change() {
        tracing::warn!("environment change broadcast failed; new values apply to new sessions");
    }
}

#[cfg(not(windows))]
fn notify_environment_changed() {
    // Login sessions read these files at start; there is nothing to signal
    debug!("persistent environment updated; takes effect on next login");
}
