//! Active settings file (`~/.claude/settings.json`)

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::Path;
use tracing::warn;

use super::error::{ActivationError, ActivationResult};
use crate::profile::Profile;
use crate::util::mask_secret;

pub const BASE_URL_KEY: &str = "ANTHROPIC_BASE_URL";
pub const AUTH_TOKEN_KEY: &str = "ANTHROPIC_AUTH_TOKEN";
pub const MODEL_KEY: &str = "default_model";

/// The triple projected into the settings file
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActiveSettings {
    #[serde(rename = "ANTHROPIC_BASE_URL", default)]
    pub base_url: String,
    #[serde(rename = "ANTHROPIC_AUTH_TOKEN", default)]
    pub auth_token: String,
    #[serde(default)]
    pub default_model: String,
}

impl ActiveSettings {
    #[must_use]
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            base_url: profile.base_url.clone(),
            auth_token: profile.auth_token.clone(),
            default_model: profile.default_model.clone(),
        }
    }

    /// Whether these settings match what `profile` would write
    #[must_use]
    pub fn matches(&self, profile: &Profile) -> bool {
        self.base_url == profile.base_url
            && self.auth_token == profile.auth_token
            && self.default_model == profile.default_model
    }
}

impl std::fmt::Debug for ActiveSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveSettings")
            .field("base_url", &self.base_url)
            .field("auth_token", &mask_secret(&self.auth_token))
            .field("default_model", &self.default_model)
            .finish()
    }
}

/// Write the triple into the settings file
///
/// Keys the file already holds besides the three are kept. A file that is
/// not a JSON object is replaced.
pub(crate) fn write_settings(path: &Path, settings: &ActiveSettings) -> io::Result<()> {
    let mut root = match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => map,
            _ => {
                warn!(path = %path.display(), "settings file is not a JSON object, replacing it");
                Map::new()
            }
        },
        Err(e) if e.kind() == io::ErrorKind::NotFound => Map::new(),
        Err(e) => return Err(e),
    };

    root.insert(BASE_URL_KEY.into(), Value::String(settings.base_url.clone()));
    root.insert(AUTH_TOKEN_KEY.into(), Value::String(settings.auth_token.clone()));
    root.insert(MODEL_KEY.into(), Value::String(settings.default_model.clone()));

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(&Value::Object(root)).map_err(io::Error::other)?;
    fs::write(path, json)
}

/// Read the triple back; `None` when the file does not exist
pub(crate) fn read_settings(path: &Path) -> ActivationResult<Option<ActiveSettings>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(ActivationError::SettingsRead {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
        }
    };
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| ActivationError::SettingsRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> ActiveSettings {
        ActiveSettings {
            base_url: "https://api.example.com".into(),
            auth_token: "sk-test".into(),
            default_model: "claude-sonnet".into(),
        }
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        write_settings(&path, &sample()).unwrap();

        let read = read_settings(&path).unwrap().unwrap();
        assert_eq!(read, sample());
    }

    #[test]
    fn test_write_keeps_unrelated_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{"permissions":{"allow":["Bash"]},"ANTHROPIC_BASE_URL":"https://old"}"#,
        )
        .unwrap();

        write_settings(&path, &sample()).unwrap();

        let value: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["permissions"]["allow"][0], "Bash");
        assert_eq!(value["ANTHROPIC_BASE_URL"], "https://api.example.com");
        assert_eq!(value["default_model"], "claude-sonnet");
    }

    #[test]
    fn test_write_replaces_non_object() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json").unwrap();

        write_settings(&path, &sample()).unwrap();
        assert_eq!(read_settings(&path).unwrap().unwrap(), sample());
    }

    #[test]
    fn test_read_missing_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(read_settings(&dir.path().join("nope.json")).unwrap().is_none());
    }

    #[test]
    fn test_debug_masks_token() {
        let mut settings = sample();
        settings.auth_token = "sk-ant-REDACTED".into();
        assert!(!format!("{settings:?}").contains("supersecret"));
    }
}
