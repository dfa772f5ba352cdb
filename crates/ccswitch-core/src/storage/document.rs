//! On-disk shape of the profile store

use serde::{Deserialize, Serialize};

use crate::profile::Profile;

/// Schema version written to new documents
pub const STORE_VERSION: &str = "1.0";

fn default_version() -> String {
    STORE_VERSION.to_string()
}

/// The whole persisted store
///
/// Missing top-level keys take their defaults so partially written or
/// hand-edited files still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreDocument {
    /// Profiles in user-controlled order
    #[serde(default)]
    pub configs: Vec<Profile>,
    /// Name of the active profile
    #[serde(default)]
    pub active_config: Option<String>,
    #[serde(default = "default_version")]
    pub version: String,
}

impl Default for StoreDocument {
    fn default() -> Self {
        Self {
            configs: Vec::new(),
            active_config: None,
            version: default_version(),
        }
    }
}

impl StoreDocument {
    /// Drop an active pointer that names no profile
    ///
    /// Returns true if the pointer was cleared.
    pub fn repair_active(&mut self) -> bool {
        let dangling = self
            .active_config
            .as_ref()
            .is_some_and(|name| !self.configs.iter().any(|p| &p.name == name));
        if dangling {
            self.active_config = None;
        }
        dangling
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_take_defaults() {
        let doc: StoreDocument = serde_json::from_str("{}").unwrap();
        assert!(doc.configs.is_empty());
        assert!(doc.active_config.is_none());
        assert_eq!(doc.version, "1.0");
    }

    #[test]
    fn test_repair_active_clears_dangling() {
        let mut doc = StoreDocument {
            active_config: Some("ghost".to_string()),
            ..StoreDocument::default()
        };
        assert!(doc.repair_active());
        assert!(doc.active_config.is_none());
        assert!(!doc.repair_active());
    }
}
