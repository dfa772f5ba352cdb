//! Legacy store file migration
//!
//! Older releases kept profiles in `cc_switcher_configs.json`. On first
//! start the file is copied (never moved) to the current name. A failed copy
//! never blocks startup: the legacy file is simply used in place.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// What `migrate_legacy` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Migration {
    /// Current file exists, or there is nothing to migrate
    NotNeeded,
    /// Legacy file copied to the current path
    Copied,
    /// Copy failed; keep reading and writing the legacy file
    UsingLegacy { reason: String },
}

/// Copy the legacy store to the current path if needed
///
/// Returns the path the store should be loaded from and saved to.
#[must_use]
pub fn migrate_legacy(store_file: &Path, legacy_file: &Path) -> (PathBuf, Migration) {
    if store_file.exists() || !legacy_file.exists() {
        return (store_file.to_path_buf(), Migration::NotNeeded);
    }

    let copied = store_file
        .parent()
        .map_or(Ok(()), fs::create_dir_all)
        .and_then(|()| fs::copy(legacy_file, store_file));

    match copied {
        Ok(_) => {
            info!(
                from = %legacy_file.display(),
                to = %store_file.display(),
                "migrated legacy profile store"
            );
            (store_file.to_path_buf(), Migration::Copied)
        }
        Err(e) => {
            warn!(
                from = %legacy_file.display(),
                error = %e,
                "legacy store migration failed, using legacy file"
            );
            (
                legacy_file.to_path_buf(),
                Migration::UsingLegacy {
                    reason: e.to_string(),
                },
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_nothing_to_migrate() {
        let dir = TempDir::new().unwrap();
        let current = dir.path().join("new.json");
        let legacy = dir.path().join("old.json");

        let (path, migration) = migrate_legacy(&current, &legacy);
        assert_eq!(path, current);
        assert_eq!(migration, Migration::NotNeeded);
        assert!(!current.exists());
    }

    #[test]
    fn test_current_file_wins() {
        let dir = TempDir::new().unwrap();
        let current = dir.path().join("new.json");
        let legacy = dir.path().join("old.json");
        fs::write(&current, "{\"configs\":[]}").unwrap();
        fs::write(&legacy, "{\"configs\":[{\"name\":\"old\"}]}").unwrap();

        let (path, migration) = migrate_legacy(&current, &legacy);
        assert_eq!(path, current);
        assert_eq!(migration, Migration::NotNeeded);
        assert_eq!(fs::read_to_string(&current).unwrap(), "{\"configs\":[]}");
    }

    #[test]
    fn test_copies_legacy_file() {
        let dir = TempDir::new().unwrap();
        let current = dir.path().join("new.json");
        let legacy = dir.path().join("old.json");
        fs::write(&legacy, "legacy content").unwrap();

        let (path, migration) = migrate_legacy(&current, &legacy);
        assert_eq!(path, current);
        assert_eq!(migration, Migration::Copied);
        assert_eq!(fs::read_to_string(&current).unwrap(), "legacy content");
        assert_eq!(fs::read_to_string(&legacy).unwrap(), "legacy content");
    }

    #[test]
    fn test_copy_failure_falls_back_to_legacy() {
        let dir = TempDir::new().unwrap();
        // Parent of the target is a regular file, so the copy cannot succeed
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let current = blocker.join("new.json");
        let legacy = dir.path().join("old.json");
        fs::write(&legacy, "legacy content").unwrap();

        let (path, migration) = migrate_legacy(&current, &legacy);
        assert_eq!(path, legacy);
        assert!(matches!(migration, Migration::UsingLegacy { .. }));
    }
}
