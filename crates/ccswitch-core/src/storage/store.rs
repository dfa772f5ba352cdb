//! Profile store operations (CRUD)
//!
//! The store is the single source of truth for profiles. Every mutation is
//! written through to disk immediately; there is no batching and no file
//! locking, so a single running instance is assumed (last save wins).

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::document::StoreDocument;
use super::error::{StoreError, StoreResult};
use super::migrate::{migrate_legacy, Migration};
use crate::paths::AppPaths;
use crate::profile::{ProbeResult, Profile, ProfileDraft, ProfileUpdate};

/// Profile storage backed by a JSON document
#[derive(Debug)]
pub struct ProfileStore {
    path: PathBuf,
    doc: StoreDocument,
    migration: Migration,
    load_error: Option<StoreError>,
}

impl ProfileStore {
    /// Migrate the legacy file if needed, then load
    #[must_use]
    pub fn open(paths: &AppPaths) -> Self {
        let (path, migration) = migrate_legacy(&paths.store_file, &paths.legacy_store_file);
        let mut store = Self::load(&path);
        store.migration = migration;
        store
    }

    /// Load the store at `path`
    ///
    /// Never fails: a missing file yields an empty store, and an unreadable
    /// or malformed file yields an empty store with the cause kept in
    /// [`ProfileStore::load_error`].
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let (doc, load_error) = match read_document(path) {
            Ok(Some(mut doc)) => {
                if doc.repair_active() {
                    warn!(path = %path.display(), "active profile no longer exists, cleared");
                }
                (doc, None)
            }
            Ok(None) => (StoreDocument::default(), None),
            Err(e) => {
                warn!(error = %e, "failed to load profile store, starting empty");
                (StoreDocument::default(), Some(e))
            }
        };

        Self {
            path: path.to_path_buf(),
            doc,
            migration: Migration::NotNeeded,
            load_error,
        }
    }

    /// File this store reads from and writes to
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Why the last load fell back to an empty store, if it did
    #[must_use]
    pub fn load_error(&self) -> Option<&StoreError> {
        self.load_error.as_ref()
    }

    /// What the legacy migration did when this store was opened
    #[must_use]
    pub fn migration(&self) -> &Migration {
        &self.migration
    }

    /// Write the whole document, creating the parent directory if needed
    ///
    /// # Errors
    /// Returns an error if the file cannot be written
    pub fn save(&self) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, &e))?;
        }
        let json = serde_json::to_string_pretty(&self.doc).map_err(|e| StoreError::Parse {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        fs::write(&self.path, json).map_err(|e| StoreError::io(&self.path, &e))?;
        debug!(path = %self.path.display(), profiles = self.doc.configs.len(), "saved profile store");
        Ok(())
    }

    /// Profiles in stored order
    #[must_use]
    pub fn list(&self) -> &[Profile] {
        &self.doc.configs
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.doc.configs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.doc.configs.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Profile> {
        self.doc.configs.get(index)
    }

    /// Index of the profile with exactly this name
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.doc.configs.iter().position(|p| p.name == name)
    }

    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Profile> {
        self.doc.configs.iter().find(|p| p.name == name)
    }

    /// Name of the active profile
    #[must_use]
    pub fn active_name(&self) -> Option<&str> {
        self.doc.active_config.as_deref()
    }

    #[must_use]
    pub fn active(&self) -> Option<&Profile> {
        self.active_name().and_then(|name| self.find(name))
    }

    /// Schema version of the loaded document
    #[must_use]
    pub fn version(&self) -> &str {
        &self.doc.version
    }

    /// Append a new untested profile
    ///
    /// Returns the index of the new profile.
    ///
    /// # Errors
    /// Returns an error if the name is taken or required fields are empty,
    /// or if saving fails (the profile stays added in memory)
    pub fn add(&mut self, draft: ProfileDraft) -> StoreResult<usize> {
        validate_draft(&draft)?;
        if self.position(&draft.name).is_some() {
            return Err(StoreError::DuplicateName { name: draft.name });
        }

        info!(name = %draft.name, "adding profile");
        self.doc.configs.push(Profile::from_draft(draft));
        self.save()?;
        Ok(self.doc.configs.len() - 1)
    }

    /// Merge `update` into the profile at `index`
    ///
    /// Renaming the active profile moves the active pointer along with it.
    ///
    /// # Errors
    /// Returns an error if the index is out of range, the new name belongs
    /// to a different profile, or saving fails
    pub fn update(&mut self, index: usize, update: ProfileUpdate) -> StoreResult<()> {
        self.check_index(index)?;
        if let Some(name) = &update.name {
            if name.trim().is_empty() {
                return Err(StoreError::Validation("Profile name cannot be empty".into()));
            }
            let clash = self
                .doc
                .configs
                .iter()
                .enumerate()
                .any(|(i, p)| i != index && &p.name == name);
            if clash {
                return Err(StoreError::DuplicateName { name: name.clone() });
            }
        }

        let profile = &mut self.doc.configs[index];
        let old_name = profile.name.clone();
        update.merge_into(profile);
        let new_name = profile.name.clone();

        if new_name != old_name && self.doc.active_config.as_deref() == Some(old_name.as_str()) {
            self.doc.active_config = Some(new_name.clone());
        }

        info!(name = %new_name, "updated profile");
        self.save()
    }

    /// Remove the profile at `index`, clearing the active pointer if it was active
    ///
    /// # Errors
    /// Returns an error if the index is out of range or saving fails
    pub fn delete(&mut self, index: usize) -> StoreResult<Profile> {
        self.check_index(index)?;
        let removed = self.doc.configs.remove(index);
        if self.doc.active_config.as_deref() == Some(removed.name.as_str()) {
            self.doc.active_config = None;
        }

        info!(name = %removed.name, "deleted profile");
        self.save()?;
        Ok(removed)
    }

    /// Swap two profiles
    ///
    /// Out-of-range or identical indices are a no-op. Returns whether
    /// anything moved.
    ///
    /// # Errors
    /// Returns an error if saving fails
    pub fn swap(&mut self, a: usize, b: usize) -> StoreResult<bool> {
        let len = self.doc.configs.len();
        if a == b || a >= len || b >= len {
            return Ok(false);
        }
        self.doc.configs.swap(a, b);
        self.save()?;
        Ok(true)
    }

    /// Move each selected profile one slot up
    ///
    /// A selection already at the top, or directly below a selection that
    /// could not move, stays where it is. Relative order of the selected
    /// profiles is preserved. Returns whether anything moved.
    ///
    /// # Errors
    /// Returns an error if saving fails
    pub fn move_up(&mut self, indices: &[usize]) -> StoreResult<bool> {
        let mut selected = self.normalize_selection(indices);
        selected.sort_unstable();

        let mut floor = 0;
        let mut moved = false;
        for index in selected {
            if index > floor {
                self.doc.configs.swap(index - 1, index);
                floor = index;
                moved = true;
            } else {
                floor = index + 1;
            }
        }

        if moved {
            self.save()?;
        }
        Ok(moved)
    }

    /// Move each selected profile one slot down
    ///
    /// Mirror image of [`ProfileStore::move_up`].
    ///
    /// # Errors
    /// Returns an error if saving fails
    pub fn move_down(&mut self, indices: &[usize]) -> StoreResult<bool> {
        let mut selected = self.normalize_selection(indices);
        selected.sort_unstable_by(|a, b| b.cmp(a));

        let mut ceiling = self.doc.configs.len();
        let mut moved = false;
        for index in selected {
            if index + 1 < ceiling {
                self.doc.configs.swap(index, index + 1);
                ceiling = index + 1;
                moved = true;
            } else {
                ceiling = index;
            }
        }

        if moved {
            self.save()?;
        }
        Ok(moved)
    }

    /// Point the store at an existing profile and persist
    ///
    /// # Errors
    /// Returns an error if no profile has that name or saving fails
    pub fn set_active(&mut self, name: &str) -> StoreResult<()> {
        if self.position(name).is_none() {
            return Err(StoreError::NotFound {
                name: name.to_string(),
            });
        }
        self.doc.active_config = Some(name.to_string());
        self.save()
    }

    /// Record a probe outcome on the named profile and persist
    ///
    /// This is the only operation that changes test fields.
    ///
    /// # Errors
    /// Returns an error if no profile has that name or saving fails
    pub fn record_probe(&mut self, name: &str, result: &ProbeResult) -> StoreResult<()> {
        let index = self.position(name).ok_or_else(|| StoreError::NotFound {
            name: name.to_string(),
        })?;
        self.doc.configs[index].apply_probe(result);
        debug!(name, status = %result.status, "recorded probe result");
        self.save()
    }

    fn check_index(&self, index: usize) -> StoreResult<()> {
        let len = self.doc.configs.len();
        if index >= len {
            return Err(StoreError::InvalidIndex { index, len });
        }
        Ok(())
    }

    fn normalize_selection(&self, indices: &[usize]) -> Vec<usize> {
        let len = self.doc.configs.len();
        let mut selected: Vec<usize> = indices.iter().copied().filter(|&i| i < len).collect();
        selected.sort_unstable();
        selected.dedup();
        selected
    }
}

/// Read and parse the document; `Ok(None)` when the file does not exist
fn read_document(path: &Path) -> StoreResult<Option<StoreDocument>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|e| StoreError::io(path, &e))?;
    let doc = serde_json::from_str(&content).map_err(|e| StoreError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(Some(doc))
}

fn validate_draft(draft: &ProfileDraft) -> StoreResult<()> {
    if draft.name.trim().is_empty() {
        return Err(StoreError::Validation("Profile name cannot be empty".into()));
    }
    if draft.base_url.trim().is_empty() {
        return Err(StoreError::Validation("Base URL cannot be empty".into()));
    }
    Ok(())
}
