//! CLI command handlers
//!
//! Profile CRUD, activation and environment export, probing, and the
//! model/project helpers each have their own module.

pub mod env;
pub mod probe;
pub mod profile;
pub mod project;

use anyhow::{anyhow, Result};
use ccswitch_core::paths::AppPaths;
use ccswitch_core::storage::ProfileStore;

/// Open the store, reporting a load that fell back to empty
pub fn open_store(paths: &AppPaths) -> ProfileStore {
    let store = ProfileStore::open(paths);
    if let Some(e) = store.load_error() {
        eprintln!("Warning: could not load {}: {e}", store.path().display());
        eprintln!("Starting with an empty profile list.");
    }
    store
}

/// Index of the profile called `name`
pub fn find_index(store: &ProfileStore, name: &str) -> Result<usize> {
    store
        .position(name)
        .ok_or_else(|| anyhow!("Profile not found: {name}"))
}
