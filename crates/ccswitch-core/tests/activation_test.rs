//! Activation engine tests
//!
//! Settings-file projection and environment export against a temp home.

use ccswitch_core::activate::{
    parse_env_line, ActivationEngine, ActivationError, EnvScope, EnvSnapshot, ENV_AUTH_TOKEN,
    ENV_BASE_URL, ENV_MODEL,
};
use ccswitch_core::paths::AppPaths;
use ccswitch_core::profile::ProfileDraft;
use ccswitch_core::storage::ProfileStore;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use tempfile::TempDir;

fn setup() -> (TempDir, AppPaths, ProfileStore) {
    let home = TempDir::new().expect("Failed to create temp dir");
    let paths = AppPaths::from_home(home.path());
    let mut store = ProfileStore::open(&paths);
    store
        .add(ProfileDraft::new(
            "primary",
            "https://primary.example.com",
            "sk-primary",
            "claude-sonnet-4-20250514",
        ))
        .expect("Failed to add profile");
    store
        .add(ProfileDraft::new(
            "backup",
            "https://backup.example.com",
            "sk-backup",
            "glm-4.5",
        ))
        .expect("Failed to add profile");
    (home, paths, store)
}

#[test]
fn test_activate_writes_settings_and_sets_active() {
    let (_home, paths, mut store) = setup();
    let engine = ActivationEngine::new(&paths);

    let report = engine.activate(&mut store, 1).expect("Failed to activate");
    assert_eq!(report.profile, "backup");
    assert_eq!(report.settings_file, paths.settings_file);

    let value: Value = serde_json::from_str(
        &fs::read_to_string(&paths.settings_file).expect("Settings file missing"),
    )
    .expect("Settings file is not JSON");
    assert_eq!(value["ANTHROPIC_BASE_URL"], "https://backup.example.com");
    assert_eq!(value["ANTHROPIC_AUTH_TOKEN"], "sk-backup");
    assert_eq!(value["default_model"], "glm-4.5");

    assert_eq!(store.active_name(), Some("backup"));
    assert_eq!(ProfileStore::open(&paths).active_name(), Some("backup"));

    let current = engine
        .current_settings()
        .expect("Failed to read settings")
        .expect("Settings missing");
    assert!(current.matches(store.get(1).expect("Profile missing")));
}

#[test]
fn test_activate_invalid_index() {
    let (_home, paths, mut store) = setup();
    let engine = ActivationEngine::new(&paths);

    let err = engine.activate(&mut store, 9).unwrap_err();
    assert_eq!(err.code(), "INVALID_INDEX");
    assert!(!paths.settings_file.exists());
}

#[test]
fn test_failed_write_leaves_active_pointer() {
    let (home, mut paths, mut store) = setup();
    ActivationEngine::new(&paths)
        .activate(&mut store, 0)
        .expect("Failed to activate");

    // Point the settings file below a regular file so the write fails
    let blocker = home.path().join("blocker");
    fs::write(&blocker, "").expect("Failed to write blocker");
    paths.settings_file = blocker.join("settings.json");
    let engine = ActivationEngine::new(&paths);

    let err = engine.activate(&mut store, 1).unwrap_err();
    assert!(matches!(err, ActivationError::SettingsWrite { .. }));
    assert!(!err.requires_elevation());
    assert_eq!(store.active_name(), Some("primary"));
}

#[test]
fn test_current_settings_absent() {
    let (_home, paths, _store) = setup();
    let engine = ActivationEngine::new(&paths);
    assert!(engine
        .current_settings()
        .expect("Failed to read settings")
        .is_none());
}

#[test]
fn test_export_process_scope() {
    let (_home, paths, store) = setup();
    let engine = ActivationEngine::new(&paths);
    let profile = store.get(0).expect("Profile missing");

    engine
        .export_environment(profile, EnvScope::Process)
        .expect("Failed to export");

    let snapshot = EnvSnapshot::capture();
    assert_eq!(snapshot.base_url.as_deref(), Some("https://primary.example.com"));
    assert_eq!(snapshot.auth_token.as_deref(), Some("sk-primary"));
    assert_eq!(snapshot.model.as_deref(), Some("claude-sonnet-4-20250514"));
    assert!(!format!("{snapshot:?}").contains("sk-primary"));
}

#[cfg(not(windows))]
#[test]
fn test_export_user_scope_writes_env_file() {
    let (_home, paths, store) = setup();
    let engine = ActivationEngine::new(&paths);
    fs::create_dir_all(paths.user_env_file.parent().expect("No parent"))
        .expect("Failed to create env dir");
    fs::write(&paths.user_env_file, "EDITOR=vim\nANTHROPIC_BASE_URL=https://stale\n")
        .expect("Failed to seed env file");

    engine
        .export_environment(store.get(1).expect("Profile missing"), EnvScope::User)
        .expect("Failed to export");

    let content = fs::read_to_string(&paths.user_env_file).expect("Env file missing");
    let vars: HashMap<String, String> = content.lines().filter_map(parse_env_line).collect();
    assert_eq!(vars.get("EDITOR").map(String::as_str), Some("vim"));
    assert_eq!(
        vars.get(ENV_BASE_URL).map(String::as_str),
        Some("https://backup.example.com")
    );
    assert_eq!(vars.get(ENV_AUTH_TOKEN).map(String::as_str), Some("sk-backup"));
    assert_eq!(vars.get(ENV_MODEL).map(String::as_str), Some("glm-4.5"));
    assert_eq!(content.matches("ANTHROPIC_BASE_URL=").count(), 1);
}

#[cfg(not(windows))]
#[test]
fn test_export_system_scope_failure_is_environment_error() {
    let (home, mut paths, store) = setup();
    let blocker = home.path().join("blocker");
    fs::write(&blocker, "").expect("Failed to write blocker");
    paths.system_env_file = blocker.join("environment");
    let engine = ActivationEngine::new(&paths);

    let err = engine
        .export_environment(store.get(0).expect("Profile missing"), EnvScope::System)
        .unwrap_err();
    assert!(matches!(
        err,
        ActivationError::Environment { scope: EnvScope::System, .. }
            | ActivationError::ElevationRequired { scope: EnvScope::System, .. }
    ));
}
