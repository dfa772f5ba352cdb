//! Activation and environment CLI commands
//!
//! Handles: ccswitch use/env/status

use anyhow::Result;
use clap::ValueEnum;

use ccswitch_core::activate::{
    profile_vars, ActivationEngine, ActivationError, EnvScope, EnvSnapshot,
};
use ccswitch_core::paths::AppPaths;
use ccswitch_core::profile::Profile;
use ccswitch_core::storage::Migration;
use ccswitch_core::util::mask_secret;

use super::{find_index, open_store};

/// `--scope` values
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ScopeArg {
    /// Print `export` lines for the current shell
    Process,
    /// Persist for the current user
    User,
    /// Persist machine-wide (needs admin/root)
    System,
}

impl From<ScopeArg> for EnvScope {
    fn from(arg: ScopeArg) -> Self {
        match arg {
            ScopeArg::Process => EnvScope::Process,
            ScopeArg::User => EnvScope::User,
            ScopeArg::System => EnvScope::System,
        }
    }
}

pub fn activate(paths: &AppPaths, name: &str, env: Option<ScopeArg>) -> Result<()> {
    let mut store = open_store(paths);
    let index = find_index(&store, name)?;
    let engine = ActivationEngine::new(paths);

    let report = engine.activate(&mut store, index)?;
    println!(
        "Switched to '{}' (wrote {})",
        report.profile,
        report.settings_file.display()
    );

    if let Some(scope) = env {
        if let Some(profile) = store.get(index) {
            export_profile(&engine, profile, scope.into())?;
        }
    }
    Ok(())
}

pub fn export(paths: &AppPaths, name: &str, scope: ScopeArg) -> Result<()> {
    let store = open_store(paths);
    let index = find_index(&store, name)?;
    let engine = ActivationEngine::new(paths);

    if let Some(profile) = store.get(index) {
        export_profile(&engine, profile, scope.into())?;
    }
    Ok(())
}

fn export_profile(engine: &ActivationEngine, profile: &Profile, scope: EnvScope) -> Result<()> {
    // Variables set here would die with this process; hand them to the shell
    if scope == EnvScope::Process {
        for (key, value) in profile_vars(profile) {
            println!("export {key}={}", shell_quote(&value));
        }
        return Ok(());
    }

    match engine.export_environment(profile, scope) {
        Ok(()) => {
            println!("Exported '{}' to the {scope} environment", profile.name);
            #[cfg(not(windows))]
            if let Some(file) = engine.env_file(scope) {
                println!("Wrote {} (takes effect at next login)", file.display());
            }
            #[cfg(windows)]
            println!("New terminals will pick up the change.");
            Ok(())
        }
        Err(e @ ActivationError::ElevationRequired { .. }) => {
            eprintln!("The {scope} environment needs administrator rights.");
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}

fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

pub fn status(paths: &AppPaths) -> Result<()> {
    let store = open_store(paths);
    let engine = ActivationEngine::new(paths);

    println!("ccswitch Status");
    println!("===============\n");
    println!("Store: {} ({} profiles)", store.path().display(), store.len());
    if let Migration::UsingLegacy { reason } = store.migration() {
        println!("  Using legacy store file: {reason}");
    }

    match store.active() {
        Some(profile) => {
            println!("Active profile: {}", profile.name);
            println!("  URL:   {}", profile.base_url);
            println!("  Token: {}", profile.masked_token());
            println!("  Model: {}", profile.default_model);
            println!("  Last test: {}", profile.test_status);
        }
        None => println!("Active profile: none"),
    }

    println!("\nSettings file: {}", engine.settings_file().display());
    match engine.current_settings() {
        Ok(Some(settings)) => {
            println!("  URL:   {}", settings.base_url);
            println!("  Token: {}", mask_secret(&settings.auth_token));
            println!("  Model: {}", settings.default_model);
            if let Some(active) = store.active() {
                if !settings.matches(active) {
                    println!("  Differs from the active profile; run 'ccswitch use {}'", active.name);
                }
            }
        }
        Ok(None) => println!("  (not written yet)"),
        Err(e) => println!("  Unreadable: {e}"),
    }

    let snapshot = EnvSnapshot::capture();
    println!("\nEnvironment:");
    println!("  ANTHROPIC_BASE_URL:   {}", snapshot.base_url.as_deref().unwrap_or("(unset)"));
    println!(
        "  ANTHROPIC_AUTH_TOKEN: {}",
        snapshot.masked_token().as_deref().unwrap_or("(unset)")
    );
    println!("  ANTHROPIC_MODEL:      {}", snapshot.model.as_deref().unwrap_or("(unset)"));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("abc"), "'abc'");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
    }
}
