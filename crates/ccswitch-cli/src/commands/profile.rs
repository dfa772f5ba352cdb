//! Profile CLI commands
//!
//! Handles: ccswitch list/add/update/remove/move

use anyhow::{bail, Result};
use serde_json::json;

use ccswitch_core::paths::AppPaths;
use ccswitch_core::profile::{Profile, ProfileDraft, ProfileUpdate, TestStatus};
use ccswitch_core::util::truncate_chars;

use super::{find_index, open_store};

pub fn list(paths: &AppPaths, json_output: bool) -> Result<()> {
    let store = open_store(paths);
    let active = store.active_name();

    if json_output {
        let profiles: Vec<serde_json::Value> = store
            .list()
            .iter()
            .map(|p| {
                json!({
                    "name": p.name,
                    "active": active == Some(p.name.as_str()),
                    "base_url": p.base_url,
                    "auth_token": p.masked_token(),
                    "default_model": p.default_model,
                    "note": p.note(),
                    "test_status": p.test_status,
                    "test_time": p.test_time,
                    "test_message": p.test_message,
                })
            })
            .collect();

        let output = json!({
            "count": profiles.len(),
            "active": active,
            "profiles": profiles,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if store.is_empty() {
        println!("No profiles found.");
        println!("Run 'ccswitch add <name> --url <url> --token <token> --model <model>' to create one.");
        return Ok(());
    }

    for profile in store.list() {
        let marker = if active == Some(profile.name.as_str()) { "*" } else { " " };
        println!(
            "{marker} {} - {} ({}) [{}]",
            profile.name,
            profile.base_url,
            profile.default_model,
            status_label(profile)
        );
        if let Some(note) = profile.note() {
            println!("    {note}");
        }
    }
    Ok(())
}

/// `passed 14:03:22` style label, or just the status when never tested
fn status_label(profile: &Profile) -> String {
    match profile.test_status {
        TestStatus::Untested => profile.test_status.to_string(),
        status if profile.test_message.is_empty() => format!("{status} {}", profile.test_time),
        status => format!(
            "{status} {}: {}",
            profile.test_time,
            truncate_chars(&profile.test_message, 40)
        ),
    }
}

pub fn add(
    paths: &AppPaths,
    name: String,
    url: String,
    token: String,
    model: String,
    note: Option<String>,
) -> Result<()> {
    let mut store = open_store(paths);
    let mut draft = ProfileDraft::new(name, url, token, model);
    if let Some(note) = note {
        draft = draft.with_note(note);
    }
    let name = draft.name.clone();

    store.add(draft)?;
    println!("Added profile '{name}'");
    Ok(())
}

pub fn update(paths: &AppPaths, profile: &str, update: ProfileUpdate) -> Result<()> {
    if update.is_empty() {
        bail!("Nothing to update (use --name, --url, --token, --model or --note)");
    }

    let mut store = open_store(paths);
    let index = find_index(&store, profile)?;
    let new_name = update.name.clone();

    store.update(index, update)?;
    match new_name {
        Some(new_name) if new_name != profile => {
            println!("Updated profile '{profile}' (now '{new_name}')");
        }
        _ => println!("Updated profile '{profile}'"),
    }
    Ok(())
}

pub fn remove(paths: &AppPaths, name: &str) -> Result<()> {
    let mut store = open_store(paths);
    let index = find_index(&store, name)?;
    let was_active = store.active_name() == Some(name);

    store.delete(index)?;
    println!("Removed profile '{name}'");
    if was_active {
        println!("It was the active profile; no profile is active now.");
    }
    Ok(())
}

pub fn reorder(paths: &AppPaths, names: &[String], up: bool) -> Result<()> {
    let mut store = open_store(paths);
    let indices = names
        .iter()
        .map(|name| find_index(&store, name))
        .collect::<Result<Vec<_>>>()?;

    let moved = if up {
        store.move_up(&indices)?
    } else {
        store.move_down(&indices)?
    };

    if moved {
        let order: Vec<&str> = store.list().iter().map(|p| p.name.as_str()).collect();
        println!("New order: {}", order.join(", "));
    } else {
        println!("Nothing moved.");
    }
    Ok(())
}
