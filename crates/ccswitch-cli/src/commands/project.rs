//! Model catalog and recent project commands
//!
//! Handles: ccswitch models / ccswitch projects list/open

use anyhow::{anyhow, Context, Result};
use clap::Subcommand;

use ccswitch_core::catalog::ModelCatalog;
use ccswitch_core::paths::AppPaths;
use ccswitch_core::projects::{launch_claude, recent_projects};

/// Recent project commands
#[derive(Subcommand)]
pub enum ProjectCommands {
    /// List projects Claude Code was used in, newest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Start claude in a recent project
    Open {
        /// Position in `projects list` (1-based)
        number: usize,
        /// Continue the most recent conversation
        #[arg(short, long = "continue")]
        resume: bool,
    },
}

pub fn execute(paths: &AppPaths, cmd: ProjectCommands) -> Result<()> {
    match cmd {
        ProjectCommands::List { json } => list(paths, json),
        ProjectCommands::Open { number, resume } => open(paths, number, resume),
    }
}

fn list(paths: &AppPaths, json_output: bool) -> Result<()> {
    let projects = recent_projects(&paths.projects_dir);

    if json_output {
        println!("{}", serde_json::to_string_pretty(&projects)?);
        return Ok(());
    }

    if projects.is_empty() {
        println!("No recent projects found.");
        return Ok(());
    }

    for (i, project) in projects.iter().enumerate() {
        println!(
            "{:>3}. {} - {} ({})",
            i + 1,
            project.name,
            project.path.display(),
            project
                .last_access
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}

fn open(paths: &AppPaths, number: usize, resume: bool) -> Result<()> {
    let projects = recent_projects(&paths.projects_dir);
    let project = number
        .checked_sub(1)
        .and_then(|i| projects.get(i))
        .ok_or_else(|| anyhow!("No recent project #{number} ({} found)", projects.len()))?;

    let mut child = launch_claude(&project.path, resume)
        .with_context(|| format!("Failed to start claude in {}", project.path.display()))?;
    println!("Started claude in {}", project.path.display());

    let status = child.wait().context("Failed to wait for claude")?;
    if !status.success() {
        eprintln!("claude exited with {status}");
    }
    Ok(())
}

pub fn models(paths: &AppPaths, prefix: Option<&str>) -> Result<()> {
    let catalog = ModelCatalog::load_or_builtin(&paths.model_catalog_file);

    if let Some(prefix) = prefix {
        for model in catalog.suggest(prefix) {
            println!("{model}");
        }
        return Ok(());
    }

    for category in &catalog.categories {
        println!("[{}]", category.name);
        for model in &category.models {
            println!("  {model}");
        }
    }
    Ok(())
}
