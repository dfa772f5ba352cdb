//! ccswitch CLI - Switch Claude Code between API profiles
//!
//! Provides `ccswitch list`, `ccswitch use`, `ccswitch test` and friends.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;

use ccswitch_core::paths::AppPaths;
use commands::env::ScopeArg;
use commands::project::ProjectCommands;

#[derive(Parser)]
#[command(name = "ccswitch")]
#[command(about = "ccswitch - Claude Code API profile switcher")]
#[command(version)]
struct Cli {
    /// Log more (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List saved profiles
    List {
        /// Output as JSON (tokens masked)
        #[arg(long)]
        json: bool,
    },
    /// Add a profile
    Add {
        /// Profile name (must be unique)
        name: String,
        /// API base URL
        #[arg(long)]
        url: String,
        /// Auth token
        #[arg(long)]
        token: String,
        /// Default model
        #[arg(long)]
        model: String,
        /// Free-form note
        #[arg(long)]
        note: Option<String>,
    },
    /// Change fields of a profile
    Update {
        /// Profile to change
        profile: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New API base URL
        #[arg(long)]
        url: Option<String>,
        /// New auth token
        #[arg(long)]
        token: Option<String>,
        /// New default model
        #[arg(long)]
        model: Option<String>,
        /// New note (empty string clears it)
        #[arg(long)]
        note: Option<String>,
    },
    /// Remove a profile
    Remove {
        /// Profile name
        name: String,
    },
    /// Move profiles one slot up or down
    Move {
        /// Profiles to move together
        #[arg(required = true)]
        names: Vec<String>,
        /// Move towards the top
        #[arg(long, conflicts_with = "down", required_unless_present = "down")]
        up: bool,
        /// Move towards the bottom
        #[arg(long)]
        down: bool,
    },
    /// Activate a profile for Claude Code
    Use {
        /// Profile name
        name: String,
        /// Also export the profile's environment variables
        #[arg(long, value_enum, value_name = "SCOPE")]
        env: Option<ScopeArg>,
    },
    /// Export a profile's environment variables
    Env {
        /// Profile name
        name: String,
        /// Where to write the variables
        #[arg(long, value_enum)]
        scope: ScopeArg,
    },
    /// Show the active profile and what Claude Code will see
    Status,
    /// Send a test request through one or all profiles
    Test {
        /// Profile name
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        name: Option<String>,
        /// Test every profile, one at a time
        #[arg(long)]
        all: bool,
        /// Question to ask
        #[arg(long, default_value = ccswitch_probe::DEFAULT_QUESTION)]
        question: String,
        /// Request timeout in seconds
        #[arg(long, default_value_t = 10)]
        timeout: u64,
        /// Pause between profiles in milliseconds (with --all)
        #[arg(long, default_value_t = 1000)]
        delay: u64,
    },
    /// List known model names
    Models {
        /// Only models starting with this prefix
        prefix: Option<String>,
    },
    /// Recent Claude Code projects
    Projects {
        #[command(subcommand)]
        action: ProjectCommands,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(command: Commands) -> anyhow::Result<()> {
    let paths = AppPaths::detect()?;

    match command {
        Commands::List { json } => commands::profile::list(&paths, json),
        Commands::Add {
            name,
            url,
            token,
            model,
            note,
        } => commands::profile::add(&paths, name, url, token, model, note),
        Commands::Update {
            profile,
            name,
            url,
            token,
            model,
            note,
        } => commands::profile::update(
            &paths,
            &profile,
            ccswitch_core::ProfileUpdate {
                name,
                base_url: url,
                auth_token: token,
                default_model: model,
                note,
            },
        ),
        Commands::Remove { name } => commands::profile::remove(&paths, &name),
        Commands::Move { names, up, down: _ } => commands::profile::reorder(&paths, &names, up),
        Commands::Use { name, env } => commands::env::activate(&paths, &name, env),
        Commands::Env { name, scope } => commands::env::export(&paths, &name, scope),
        Commands::Status => commands::env::status(&paths),
        Commands::Test {
            name,
            all,
            question,
            timeout,
            delay,
        } => {
            let options = commands::probe::TestOptions {
                question,
                timeout: std::time::Duration::from_secs(timeout),
                delay: std::time::Duration::from_millis(delay),
            };
            match name {
                Some(name) if !all => commands::probe::test_one(&paths, &name, &options),
                _ => commands::probe::test_all(&paths, &options),
            }
        }
        Commands::Models { prefix } => commands::project::models(&paths, prefix.as_deref()),
        Commands::Projects { action } => commands::project::execute(&paths, action),
    }
}
