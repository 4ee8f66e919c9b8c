mod agents_cmd;
mod config;
mod export_cmd;
mod extract_cmd;
mod finalize_cmd;
mod rebuild_cmd;
mod regen_cmd;
mod session;
mod show_cmd;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use cadence_backend::{BackendConfig, HttpBackend};

use config::CadenceConfig;

#[derive(Parser)]
#[command(name = "cadence", about = "Content calendar planner and regenerator")]
struct Cli {
    /// Backend base URL (overrides CADENCE_BACKEND_URL env var)
    #[arg(long, global = true)]
    backend_url: Option<String>,

    /// Directory holding the session file and cache (defaults to ~/.local/state/cadence)
    #[arg(long, global = true)]
    session_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a cadence config file (no backend required)
    Init {
        /// Backend base URL to record
        #[arg(long, default_value = BackendConfig::DEFAULT_URL)]
        backend_url: String,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Upload a source document and extract the weekly outline
    Extract {
        /// Path to the source document
        file: PathBuf,
        /// Number of weeks to plan
        #[arg(long)]
        weeks: u32,
        /// Comma-separated posting days (e.g. "Monday,Wednesday,Friday")
        #[arg(long)]
        days: String,
    },
    /// Show the extracted outline (main ideas and sub-topics)
    Ideas,
    /// Pick platforms, generate posts, and materialize the plan
    Finalize {
        /// Comma-separated target platforms (e.g. "Instagram,LinkedIn")
        #[arg(long)]
        platforms: String,
        /// Posts per platform per day
        #[arg(long, default_value_t = 1)]
        posts_per_day: u32,
    },
    /// Show the materialized plan (omit --week to show all weeks)
    Show {
        /// Week number to show
        #[arg(long)]
        week: Option<u32>,
    },
    /// Regenerate one piece of the plan
    Regenerate {
        #[command(subcommand)]
        command: RegenCommands,
    },
    /// Re-run extraction and generation from the stored source document
    Rebuild,
    /// Discard the outline and plan (settings and config are kept)
    Reset,
    /// Show the pipeline role configurations
    Agents {
        /// Bypass the cached catalog and refetch
        #[arg(long)]
        refresh: bool,
    },
    /// Mark a platform as connected
    Connect {
        /// Platform name (e.g. Instagram)
        platform: String,
        /// Mark as disconnected instead
        #[arg(long)]
        off: bool,
    },
    /// Show platform connection flags
    Connections,
    /// Export the plan as JSON
    Export {
        /// Output file path (defaults to stdout)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum RegenCommands {
    /// Regenerate a week's main idea
    Main {
        /// Week number (1-based)
        #[arg(long)]
        week: u32,
        /// Optional steering instruction
        #[arg(long)]
        instruction: Option<String>,
    },
    /// Regenerate a day's sub-topic
    Sub {
        /// Week number (1-based)
        #[arg(long)]
        week: u32,
        /// Day name (e.g. Monday)
        #[arg(long)]
        day: String,
        /// Optional steering instruction
        #[arg(long)]
        instruction: Option<String>,
    },
    /// Regenerate one slot's post text
    Post {
        /// Week number (1-based)
        #[arg(long)]
        week: u32,
        /// Day name (e.g. Monday)
        #[arg(long)]
        day: String,
        /// Platform name (e.g. Instagram)
        #[arg(long)]
        platform: String,
        /// Slot index within the day (0-based)
        #[arg(long, default_value_t = 0)]
        slot: u32,
        /// Optional steering instruction
        #[arg(long)]
        instruction: Option<String>,
    },
    /// Regenerate one slot's image
    Image {
        /// Week number (1-based)
        #[arg(long)]
        week: u32,
        /// Day name (e.g. Monday)
        #[arg(long)]
        day: String,
        /// Platform name (e.g. Instagram)
        #[arg(long)]
        platform: String,
        /// Slot index within the day (0-based)
        #[arg(long, default_value_t = 0)]
        slot: u32,
        /// Optional steering instruction
        #[arg(long)]
        instruction: Option<String>,
    },
}

/// Split a comma-separated argument into trimmed, non-empty items.
pub(crate) fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Build the HTTP client from the resolved configuration.
fn backend(cli_url: Option<&str>) -> anyhow::Result<HttpBackend> {
    let resolved = CadenceConfig::resolve(cli_url);
    HttpBackend::new(resolved.backend).context("failed to build the backend client")
}

/// Execute the `cadence init` command: write config file.
fn cmd_init(backend_url: &str, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = config::ConfigFile {
        backend: config::BackendSection {
            url: backend_url.to_string(),
            timeout_secs: None,
        },
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  backend.url = {backend_url}");
    println!();
    println!("Next: run `cadence extract <file> --weeks N --days ...` to start a plan.");

    Ok(())
}

/// Execute the `cadence reset` command: drop the outline and plan.
fn cmd_reset(state_dir: &Path) -> anyhow::Result<()> {
    let mut session = session::Session::load_from(state_dir)?;
    session.outline = None;
    session.plan = None;
    session.save_to(state_dir)?;

    println!("Outline and plan discarded. Settings kept.");
    println!("Run `cadence rebuild` to regenerate, or `cadence extract` to start over.");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let state_dir = config::state_dir(cli.session_dir.as_deref());

    match cli.command {
        Commands::Init { backend_url, force } => {
            cmd_init(&backend_url, force)?;
        }
        Commands::Extract { file, weeks, days } => {
            let backend = backend(cli.backend_url.as_deref())?;
            extract_cmd::run_extract(&backend, &state_dir, &file, weeks, &days).await?;
        }
        Commands::Ideas => {
            show_cmd::run_ideas(&state_dir)?;
        }
        Commands::Finalize {
            platforms,
            posts_per_day,
        } => {
            let backend = backend(cli.backend_url.as_deref())?;
            finalize_cmd::run_finalize(&backend, &state_dir, &platforms, posts_per_day).await?;
        }
        Commands::Show { week } => {
            show_cmd::run_show(&state_dir, week)?;
        }
        Commands::Regenerate { command } => {
            let backend = backend(cli.backend_url.as_deref())?;
            regen_cmd::run_regenerate(backend, &state_dir, command).await?;
        }
        Commands::Rebuild => {
            let backend = backend(cli.backend_url.as_deref())?;
            rebuild_cmd::run_rebuild(&backend, &state_dir).await?;
        }
        Commands::Reset => {
            cmd_reset(&state_dir)?;
        }
        Commands::Agents { refresh } => {
            let backend = backend(cli.backend_url.as_deref())?;
            agents_cmd::run_agents(&backend, &state_dir, refresh).await?;
        }
        Commands::Connect { platform, off } => {
            agents_cmd::run_connect(&state_dir, &platform, off)?;
        }
        Commands::Connections => {
            agents_cmd::run_connections(&state_dir)?;
        }
        Commands::Export { output } => {
            export_cmd::run_export(&state_dir, output.as_deref())?;
        }
    }

    Ok(())
}
