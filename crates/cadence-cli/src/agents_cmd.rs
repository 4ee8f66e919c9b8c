//! The `cadence agents`, `connect`, and `connections` commands: the
//! pipeline role catalog and the platform connection flags.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use cadence_backend::HttpBackend;
use cadence_core::cache::{ConfigCache, FileStore, flags};
use cadence_core::configs::{self, PIPELINE_ROLES};

use crate::show_cmd::preview;

/// The kv store lives next to the session file.
fn file_store(state_dir: &Path) -> FileStore {
    FileStore::new(state_dir.join("cache"))
}

/// Execute `cadence agents`: list every pipeline role with its agent
/// persona and task brief.
pub async fn run_agents(backend: &HttpBackend, state_dir: &Path, refresh: bool) -> Result<()> {
    let cache = ConfigCache::new(Arc::new(file_store(state_dir)));
    let catalog = configs::fetch_all(backend, &cache, refresh).await;

    let role_w = PIPELINE_ROLES
        .iter()
        .map(|role| role.len())
        .max()
        .unwrap_or(4);

    println!("{:<role_w$}  {:<38}  {}", "ROLE", "AGENT", "TASK");
    println!("{}", "-".repeat(role_w + 2 + 38 + 2 + 50));
    for (name, role) in &catalog.roles {
        let agent = if role.agent.role.is_empty() {
            "(not configured)".to_string()
        } else {
            preview(&role.agent.role, 38)
        };
        let task = preview(&role.task.description, 50);
        println!("{name:<role_w$}  {agent:<38}  {task}");
    }

    Ok(())
}

/// Execute `cadence connect PLATFORM [--off]`.
pub fn run_connect(state_dir: &Path, platform: &str, off: bool) -> Result<()> {
    let store = file_store(state_dir);
    flags::set_connected(&store, platform, !off);

    println!(
        "{} marked as {}.",
        platform,
        if off { "disconnected" } else { "connected" }
    );
    Ok(())
}

/// Execute `cadence connections`: one line per publishing platform.
pub fn run_connections(state_dir: &Path) -> Result<()> {
    let store = file_store(state_dir);

    println!("Platform connections:");
    for platform in configs::platform_roles() {
        let mark = if flags::is_connected(&store, platform) {
            "on"
        } else {
            "off"
        };
        println!("  {platform:<10} {mark}");
    }
    Ok(())
}
