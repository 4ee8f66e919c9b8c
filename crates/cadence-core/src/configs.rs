//! Pipeline role configuration catalog.
//!
//! The backend runs one agent/task pair per pipeline role. This module
//! fetches the whole roster concurrently, pairs agents with their
//! tasks, and shelters the result behind the day-scoped cache so a
//! routine `agents` listing does not hammer the backend.

use cadence_backend::client::Backend;
use cadence_backend::types::{AgentConfig, TaskConfig};
use futures::future::join_all;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cache::ConfigCache;

/// Every role the generation pipeline runs, in display order. The
/// first seven mirror the publishing platforms; the rest are shared
/// research, review and regeneration stages.
pub const PIPELINE_ROLES: [&str; 12] = [
    "Instagram",
    "Facebook",
    "YouTube",
    "Twitter",
    "LinkedIn",
    "WordPress",
    "TikTok",
    "Script_Research",
    "QC",
    "Script_Rewriter",
    "Regenerate_Content",
    "Regenerate_Subcontent",
];

pub const AGENT_CONFIGS_KEY: &str = "agent_configs";
pub const TASK_CONFIGS_KEY: &str = "task_configs";

/// The roster's leading platform roles, the ones a connection flag
/// makes sense for.
pub fn platform_roles() -> &'static [&'static str] {
    &PIPELINE_ROLES[..7]
}

/// Agent persona plus task brief for one pipeline role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleConfig {
    pub agent: AgentConfig,
    pub task: TaskConfig,
}

/// All roles, keyed by roster name in roster order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigCatalog {
    pub roles: IndexMap<String, RoleConfig>,
}

/// Fetch the full catalog, honoring the day-scoped cache.
///
/// `refresh` bypasses the cache read; the result is written back
/// either way. A role whose fetch fails falls back to an empty config,
/// so one bad role never blanks the rest of the roster.
pub async fn fetch_all(backend: &dyn Backend, cache: &ConfigCache, refresh: bool) -> ConfigCatalog {
    if !refresh {
        let agents: Option<IndexMap<String, AgentConfig>> = cache.get(AGENT_CONFIGS_KEY);
        let tasks: Option<IndexMap<String, TaskConfig>> = cache.get(TASK_CONFIGS_KEY);
        if let (Some(agents), Some(tasks)) = (agents, tasks) {
            debug!("serving role configs from cache");
            return merge(agents, tasks);
        }
    }

    let agent_calls = PIPELINE_ROLES.into_iter().map(|role| async move {
        match backend.agent_config(&role.to_ascii_lowercase()).await {
            Ok(envelope) => envelope.current,
            Err(err) => {
                warn!(role, error = %err, "agent config unavailable, using defaults");
                AgentConfig::default()
            }
        }
    });
    let task_calls = PIPELINE_ROLES.into_iter().map(|role| async move {
        match backend.task_config(&role.to_ascii_lowercase()).await {
            Ok(envelope) => envelope.current,
            Err(err) => {
                warn!(role, error = %err, "task config unavailable, using defaults");
                TaskConfig::default()
            }
        }
    });
    let (agents, tasks) = tokio::join!(join_all(agent_calls), join_all(task_calls));

    let agents: IndexMap<String, AgentConfig> = PIPELINE_ROLES
        .into_iter()
        .map(str::to_string)
        .zip(agents)
        .collect();
    let tasks: IndexMap<String, TaskConfig> = PIPELINE_ROLES
        .into_iter()
        .map(str::to_string)
        .zip(tasks)
        .collect();

    cache.put(AGENT_CONFIGS_KEY, &agents);
    cache.put(TASK_CONFIGS_KEY, &tasks);

    merge(agents, tasks)
}

fn merge(
    agents: IndexMap<String, AgentConfig>,
    mut tasks: IndexMap<String, TaskConfig>,
) -> ConfigCatalog {
    let roles = agents
        .into_iter()
        .map(|(role, agent)| {
            let task = tasks.shift_remove(&role).unwrap_or_default();
            (role, RoleConfig { agent, task })
        })
        .collect();
    ConfigCatalog { roles }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roster_covers_platforms_and_stages() {
        assert_eq!(PIPELINE_ROLES.len(), 12);
        assert_eq!(PIPELINE_ROLES[0], "Instagram");
        assert_eq!(PIPELINE_ROLES[6], "TikTok");
        assert!(PIPELINE_ROLES.contains(&"Regenerate_Content"));
        assert!(PIPELINE_ROLES.contains(&"Regenerate_Subcontent"));
    }

    #[test]
    fn platform_roles_are_the_leading_seven() {
        let platforms = platform_roles();
        assert_eq!(platforms.len(), 7);
        assert_eq!(platforms.first(), Some(&"Instagram"));
        assert_eq!(platforms.last(), Some(&"TikTok"));
        assert!(!platforms.contains(&"QC"));
    }

    #[test]
    fn merge_pairs_by_role_in_agent_order() {
        let mut agents = IndexMap::new();
        agents.insert(
            "QC".to_string(),
            AgentConfig {
                role: "reviewer".to_string(),
                ..Default::default()
            },
        );
        agents.insert("TikTok".to_string(), AgentConfig::default());
        let mut tasks = IndexMap::new();
        tasks.insert(
            "TikTok".to_string(),
            TaskConfig {
                description: "short video".to_string(),
                ..Default::default()
            },
        );

        let catalog = merge(agents, tasks);

        let names: Vec<&str> = catalog.roles.keys().map(String::as_str).collect();
        assert_eq!(names, ["QC", "TikTok"]);
        assert_eq!(catalog.roles["QC"].agent.role, "reviewer");
        assert_eq!(
            catalog.roles["QC"].task,
            TaskConfig::default(),
            "role without a task brief should fall back to empty"
        );
        assert_eq!(catalog.roles["TikTok"].task.description, "short video");
    }
}
