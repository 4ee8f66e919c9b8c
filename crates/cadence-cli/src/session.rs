//! The on-disk session: one JSON file holding the operator's settings,
//! the extracted outline, and the materialized plan.
//!
//! `extract` starts a session, `finalize` completes it, and every later
//! command loads, mutates, and saves it. One session per state
//! directory; starting a new extraction replaces the old session.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cadence_core::plan::{Plan, PlanSettings, ScheduleOutline};

pub const SESSION_FILE: &str = "session.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// The uploaded source document. `finalize` and `rebuild` read it
    /// again, so it has to stay where it was.
    pub source_file: Option<PathBuf>,
    pub weeks: u32,
    pub days: Vec<String>,
    /// Empty until `finalize` picks the platforms.
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(default)]
    pub posts_per_day: u32,
    #[serde(default)]
    pub outline: Option<ScheduleOutline>,
    #[serde(default)]
    pub plan: Option<Plan>,
}

impl Session {
    pub fn new(source_file: PathBuf, weeks: u32, days: Vec<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            source_file: Some(source_file),
            weeks,
            days,
            platforms: Vec::new(),
            posts_per_day: 0,
            outline: None,
            plan: None,
        }
    }

    /// The full plan settings. Fails until `finalize` has run once,
    /// since the platforms are not chosen before that.
    pub fn settings(&self) -> Result<PlanSettings> {
        let settings = PlanSettings {
            weeks: self.weeks,
            days: self.days.clone(),
            platforms: self.platforms.clone(),
            posts_per_day: self.posts_per_day,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// The bare file name of the source document, as sent to the backend.
    pub fn source_name(&self) -> Option<String> {
        self.source_file
            .as_ref()
            .and_then(|path| path.file_name())
            .map(|name| name.to_string_lossy().to_string())
    }

    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join(SESSION_FILE)
    }

    /// Load the session from the state directory.
    pub fn load_from(dir: &Path) -> Result<Self> {
        let path = Self::path_in(dir);
        let contents = std::fs::read_to_string(&path).with_context(|| {
            format!(
                "no session at {} (run `cadence extract` first)",
                path.display()
            )
        })?;
        let session = serde_json::from_str(&contents)
            .with_context(|| format!("session file {} is corrupt", path.display()))?;
        Ok(session)
    }

    /// Write the session, bumping `updated_at`.
    pub fn save_to(&mut self, dir: &Path) -> Result<()> {
        self.updated_at = Utc::now();
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create state directory {}", dir.display()))?;

        let path = Self::path_in(dir);
        let contents = serde_json::to_string_pretty(self).context("failed to serialize session")?;
        std::fs::write(&path, contents)
            .with_context(|| format!("failed to write session file at {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Session {
        Session::new(
            PathBuf::from("/docs/strategy.pdf"),
            2,
            vec!["Monday".to_string(), "Thursday".to_string()],
        )
    }

    #[test]
    fn save_and_load_roundtrip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut session = sample();
        session.platforms = vec!["Instagram".to_string()];
        session.posts_per_day = 2;

        session.save_to(tmp.path()).unwrap();
        let loaded = Session::load_from(tmp.path()).unwrap();

        assert_eq!(loaded.id, session.id);
        assert_eq!(loaded.weeks, 2);
        assert_eq!(loaded.days, session.days);
        assert_eq!(loaded.platforms, session.platforms);
        assert_eq!(loaded.source_name().as_deref(), Some("strategy.pdf"));
        assert!(loaded.updated_at >= loaded.created_at);
    }

    #[test]
    fn load_without_a_session_names_the_fix() {
        let tmp = tempfile::TempDir::new().unwrap();
        let err = Session::load_from(tmp.path()).unwrap_err();
        assert!(
            err.to_string().contains("cadence extract"),
            "unexpected error: {err:#}"
        );
    }

    #[test]
    fn settings_requires_platforms() {
        let mut session = sample();
        assert!(session.settings().is_err(), "no platforms chosen yet");

        session.platforms = vec!["LinkedIn".to_string()];
        session.posts_per_day = 1;
        let settings = session.settings().unwrap();
        assert_eq!(settings.weeks, 2);
        assert_eq!(settings.platform_posts(), [("LinkedIn".to_string(), 1)]);
    }
}
