//! Plan geometry: the materialized calendar and its addressing.
//!
//! A [`Plan`] is fully pre-allocated from [`PlanSettings`]: every week,
//! every configured day, every platform track, every slot exists from the
//! start, filled or empty. Geometry is fixed after pre-allocation; only
//! field values mutate. Day and platform lookup is ASCII
//! case-insensitive, week lookup is by 1-based number.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Operator-chosen schedule shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSettings {
    /// Number of weeks, 1-based downstream.
    pub weeks: u32,
    /// Posting weekdays in display order.
    pub days: Vec<String>,
    /// Target platforms in display order.
    pub platforms: Vec<String>,
    /// Slots per platform per day, shared by every platform.
    pub posts_per_day: u32,
}

/// Validation failure for [`PlanSettings`].
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("week count must be at least 1")]
    ZeroWeeks,
    #[error("posts per day must be at least 1")]
    ZeroPosts,
    #[error("at least one posting day is required")]
    NoDays,
    #[error("at least one platform is required")]
    NoPlatforms,
    #[error("duplicate day {0:?} (day names are case-insensitive)")]
    DuplicateDay(String),
    #[error("duplicate platform {0:?} (platform names are case-insensitive)")]
    DuplicatePlatform(String),
}

impl PlanSettings {
    /// Check counts are positive and name lists are non-empty and free
    /// of case-insensitive duplicates.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.weeks == 0 {
            return Err(SettingsError::ZeroWeeks);
        }
        if self.posts_per_day == 0 {
            return Err(SettingsError::ZeroPosts);
        }
        if self.days.is_empty() {
            return Err(SettingsError::NoDays);
        }
        if self.platforms.is_empty() {
            return Err(SettingsError::NoPlatforms);
        }
        let mut seen = HashSet::new();
        for day in &self.days {
            if !seen.insert(day.to_ascii_lowercase()) {
                return Err(SettingsError::DuplicateDay(day.clone()));
            }
        }
        seen.clear();
        for platform in &self.platforms {
            if !seen.insert(platform.to_ascii_lowercase()) {
                return Err(SettingsError::DuplicatePlatform(platform.clone()));
            }
        }
        Ok(())
    }

    /// Per-platform post counts in the wire's pair form.
    pub fn platform_posts(&self) -> Vec<(String, u32)> {
        self.platforms
            .iter()
            .map(|platform| (platform.clone(), self.posts_per_day))
            .collect()
    }
}

/// Display time for the slot at `index`: 3-hour spacing from 09:00
/// (`"9:00"`, `"12:00"`, `"15:00"`, ...). The formula is the contract;
/// indexes past 4 walk beyond 23:00 uncapped.
pub fn slot_time(index: u32) -> String {
    format!("{}:00", 9 + 3 * index)
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// The materialized calendar for one source document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub weeks: Vec<Week>,
}

/// One calendar week, numbered from 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Week {
    pub number: u32,
    pub main_idea: String,
    pub days: Vec<DaySchedule>,
}

/// One posting day within a week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySchedule {
    pub day: String,
    pub sub_topic: String,
    pub tracks: Vec<PlatformTrack>,
}

/// One platform's fixed-length slot list for a day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformTrack {
    pub platform: String,
    pub slots: Vec<Slot>,
}

/// One scheduled post instance. Its position in the track is its stable
/// identity: regeneration replaces `content` / `image_url` in place and
/// never moves or resizes slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub index: u32,
    pub time: String,
    pub content: String,
    pub image_url: Option<String>,
}

impl Slot {
    fn empty(index: u32) -> Self {
        Self {
            index,
            time: slot_time(index),
            content: String::new(),
            image_url: None,
        }
    }
}

impl Plan {
    /// Pre-allocate the full geometry with empty content.
    pub fn new(settings: &PlanSettings) -> Self {
        let weeks = (1..=settings.weeks)
            .map(|number| Week {
                number,
                main_idea: String::new(),
                days: settings
                    .days
                    .iter()
                    .map(|day| DaySchedule {
                        day: day.clone(),
                        sub_topic: String::new(),
                        tracks: settings
                            .platforms
                            .iter()
                            .map(|platform| PlatformTrack {
                                platform: platform.clone(),
                                slots: (0..settings.posts_per_day).map(Slot::empty).collect(),
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect();
        Self { weeks }
    }

    pub fn week(&self, number: u32) -> Option<&Week> {
        self.weeks.iter().find(|week| week.number == number)
    }

    pub fn week_mut(&mut self, number: u32) -> Option<&mut Week> {
        self.weeks.iter_mut().find(|week| week.number == number)
    }

    pub fn day(&self, week: u32, day: &str) -> Option<&DaySchedule> {
        self.week(week)?.day(day)
    }

    pub fn day_mut(&mut self, week: u32, day: &str) -> Option<&mut DaySchedule> {
        self.week_mut(week)?.day_mut(day)
    }

    pub fn track(&self, week: u32, day: &str, platform: &str) -> Option<&PlatformTrack> {
        self.day(week, day)?.track(platform)
    }

    pub fn track_mut(&mut self, week: u32, day: &str, platform: &str) -> Option<&mut PlatformTrack> {
        self.day_mut(week, day)?.track_mut(platform)
    }

    pub fn slot(&self, week: u32, day: &str, platform: &str, index: u32) -> Option<&Slot> {
        self.track(week, day, platform)?.slots.get(index as usize)
    }

    pub fn slot_mut(&mut self, week: u32, day: &str, platform: &str, index: u32) -> Option<&mut Slot> {
        self.track_mut(week, day, platform)?.slots.get_mut(index as usize)
    }
}

impl Week {
    /// Look a day up by name, case-insensitively, trimming the query.
    pub fn day(&self, name: &str) -> Option<&DaySchedule> {
        let name = name.trim();
        self.days.iter().find(|d| d.day.eq_ignore_ascii_case(name))
    }

    pub fn day_mut(&mut self, name: &str) -> Option<&mut DaySchedule> {
        let name = name.trim();
        self.days.iter_mut().find(|d| d.day.eq_ignore_ascii_case(name))
    }
}

impl DaySchedule {
    /// Look a track up by platform name, case-insensitively.
    pub fn track(&self, platform: &str) -> Option<&PlatformTrack> {
        let platform = platform.trim();
        self.tracks.iter().find(|t| t.platform.eq_ignore_ascii_case(platform))
    }

    pub fn track_mut(&mut self, platform: &str) -> Option<&mut PlatformTrack> {
        let platform = platform.trim();
        self.tracks.iter_mut().find(|t| t.platform.eq_ignore_ascii_case(platform))
    }
}
