//! Addressing one regenerable piece of a plan.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::plan::model::Plan;

/// Selector for exactly one regenerable field.
///
/// `Post` and `Image` address the same slot and differ in which field a
/// write lands on: the post text or the image URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegenTarget {
    /// A week's main idea.
    Main { week: u32 },
    /// A day's sub-topic.
    Sub { week: u32, day: String },
    /// One slot's post text.
    Post {
        week: u32,
        day: String,
        platform: String,
        slot: u32,
    },
    /// One slot's image.
    Image {
        week: u32,
        day: String,
        platform: String,
        slot: u32,
    },
}

impl RegenTarget {
    /// The current text a regeneration of this target starts from.
    /// For `Image` that is the slot's post text, since the image
    /// illustrates the post. `None` when the target does not exist in
    /// the plan's geometry.
    pub fn seed<'a>(&self, plan: &'a Plan) -> Option<&'a str> {
        match self {
            Self::Main { week } => plan.week(*week).map(|w| w.main_idea.as_str()),
            Self::Sub { week, day } => plan.day(*week, day).map(|d| d.sub_topic.as_str()),
            Self::Post {
                week,
                day,
                platform,
                slot,
            }
            | Self::Image {
                week,
                day,
                platform,
                slot,
            } => plan
                .slot(*week, day, platform, *slot)
                .map(|s| s.content.as_str()),
        }
    }

    /// Write a cleaned value into the addressed field, touching nothing
    /// else. An empty `Image` value clears the URL. Returns `false`
    /// when the target does not exist.
    pub fn write(&self, plan: &mut Plan, value: String) -> bool {
        match self {
            Self::Main { week } => {
                let Some(week) = plan.week_mut(*week) else {
                    return false;
                };
                week.main_idea = value;
            }
            Self::Sub { week, day } => {
                let Some(day) = plan.day_mut(*week, day) else {
                    return false;
                };
                day.sub_topic = value;
            }
            Self::Post {
                week,
                day,
                platform,
                slot,
            } => {
                let Some(slot) = plan.slot_mut(*week, day, platform, *slot) else {
                    return false;
                };
                slot.content = value;
            }
            Self::Image {
                week,
                day,
                platform,
                slot,
            } => {
                let Some(slot) = plan.slot_mut(*week, day, platform, *slot) else {
                    return false;
                };
                slot.image_url = if value.is_empty() { None } else { Some(value) };
            }
        }
        true
    }
}

impl fmt::Display for RegenTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Main { week } => write!(f, "week {week} main idea"),
            Self::Sub { week, day } => write!(f, "week {week} / {day} sub-topic"),
            Self::Post {
                week,
                day,
                platform,
                slot,
            } => write!(f, "week {week} / {day} / {platform} / slot {slot}"),
            Self::Image {
                week,
                day,
                platform,
                slot,
            } => write!(f, "week {week} / {day} / {platform} / slot {slot} image"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::model::PlanSettings;

    fn plan() -> Plan {
        Plan::new(&PlanSettings {
            weeks: 2,
            days: vec!["Monday".to_owned(), "Friday".to_owned()],
            platforms: vec!["instagram".to_owned()],
            posts_per_day: 2,
        })
    }

    #[test]
    fn display_forms() {
        let post = RegenTarget::Post {
            week: 2,
            day: "Friday".to_owned(),
            platform: "instagram".to_owned(),
            slot: 1,
        };
        assert_eq!(post.to_string(), "week 2 / Friday / instagram / slot 1");
        assert_eq!(
            RegenTarget::Main { week: 2 }.to_string(),
            "week 2 main idea"
        );
        assert_eq!(
            RegenTarget::Sub {
                week: 1,
                day: "Monday".to_owned()
            }
            .to_string(),
            "week 1 / Monday sub-topic"
        );
    }

    #[test]
    fn write_then_seed_round_trips() {
        let mut plan = plan();
        let target = RegenTarget::Sub {
            week: 1,
            day: "friday".to_owned(),
        };
        assert!(target.write(&mut plan, "Cold brew day".to_owned()));
        assert_eq!(target.seed(&plan), Some("Cold brew day"));
    }

    #[test]
    fn image_seed_is_the_post_text() {
        let mut plan = plan();
        let post = RegenTarget::Post {
            week: 1,
            day: "Monday".to_owned(),
            platform: "instagram".to_owned(),
            slot: 0,
        };
        let image = RegenTarget::Image {
            week: 1,
            day: "Monday".to_owned(),
            platform: "instagram".to_owned(),
            slot: 0,
        };
        assert!(post.write(&mut plan, "the post".to_owned()));
        assert_eq!(image.seed(&plan), Some("the post"));
    }

    #[test]
    fn empty_image_value_clears_the_url() {
        let mut plan = plan();
        let image = RegenTarget::Image {
            week: 1,
            day: "Monday".to_owned(),
            platform: "instagram".to_owned(),
            slot: 0,
        };
        assert!(image.write(&mut plan, "https://img.example/a.png".to_owned()));
        assert!(
            plan.slot(1, "Monday", "instagram", 0)
                .expect("slot")
                .image_url
                .is_some()
        );
        assert!(image.write(&mut plan, String::new()));
        assert!(
            plan.slot(1, "Monday", "instagram", 0)
                .expect("slot")
                .image_url
                .is_none()
        );
    }

    #[test]
    fn unknown_targets_neither_seed_nor_write() {
        let mut plan = plan();
        let target = RegenTarget::Main { week: 9 };
        assert!(target.seed(&plan).is_none());
        assert!(!target.write(&mut plan, "lost".to_owned()));
        let target = RegenTarget::Post {
            week: 1,
            day: "Monday".to_owned(),
            platform: "instagram".to_owned(),
            slot: 7,
        };
        assert!(target.seed(&plan).is_none());
        assert!(!target.write(&mut plan, "lost".to_owned()));
    }
}
