//! Schedule outline: normalized extraction results.
//!
//! The extraction endpoint returns free text nested by week and day. The
//! outline flattens that into one main idea per week and one sub-topic
//! per (week, day), index-aligned with the plan weeks. Building an
//! outline never fails; missing text degrades to placeholders.

use cadence_backend::types::{TextBlock, WeekExtract};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Week main ideas plus per-day sub-topics for the whole schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleOutline {
    pub weeks: Vec<WeekOutline>,
}

/// One week's normalized ideas. `weeks[i]` corresponds to plan week
/// `i + 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekOutline {
    /// The backend's week label (e.g. `"week_1"`).
    pub label: String,
    pub main_idea: String,
    /// Days in the order the backend returned them, which is not
    /// necessarily the configured posting-day order. Consumers reconcile
    /// by name, case-insensitively.
    pub days: Vec<DayTopic>,
}

/// A day label and its sub-topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayTopic {
    pub day: String,
    pub topic: String,
}

/// Normalize an extraction payload into an outline.
///
/// Week order is the backend map order and defines the 1-based week
/// number downstream. Per week:
/// - main idea = the optional `week` title (empty counts as missing,
///   falling back to `Main Idea for {label}`), overridden by the first
///   line of the first day's first text block when that line is
///   non-empty;
/// - each day's sub-topic = its first block minus that block's first
///   line, lines joined with single spaces and trimmed, or
///   `No content for {day}` when nothing remains.
pub fn build_outline(content: &IndexMap<String, WeekExtract>) -> ScheduleOutline {
    let weeks = content
        .iter()
        .map(|(label, extract)| build_week(label, extract))
        .collect();
    ScheduleOutline { weeks }
}

fn build_week(label: &str, extract: &WeekExtract) -> WeekOutline {
    let mut main_idea = match &extract.week {
        Some(title) if !title.is_empty() => title.clone(),
        _ => format!("Main Idea for {label}"),
    };
    if let Some((_, blocks)) = extract.content_by_days.first() {
        if let Some(line) = first_line(blocks) {
            main_idea = line;
        }
    }
    let days = extract
        .content_by_days
        .iter()
        .map(|(day, blocks)| DayTopic {
            day: day.clone(),
            topic: day_topic(day, blocks),
        })
        .collect();
    WeekOutline {
        label: label.to_owned(),
        main_idea,
        days,
    }
}

/// First line of the first block, trimmed; `None` when empty.
fn first_line(blocks: &[TextBlock]) -> Option<String> {
    let text = &blocks.first()?.text;
    let line = text.split('\n').next().unwrap_or("").trim();
    if line.is_empty() {
        None
    } else {
        Some(line.to_owned())
    }
}

/// Everything after the first line of the first block, joined with
/// spaces. Line-internal whitespace is preserved; only the ends are
/// trimmed.
fn day_topic(day: &str, blocks: &[TextBlock]) -> String {
    let remainder = blocks
        .first()
        .map(|block| {
            block
                .text
                .split('\n')
                .skip(1)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default();
    let topic = remainder.trim();
    if topic.is_empty() {
        format!("No content for {day}")
    } else {
        topic.to_owned()
    }
}
