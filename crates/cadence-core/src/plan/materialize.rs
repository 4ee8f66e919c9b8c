//! Materialize flat generation results into the plan geometry.
//!
//! The backend returns, per platform, a flat list of posts labeled
//! `"Week {n} - {day}"` in arrival order. Assignment is one canonical
//! parse pass: within a platform, the k-th arrival for a given (week,
//! day) fills slot k of that track. Labels that do not parse, address
//! geometry the plan does not have, or overflow the slot list are
//! skipped with a warning. Materialization itself never fails and never
//! changes geometry.

use std::collections::HashMap;

use cadence_backend::types::GeneratedPost;
use tracing::warn;

use super::model::{Plan, PlanSettings};
use super::outline::ScheduleOutline;

/// Build a fully pre-allocated plan, copy the outline into it, and fill
/// slots from `results`.
///
/// Outline weeks map to plan weeks by position; outline days are
/// reconciled against configured days by name, case-insensitively.
/// Idempotent: the same inputs always produce the same plan.
pub fn materialize(
    settings: &PlanSettings,
    outline: &ScheduleOutline,
    results: &HashMap<String, Vec<GeneratedPost>>,
) -> Plan {
    let mut plan = Plan::new(settings);
    apply_outline(&mut plan, outline);
    apply_generation(&mut plan, results);
    plan
}

/// The outline-application pass alone: copy main ideas and sub-topics
/// onto an existing plan without touching slots. Used when generation
/// results are unavailable but fresher ideas are.
pub fn apply_outline(plan: &mut Plan, outline: &ScheduleOutline) {
    for (week, ideas) in plan.weeks.iter_mut().zip(&outline.weeks) {
        week.main_idea = ideas.main_idea.clone();
        for day in week.days.iter_mut() {
            let topic = ideas
                .days
                .iter()
                .find(|t| t.day.trim().eq_ignore_ascii_case(&day.day));
            if let Some(topic) = topic {
                day.sub_topic = topic.topic.clone();
            }
        }
    }
}

/// The slot-assignment pass alone, so full materialization, partial
/// refresh, and re-application share one code path. Safe to re-apply:
/// the same response writes the same values to the same slots.
pub fn apply_generation(plan: &mut Plan, results: &HashMap<String, Vec<GeneratedPost>>) {
    for (platform, posts) in results {
        // Arrival counter per (week, day) within this platform's list.
        let mut next_slot: HashMap<(u32, String), usize> = HashMap::new();
        for post in posts {
            let Some((week, day)) = parse_week_day(&post.week_day) else {
                warn!(label = %post.week_day, "skipping post with malformed week_day label");
                continue;
            };
            let index = *next_slot
                .entry((week, day.to_ascii_lowercase()))
                .and_modify(|i| *i += 1)
                .or_insert(0);
            let Some(track) = plan.track_mut(week, day, platform) else {
                warn!(week, day, platform = %platform, "skipping post outside the plan geometry");
                continue;
            };
            let Some(slot) = track.slots.get_mut(index) else {
                warn!(week, day, platform = %platform, index, "dropping overflow post");
                continue;
            };
            slot.content = post.content.clone();
            slot.image_url = post.image.clone().filter(|url| !url.is_empty());
        }
    }
}

/// Parse a `"Week {n} - {day}"` label. Splits on the first `" - "`;
/// the day part keeps any further separators.
fn parse_week_day(label: &str) -> Option<(u32, &str)> {
    let (week_part, day_part) = label.split_once(" - ")?;
    let number = week_part.trim().strip_prefix("Week ")?.trim().parse().ok()?;
    let day = day_part.trim();
    if day.is_empty() {
        return None;
    }
    Some((number, day))
}
