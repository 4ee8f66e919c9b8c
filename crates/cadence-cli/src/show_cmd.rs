//! The `cadence ideas` and `cadence show` commands: print the outline
//! and the materialized plan.

use std::path::Path;

use anyhow::{Context, Result};

use cadence_core::plan::{ScheduleOutline, Week};

use crate::session::Session;

/// Execute `cadence ideas`: print main ideas and sub-topics.
pub fn run_ideas(state_dir: &Path) -> Result<()> {
    let session = Session::load_from(state_dir)?;
    let outline = session
        .outline
        .as_ref()
        .context("the session has no outline; run `cadence extract` first")?;
    print_outline(outline);
    Ok(())
}

pub fn print_outline(outline: &ScheduleOutline) {
    println!("Outline: {} week(s)", outline.weeks.len());
    for (i, week) in outline.weeks.iter().enumerate() {
        println!();
        println!("Week {}: {}", i + 1, week.main_idea);
        for day in &week.days {
            println!("  {:<10} {}", day.day, day.topic);
        }
    }
}

/// Execute `cadence show`: print the plan, optionally one week of it.
pub fn run_show(state_dir: &Path, week: Option<u32>) -> Result<()> {
    let session = Session::load_from(state_dir)?;
    let plan = session
        .plan
        .as_ref()
        .context("the session has no plan; run `cadence finalize` first")?;

    match week {
        Some(number) => {
            let week = plan
                .week(number)
                .with_context(|| format!("the plan has no week {number}"))?;
            print_week(week);
        }
        None => {
            println!("Plan: {} week(s)", plan.weeks.len());
            for week in &plan.weeks {
                println!();
                print_week(week);
            }
        }
    }

    Ok(())
}

fn print_week(week: &Week) {
    println!("Week {}: {}", week.number, week.main_idea);
    for day in &week.days {
        println!("  {} -- {}", day.day, day.sub_topic);
        for track in &day.tracks {
            println!("    {}:", track.platform);
            for slot in &track.slots {
                let content = if slot.content.is_empty() {
                    "(empty)".to_string()
                } else {
                    preview(&slot.content, 70)
                };
                let image = if slot.image_url.is_some() {
                    "  [image]"
                } else {
                    ""
                };
                println!("      [{}] {:<6} {}{}", slot.index, slot.time, content, image);
            }
        }
    }
}

/// First line of `text`, truncated to `max` characters with an ellipsis.
pub(crate) fn preview(text: &str, max: usize) -> String {
    let line = text.lines().next().unwrap_or("").trim();
    let mut out: String = line.chars().take(max).collect();
    if line.chars().count() > max {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_keeps_short_text_intact() {
        assert_eq!(preview("a short post", 70), "a short post");
    }

    #[test]
    fn preview_truncates_and_marks_long_text() {
        let long = "x".repeat(90);
        let shown = preview(&long, 70);
        assert_eq!(shown.chars().count(), 73);
        assert!(shown.ends_with("..."));
    }

    #[test]
    fn preview_uses_only_the_first_line() {
        assert_eq!(preview("headline\nbody body body", 70), "headline");
    }
}
