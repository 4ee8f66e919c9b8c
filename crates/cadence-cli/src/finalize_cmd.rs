//! The `cadence finalize` command: pick platforms, run generation, and
//! materialize the full plan.

use std::path::Path;

use anyhow::{Context, Result, bail};

use cadence_backend::HttpBackend;
use cadence_backend::client::Backend;
use cadence_backend::types::GenerateResponse;
use cadence_core::plan::{Plan, materialize};

use crate::session::Session;

pub async fn run_finalize(
    backend: &HttpBackend,
    state_dir: &Path,
    platforms_arg: &str,
    posts_per_day: u32,
) -> Result<()> {
    let mut session = Session::load_from(state_dir)?;
    let outline = session
        .outline
        .clone()
        .context("the session has no outline; run `cadence extract` first")?;

    // 1. Complete the settings and validate the whole schedule.
    session.platforms = crate::parse_list(platforms_arg);
    session.posts_per_day = posts_per_day;
    let settings = session.settings()?;

    // 2. Re-read the source document; generation uploads it again.
    let source = session
        .source_file
        .clone()
        .context("the session has no source document recorded")?;
    let bytes = std::fs::read(&source)
        .with_context(|| format!("failed to re-read source document {}", source.display()))?;
    let file_name = session
        .source_name()
        .unwrap_or_else(|| "document".to_string());

    println!(
        "Generating posts for {} week(s) x {} day(s) x {} platform(s), {} per day...",
        settings.weeks,
        settings.days.len(),
        settings.platforms.len(),
        settings.posts_per_day
    );

    // 3. Run generation on the backend.
    let response = backend
        .generate_custom_scripts(
            &file_name,
            bytes,
            settings.weeks,
            &settings.days,
            &settings.platform_posts(),
        )
        .await
        .context("generation request failed")?;
    let results = match response {
        GenerateResponse::Success { results } => results,
        GenerateResponse::Error { message } => bail!(
            "backend rejected the generation: {}",
            message.as_deref().unwrap_or("no details")
        ),
    };

    // 4. Materialize and persist.
    let plan = materialize(&settings, &outline, &results);
    let placed = placed_posts(&plan);
    session.plan = Some(plan);
    session.save_to(state_dir)?;

    println!("Plan materialized: {placed} generated post(s) placed.");
    println!("Run `cadence show` to view it.");

    Ok(())
}

/// Count slots that received post text.
fn placed_posts(plan: &Plan) -> usize {
    plan.weeks
        .iter()
        .flat_map(|week| &week.days)
        .flat_map(|day| &day.tracks)
        .flat_map(|track| &track.slots)
        .filter(|slot| !slot.content.is_empty())
        .count()
}
