//! The `cadence rebuild` command: re-run extraction and generation from
//! the stored source document.

use std::path::Path;

use anyhow::{Context, Result, bail};

use cadence_backend::HttpBackend;
use cadence_core::plan::{apply_outline, build_outline, materialize};
use cadence_core::refresh::refresh_all;

use crate::session::Session;

/// Both pipelines run in parallel and each side degrades on its own: a
/// failed extraction keeps the current outline, a failed generation
/// keeps the current posts and only refreshes the ideas on top.
pub async fn run_rebuild(backend: &HttpBackend, state_dir: &Path) -> Result<()> {
    let mut session = Session::load_from(state_dir)?;
    let settings = session
        .settings()
        .context("the session has no platforms yet; run `cadence finalize` once first")?;
    let source = session
        .source_file
        .clone()
        .context("the session has no source document recorded")?;
    let file_name = session
        .source_name()
        .unwrap_or_else(|| "document".to_string());
    let bytes = std::fs::read(&source)
        .with_context(|| format!("failed to re-read source document {}", source.display()))?;

    println!("Rebuilding from {file_name}...");

    let outcome = refresh_all(backend, &file_name, &bytes, &settings).await;
    if outcome.extraction.is_none() && outcome.generation.is_none() {
        bail!("rebuild failed on both pipelines; the session is unchanged");
    }

    match outcome.extraction {
        Some(content) => {
            session.outline = Some(build_outline(&content));
            println!("  extraction: refreshed");
        }
        None => println!("  extraction: failed, keeping the current outline"),
    }
    let outline = session.outline.clone().unwrap_or_default();

    match outcome.generation {
        Some(results) => {
            session.plan = Some(materialize(&settings, &outline, &results));
            println!("  generation: refreshed");
        }
        None => {
            // Keep the posts we already have; only the ideas move.
            if let Some(plan) = session.plan.as_mut() {
                apply_outline(plan, &outline);
            }
            println!("  generation: failed, keeping the current posts");
        }
    }

    session.save_to(state_dir)?;
    println!("Session saved. Run `cadence show` to view the plan.");

    Ok(())
}
