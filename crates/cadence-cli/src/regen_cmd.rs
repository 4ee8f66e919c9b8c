//! The `cadence regenerate` commands: scoped regeneration of one plan
//! field through the single-writer plan store.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use cadence_backend::HttpBackend;
use cadence_core::regen::{PlanStore, RegenTarget, Regenerator};

use crate::RegenCommands;
use crate::session::Session;
use crate::show_cmd::preview;

/// Dispatch a `cadence regenerate ...` subcommand: spin a store up
/// around the session plan, run the one regeneration, persist the
/// refreshed plan.
pub async fn run_regenerate(
    backend: HttpBackend,
    state_dir: &Path,
    command: RegenCommands,
) -> Result<()> {
    let mut session = Session::load_from(state_dir)?;
    let plan = session
        .plan
        .clone()
        .context("the session has no plan; run `cadence finalize` first")?;

    let (target, instruction) = match command {
        RegenCommands::Main { week, instruction } => (RegenTarget::Main { week }, instruction),
        RegenCommands::Sub {
            week,
            day,
            instruction,
        } => (RegenTarget::Sub { week, day }, instruction),
        RegenCommands::Post {
            week,
            day,
            platform,
            slot,
            instruction,
        } => (
            RegenTarget::Post {
                week,
                day,
                platform,
                slot,
            },
            instruction,
        ),
        RegenCommands::Image {
            week,
            day,
            platform,
            slot,
            instruction,
        } => (
            RegenTarget::Image {
                week,
                day,
                platform,
                slot,
            },
            instruction,
        ),
    };

    println!("Regenerating {target}...");

    // The store owns the plan while the backend call is in flight; the
    // CLI runs exactly one regeneration, so staleness cannot bite here.
    let store = PlanStore::spawn(plan);
    let handle = store.handle();
    let regenerator = Regenerator::new(Arc::new(backend), handle.clone());

    let result = regenerator.regenerate(&target, instruction.as_deref()).await;
    let snapshot = handle.snapshot().await;
    store.shutdown().await;

    let outcome = result.with_context(|| format!("failed to regenerate {target}"))?;
    session.plan = Some(snapshot.context("plan store stopped before the snapshot")?);
    session.save_to(state_dir)?;

    println!("Regenerated {}.", outcome.target);
    if outcome.value.is_empty() {
        println!("  (cleared)");
    } else {
        println!("  {}", preview(&outcome.value, 100));
    }

    Ok(())
}
