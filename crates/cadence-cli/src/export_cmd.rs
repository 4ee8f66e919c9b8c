//! The `cadence export` command: the materialized plan as JSON.

use std::path::Path;

use anyhow::{Context, Result};

use crate::session::Session;

pub fn run_export(state_dir: &Path, output: Option<&Path>) -> Result<()> {
    let session = Session::load_from(state_dir)?;
    let plan = session
        .plan
        .as_ref()
        .context("the session has no plan; run `cadence finalize` first")?;

    let json = serde_json::to_string_pretty(plan).context("failed to serialize the plan")?;

    match output {
        Some(path) => {
            std::fs::write(path, &json)
                .with_context(|| format!("cannot write output file {}", path.display()))?;
            println!("Plan exported to {}", path.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}
