//! The `cadence extract` command: upload a document, extract the
//! weekly outline, start a session.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result, bail};

use cadence_backend::HttpBackend;
use cadence_backend::client::Backend;
use cadence_backend::types::ExtractResponse;
use cadence_core::plan::build_outline;

use crate::session::Session;
use crate::show_cmd;

pub async fn run_extract(
    backend: &HttpBackend,
    state_dir: &Path,
    file: &Path,
    weeks: u32,
    days_arg: &str,
) -> Result<()> {
    // 1. Validate the schedule arguments before any upload.
    if weeks == 0 {
        bail!("--weeks must be at least 1");
    }
    let days = crate::parse_list(days_arg);
    if days.is_empty() {
        bail!("--days must name at least one posting day");
    }
    let mut seen = HashSet::new();
    for day in &days {
        if !seen.insert(day.to_ascii_lowercase()) {
            bail!("duplicate day {day:?} (day names are case-insensitive)");
        }
    }

    // 2. Read the source document.
    let bytes = std::fs::read(file)
        .with_context(|| format!("failed to read source document {}", file.display()))?;
    let file_name = file
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "document".to_string());

    println!(
        "Extracting {} ({} week(s), days: {})...",
        file_name,
        weeks,
        days.join(", ")
    );

    // 3. Run extraction on the backend.
    let response = backend
        .extract_content(&file_name, bytes, weeks, &days)
        .await
        .context("extraction request failed")?;
    let content = match response {
        ExtractResponse::Success { content, .. } => content,
        ExtractResponse::Error { message } => bail!(
            "backend rejected the extraction: {}",
            message.as_deref().unwrap_or("no details")
        ),
    };

    // 4. Normalize into an outline and start a fresh session.
    let outline = build_outline(&content);
    let mut session = Session::new(file.to_path_buf(), weeks, days);
    session.outline = Some(outline);
    session.save_to(state_dir)?;

    println!("Session {} started.", session.id);
    println!();
    if let Some(outline) = &session.outline {
        show_cmd::print_outline(outline);
    }
    println!();
    println!("Next: `cadence finalize --platforms ...` to generate the posts.");

    Ok(())
}
