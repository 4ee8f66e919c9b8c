//! Full-plan refresh from the stored source document.
//!
//! Rebuilding runs the extraction and generation pipelines again, in
//! parallel, and hands back whatever succeeded. Each side degrades
//! independently: a failed extraction does not discard freshly
//! generated posts, and vice versa.

use std::collections::HashMap;

use cadence_backend::client::Backend;
use cadence_backend::types::{ExtractResponse, GenerateResponse, GeneratedPost, WeekExtract};
use indexmap::IndexMap;
use tracing::warn;

use crate::plan::PlanSettings;

/// What the two pipelines produced. A `None` side means that pipeline
/// failed and the caller should keep what it already has.
#[derive(Debug, Default)]
pub struct RefreshOutcome {
    pub extraction: Option<IndexMap<String, WeekExtract>>,
    pub generation: Option<HashMap<String, Vec<GeneratedPost>>>,
}

/// Re-run extraction and generation against the same source document.
pub async fn refresh_all(
    backend: &dyn Backend,
    file_name: &str,
    file_bytes: &[u8],
    settings: &PlanSettings,
) -> RefreshOutcome {
    let extract = async {
        let outcome = backend
            .extract_content(file_name, file_bytes.to_vec(), settings.weeks, &settings.days)
            .await;
        match outcome {
            Ok(ExtractResponse::Success { content, .. }) => Some(content),
            Ok(ExtractResponse::Error { message }) => {
                warn!(
                    message = message.as_deref().unwrap_or("no details"),
                    "extraction refresh rejected"
                );
                None
            }
            Err(err) => {
                warn!(error = %err, "extraction refresh failed");
                None
            }
        }
    };

    let platform_posts = settings.platform_posts();
    let generate = async {
        let outcome = backend
            .generate_custom_scripts(
                file_name,
                file_bytes.to_vec(),
                settings.weeks,
                &settings.days,
                &platform_posts,
            )
            .await;
        match outcome {
            Ok(GenerateResponse::Success { results }) => Some(results),
            Ok(GenerateResponse::Error { message }) => {
                warn!(
                    message = message.as_deref().unwrap_or("no details"),
                    "generation refresh rejected"
                );
                None
            }
            Err(err) => {
                warn!(error = %err, "generation refresh failed");
                None
            }
        }
    };

    let (extraction, generation) = tokio::join!(extract, generate);
    RefreshOutcome {
        extraction,
        generation,
    }
}
