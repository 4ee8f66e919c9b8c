//! Scoped regeneration: one backend call, one cleaned value, one field.
//!
//! The [`Regenerator`] routes a [`RegenTarget`] to the matching backend
//! operation, cleans the returned text with the [`crate::convention`]
//! rules for that target kind, and submits a single-field write to the
//! plan store. Sibling fields are never touched. A rejected or failed
//! call leaves the previous value in place; the operator retries just
//! that piece.

pub mod store;
pub mod target;

pub use store::{PlanHandle, PlanStore, StoreError, WriteOutcome};
pub use target::RegenTarget;

use std::sync::Arc;

use cadence_backend::client::Backend;
use cadence_backend::error::BackendError;
use cadence_backend::types::{
    GenerateImageResponse, RegenerateContentResponse, RegenerateScriptResponse,
    RegenerateSubcontentResponse,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::convention;

/// Why a regeneration produced no new value.
#[derive(Debug, Error)]
pub enum RegenError {
    /// The target does not exist in the current plan.
    #[error("unknown regeneration target: {0}")]
    UnknownTarget(RegenTarget),

    /// The backend answered with an `error` status payload.
    #[error("backend rejected the regeneration: {}", message.as_deref().unwrap_or("no details"))]
    Rejected { message: Option<String> },

    /// The plan was reset while the request was in flight; the stale
    /// result was discarded.
    #[error("plan was reset while the regeneration was in flight")]
    Stale,

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Lifecycle of one regeneration request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegenPhase {
    Idle,
    Requesting,
    Applied,
    Failed,
}

impl RegenPhase {
    /// Valid edges: `Idle -> Requesting -> Applied | Failed -> Idle`.
    pub fn is_valid_transition(from: Self, to: Self) -> bool {
        matches!(
            (from, to),
            (Self::Idle, Self::Requesting)
                | (Self::Requesting, Self::Applied)
                | (Self::Requesting, Self::Failed)
                | (Self::Applied, Self::Idle)
                | (Self::Failed, Self::Idle)
        )
    }
}

/// The value written by a successful regeneration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegenOutcome {
    pub target: RegenTarget,
    pub value: String,
}

/// Issues one backend call per invocation, no retries. Holds no plan
/// state of its own, so any number of regenerations can run against one
/// store concurrently; writes serialize in the store task.
pub struct Regenerator {
    backend: Arc<dyn Backend>,
    plan: PlanHandle,
}

impl Regenerator {
    pub fn new(backend: Arc<dyn Backend>, plan: PlanHandle) -> Self {
        Self { backend, plan }
    }

    /// Regenerate one field.
    ///
    /// `instruction` is the operator's edit request. For `Main` and
    /// `Sub` it replaces the current value as the request seed when
    /// given; `Main` additionally strips one leading `label:` from
    /// whatever is sent. `Post` and `Image` always send the current
    /// post text as `content` and the instruction (or empty) as
    /// `query`.
    ///
    /// The write is tagged with the epoch captured before the call, so
    /// a plan reset in the meantime surfaces as [`RegenError::Stale`]
    /// and the new plan is left untouched.
    pub async fn regenerate(
        &self,
        target: &RegenTarget,
        instruction: Option<&str>,
    ) -> Result<RegenOutcome, RegenError> {
        let seed = self
            .plan
            .read_target(target)
            .await?
            .ok_or_else(|| RegenError::UnknownTarget(target.clone()))?;
        let epoch = self.plan.generation().await?;

        let mut phase = RegenPhase::Idle;
        advance(target, &mut phase, RegenPhase::Requesting);
        info!(target = %target, epoch, "requesting regeneration");

        let value = match self.request(target, &seed, instruction).await {
            Ok(value) => value,
            Err(err) => {
                warn!(target = %target, error = %err, "regeneration failed");
                return Err(fail(target, &mut phase, err));
            }
        };

        match self.plan.apply(epoch, target.clone(), value.clone()).await? {
            WriteOutcome::Applied => {
                advance(target, &mut phase, RegenPhase::Applied);
                advance(target, &mut phase, RegenPhase::Idle);
                info!(target = %target, epoch, "regeneration applied");
                Ok(RegenOutcome {
                    target: target.clone(),
                    value,
                })
            }
            WriteOutcome::Stale => Err(fail(target, &mut phase, RegenError::Stale)),
            WriteOutcome::UnknownTarget => Err(fail(
                target,
                &mut phase,
                RegenError::UnknownTarget(target.clone()),
            )),
        }
    }

    /// One backend call for one target kind, result cleaned per kind.
    async fn request(
        &self,
        target: &RegenTarget,
        seed: &str,
        instruction: Option<&str>,
    ) -> Result<String, RegenError> {
        match target {
            RegenTarget::Main { .. } => {
                let text = instruction.unwrap_or(seed);
                let payload = convention::strip_request_label(text);
                match self.backend.regenerate_content(payload).await? {
                    RegenerateContentResponse::Success { week_content } => {
                        Ok(convention::clean_main_idea(&week_content))
                    }
                    RegenerateContentResponse::Error { message } => {
                        Err(RegenError::Rejected { message })
                    }
                }
            }
            RegenTarget::Sub { .. } => {
                let text = instruction.unwrap_or(seed);
                match self.backend.regenerate_subcontent(text).await? {
                    RegenerateSubcontentResponse::Success { subcontent } => {
                        Ok(convention::clean_sub_topic(&subcontent))
                    }
                    RegenerateSubcontentResponse::Error { message } => {
                        Err(RegenError::Rejected { message })
                    }
                }
            }
            RegenTarget::Post { platform, .. } => {
                let query = instruction.unwrap_or("");
                let platform = platform.to_ascii_lowercase();
                match self.backend.regenerate_script(seed, query, &platform).await? {
                    RegenerateScriptResponse::Success { content } => Ok(content.into_text()),
                    RegenerateScriptResponse::Error { message } => {
                        Err(RegenError::Rejected { message })
                    }
                }
            }
            RegenTarget::Image { .. } => {
                let query = instruction.unwrap_or("");
                match self.backend.generate_image(seed, query).await? {
                    GenerateImageResponse::Success { image_url } => Ok(image_url),
                    GenerateImageResponse::Error { message } => {
                        Err(RegenError::Rejected { message })
                    }
                }
            }
        }
    }
}

fn advance(target: &RegenTarget, phase: &mut RegenPhase, to: RegenPhase) {
    if RegenPhase::is_valid_transition(*phase, to) {
        debug!(target = %target, from = ?phase, to = ?to, "regeneration phase");
    } else {
        warn!(target = %target, from = ?phase, to = ?to, "unexpected regeneration phase edge");
    }
    *phase = to;
}

fn fail(target: &RegenTarget, phase: &mut RegenPhase, err: RegenError) -> RegenError {
    advance(target, phase, RegenPhase::Failed);
    advance(target, phase, RegenPhase::Idle);
    err
}
