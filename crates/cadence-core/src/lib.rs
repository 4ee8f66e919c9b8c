//! The content-plan engine.
//!
//! Everything between the wire types and the CLI lives here:
//!
//! - [`convention`] -- text-cleaning rules for backend responses that
//!   arrive wrapped in week/day labels or stray JSON.
//! - [`plan`] -- the plan model (weeks, days, platform tracks, slots),
//!   the schedule outline built from an extraction, and the
//!   materializer that folds generated posts into a full plan.
//! - [`regen`] -- scoped regeneration: the single-writer plan store
//!   and the coordinator that routes one target to one backend call.
//! - [`refresh`] -- full-plan refresh from the stored source document.
//! - [`configs`] -- the pipeline role catalog (agent/task pairs).
//! - [`cache`] -- the day-scoped cache the catalog sits behind, plus
//!   platform connection flags.
//!
//! The engine is deliberately backend-agnostic: every operation takes
//! `&dyn Backend`, so tests script responses without a server.

pub mod cache;
pub mod configs;
pub mod convention;
pub mod plan;
pub mod refresh;
pub mod regen;
