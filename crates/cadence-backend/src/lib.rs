//! Typed bindings for the content-generation backend.
//!
//! This crate owns everything that crosses the HTTP boundary:
//!
//! - [`types`] -- the wire shapes. Every response is a tagged union on a
//!   `status` field; deserialization validates the shape once, at the
//!   boundary, so the engine never optional-chains into unknown JSON.
//! - [`client`] -- the [`Backend`] trait (the async operation surface)
//!   and its [`HttpBackend`] implementation on `reqwest`.
//! - [`config`] -- [`BackendConfig`], resolved from the environment.
//! - [`error`] -- [`BackendError`], the transport/decode error type.
//!
//! A well-formed `status: "error"` payload is **not** a [`BackendError`]:
//! the union is handed back to the caller, which owns the policy for
//! rejected work.

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::{Backend, HttpBackend};
pub use config::BackendConfig;
pub use error::BackendError;
