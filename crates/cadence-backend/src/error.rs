use thiserror::Error;

/// Errors produced by [`crate::client::Backend`] implementations.
///
/// Only transport- and shape-level failures live here. A well-formed
/// `status: "error"` payload deserializes into the matching response
/// union instead, and the caller decides what rejection means.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Network-level failure: connect, timeout, or mid-body error.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-2xx HTTP status.
    #[error("backend returned HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The body did not match the expected wire shape.
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}
