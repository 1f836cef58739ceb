//! Engine-side error types.
//!
//! `ServiceError` is the only run-fatal category: a generation or
//! retrieval service that cannot be reached (or returns garbage) aborts
//! the pipeline. Everything else is captured into the trace and the run
//! continues.

use thiserror::Error;

/// A generation or retrieval service failure. Run-fatal.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("generation request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service returned a malformed payload: {0}")]
    MalformedPayload(String),

    #[error("service unavailable: {0}")]
    Unavailable(String),
}

/// Top-level pipeline failure surfaced to the caller of a run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Service(#[from] ServiceError),
}
