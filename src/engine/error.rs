//! Errors reported by engine operations.

use thiserror::Error;

/// Failure of a single engine call.
///
/// Carries no pipeline context; the reference pipeline tags it with the
/// stage that was running.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("allocation failed")]
    ResourceExhausted,

    #[error("cannot write samples to sink after it has been closed")]
    SinkClosed,

    #[error("{0}")]
    Rejected(String),

    #[error("{path}: {message}")]
    Parse { path: String, message: String },
}
