//! Error types for lichen-swh
//!
//! The agent's error taxonomy is deliberately small: everything that reaches
//! the caller is fatal to the run. Rate limiting is not an error (handled by
//! the backoff loop) and an unknown content is not an error (recorded as a
//! not-found result).

use thiserror::Error;

/// Agent error type
#[derive(Debug, Error)]
pub enum AgentError {
    /// Transport-level failure or unclassifiable service response.
    ///
    /// Carries the diagnostic detail (request line, and response status/body
    /// when one was received) that is printed before the run aborts. A
    /// broken endpoint halts the batch rather than silently skipping files.
    #[error("heritage service unreachable or misbehaving: {0}")]
    Transport(String),

    /// Persistence failure; fatal, never retried
    #[error("persistence failure: {0}")]
    Persistence(#[from] sqlx::Error),

    /// lichen-common error (config, database bootstrap, ...)
    #[error(transparent)]
    Common(#[from] lichen_common::Error),
}

/// Result type for agent operations
pub type AgentResult<T> = Result<T, AgentError>;
