//! Error types for the scoring service.

use thiserror::Error;

/// Scoring error taxonomy.
#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Event bus error: {0}")]
    Bus(String),
}

/// Result type for scoring operations.
pub type ScoringResult<T> = Result<T, ScoringError>;
