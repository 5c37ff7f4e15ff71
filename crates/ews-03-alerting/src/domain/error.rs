//! Error types for the alerting service.

use thiserror::Error;

/// Alerting error taxonomy.
#[derive(Debug, Error)]
pub enum AlertError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Illegal lifecycle transition (alert or notification).
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Event bus error: {0}")]
    Bus(String),
}

/// Result type for alerting operations.
pub type AlertResult<T> = Result<T, AlertError>;
