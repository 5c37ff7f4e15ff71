//! Error types for the ingestion service.

use thiserror::Error;

/// Ingestion error taxonomy.
///
/// Validation errors are never retried; storage errors abort the round
/// before anything is published; bus errors are best-effort (logged by the
/// publisher); downstream errors cover the scoring-trigger gateway.
#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Event bus error: {0}")]
    Bus(String),

    #[error("Downstream service error: {0}")]
    Downstream(String),
}

/// Result type for ingestion operations.
pub type IngestionResult<T> = Result<T, IngestionError>;
