//! Driven ports (outbound dependencies).

use crate::domain::{EventQuery, PatientReadModel};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared_types::{PatientId, ScoreConsensus, ScoreEvent};
use uuid::Uuid;

/// Append-only persistence for score events.
///
/// Deliberately has no update or delete: events are immutable history.
#[async_trait]
pub trait ScoreEventStore: Send + Sync {
    /// Append an event. Appending an event id that already exists is a
    /// no-op (idempotent under at-least-once delivery).
    async fn append_event(&self, event: ScoreEvent) -> Result<(), String>;

    /// All events for a patient inside `[start, end]`, ascending by
    /// observation time.
    async fn events_in_window(
        &self,
        patient_id: &PatientId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ScoreEvent>, String>;

    /// Query events with optional filters, most recent first.
    async fn query(&self, query: &EventQuery) -> Result<Vec<ScoreEvent>, String>;

    /// Total events appended.
    async fn count(&self) -> Result<usize, String>;
}

/// Persistence for score-consensus records.
#[async_trait]
pub trait ScoreConsensusStore: Send + Sync {
    /// Persist a consensus record.
    async fn insert_consensus(&self, consensus: ScoreConsensus) -> Result<(), String>;

    /// Fetch one consensus by id.
    async fn get(&self, consensus_id: Uuid) -> Result<Option<ScoreConsensus>, String>;
}

/// Persistence for patient read models.
#[async_trait]
pub trait ReadModelStore: Send + Sync {
    /// Fetch the model for a patient.
    async fn get(&self, patient_id: &PatientId) -> Result<Option<PatientReadModel>, String>;

    /// Store (create or replace) a model. The projector serialises calls
    /// per patient; implementations need no further coordination.
    async fn put(&self, model: PatientReadModel) -> Result<(), String>;

    /// All models (statistics and high-risk queries).
    async fn all(&self) -> Result<Vec<PatientReadModel>, String>;
}

/// Event bus for choreography.
#[async_trait]
pub trait ScoreEventBus: Send + Sync {
    /// Publish a persisted score event (`ews.calculated`).
    async fn publish_score_calculated(
        &self,
        event: ScoreEvent,
        correlation_id: Uuid,
    ) -> Result<(), String>;

    /// Publish a persisted score consensus (`ews.consensus`).
    async fn publish_score_consensus(
        &self,
        consensus: ScoreConsensus,
        correlation_id: Uuid,
    ) -> Result<(), String>;
}
