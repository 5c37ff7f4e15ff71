//! Driven ports (outbound dependencies).

use crate::domain::{ConsensusQuery, ReadingWindow, ScoreRequest};
use async_trait::async_trait;
use shared_types::{PatientId, SensorConsensus, SensorReading, SensorType};

/// Persistence for raw sensor readings.
#[async_trait]
pub trait ReadingStore: Send + Sync {
    /// Append a reading. Readings are immutable once stored.
    async fn insert_reading(&self, reading: SensorReading) -> Result<(), String>;

    /// All readings for one (patient, sensor type) inside a window,
    /// ascending by observation time.
    async fn readings_in_window(
        &self,
        patient_id: &PatientId,
        sensor_type: SensorType,
        window: ReadingWindow,
    ) -> Result<Vec<SensorReading>, String>;
}

/// Persistence for sensor-consensus records.
#[async_trait]
pub trait SensorConsensusStore: Send + Sync {
    /// Persist a consensus record.
    async fn insert_consensus(&self, consensus: SensorConsensus) -> Result<(), String>;

    /// The latest valid consensus per sensor type for a patient.
    async fn latest_valid_per_type(
        &self,
        patient_id: &PatientId,
    ) -> Result<Vec<SensorConsensus>, String>;

    /// Query consensuses for a patient with optional filters, ascending by
    /// consensus time.
    async fn query(
        &self,
        patient_id: &PatientId,
        query: &ConsensusQuery,
    ) -> Result<Vec<SensorConsensus>, String>;
}

/// Event bus for choreography.
#[async_trait]
pub trait SensorConsensusBus: Send + Sync {
    /// Publish a formed sensor consensus (valid or not). Best-effort: the
    /// record is already persisted when this is called.
    async fn publish_sensor_consensus(&self, consensus: SensorConsensus) -> Result<(), String>;
}

/// Gateway to the scoring service (an HTTP sibling in deployment; a direct
/// adapter in a single-process wiring).
#[async_trait]
pub trait ScoreCommandGateway: Send + Sync {
    /// Request a NEWS2 calculation for a completed vital vector.
    async fn request_score(&self, request: ScoreRequest) -> Result<(), String>;
}
