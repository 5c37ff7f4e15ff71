//! Driving ports (inbound API).
//!
//! The HTTP edge is an external collaborator; it validates transport
//! concerns and calls these methods.

use crate::domain::{ConsensusQuery, IngestionResult};
use async_trait::async_trait;
use shared_types::{PatientId, SensorConsensus, SensorReading};

/// Primary ingestion API.
#[async_trait]
pub trait IngestionApi: Send + Sync {
    /// Ingest a single reading: persist it, run a windowed consensus round
    /// for its (patient, sensor type), and trigger scoring when the
    /// patient's vital vector is complete.
    ///
    /// Returns the consensus formed by this round, if any. A lone reading
    /// in the window forms none and is reconsidered on the next arrival.
    async fn ingest_reading(
        &self,
        reading: SensorReading,
    ) -> IngestionResult<Option<SensorConsensus>>;

    /// Ingest a batch of readings. Per-item failures do not abort the
    /// batch; the outcome reports both sides.
    async fn ingest_batch(&self, readings: Vec<SensorReading>) -> IngestionResult<BatchOutcome>;

    /// Query stored consensuses for a patient, optionally filtered by
    /// time range and sensor type. Ascending by consensus time.
    async fn consensus_history(
        &self,
        patient_id: &PatientId,
        query: ConsensusQuery,
    ) -> IngestionResult<Vec<SensorConsensus>>;
}

/// Outcome of a batch ingest.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Readings persisted.
    pub accepted: usize,
    /// Consensuses formed while processing the batch.
    pub consensuses: Vec<SensorConsensus>,
    /// Per-item errors (index, message).
    pub errors: Vec<(usize, String)>,
}
