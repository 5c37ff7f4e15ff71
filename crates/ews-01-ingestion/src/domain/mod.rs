//! Domain logic for the ingestion service: windowing, quorum resolution
//! and vital-vector completeness.

mod completeness;
mod config;
mod error;
mod quorum;
mod window;

pub use completeness::assemble_vitals;
pub use config::IngestionConfig;
pub use error::{IngestionError, IngestionResult};
pub use quorum::{latest_per_node, resolve, QuorumOutcome};
pub use window::ReadingWindow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::{NodeId, PatientId, SensorType, VitalSigns};
use uuid::Uuid;

/// Filters for the sensor-consensus query API.
#[derive(Debug, Clone, Default)]
pub struct ConsensusQuery {
    /// Only consensuses at or after this instant.
    pub from: Option<DateTime<Utc>>,
    /// Only consensuses at or before this instant.
    pub to: Option<DateTime<Utc>>,
    /// Only consensuses for this sensor type.
    pub sensor_type: Option<SensorType>,
}

/// Command sent to the scoring service when a vital vector is complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRequest {
    /// The patient to score.
    pub patient_id: PatientId,
    /// The edge node whose reading completed the vector.
    pub node_id: NodeId,
    /// The assembled vital vector.
    pub vital_signs: VitalSigns,
    /// Observation time of the vector (the triggering consensus time).
    pub observed_at: DateTime<Utc>,
    /// Causal-chain id carried through to the score events.
    pub correlation_id: Uuid,
}
