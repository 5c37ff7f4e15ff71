//! Domain logic for the scoring service: NEWS2 banding, score quorum and
//! the patient read model.

mod config;
mod error;
mod read_model;

pub mod consensus;
pub mod news2;

pub use config::ScoringConfig;
pub use consensus::{authoritative_event, resolve_scores, score_latest_per_node, ScoreQuorumOutcome};
pub use error::{ScoringError, ScoringResult};
pub use news2::{score, ScoreBreakdown, ScoreError};
pub use read_model::{PatientReadModel, ScoreHistoryEntry};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::{NodeId, PatientId, ScoreEventKind, VitalSigns};

/// Command to calculate a NEWS2 score for one (patient, node) vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateCommand {
    /// The patient to score.
    pub patient_id: PatientId,
    /// The node whose readings produced the vector.
    pub node_id: NodeId,
    /// The complete vital vector.
    pub vital_signs: VitalSigns,
    /// Observation time; defaults to now at the service edge.
    pub observed_at: Option<DateTime<Utc>>,
    /// Marks the calculation as externally validated.
    #[serde(default)]
    pub validated: bool,
    /// Opaque caller metadata.
    #[serde(default)]
    pub metadata: serde_json::Value,
    /// Causal-chain id; a fresh one is generated when absent.
    #[serde(default)]
    pub correlation_id: Option<uuid::Uuid>,
}

/// Filters for the score-event query API.
#[derive(Debug, Clone, Default)]
pub struct EventQuery {
    /// Only events for this patient.
    pub patient_id: Option<PatientId>,
    /// Only events of this kind.
    pub kind: Option<ScoreEventKind>,
    /// Only events observed at or after this instant.
    pub from: Option<DateTime<Utc>>,
    /// Only events observed at or before this instant.
    pub to: Option<DateTime<Utc>>,
    /// Maximum events returned (most recent first).
    pub limit: Option<usize>,
}

/// Fleet-wide statistics over the read models and event store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsOverview {
    /// Patients with a read model.
    pub patients: usize,
    /// Mean current score across patients (0 when none).
    pub average_score: f64,
    /// Patients per risk band.
    pub risk_distribution: RiskDistribution,
    /// Total score events appended.
    pub total_events: usize,
}

/// Patient counts per clinical-risk band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskDistribution {
    pub low: usize,
    pub low_medium: usize,
    pub medium: usize,
    pub high: usize,
}
