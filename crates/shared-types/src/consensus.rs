//! # Consensus Records
//!
//! The agreed outcomes of the two fan-in quorum tiers: per-sensor value
//! consensus (tier one) and per-patient score consensus (tier two).
//!
//! Both tiers share the method vocabulary. The invariant in both:
//! `valid = false` if and only if `method = none`, and the consensus value
//! is always populated; downstream decides whether to use it.

use crate::entities::{NodeId, PatientId};
use crate::scoring::{ClinicalRisk, ScoreEvent};
use crate::vitals::SensorType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a consensus value was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsensusMethod {
    /// One participant remained after latest-per-node dedup.
    Single,
    /// A strict majority agreed on an exact value.
    Majority,
    /// No majority, but all values fell within tolerance of the mean.
    Average,
    /// Participants were spread wider than the agreement window; the
    /// latest value was taken.
    Latest,
    /// No agreement; the mean is recorded for display only.
    None,
}

impl ConsensusMethod {
    /// Whether this method denotes a usable (valid) consensus.
    ///
    /// `none` is explicitly representable and is the only invalid method;
    /// a missing record is not the same thing as an invalid one.
    #[must_use]
    pub fn is_valid(self) -> bool {
        !matches!(self, Self::None)
    }

    /// The wire name of this method.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Majority => "majority",
            Self::Average => "average",
            Self::Latest => "latest",
            Self::None => "none",
        }
    }
}

/// One participating reading inside a sensor consensus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipatingReading {
    /// The reporting node.
    pub node_id: NodeId,
    /// The node's (latest-in-window) value.
    pub value: f64,
    /// When the node observed it.
    pub observed_at: DateTime<Utc>,
}

/// The agreed value for one (patient, sensorType) over a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorConsensus {
    /// Unique consensus identifier.
    pub consensus_id: Uuid,
    /// The observed patient.
    pub patient_id: PatientId,
    /// The sensor type this consensus covers.
    pub sensor_type: SensorType,
    /// The readings that participated (latest per node in the window).
    pub participating: Vec<ParticipatingReading>,
    /// The agreed (or fallback) value. Always populated.
    pub consensus_value: f64,
    /// Timestamp of the consensus (per-method: the winning reading's
    /// observation time, or the latest participant for averages).
    pub consensus_at: DateTime<Utc>,
    /// Whether the value is usable for clinical decisions.
    pub valid: bool,
    /// How the value was reached.
    pub method: ConsensusMethod,
}

/// Reconciliation record over per-node score events for one patient.
///
/// `node_scores` embeds the participating events so the read-model
/// projector can copy authoritative vitals without a second store read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreConsensus {
    /// Unique consensus identifier (the projector's idempotence key).
    pub consensus_id: Uuid,
    /// The scored patient.
    pub patient_id: PatientId,
    /// Participating score events (latest per node in the window).
    pub node_scores: Vec<ScoreEvent>,
    /// The agreed NEWS2 total (rounded mean for the average path).
    pub consensus_score: u8,
    /// Risk band for `consensus_score`.
    pub clinical_risk: ClinicalRisk,
    /// Timestamp of the consensus.
    pub consensus_at: DateTime<Utc>,
    /// Whether the score is usable for clinical decisions.
    pub valid: bool,
    /// How the score was reached.
    pub method: ConsensusMethod,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_validity() {
        assert!(ConsensusMethod::Single.is_valid());
        assert!(ConsensusMethod::Majority.is_valid());
        assert!(ConsensusMethod::Average.is_valid());
        assert!(ConsensusMethod::Latest.is_valid());
        assert!(!ConsensusMethod::None.is_valid());
    }

    #[test]
    fn test_method_wire_names() {
        assert_eq!(
            serde_json::to_string(&ConsensusMethod::Majority).unwrap(),
            "\"majority\""
        );
        assert_eq!(
            serde_json::to_string(&ConsensusMethod::None).unwrap(),
            "\"none\""
        );
    }
}
