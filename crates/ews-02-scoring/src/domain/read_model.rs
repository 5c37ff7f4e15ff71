//! The CQRS patient read model.
//!
//! A projection optimised for patient-current-state queries, derived from
//! the append-only consensus stream. Distinct from the event store: losing
//! it loses nothing, it can be rebuilt by replaying consensuses.

use crate::domain::consensus::authoritative_event;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::{ClinicalRisk, PatientId, ScoreComponents, ScoreConsensus, VitalSigns};
use uuid::Uuid;

/// One entry of the bounded score history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreHistoryEntry {
    /// The consensus that produced this entry (idempotence key).
    pub consensus_id: Uuid,
    /// The consensus timestamp.
    pub timestamp: DateTime<Utc>,
    /// The consensus score.
    pub score: u8,
    /// Risk band for the score.
    pub clinical_risk: ClinicalRisk,
}

/// Current state + bounded history for one patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientReadModel {
    /// Unique key.
    pub patient_id: PatientId,
    /// Score of the most recent consensus applied.
    pub current_score: u8,
    /// Risk band of the most recent consensus applied.
    pub clinical_risk: ClinicalRisk,
    /// Authoritative vitals from the last VALID consensus; preserved when
    /// an invalid consensus arrives.
    pub vital_signs: Option<VitalSigns>,
    /// Component scores paired with `vital_signs`.
    pub score_components: Option<ScoreComponents>,
    /// Ring of the last [`Self::HISTORY_LIMIT`] consensuses, ascending by
    /// timestamp.
    pub score_history: Vec<ScoreHistoryEntry>,
    /// Timestamp of the most recent consensus applied.
    pub last_updated: DateTime<Utc>,
}

impl PatientReadModel {
    /// Maximum history entries retained (oldest evicted first).
    pub const HISTORY_LIMIT: usize = 100;

    /// Create a model from a patient's first consensus.
    #[must_use]
    pub fn create_from(consensus: &ScoreConsensus) -> Self {
        let mut model = Self {
            patient_id: consensus.patient_id.clone(),
            current_score: consensus.consensus_score,
            clinical_risk: consensus.clinical_risk,
            vital_signs: None,
            score_components: None,
            score_history: Vec::new(),
            last_updated: consensus.consensus_at,
        };
        model.apply(consensus);
        model
    }

    /// Apply a consensus to the model.
    ///
    /// Idempotent: re-applying a consensus id already in the history is a
    /// no-op and returns `false`. Updates are monotonic: the current score
    /// tracks the newest `consensus_at` even when consensuses arrive out
    /// of order, while the history records every distinct consensus in
    /// timestamp order.
    pub fn apply(&mut self, consensus: &ScoreConsensus) -> bool {
        if self
            .score_history
            .iter()
            .any(|entry| entry.consensus_id == consensus.consensus_id)
        {
            return false;
        }

        let entry = ScoreHistoryEntry {
            consensus_id: consensus.consensus_id,
            timestamp: consensus.consensus_at,
            score: consensus.consensus_score,
            clinical_risk: consensus.clinical_risk,
        };
        let position = self
            .score_history
            .partition_point(|e| e.timestamp <= entry.timestamp);
        self.score_history.insert(position, entry);
        if self.score_history.len() > Self::HISTORY_LIMIT {
            let overflow = self.score_history.len() - Self::HISTORY_LIMIT;
            self.score_history.drain(..overflow);
        }

        // The newest consensus owns the current fields; an out-of-order
        // older one only contributes history.
        if consensus.consensus_at >= self.last_updated {
            self.current_score = consensus.consensus_score;
            self.clinical_risk = consensus.clinical_risk;
            self.last_updated = consensus.consensus_at;

            if consensus.valid {
                if let Some(source) =
                    authoritative_event(&consensus.node_scores, consensus.consensus_score)
                {
                    self.vital_signs = Some(source.vital_signs.clone());
                    self.score_components = Some(source.score_components);
                }
            }
            // Invalid consensus: score and history update, vitals stay.
        }

        true
    }
}
