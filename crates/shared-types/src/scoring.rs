//! # Score Records
//!
//! Immutable per-node NEWS2 calculation events and their vocabulary.
//! Events are append-only: created once, never mutated, never deleted.

use crate::entities::{NodeId, PatientId};
use crate::vitals::VitalSigns;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of a score event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreEventKind {
    /// First calculation for a (patient, node) inside the current window.
    #[serde(rename = "EWS_CALCULATED")]
    EwsCalculated,
    /// A recalculation superseding an event from the same node inside the
    /// window (the earlier event remains in the store).
    #[serde(rename = "EWS_UPDATED")]
    EwsUpdated,
    /// A calculation submitted as externally validated.
    #[serde(rename = "EWS_VALIDATED")]
    EwsValidated,
}

impl ScoreEventKind {
    /// The wire name of this kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EwsCalculated => "EWS_CALCULATED",
            Self::EwsUpdated => "EWS_UPDATED",
            Self::EwsValidated => "EWS_VALIDATED",
        }
    }
}

/// Categorical clinical risk derived from the NEWS2 total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClinicalRisk {
    /// Total 0.
    Low,
    /// Total 1–4.
    #[serde(rename = "Low-Medium")]
    LowMedium,
    /// Total 5–6.
    Medium,
    /// Total ≥ 7.
    High,
}

impl ClinicalRisk {
    /// Map a NEWS2 total (0–20) to its risk band.
    #[must_use]
    pub fn from_total(total: u8) -> Self {
        match total {
            0 => Self::Low,
            1..=4 => Self::LowMedium,
            5..=6 => Self::Medium,
            _ => Self::High,
        }
    }

    /// Human-readable band name (matches the serialized form).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::LowMedium => "Low-Medium",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

/// Per-vital integer component scores (each 0–3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreComponents {
    /// Respiratory-rate component.
    pub respiratory_rate: u8,
    /// Oxygen-saturation component.
    pub oxygen_saturation: u8,
    /// Temperature component.
    pub temperature: u8,
    /// Systolic-BP component.
    #[serde(rename = "systolicBP")]
    pub systolic_bp: u8,
    /// Heart-rate component.
    pub heart_rate: u8,
    /// Consciousness component.
    pub consciousness: u8,
}

impl ScoreComponents {
    /// Sum of all components (the NEWS2 total, 0–20).
    #[must_use]
    pub fn total(&self) -> u8 {
        self.respiratory_rate
            + self.oxygen_saturation
            + self.temperature
            + self.systolic_bp
            + self.heart_rate
            + self.consciousness
    }
}

/// Immutable record of one per-node NEWS2 calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEvent {
    /// Unique event identifier.
    pub event_id: Uuid,
    /// The scored patient.
    pub patient_id: PatientId,
    /// The edge node whose readings produced this calculation.
    pub node_id: NodeId,
    /// Event kind.
    pub kind: ScoreEventKind,
    /// Observation time of the underlying vital vector.
    pub observed_at: DateTime<Utc>,
    /// Snapshot of the scored vitals.
    pub vital_signs: VitalSigns,
    /// Per-vital component scores.
    pub score_components: ScoreComponents,
    /// NEWS2 total (0–20).
    pub total_score: u8,
    /// Risk band for `total_score`.
    pub clinical_risk: ClinicalRisk,
    /// Opaque caller metadata.
    #[serde(default)]
    pub metadata: serde_json::Value,
}
