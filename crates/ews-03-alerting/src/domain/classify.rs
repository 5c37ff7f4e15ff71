//! Classification of consensus outcomes into alerts.
//!
//! The mapping is total on {invalid ∨ score ≥ 3}: every consensus yields
//! at most one alert, and scores of 0–2 with a valid consensus yield none.

use shared_types::{AlertSeverity, AlertType, ScoreConsensus, SensorConsensus};

/// What a consensus outcome classifies as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Alert type.
    pub alert_type: AlertType,
    /// Alert severity.
    pub severity: AlertSeverity,
    /// Human-readable summary for dispatch.
    pub message: String,
}

/// Classify a score consensus. `None` means no alert is warranted.
#[must_use]
pub fn classify_score_consensus(consensus: &ScoreConsensus) -> Option<Classification> {
    if !consensus.valid {
        return Some(Classification {
            alert_type: AlertType::EwsDataInconsistency,
            severity: AlertSeverity::Medium,
            message: format!(
                "Nodes disagree on the NEWS2 score for patient {} (spread around {}); \
                 score not usable for clinical decisions",
                consensus.patient_id, consensus.consensus_score
            ),
        });
    }

    match consensus.consensus_score {
        score if score >= 7 => Some(Classification {
            alert_type: AlertType::EwsCritical,
            severity: AlertSeverity::High,
            message: format!(
                "NEWS2 score {score} ({} risk) for patient {} reached the critical threshold",
                consensus.clinical_risk.as_str(),
                consensus.patient_id
            ),
        }),
        score @ 5..=6 => Some(Classification {
            alert_type: AlertType::EwsUrgent,
            severity: AlertSeverity::Medium,
            message: format!(
                "NEWS2 score {score} ({} risk) for patient {} requires urgent review",
                consensus.clinical_risk.as_str(),
                consensus.patient_id
            ),
        }),
        score @ 3..=4 => Some(Classification {
            alert_type: AlertType::EwsElevated,
            severity: AlertSeverity::Low,
            message: format!(
                "NEWS2 score {score} for patient {} is elevated",
                consensus.patient_id
            ),
        }),
        _ => None,
    }
}

/// Classify a sensor consensus. Only disagreement raises an alert.
#[must_use]
pub fn classify_sensor_consensus(consensus: &SensorConsensus) -> Option<Classification> {
    if consensus.valid {
        return None;
    }
    Some(Classification {
        alert_type: AlertType::SensorWarning,
        severity: AlertSeverity::Medium,
        message: format!(
            "Edge nodes disagree on {} for patient {} (mean {:.1} recorded for display only)",
            consensus.sensor_type, consensus.patient_id, consensus.consensus_value
        ),
    })
}
