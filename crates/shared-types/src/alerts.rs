//! # Alert Vocabulary
//!
//! The classification types shared between the scoring and alerting
//! services. The alert, subscription and notification entities themselves
//! are owned by the alerting service.

use serde::{Deserialize, Serialize};

/// What a raised alert is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertType {
    /// Consensus score ≥ 7.
    #[serde(rename = "EWS_CRITICAL")]
    EwsCritical,
    /// Consensus score 5–6.
    #[serde(rename = "EWS_URGENT")]
    EwsUrgent,
    /// Consensus score 3–4.
    #[serde(rename = "EWS_ELEVATED")]
    EwsElevated,
    /// Nodes disagreed; the consensus is invalid.
    #[serde(rename = "EWS_DATA_INCONSISTENCY")]
    EwsDataInconsistency,
    /// A single sensor value physiologically out of range.
    #[serde(rename = "SENSOR_CRITICAL")]
    SensorCritical,
    /// Sensor-level disagreement or degraded signal quality.
    #[serde(rename = "SENSOR_WARNING")]
    SensorWarning,
}

impl AlertType {
    /// The wire name of this type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EwsCritical => "EWS_CRITICAL",
            Self::EwsUrgent => "EWS_URGENT",
            Self::EwsElevated => "EWS_ELEVATED",
            Self::EwsDataInconsistency => "EWS_DATA_INCONSISTENCY",
            Self::SensorCritical => "SENSOR_CRITICAL",
            Self::SensorWarning => "SENSOR_WARNING",
        }
    }

    /// Parse a wire name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "EWS_CRITICAL" => Some(Self::EwsCritical),
            "EWS_URGENT" => Some(Self::EwsUrgent),
            "EWS_ELEVATED" => Some(Self::EwsElevated),
            "EWS_DATA_INCONSISTENCY" => Some(Self::EwsDataInconsistency),
            "SENSOR_CRITICAL" => Some(Self::SensorCritical),
            "SENSOR_WARNING" => Some(Self::SensorWarning),
            _ => None,
        }
    }
}

/// Severity of an alert. Ordering: LOW < MEDIUM < HIGH.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AlertSeverity {
    /// Informational.
    #[serde(rename = "LOW")]
    Low,
    /// Needs attention this shift.
    #[serde(rename = "MEDIUM")]
    Medium,
    /// Needs attention now.
    #[serde(rename = "HIGH")]
    High,
}

impl AlertSeverity {
    /// The wire name of this severity.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }

    /// Parse a wire name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "LOW" => Some(Self::Low),
            "MEDIUM" => Some(Self::Medium),
            "HIGH" => Some(Self::High),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(AlertSeverity::High > AlertSeverity::Medium);
        assert!(AlertSeverity::Medium > AlertSeverity::Low);
    }

    #[test]
    fn test_alert_type_roundtrip() {
        for t in [
            AlertType::EwsCritical,
            AlertType::EwsUrgent,
            AlertType::EwsElevated,
            AlertType::EwsDataInconsistency,
            AlertType::SensorCritical,
            AlertType::SensorWarning,
        ] {
            assert_eq!(AlertType::parse(t.as_str()), Some(t));
        }
        assert_eq!(AlertType::parse("EWS_UNKNOWN"), None);
    }
}
