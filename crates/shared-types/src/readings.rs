//! # Sensor Readings
//!
//! One observation from one edge node. Immutable once created.

use crate::entities::{NodeId, PatientId};
use crate::vitals::SensorType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single physiological observation reported by an edge node.
///
/// Consciousness readings carry the integer AVPU encoding (0–3) in `value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorReading {
    /// The observed patient.
    pub patient_id: PatientId,
    /// Which of the six vital-sign sensors produced the value.
    pub sensor_type: SensorType,
    /// The observed value (real; consciousness encoded 0–3).
    pub value: f64,
    /// Unit of measure as reported by the node (e.g. "bpm", "%", "°C").
    #[serde(default)]
    pub unit: String,
    /// When the node observed the value. Stored timestamps drive all
    /// window math; wall clock is never consulted.
    pub observed_at: DateTime<Utc>,
    /// The reporting edge node.
    pub node_id: NodeId,
    /// Opaque node metadata, passed through unmodified.
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl SensorReading {
    /// Convenience constructor for the common case without metadata.
    pub fn new(
        patient_id: impl Into<PatientId>,
        sensor_type: SensorType,
        value: f64,
        observed_at: DateTime<Utc>,
        node_id: impl Into<NodeId>,
    ) -> Self {
        Self {
            patient_id: patient_id.into(),
            sensor_type,
            value,
            unit: String::new(),
            observed_at,
            node_id: node_id.into(),
            metadata: serde_json::Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_reading_serde_shape() {
        let reading = SensorReading::new(
            PatientId::new("P1"),
            SensorType::HeartRate,
            72.0,
            Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
            NodeId::new("node-1"),
        );
        let json = serde_json::to_value(&reading).unwrap();
        assert_eq!(json["patientId"], "P1");
        assert_eq!(json["sensorType"], "heartRate");
        assert_eq!(json["nodeId"], "node-1");
    }

    #[test]
    fn test_reading_deserializes_without_optional_fields() {
        let json = serde_json::json!({
            "patientId": "P1",
            "sensorType": "spo2",
            "value": 97.0,
            "observedAt": "2026-03-01T12:00:00Z",
            "nodeId": "node-2"
        });
        let reading: SensorReading = serde_json::from_value(json).unwrap();
        assert_eq!(reading.unit, "");
        assert!(reading.metadata.is_null());
    }
}
