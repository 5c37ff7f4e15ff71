//! # Vital-Sign Vocabulary
//!
//! Sensor types, the AVPU consciousness scale and the assembled
//! `VitalSigns` vector handed to the NEWS2 scorer.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The six physiological sensor types reported by edge nodes.
///
/// Wire names match the ingestion payloads (`respRate`, `spo2`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorType {
    /// Respiratory rate, breaths per minute.
    #[serde(rename = "respRate")]
    RespRate,
    /// Peripheral oxygen saturation, percent.
    #[serde(rename = "spo2")]
    Spo2,
    /// Body temperature, degrees Celsius.
    #[serde(rename = "temperature")]
    Temperature,
    /// Systolic blood pressure, mmHg.
    #[serde(rename = "bpSystolic")]
    BpSystolic,
    /// Heart rate, beats per minute.
    #[serde(rename = "heartRate")]
    HeartRate,
    /// Consciousness on the AVPU scale, encoded 0–3.
    #[serde(rename = "consciousness")]
    Consciousness,
}

impl SensorType {
    /// All six types, in the order vitals are reported.
    pub const ALL: [SensorType; 6] = [
        Self::RespRate,
        Self::Spo2,
        Self::Temperature,
        Self::BpSystolic,
        Self::HeartRate,
        Self::Consciousness,
    ];

    /// The wire name of this sensor type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RespRate => "respRate",
            Self::Spo2 => "spo2",
            Self::Temperature => "temperature",
            Self::BpSystolic => "bpSystolic",
            Self::HeartRate => "heartRate",
            Self::Consciousness => "consciousness",
        }
    }

    /// Parse a wire name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }

    /// Translate the sensor type to the vital name used in score records.
    ///
    /// `respRate → respiratoryRate`, `spo2 → oxygenSaturation`,
    /// `bpSystolic → systolicBP`; the rest map to themselves.
    #[must_use]
    pub fn vital_name(self) -> &'static str {
        match self {
            Self::RespRate => "respiratoryRate",
            Self::Spo2 => "oxygenSaturation",
            Self::Temperature => "temperature",
            Self::BpSystolic => "systolicBP",
            Self::HeartRate => "heartRate",
            Self::Consciousness => "consciousness",
        }
    }
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// AVPU consciousness scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Consciousness {
    /// Fully alert.
    Alert,
    /// Responds to voice.
    Voice,
    /// Responds to pain.
    Pain,
    /// Unresponsive.
    Unresponsive,
}

/// Error for consciousness codes outside 0–3.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid consciousness code {0}, expected 0-3")]
pub struct InvalidConsciousness(pub i64);

impl Consciousness {
    /// Decode the sensor integer encoding (0=Alert .. 3=Unresponsive).
    pub fn from_code(code: i64) -> Result<Self, InvalidConsciousness> {
        match code {
            0 => Ok(Self::Alert),
            1 => Ok(Self::Voice),
            2 => Ok(Self::Pain),
            3 => Ok(Self::Unresponsive),
            other => Err(InvalidConsciousness(other)),
        }
    }

    /// The sensor integer encoding of this level.
    #[must_use]
    pub fn code(self) -> i64 {
        match self {
            Self::Alert => 0,
            Self::Voice => 1,
            Self::Pain => 2,
            Self::Unresponsive => 3,
        }
    }

    /// Parse the AVPU string form used in command payloads.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Alert" => Some(Self::Alert),
            "Voice" => Some(Self::Voice),
            "Pain" => Some(Self::Pain),
            "Unresponsive" => Some(Self::Unresponsive),
            _ => None,
        }
    }

    /// The AVPU string form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Alert => "Alert",
            Self::Voice => "Voice",
            Self::Pain => "Pain",
            Self::Unresponsive => "Unresponsive",
        }
    }
}

/// A complete vital-sign vector for one patient at one point in time.
///
/// Derived, never persisted on its own: assembled by the completeness
/// detector from the freshest valid consensus per sensor type, or supplied
/// directly on the scoring command API. Snapshots of it are embedded in
/// score events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalSigns {
    /// Breaths per minute.
    pub respiratory_rate: f64,
    /// SpO2 percent.
    pub oxygen_saturation: f64,
    /// Degrees Celsius.
    pub temperature: f64,
    /// Systolic blood pressure, mmHg.
    #[serde(rename = "systolicBP")]
    pub systolic_bp: f64,
    /// Beats per minute.
    pub heart_rate: f64,
    /// AVPU level.
    pub consciousness: Consciousness,
}
