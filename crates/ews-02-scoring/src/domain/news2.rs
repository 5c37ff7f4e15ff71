//! NEWS2 scoring.
//!
//! Pure, deterministic banding of a six-vital vector into component
//! scores, a total and a clinical-risk category. Values outside every
//! band raise a validation error rather than silently scoring 0.
//!
//! Banding table (component score per vital):
//!
//! | Vital | 3 | 2 | 1 | 0 | 1 | 2 | 3 |
//! |---|---|---|---|---|---|---|---|
//! | respiratoryRate | ≤8 | | 9–11 | 12–20 | | 21–24 | ≥25 |
//! | oxygenSaturation | ≤91 | 92–93 | 94–95 | ≥96 | | | |
//! | temperature | ≤35.0 | | 35.1–36.0 | 36.1–38.0 | 38.1–39.0 | ≥39.1 | |
//! | systolicBP | ≤90 | 91–100 | 101–110 | 111–219 | | | ≥220 |
//! | heartRate | ≤40 | | 41–50 | 51–90 | 91–110 | 111–130 | ≥131 |
//! | consciousness | | | | Alert | | | Voice/Pain/Unresponsive |
//!
//! Temperature boundaries are inclusive on both ends of each band; heart
//! rate is fully partitioned with no gaps.

use shared_types::{ClinicalRisk, Consciousness, ScoreComponents, VitalSigns};
use thiserror::Error;

/// A vital value that falls into no band.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{vital} value {value} is outside every scoring band")]
pub struct ScoreError {
    /// The offending vital (read-model field name).
    pub vital: &'static str,
    /// The out-of-band value.
    pub value: f64,
}

/// The output of one NEWS2 calculation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreBreakdown {
    /// Per-vital component scores.
    pub components: ScoreComponents,
    /// Sum of components (0–20).
    pub total_score: u8,
    /// Risk band for the total.
    pub clinical_risk: ClinicalRisk,
}

/// Score a complete vital vector.
///
/// # Errors
///
/// Returns [`ScoreError`] when any value lies outside every band of its
/// vital (e.g. a respiratory rate of 8.5).
pub fn score(vitals: &VitalSigns) -> Result<ScoreBreakdown, ScoreError> {
    let components = ScoreComponents {
        respiratory_rate: respiratory_rate(vitals.respiratory_rate)?,
        oxygen_saturation: oxygen_saturation(vitals.oxygen_saturation)?,
        temperature: temperature(vitals.temperature)?,
        systolic_bp: systolic_bp(vitals.systolic_bp)?,
        heart_rate: heart_rate(vitals.heart_rate)?,
        consciousness: consciousness(vitals.consciousness),
    };
    let total_score = components.total();

    Ok(ScoreBreakdown {
        components,
        total_score,
        clinical_risk: ClinicalRisk::from_total(total_score),
    })
}

fn respiratory_rate(v: f64) -> Result<u8, ScoreError> {
    match v {
        v if v <= 8.0 => Ok(3),
        v if (9.0..=11.0).contains(&v) => Ok(1),
        v if (12.0..=20.0).contains(&v) => Ok(0),
        v if (21.0..=24.0).contains(&v) => Ok(2),
        v if v >= 25.0 => Ok(3),
        value => Err(ScoreError {
            vital: "respiratoryRate",
            value,
        }),
    }
}

fn oxygen_saturation(v: f64) -> Result<u8, ScoreError> {
    match v {
        v if v <= 91.0 => Ok(3),
        v if (92.0..=93.0).contains(&v) => Ok(2),
        v if (94.0..=95.0).contains(&v) => Ok(1),
        v if v >= 96.0 => Ok(0),
        value => Err(ScoreError {
            vital: "oxygenSaturation",
            value,
        }),
    }
}

fn temperature(v: f64) -> Result<u8, ScoreError> {
    match v {
        v if v <= 35.0 => Ok(3),
        v if (35.1..=36.0).contains(&v) => Ok(1),
        v if (36.1..=38.0).contains(&v) => Ok(0),
        v if (38.1..=39.0).contains(&v) => Ok(1),
        v if v >= 39.1 => Ok(2),
        value => Err(ScoreError {
            vital: "temperature",
            value,
        }),
    }
}

fn systolic_bp(v: f64) -> Result<u8, ScoreError> {
    match v {
        v if v <= 90.0 => Ok(3),
        v if (91.0..=100.0).contains(&v) => Ok(2),
        v if (101.0..=110.0).contains(&v) => Ok(1),
        v if (111.0..=219.0).contains(&v) => Ok(0),
        v if v >= 220.0 => Ok(3),
        value => Err(ScoreError {
            vital: "systolicBP",
            value,
        }),
    }
}

fn heart_rate(v: f64) -> Result<u8, ScoreError> {
    // Fully partitioned: every finite value falls in exactly one band.
    match v {
        v if v.is_nan() => Err(ScoreError {
            vital: "heartRate",
            value: v,
        }),
        v if v <= 40.0 => Ok(3),
        v if v <= 50.0 => Ok(1),
        v if v <= 90.0 => Ok(0),
        v if v <= 110.0 => Ok(1),
        v if v <= 130.0 => Ok(2),
        _ => Ok(3),
    }
}

fn consciousness(level: Consciousness) -> u8 {
    match level {
        Consciousness::Alert => 0,
        Consciousness::Voice | Consciousness::Pain | Consciousness::Unresponsive => 3,
    }
}
