//! Vital-vector completeness detection.
//!
//! On each new valid sensor consensus, the detector assembles the freshest
//! valid consensus per sensor type and decides whether a full NEWS2 input
//! vector exists. Freshness is measured against the triggering consensus
//! timestamp, not wall clock, so replays produce identical decisions.
//!
//! A missing consciousness consensus leaves the vector incomplete; no
//! default level is substituted.

use chrono::{DateTime, Duration, Utc};
use shared_types::{Consciousness, SensorConsensus, SensorType, VitalSigns};
use std::collections::HashMap;

/// Assemble a complete vital vector from per-type consensuses, or report
/// incompleteness.
///
/// `consensuses` is the store's latest-valid-per-type snapshot for one
/// patient (extra entries per type are tolerated; the freshest wins).
/// Entries older than `freshness` relative to `anchor` are discarded.
///
/// Returns `Ok(None)` when any of the six vitals is missing or stale, and
/// an error when a consciousness consensus carries a value outside the
/// 0–3 encoding (corrupt data, not incompleteness).
pub fn assemble_vitals(
    consensuses: &[SensorConsensus],
    anchor: DateTime<Utc>,
    freshness: Duration,
) -> Result<Option<VitalSigns>, String> {
    let cutoff = anchor - freshness;

    let mut freshest: HashMap<SensorType, &SensorConsensus> = HashMap::new();
    for consensus in consensuses {
        if !consensus.valid || consensus.consensus_at < cutoff {
            continue;
        }
        freshest
            .entry(consensus.sensor_type)
            .and_modify(|current| {
                if consensus.consensus_at > current.consensus_at {
                    *current = consensus;
                }
            })
            .or_insert(consensus);
    }

    if SensorType::ALL.iter().any(|t| !freshest.contains_key(t)) {
        return Ok(None);
    }

    let value_of = |t: SensorType| freshest[&t].consensus_value;

    let consciousness_raw = value_of(SensorType::Consciousness);
    if consciousness_raw.fract() != 0.0 {
        return Err(format!(
            "consciousness consensus {consciousness_raw} is not an integer code"
        ));
    }
    let consciousness = Consciousness::from_code(consciousness_raw as i64)
        .map_err(|e| e.to_string())?;

    Ok(Some(VitalSigns {
        respiratory_rate: value_of(SensorType::RespRate),
        oxygen_saturation: value_of(SensorType::Spo2),
        temperature: value_of(SensorType::Temperature),
        systolic_bp: value_of(SensorType::BpSystolic),
        heart_rate: value_of(SensorType::HeartRate),
        consciousness,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use shared_types::{ConsensusMethod, PatientId};
    use uuid::Uuid;

    fn at(min: u32, secs: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, min, secs).unwrap()
    }

    fn consensus(sensor_type: SensorType, value: f64, min: u32) -> SensorConsensus {
        SensorConsensus {
            consensus_id: Uuid::new_v4(),
            patient_id: PatientId::new("P1"),
            sensor_type,
            participating: vec![],
            consensus_value: value,
            consensus_at: at(min, 0),
            valid: true,
            method: ConsensusMethod::Majority,
        }
    }

    fn full_set(minute: u32) -> Vec<SensorConsensus> {
        vec![
            consensus(SensorType::RespRate, 18.0, minute),
            consensus(SensorType::Spo2, 96.0, minute),
            consensus(SensorType::Temperature, 37.1, minute),
            consensus(SensorType::BpSystolic, 125.0, minute),
            consensus(SensorType::HeartRate, 72.0, minute),
            consensus(SensorType::Consciousness, 0.0, minute),
        ]
    }

    #[test]
    fn test_complete_fresh_vector() {
        let vitals = assemble_vitals(&full_set(10), at(10, 30), Duration::minutes(5))
            .unwrap()
            .unwrap();
        assert_eq!(vitals.respiratory_rate, 18.0);
        assert_eq!(vitals.consciousness, Consciousness::Alert);
    }

    #[test]
    fn test_missing_vital_is_incomplete() {
        let mut set = full_set(10);
        set.retain(|c| c.sensor_type != SensorType::Temperature);
        let result = assemble_vitals(&set, at(10, 30), Duration::minutes(5)).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_missing_consciousness_is_incomplete() {
        // No default level is substituted for a missing consciousness.
        let mut set = full_set(10);
        set.retain(|c| c.sensor_type != SensorType::Consciousness);
        let result = assemble_vitals(&set, at(10, 30), Duration::minutes(5)).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_stale_vital_is_incomplete() {
        let mut set = full_set(10);
        // Heart rate consensus from 6 minutes before the anchor.
        set.retain(|c| c.sensor_type != SensorType::HeartRate);
        set.push(consensus(SensorType::HeartRate, 72.0, 4));
        let result = assemble_vitals(&set, at(10, 30), Duration::minutes(5)).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_invalid_consensus_ignored() {
        let mut set = full_set(10);
        for c in &mut set {
            if c.sensor_type == SensorType::Spo2 {
                c.valid = false;
                c.method = ConsensusMethod::None;
            }
        }
        let result = assemble_vitals(&set, at(10, 30), Duration::minutes(5)).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_freshest_per_type_wins() {
        let mut set = full_set(8);
        set.extend(full_set(10));
        set.push(consensus(SensorType::HeartRate, 90.0, 11));
        let vitals = assemble_vitals(&set, at(11, 30), Duration::minutes(5))
            .unwrap()
            .unwrap();
        assert_eq!(vitals.heart_rate, 90.0);
    }

    #[test]
    fn test_corrupt_consciousness_code_rejected() {
        let mut set = full_set(10);
        for c in &mut set {
            if c.sensor_type == SensorType::Consciousness {
                c.consensus_value = 7.0;
            }
        }
        assert!(assemble_vitals(&set, at(10, 30), Duration::minutes(5)).is_err());
    }
}
