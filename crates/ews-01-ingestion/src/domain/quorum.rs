//! Fan-in quorum resolution over windowed sensor readings.
//!
//! The ladder, in order:
//!
//! 1. One participant after latest-per-node dedup → `single`.
//! 2. Participants spread wider than the agreement span → `latest`
//!    (clock skew, not disagreement; stale points must not form quorum).
//! 3. A value held by a strict majority → `majority`.
//! 4. All values within relative tolerance of the mean → `average`.
//! 5. Otherwise → `none` with `valid = false`; the mean is still recorded
//!    so downstream can display it without trusting it.

use chrono::{DateTime, Duration, Utc};
use shared_types::{ConsensusMethod, ParticipatingReading, SensorReading};
use std::collections::HashMap;

/// The outcome of one quorum round.
#[derive(Debug, Clone, PartialEq)]
pub struct QuorumOutcome {
    /// The agreed (or fallback) value. Always populated.
    pub value: f64,
    /// Timestamp attributed to the outcome: the winning reading's
    /// observation time, or the latest participant for mean-based paths.
    pub at: DateTime<Utc>,
    /// How the value was reached.
    pub method: ConsensusMethod,
    /// Whether the value is usable downstream.
    pub valid: bool,
}

/// Reduce windowed readings to at most one participant per node, keeping
/// the latest observation of each.
#[must_use]
pub fn latest_per_node(readings: &[SensorReading]) -> Vec<ParticipatingReading> {
    let mut latest: HashMap<&str, &SensorReading> = HashMap::new();
    for reading in readings {
        latest
            .entry(reading.node_id.as_str())
            .and_modify(|current| {
                if reading.observed_at > current.observed_at {
                    *current = reading;
                }
            })
            .or_insert(reading);
    }

    let mut participants: Vec<ParticipatingReading> = latest
        .into_values()
        .map(|r| ParticipatingReading {
            node_id: r.node_id.clone(),
            value: r.value,
            observed_at: r.observed_at,
        })
        .collect();
    // Deterministic order for grouping and persistence.
    participants.sort_by(|a, b| {
        a.observed_at
            .cmp(&b.observed_at)
            .then_with(|| a.node_id.as_str().cmp(b.node_id.as_str()))
    });
    participants
}

/// Run the quorum ladder over deduplicated participants.
///
/// `participants` must be sorted ascending by observation time (as
/// produced by [`latest_per_node`]). Returns `None` for empty input.
#[must_use]
pub fn resolve(
    participants: &[ParticipatingReading],
    agreement_span: Duration,
    value_tolerance: f64,
) -> Option<QuorumOutcome> {
    let latest = participants.last()?;

    if participants.len() == 1 {
        return Some(QuorumOutcome {
            value: latest.value,
            at: latest.observed_at,
            method: ConsensusMethod::Single,
            valid: true,
        });
    }

    let earliest = &participants[0];
    let time_range = latest.observed_at - earliest.observed_at;
    if time_range > agreement_span {
        return Some(QuorumOutcome {
            value: latest.value,
            at: latest.observed_at,
            method: ConsensusMethod::Latest,
            valid: true,
        });
    }

    // Group by exact value. Bit patterns make f64 usable as a key; the
    // values being grouped came off the wire unmodified, so equal readings
    // have equal bits.
    let mut groups: HashMap<u64, (usize, DateTime<Utc>, f64)> = HashMap::new();
    for p in participants {
        let entry = groups
            .entry(p.value.to_bits())
            .or_insert((0, p.observed_at, p.value));
        entry.0 += 1;
        if p.observed_at > entry.1 {
            entry.1 = p.observed_at;
        }
    }

    let (majority_count, majority_at, majority_value) = groups
        .values()
        .max_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)))
        .copied()?;

    if majority_count * 2 > participants.len() {
        return Some(QuorumOutcome {
            value: majority_value,
            at: majority_at,
            method: ConsensusMethod::Majority,
            valid: true,
        });
    }

    let avg =
        participants.iter().map(|p| p.value).sum::<f64>() / participants.len() as f64;

    let within_tolerance = if avg == 0.0 {
        participants.iter().all(|p| p.value == 0.0)
    } else {
        participants
            .iter()
            .all(|p| ((p.value - avg) / avg).abs() <= value_tolerance)
    };

    Some(if within_tolerance {
        QuorumOutcome {
            value: avg,
            at: latest.observed_at,
            method: ConsensusMethod::Average,
            valid: true,
        }
    } else {
        QuorumOutcome {
            value: avg,
            at: latest.observed_at,
            method: ConsensusMethod::None,
            valid: false,
        }
    })
}
