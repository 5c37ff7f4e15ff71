//! Fan-in quorum over per-node score events.
//!
//! Mirrors the sensor-value ladder but groups on the integer NEWS2 total
//! and measures the average fallback with an ABSOLUTE threshold: a
//! one-point spread between nodes is agreement, a wider spread is a data
//! inconsistency regardless of the score's magnitude.

use chrono::{DateTime, Duration, Utc};
use shared_types::{ConsensusMethod, ScoreEvent};
use std::collections::HashMap;

/// The outcome of one score-quorum round.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreQuorumOutcome {
    /// The agreed NEWS2 total (rounded mean for mean-based paths).
    pub score: u8,
    /// Timestamp attributed to the outcome.
    pub at: DateTime<Utc>,
    /// How the score was reached.
    pub method: ConsensusMethod,
    /// Whether the score is usable downstream.
    pub valid: bool,
}

/// Reduce windowed score events to the latest per node, ascending by
/// observation time.
#[must_use]
pub fn score_latest_per_node(events: &[ScoreEvent]) -> Vec<ScoreEvent> {
    let mut latest: HashMap<&str, &ScoreEvent> = HashMap::new();
    for event in events {
        latest
            .entry(event.node_id.as_str())
            .and_modify(|current| {
                if event.observed_at > current.observed_at {
                    *current = event;
                }
            })
            .or_insert(event);
    }

    let mut participants: Vec<ScoreEvent> = latest.into_values().cloned().collect();
    participants.sort_by(|a, b| {
        a.observed_at
            .cmp(&b.observed_at)
            .then_with(|| a.node_id.as_str().cmp(b.node_id.as_str()))
    });
    participants
}

/// Run the quorum ladder over deduplicated score events.
///
/// `participants` must be sorted ascending by observation time (as
/// produced by [`score_latest_per_node`]). Returns `None` for empty input.
#[must_use]
pub fn resolve_scores(
    participants: &[ScoreEvent],
    agreement_span: Duration,
    score_threshold: f64,
) -> Option<ScoreQuorumOutcome> {
    let latest = participants.last()?;

    if participants.len() == 1 {
        return Some(ScoreQuorumOutcome {
            score: latest.total_score,
            at: latest.observed_at,
            method: ConsensusMethod::Single,
            valid: true,
        });
    }

    let earliest = &participants[0];
    if latest.observed_at - earliest.observed_at > agreement_span {
        return Some(ScoreQuorumOutcome {
            score: latest.total_score,
            at: latest.observed_at,
            method: ConsensusMethod::Latest,
            valid: true,
        });
    }

    let mut groups: HashMap<u8, (usize, DateTime<Utc>)> = HashMap::new();
    for event in participants {
        let entry = groups
            .entry(event.total_score)
            .or_insert((0, event.observed_at));
        entry.0 += 1;
        if event.observed_at > entry.1 {
            entry.1 = event.observed_at;
        }
    }

    let (&majority_score, &(majority_count, majority_at)) = groups
        .iter()
        .max_by(|a, b| a.1 .0.cmp(&b.1 .0).then(a.1 .1.cmp(&b.1 .1)))?;

    if majority_count * 2 > participants.len() {
        return Some(ScoreQuorumOutcome {
            score: majority_score,
            at: majority_at,
            method: ConsensusMethod::Majority,
            valid: true,
        });
    }

    let avg = participants
        .iter()
        .map(|e| f64::from(e.total_score))
        .sum::<f64>()
        / participants.len() as f64;
    // Round half away from zero; deviations are measured against the
    // rounded value the record will actually carry.
    let rounded = avg.round();

    let within_threshold = participants
        .iter()
        .all(|e| (f64::from(e.total_score) - rounded).abs() <= score_threshold);

    Some(ScoreQuorumOutcome {
        score: rounded as u8,
        at: latest.observed_at,
        method: if within_threshold {
            ConsensusMethod::Average
        } else {
            ConsensusMethod::None
        },
        valid: within_threshold,
    })
}

/// Pick the participating event whose vitals become authoritative for a
/// consensus: the first (by observation time) event whose total equals the
/// consensus score, falling back to the first participant when no total
/// matches (mean-based outcomes).
#[must_use]
pub fn authoritative_event(participants: &[ScoreEvent], consensus_score: u8) -> Option<&ScoreEvent> {
    participants
        .iter()
        .find(|e| e.total_score == consensus_score)
        .or_else(|| participants.first())
}
