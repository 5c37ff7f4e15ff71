//! Scoring configuration.

/// Tunables for the score-consensus engine and the read-model projector.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    /// Minimum raw score events inside the window before a consensus round
    /// runs.
    pub min_window_events: usize,

    /// Window lookback from the triggering event's timestamp, seconds.
    pub window_lookback_secs: i64,

    /// Forward grace beyond the triggering timestamp, seconds.
    pub window_grace_secs: i64,

    /// Maximum spread between participants for score agreement, seconds.
    pub agreement_span_secs: i64,

    /// Absolute tolerance for the average fallback
    /// (`|score − round(mean)| ≤ threshold`).
    pub score_threshold: f64,

    /// Read-model history ring size.
    pub history_limit: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            min_window_events: 2,
            window_lookback_secs: 30,
            window_grace_secs: 5,
            agreement_span_secs: 5,
            score_threshold: 1.0,
            history_limit: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScoringConfig::default();
        assert_eq!(config.window_lookback_secs, 30);
        assert_eq!(config.window_grace_secs, 5);
    }
}
