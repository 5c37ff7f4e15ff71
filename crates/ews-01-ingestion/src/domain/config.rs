//! Ingestion configuration.

/// Tunables for the sensor-value consensus engine and completeness
/// detector. Defaults encode the production windowing rules.
#[derive(Debug, Clone)]
pub struct IngestionConfig {
    /// Minimum raw readings inside the window before a consensus round
    /// runs. A single reading is silent; it is reconsidered when the next
    /// reading for the same (patient, sensor) arrives.
    pub min_window_readings: usize,

    /// Window lookback from the triggering reading's timestamp, seconds.
    pub window_lookback_secs: i64,

    /// Forward grace beyond the triggering timestamp, seconds. Absorbs
    /// clock skew between edge nodes.
    pub window_grace_secs: i64,

    /// Maximum spread between participants for value agreement, seconds.
    /// Wider spreads fall back to the latest reading.
    pub agreement_span_secs: i64,

    /// Relative tolerance for the average fallback
    /// (`|v − avg| / avg ≤ tolerance`).
    pub value_tolerance: f64,

    /// Freshness cutoff for the completeness check, seconds.
    pub freshness_secs: i64,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            min_window_readings: 2,
            window_lookback_secs: 30,
            window_grace_secs: 5,
            agreement_span_secs: 5,
            value_tolerance: 0.20,
            freshness_secs: 300,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = IngestionConfig::default();
        assert!((config.value_tolerance - 0.20).abs() < f64::EPSILON);
        assert_eq!(config.freshness_secs, 300);
        assert_eq!(config.agreement_span_secs, 5);
    }
}
