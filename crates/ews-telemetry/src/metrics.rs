//! Prometheus metrics for the pipeline.
//!
//! One registry for the whole process; the three services are few enough
//! that a central counter set beats per-crate registries.

use lazy_static::lazy_static;
use prometheus::{
    register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec, Registry,
};

use crate::TelemetryError;

lazy_static! {
    /// Sensor readings accepted by ingestion.
    pub static ref READINGS_INGESTED: IntCounter = register_int_counter!(
        "ews_readings_ingested_total",
        "Sensor readings accepted by the ingestion service"
    )
    .expect("metric registration");

    /// Sensor-value consensus rounds completed, labelled by method.
    pub static ref SENSOR_CONSENSUS_ROUNDS: IntCounterVec = register_int_counter_vec!(
        "ews_sensor_consensus_rounds_total",
        "Sensor-value consensus rounds completed",
        &["method"]
    )
    .expect("metric registration");

    /// NEWS2 calculations performed.
    pub static ref SCORES_CALCULATED: IntCounter = register_int_counter!(
        "ews_scores_calculated_total",
        "NEWS2 calculations performed"
    )
    .expect("metric registration");

    /// Score consensus rounds completed, labelled by method.
    pub static ref SCORE_CONSENSUS_ROUNDS: IntCounterVec = register_int_counter_vec!(
        "ews_score_consensus_rounds_total",
        "Score consensus rounds completed",
        &["method"]
    )
    .expect("metric registration");

    /// Read-model projections applied.
    pub static ref READ_MODEL_UPDATES: IntCounter = register_int_counter!(
        "ews_read_model_updates_total",
        "Patient read-model projections applied"
    )
    .expect("metric registration");

    /// Alerts raised, labelled by type.
    pub static ref ALERTS_RAISED: IntCounterVec = register_int_counter_vec!(
        "ews_alerts_raised_total",
        "Alerts raised",
        &["alert_type"]
    )
    .expect("metric registration");

    /// Notifications successfully handed to a channel.
    pub static ref NOTIFICATIONS_SENT: IntCounter = register_int_counter!(
        "ews_notifications_sent_total",
        "Notifications successfully sent"
    )
    .expect("metric registration");

    /// Notification channel failures.
    pub static ref NOTIFICATIONS_FAILED: IntCounter = register_int_counter!(
        "ews_notifications_failed_total",
        "Notification deliveries that failed"
    )
    .expect("metric registration");

    /// Bus messages published.
    pub static ref BUS_MESSAGES_PUBLISHED: IntCounter = register_int_counter!(
        "ews_bus_messages_published_total",
        "Messages published to the event bus"
    )
    .expect("metric registration");

    /// Bus messages consumed (post-dedup).
    pub static ref BUS_MESSAGES_RECEIVED: IntCounter = register_int_counter!(
        "ews_bus_messages_received_total",
        "Messages consumed from the event bus"
    )
    .expect("metric registration");

    /// Errors per service, labelled by service and kind.
    pub static ref SERVICE_ERRORS: IntCounterVec = register_int_counter_vec!(
        "ews_service_errors_total",
        "Errors encountered per service",
        &["service", "kind"]
    )
    .expect("metric registration");
}

/// Handle proving the metric set was touched at startup.
pub struct MetricsHandle {
    _private: (),
}

/// Force-register all metrics against the default registry.
///
/// The lazy statics self-register on first touch; calling this at startup
/// makes registration failures surface immediately instead of on the first
/// scrape.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    lazy_static::initialize(&READINGS_INGESTED);
    lazy_static::initialize(&SENSOR_CONSENSUS_ROUNDS);
    lazy_static::initialize(&SCORES_CALCULATED);
    lazy_static::initialize(&SCORE_CONSENSUS_ROUNDS);
    lazy_static::initialize(&READ_MODEL_UPDATES);
    lazy_static::initialize(&ALERTS_RAISED);
    lazy_static::initialize(&NOTIFICATIONS_SENT);
    lazy_static::initialize(&NOTIFICATIONS_FAILED);
    lazy_static::initialize(&BUS_MESSAGES_PUBLISHED);
    lazy_static::initialize(&BUS_MESSAGES_RECEIVED);
    lazy_static::initialize(&SERVICE_ERRORS);

    Ok(MetricsHandle { _private: () })
}

/// The default registry all pipeline metrics are registered against.
#[must_use]
pub fn registry() -> Registry {
    prometheus::default_registry().clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_increment() {
        let _handle = register_metrics().unwrap();

        let before = READINGS_INGESTED.get();
        READINGS_INGESTED.inc();
        assert_eq!(READINGS_INGESTED.get(), before + 1);

        SENSOR_CONSENSUS_ROUNDS.with_label_values(&["majority"]).inc();
        assert!(
            SENSOR_CONSENSUS_ROUNDS
                .with_label_values(&["majority"])
                .get()
                >= 1
        );
    }
}
