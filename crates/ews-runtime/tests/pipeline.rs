//! End-to-end scenarios over the fully wired container.
//!
//! Readings and commands enter through the public service APIs; alerts
//! and notifications are observed through the alerting queries after the
//! bus choreography has run.

use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use ews_02_scoring::{CalculateCommand, ScoringApi};
use ews_03_alerting::{
    Alert, AlertApi, AlertQuery, ChannelKind, NotificationQuery, NotificationStatus,
    SubscriberType, Subscription, SubscriptionChannel,
};
use ews_01_ingestion::IngestionApi;
use ews_runtime::{AppConfig, Container};
use shared_types::{
    AlertSeverity, AlertType, ClinicalRisk, Consciousness, ConsensusMethod, PatientId,
    SensorReading, SensorType, VitalSigns,
};
use std::time::Duration;
use uuid::Uuid;

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

fn at(secs: i64) -> DateTime<Utc> {
    base() + ChronoDuration::seconds(secs)
}

fn reading(node: &str, sensor: SensorType, value: f64, secs: i64) -> SensorReading {
    SensorReading::new(PatientId::new("P1"), sensor, value, at(secs), node)
}

fn command(node: &str, vitals: VitalSigns, secs: i64) -> CalculateCommand {
    CalculateCommand {
        patient_id: PatientId::new("P1"),
        node_id: node.into(),
        vital_signs: vitals,
        observed_at: Some(at(secs)),
        validated: false,
        metadata: serde_json::Value::Null,
        correlation_id: None,
    }
}

fn normal_vitals() -> VitalSigns {
    VitalSigns {
        respiratory_rate: 18.0,
        oxygen_saturation: 96.0,
        temperature: 37.1,
        systolic_bp: 125.0,
        heart_rate: 72.0,
        consciousness: Consciousness::Alert,
    }
}

/// A vector scoring 5 (Medium risk).
fn medium_vitals() -> VitalSigns {
    VitalSigns {
        respiratory_rate: 22.0,
        oxygen_saturation: 94.0,
        temperature: 37.0,
        systolic_bp: 105.0,
        heart_rate: 95.0,
        consciousness: Consciousness::Alert,
    }
}

/// Poll the alert list until `predicate` holds or two seconds elapse.
async fn wait_for_alerts(
    container: &Container,
    predicate: impl Fn(&[Alert]) -> bool,
) -> Vec<Alert> {
    for _ in 0..100 {
        let alerts = container
            .alerting
            .list_alerts(AlertQuery::default())
            .await
            .expect("alert query");
        if predicate(&alerts) {
            return alerts;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    container
        .alerting
        .list_alerts(AlertQuery::default())
        .await
        .expect("alert query")
}

#[tokio::test]
async fn scenario_normal_vitals_score_zero_no_alert() {
    let container = Container::build(&AppConfig::default()).unwrap();

    let receipt = container
        .scoring
        .calculate(command("node-1", normal_vitals(), 0))
        .await
        .unwrap();

    assert_eq!(receipt.total_score, 0);
    assert_eq!(receipt.clinical_risk, ClinicalRisk::Low);
    assert!(receipt.consensus.is_none());

    tokio::time::sleep(Duration::from_millis(100)).await;
    let alerts = container
        .alerting
        .list_alerts(AlertQuery::default())
        .await
        .unwrap();
    assert!(alerts.is_empty());

    container.shutdown();
}

#[tokio::test]
async fn scenario_two_nodes_heart_rate_majority() {
    let container = Container::build(&AppConfig::default()).unwrap();

    let first = container
        .ingestion
        .ingest_reading(reading("node-1", SensorType::HeartRate, 72.0, 0))
        .await
        .unwrap();
    assert!(first.is_none());

    let consensus = container
        .ingestion
        .ingest_reading(reading("node-2", SensorType::HeartRate, 72.0, 1))
        .await
        .unwrap()
        .expect("two agreeing nodes form a consensus");

    assert_eq!(consensus.consensus_value, 72.0);
    assert_eq!(consensus.method, ConsensusMethod::Majority);
    assert!(consensus.valid);

    container.shutdown();
}

#[tokio::test]
async fn scenario_temperature_majority_two_of_three() {
    let container = Container::build(&AppConfig::default()).unwrap();

    container
        .ingestion
        .ingest_reading(reading("node-1", SensorType::Temperature, 37.2, 0))
        .await
        .unwrap();
    container
        .ingestion
        .ingest_reading(reading("node-2", SensorType::Temperature, 37.2, 1))
        .await
        .unwrap();
    let consensus = container
        .ingestion
        .ingest_reading(reading("node-3", SensorType::Temperature, 39.5, 2))
        .await
        .unwrap()
        .expect("three readings run a round");

    assert_eq!(consensus.method, ConsensusMethod::Majority);
    assert_eq!(consensus.consensus_value, 37.2);

    container.shutdown();
}

#[tokio::test]
async fn scenario_sensor_disagreement_raises_warning() {
    let container = Container::build(&AppConfig::default()).unwrap();

    // Three nodes far outside the 20% tolerance of their mean.
    container
        .ingestion
        .ingest_reading(reading("node-1", SensorType::HeartRate, 60.0, 0))
        .await
        .unwrap();
    container
        .ingestion
        .ingest_reading(reading("node-2", SensorType::HeartRate, 100.0, 1))
        .await
        .unwrap();
    let consensus = container
        .ingestion
        .ingest_reading(reading("node-3", SensorType::HeartRate, 140.0, 2))
        .await
        .unwrap()
        .expect("three readings run a round");

    assert!(!consensus.valid);
    assert_eq!(consensus.method, ConsensusMethod::None);

    let alerts = wait_for_alerts(&container, |alerts| !alerts.is_empty()).await;
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].alert_type, AlertType::SensorWarning);
    assert_eq!(alerts[0].alert_severity, AlertSeverity::Medium);
    assert_eq!(alerts[0].priority, 58);

    container.shutdown();
}

#[tokio::test]
async fn scenario_two_nodes_score_five_urgent_alert() {
    let container = Container::build(&AppConfig::default()).unwrap();

    container
        .scoring
        .calculate(command("node-1", medium_vitals(), 0))
        .await
        .unwrap();
    let receipt = container
        .scoring
        .calculate(command("node-2", medium_vitals(), 1))
        .await
        .unwrap();

    let consensus = receipt.consensus.expect("two nodes reach a score consensus");
    assert_eq!(consensus.consensus_score, 5);
    assert_eq!(consensus.method, ConsensusMethod::Majority);
    assert!(consensus.valid);

    // Read model reflects the consensus.
    let model = container
        .scoring
        .latest(&PatientId::new("P1"))
        .await
        .unwrap()
        .expect("read model projected");
    assert_eq!(model.current_score, 5);
    assert_eq!(model.clinical_risk, ClinicalRisk::Medium);

    // Alert classified and prioritised.
    let alerts = wait_for_alerts(&container, |alerts| !alerts.is_empty()).await;
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].alert_type, AlertType::EwsUrgent);
    assert_eq!(alerts[0].alert_severity, AlertSeverity::Medium);
    assert_eq!(alerts[0].priority, 65);

    container.shutdown();
}

#[tokio::test]
async fn scenario_divergent_scores_data_inconsistency() {
    let container = Container::build(&AppConfig::default()).unwrap();

    let low = VitalSigns {
        respiratory_rate: 21.0, // 2
        oxygen_saturation: 96.0,
        temperature: 37.0,
        systolic_bp: 105.0, // 1
        heart_rate: 72.0,
        consciousness: Consciousness::Alert,
    }; // total 3
    let high = VitalSigns {
        respiratory_rate: 25.0,  // 3
        oxygen_saturation: 93.0, // 2
        temperature: 37.0,
        systolic_bp: 100.0, // 2
        heart_rate: 95.0,   // 1
        consciousness: Consciousness::Alert,
    }; // total 8

    container
        .scoring
        .calculate(command("node-1", low, 0))
        .await
        .unwrap();
    let receipt = container
        .scoring
        .calculate(command("node-2", high, 1))
        .await
        .unwrap();

    let consensus = receipt.consensus.expect("round ran");
    assert!(!consensus.valid);
    assert_eq!(consensus.method, ConsensusMethod::None);
    assert_eq!(consensus.consensus_score, 6);

    let alerts = wait_for_alerts(&container, |alerts| !alerts.is_empty()).await;
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].alert_type, AlertType::EwsDataInconsistency);
    assert_eq!(alerts[0].alert_severity, AlertSeverity::Medium);
    assert_eq!(alerts[0].priority, 50);

    container.shutdown();
}

#[tokio::test]
async fn scenario_subscription_matching_and_notification() {
    let container = Container::build(&AppConfig::default()).unwrap();

    // Matches: active STAFF, minSeverity LOW, all types.
    container
        .alerting
        .create_subscription(Subscription {
            subscription_id: Uuid::new_v4(),
            subscriber_type: SubscriberType::Staff,
            subscriber_id: "staff-open".into(),
            patient_id: None,
            alert_types: vec![],
            min_severity: AlertSeverity::Low,
            channels: vec![SubscriptionChannel {
                kind: ChannelKind::Email,
                contact: "ward@example.org".into(),
                enabled: true,
            }],
            active: true,
        })
        .await
        .unwrap();

    // Does not match an EWS_CRITICAL alert: type list excludes it.
    container
        .alerting
        .create_subscription(Subscription {
            subscription_id: Uuid::new_v4(),
            subscriber_type: SubscriberType::Staff,
            subscriber_id: "staff-narrow".into(),
            patient_id: None,
            alert_types: vec![AlertType::EwsUrgent],
            min_severity: AlertSeverity::High,
            channels: vec![SubscriptionChannel {
                kind: ChannelKind::Email,
                contact: "other@example.org".into(),
                enabled: true,
            }],
            active: true,
        })
        .await
        .unwrap();

    // A critical vector (score >= 7) from two nodes.
    let critical = VitalSigns {
        respiratory_rate: 26.0,  // 3
        oxygen_saturation: 93.0, // 2
        temperature: 37.0,
        systolic_bp: 100.0, // 2
        heart_rate: 95.0,   // 1
        consciousness: Consciousness::Alert,
    }; // total 8
    container
        .scoring
        .calculate(command("node-1", critical.clone(), 0))
        .await
        .unwrap();
    container
        .scoring
        .calculate(command("node-2", critical, 1))
        .await
        .unwrap();

    let alerts = wait_for_alerts(&container, |alerts| !alerts.is_empty()).await;
    assert_eq!(alerts[0].alert_type, AlertType::EwsCritical);
    assert_eq!(alerts[0].priority, 100);

    // Exactly one notification: the narrow subscription did not match.
    let notifications = container
        .alerting
        .list_notifications(NotificationQuery::default())
        .await
        .unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].recipient, "ward@example.org");
    assert_eq!(notifications[0].status, NotificationStatus::Sent);

    container.shutdown();
}

#[tokio::test]
async fn scenario_full_pipeline_from_readings_to_alert() {
    let container = Container::build(&AppConfig::default()).unwrap();

    // Two nodes agree on a full vector scoring 5; the second reading of
    // each pair forms the sensor consensus.
    let vitals: [(SensorType, f64); 6] = [
        (SensorType::RespRate, 22.0),
        (SensorType::Spo2, 94.0),
        (SensorType::Temperature, 37.0),
        (SensorType::BpSystolic, 105.0),
        (SensorType::HeartRate, 95.0),
        (SensorType::Consciousness, 0.0),
    ];
    for (index, (sensor, value)) in vitals.iter().enumerate() {
        let t = index as i64 * 2;
        container
            .ingestion
            .ingest_reading(reading("node-1", *sensor, *value, t))
            .await
            .unwrap();
        container
            .ingestion
            .ingest_reading(reading("node-2", *sensor, *value, t + 1))
            .await
            .unwrap();
    }

    // The completed vector triggered one per-node calculation.
    let events = container
        .scoring
        .events(ews_02_scoring::EventQuery::default())
        .await
        .unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].total_score, 5);

    // A fresh heart-rate round triggers a second calculation; its window
    // holds both score events and the consensus projects the read model.
    container
        .ingestion
        .ingest_reading(reading("node-1", SensorType::HeartRate, 95.0, 14))
        .await
        .unwrap();
    container
        .ingestion
        .ingest_reading(reading("node-2", SensorType::HeartRate, 95.0, 15))
        .await
        .unwrap();

    let model = container
        .scoring
        .latest(&PatientId::new("P1"))
        .await
        .unwrap()
        .expect("read model projected from the ingestion path");
    assert_eq!(model.current_score, 5);
    assert_eq!(model.clinical_risk, ClinicalRisk::Medium);
    assert_eq!(model.vital_signs.as_ref().unwrap().heart_rate, 95.0);

    let alerts = wait_for_alerts(&container, |alerts| {
        alerts.iter().any(|a| a.alert_type == AlertType::EwsUrgent)
    })
    .await;
    assert!(alerts.iter().any(|a| a.alert_type == AlertType::EwsUrgent));

    container.shutdown();
}
