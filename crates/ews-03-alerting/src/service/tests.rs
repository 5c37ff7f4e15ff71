use super::*;
use crate::adapters::{
    InMemoryAlertStore, InMemoryNotificationStore, InMemorySubscriptionStore, RecordingChannel,
};
use crate::domain::{ChannelKind, NotificationStatus, SubscriberType, SubscriptionChannel};
use chrono::Utc;
use shared_types::{
    AlertSeverity, AlertType, ClinicalRisk, ConsensusMethod, PatientId,
};

// Mock implementations for testing

#[derive(Default)]
struct MockBus {
    raised: parking_lot::Mutex<Vec<Uuid>>,
}

#[async_trait]
impl AlertEventBus for MockBus {
    async fn publish_alert_raised(&self, alert: &Alert) -> Result<(), String> {
        self.raised.lock().push(alert.alert_id);
        Ok(())
    }
}

type TestService = AlertService<
    InMemoryAlertStore,
    InMemorySubscriptionStore,
    InMemoryNotificationStore,
    MockBus,
>;

struct Harness {
    service: TestService,
    subscriptions: Arc<InMemorySubscriptionStore>,
    email: Arc<RecordingChannel>,
    sms: Arc<RecordingChannel>,
    bus: Arc<MockBus>,
}

fn harness() -> Harness {
    let alerts = Arc::new(InMemoryAlertStore::new());
    let subscriptions = Arc::new(InMemorySubscriptionStore::new());
    let notifications = Arc::new(InMemoryNotificationStore::new());
    let bus = Arc::new(MockBus::default());
    let email = Arc::new(RecordingChannel::new(ChannelKind::Email));
    let sms = Arc::new(RecordingChannel::new(ChannelKind::Sms));

    let service = AlertService::new(AlertDependencies {
        alerts,
        subscriptions: subscriptions.clone(),
        notifications,
        bus: bus.clone(),
        channels: vec![email.clone(), sms.clone()],
    });

    Harness {
        service,
        subscriptions,
        email,
        sms,
        bus,
    }
}

fn subscription(
    subscriber_type: SubscriberType,
    min_severity: AlertSeverity,
    alert_types: Vec<AlertType>,
) -> Subscription {
    Subscription {
        subscription_id: Uuid::new_v4(),
        subscriber_type,
        subscriber_id: "sub-1".into(),
        patient_id: None,
        alert_types,
        min_severity,
        channels: vec![SubscriptionChannel {
            kind: ChannelKind::Email,
            contact: "ward@example.org".into(),
            enabled: true,
        }],
        active: true,
    }
}

fn score_consensus(score: u8, valid: bool) -> ScoreConsensus {
    ScoreConsensus {
        consensus_id: Uuid::new_v4(),
        patient_id: PatientId::new("P1"),
        node_scores: vec![],
        consensus_score: score,
        clinical_risk: ClinicalRisk::from_total(score),
        consensus_at: Utc::now(),
        valid,
        method: if valid {
            ConsensusMethod::Majority
        } else {
            ConsensusMethod::None
        },
    }
}

#[tokio::test]
async fn test_urgent_consensus_raises_priority_65_alert() {
    let h = harness();
    let alert = h
        .service
        .handle_score_consensus(&score_consensus(5, true))
        .await
        .unwrap()
        .expect("score 5 raises an alert");

    assert_eq!(alert.alert_type, AlertType::EwsUrgent);
    assert_eq!(alert.alert_severity, AlertSeverity::Medium);
    assert_eq!(alert.priority, 65);
    assert_eq!(alert.status, AlertStatus::New);
    assert_eq!(h.bus.raised.lock().len(), 1);
}

#[tokio::test]
async fn test_invalid_consensus_raises_data_inconsistency() {
    let h = harness();
    let alert = h
        .service
        .handle_score_consensus(&score_consensus(6, false))
        .await
        .unwrap()
        .expect("invalid consensus raises an alert");

    assert_eq!(alert.alert_type, AlertType::EwsDataInconsistency);
    assert_eq!(alert.priority, 50);
}

#[tokio::test]
async fn test_low_score_raises_nothing() {
    let h = harness();
    let alert = h
        .service
        .handle_score_consensus(&score_consensus(0, true))
        .await
        .unwrap();
    assert!(alert.is_none());
    assert!(h.bus.raised.lock().is_empty());
}

#[tokio::test]
async fn test_subscription_matching_one_of_two() {
    // Critical alert; an open STAFF subscription matches, a HIGH-minimum
    // subscription restricted to EWS_URGENT does not.
    let h = harness();
    h.subscriptions
        .insert_subscription(subscription(
            SubscriberType::Staff,
            AlertSeverity::Low,
            vec![],
        ))
        .await
        .unwrap();
    h.subscriptions
        .insert_subscription(subscription(
            SubscriberType::Staff,
            AlertSeverity::High,
            vec![AlertType::EwsUrgent],
        ))
        .await
        .unwrap();

    let alert = h
        .service
        .handle_score_consensus(&score_consensus(8, true))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(alert.alert_type, AlertType::EwsCritical);
    assert_eq!(alert.notification_ids.len(), 1);
    assert_eq!(h.email.delivered().len(), 1);

    let stored = h
        .service
        .list_notifications(NotificationQuery::default())
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].status, NotificationStatus::Sent);
}

#[tokio::test]
async fn test_one_notification_per_enabled_channel() {
    let h = harness();
    let mut sub = subscription(SubscriberType::Staff, AlertSeverity::Low, vec![]);
    sub.channels = vec![
        SubscriptionChannel {
            kind: ChannelKind::Email,
            contact: "ward@example.org".into(),
            enabled: true,
        },
        SubscriptionChannel {
            kind: ChannelKind::Sms,
            contact: "+4412345".into(),
            enabled: true,
        },
        SubscriptionChannel {
            kind: ChannelKind::Push,
            contact: "device-token".into(),
            enabled: false,
        },
    ];
    h.subscriptions.insert_subscription(sub).await.unwrap();

    let alert = h
        .service
        .handle_score_consensus(&score_consensus(7, true))
        .await
        .unwrap()
        .unwrap();

    // Disabled channel skipped: two notifications, not three.
    assert_eq!(alert.notification_ids.len(), 2);
    assert_eq!(h.email.delivered().len(), 1);
    assert_eq!(h.sms.delivered().len(), 1);
}

#[tokio::test]
async fn test_failed_delivery_recorded_and_resendable() {
    let h = harness();
    h.subscriptions
        .insert_subscription(subscription(
            SubscriberType::Staff,
            AlertSeverity::Low,
            vec![],
        ))
        .await
        .unwrap();
    h.email.fail_with("smtp down");

    let alert = h
        .service
        .handle_score_consensus(&score_consensus(7, true))
        .await
        .unwrap()
        .unwrap();

    let stored = h
        .service
        .list_notifications(NotificationQuery {
            alert_id: Some(alert.alert_id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].status, NotificationStatus::Failed);
    assert!(stored[0].error_message.as_deref() == Some("smtp down"));

    // Resend after the transport recovers: same id, SENT.
    h.email.succeed();
    let resent = h
        .service
        .resend_notification(stored[0].notification_id)
        .await
        .unwrap();
    assert_eq!(resent.notification_id, stored[0].notification_id);
    assert_eq!(resent.status, NotificationStatus::Sent);
}

#[tokio::test]
async fn test_resend_rejected_for_sent() {
    let h = harness();
    h.subscriptions
        .insert_subscription(subscription(
            SubscriberType::Staff,
            AlertSeverity::Low,
            vec![],
        ))
        .await
        .unwrap();

    let alert = h
        .service
        .handle_score_consensus(&score_consensus(7, true))
        .await
        .unwrap()
        .unwrap();
    let notification_id = alert.notification_ids[0];

    let result = h.service.resend_notification(notification_id).await;
    assert!(matches!(result, Err(AlertError::InvalidTransition(_))));
}

#[tokio::test]
async fn test_escalation_renotifies_department_tier() {
    let h = harness();
    // Staff subscription hears the initial alert; the department tier
    // only hears the escalation.
    h.subscriptions
        .insert_subscription(subscription(
            SubscriberType::Staff,
            AlertSeverity::Low,
            vec![],
        ))
        .await
        .unwrap();
    let mut dept = subscription(SubscriberType::Department, AlertSeverity::High, vec![]);
    dept.channels[0].contact = "icu@example.org".into();
    h.subscriptions.insert_subscription(dept).await.unwrap();

    let alert = h
        .service
        .handle_score_consensus(&score_consensus(5, true))
        .await
        .unwrap()
        .unwrap();
    // Department minSeverity HIGH does not match the MEDIUM alert.
    assert_eq!(alert.notification_ids.len(), 1);
    assert_eq!(alert.priority, 65);

    let escalated = h
        .service
        .escalate(alert.alert_id, Some("no response in 10 min".into()))
        .await
        .unwrap();

    assert_eq!(escalated.status, AlertStatus::Escalated);
    assert_eq!(escalated.priority, 75);
    assert_eq!(escalated.notification_ids.len(), 2);

    let recipients: Vec<String> = h
        .email
        .delivered()
        .iter()
        .map(|n| n.recipient.clone())
        .collect();
    assert!(recipients.contains(&"icu@example.org".to_string()));
}

#[tokio::test]
async fn test_escalate_resolved_rejected() {
    let h = harness();
    let alert = h
        .service
        .handle_score_consensus(&score_consensus(7, true))
        .await
        .unwrap()
        .unwrap();

    h.service
        .resolve(alert.alert_id, "nurse-1", None)
        .await
        .unwrap();

    let result = h.service.escalate(alert.alert_id, None).await;
    assert!(matches!(result, Err(AlertError::InvalidTransition(_))));
}

#[tokio::test]
async fn test_lifecycle_via_api() {
    let h = harness();
    let alert = h
        .service
        .handle_score_consensus(&score_consensus(7, true))
        .await
        .unwrap()
        .unwrap();

    let acked = h
        .service
        .acknowledge(alert.alert_id, "nurse-1")
        .await
        .unwrap();
    assert_eq!(acked.status, AlertStatus::Acknowledged);
    assert_eq!(acked.acknowledged_by.as_deref(), Some("nurse-1"));

    // Second acknowledge is an invalid transition.
    assert!(matches!(
        h.service.acknowledge(alert.alert_id, "nurse-2").await,
        Err(AlertError::InvalidTransition(_))
    ));

    let resolved = h
        .service
        .resolve(alert.alert_id, "nurse-1", Some("treated".into()))
        .await
        .unwrap();
    assert_eq!(resolved.status, AlertStatus::Resolved);
    assert_eq!(resolved.resolution.as_deref(), Some("treated"));
}

#[tokio::test]
async fn test_list_alerts_priority_order_and_filters() {
    let h = harness();
    h.service
        .handle_score_consensus(&score_consensus(3, true))
        .await
        .unwrap();
    h.service
        .handle_score_consensus(&score_consensus(8, true))
        .await
        .unwrap();

    let all = h.service.list_alerts(AlertQuery::default()).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].alert_type, AlertType::EwsCritical);
    assert!(all[0].priority > all[1].priority);

    let high_only = h
        .service
        .list_alerts(AlertQuery {
            severity: Some(AlertSeverity::High),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(high_only.len(), 1);
}

#[tokio::test]
async fn test_subscription_crud() {
    let h = harness();
    let sub = subscription(SubscriberType::Staff, AlertSeverity::Low, vec![]);
    let id = sub.subscription_id;

    h.service.create_subscription(sub.clone()).await.unwrap();
    assert!(h.service.get_subscription(id).await.unwrap().is_some());

    let mut updated = sub.clone();
    updated.active = false;
    h.service.update_subscription(updated).await.unwrap();
    assert!(!h.service.get_subscription(id).await.unwrap().unwrap().active);

    h.service.delete_subscription(id).await.unwrap();
    assert!(h.service.get_subscription(id).await.unwrap().is_none());
    assert!(matches!(
        h.service.delete_subscription(id).await,
        Err(AlertError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_subscription_without_channels_rejected() {
    let h = harness();
    let mut sub = subscription(SubscriberType::Staff, AlertSeverity::Low, vec![]);
    sub.channels.clear();
    assert!(matches!(
        h.service.create_subscription(sub).await,
        Err(AlertError::Validation(_))
    ));
}

#[tokio::test]
async fn test_sensor_consensus_warning() {
    let h = harness();
    let consensus = shared_types::SensorConsensus {
        consensus_id: Uuid::new_v4(),
        patient_id: PatientId::new("P1"),
        sensor_type: shared_types::SensorType::Temperature,
        participating: vec![],
        consensus_value: 37.9,
        consensus_at: Utc::now(),
        valid: false,
        method: ConsensusMethod::None,
    };

    let alert = h
        .service
        .handle_sensor_consensus(&consensus)
        .await
        .unwrap()
        .expect("invalid sensor consensus raises a warning");
    assert_eq!(alert.alert_type, AlertType::SensorWarning);
    assert_eq!(alert.priority, 58);

    let mut valid = consensus;
    valid.valid = true;
    valid.method = ConsensusMethod::Majority;
    assert!(h
        .service
        .handle_sensor_consensus(&valid)
        .await
        .unwrap()
        .is_none());
}
