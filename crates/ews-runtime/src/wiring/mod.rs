//! # Choreography Wiring
//!
//! Connects bus subscriptions to service handlers.
//!
//! ```text
//! INGESTION (1)
//!     │
//!     ├──SensorConsensusFormed──→ [Event Bus] ──→ ALERTING (3)
//!     │                                           (invalid → SENSOR_WARNING)
//!     └──ScoreCommandGateway──→ SCORING (2)
//!                                   │
//!                                   ├──ews.calculated──→ [Event Bus]
//!                                   │
//!                                   └──ews.consensus──→ [Event Bus] ──→ ALERTING (3)
//!                                                                       (classify → dispatch)
//! ```
//!
//! The consumer loop de-duplicates on the envelope message id before
//! handing a payload to a service; handlers stay idempotent regardless,
//! because redelivery can outlive the dedup horizon.

use ews_03_alerting::AlertApi;
use ews_telemetry::{BUS_MESSAGES_RECEIVED, SERVICE_ERRORS};
use shared_bus::{EventFilter, EventTopic, EwsEvent, InMemoryEventBus};
use shared_types::EventEnvelope;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Consumer-side duplicate suppression for at-least-once delivery.
///
/// Remembers envelope message ids for the redelivery horizon the envelope
/// itself documents (`EventEnvelope::REDELIVERY_HORIZON`). The horizon
/// follows the stream's own timestamps rather than wall clock, matching
/// the rest of the pipeline's stored-time windowing: an id is forgotten
/// once messages that much newer have been seen, and a message already
/// older than the horizon is refused outright, because its id may have
/// been forgotten and duplicates can no longer be told apart.
struct RecentMessages {
    /// Seconds of stream time an id is remembered for.
    horizon_secs: u64,
    /// Newest envelope timestamp seen so far.
    newest: u64,
    /// Ids in arrival order, oldest first, for eviction.
    order: VecDeque<(u64, Uuid)>,
    /// Membership index over `order`.
    seen: HashSet<Uuid>,
}

impl RecentMessages {
    fn new() -> Self {
        Self {
            horizon_secs: EventEnvelope::<()>::REDELIVERY_HORIZON,
            newest: 0,
            order: VecDeque::new(),
            seen: HashSet::new(),
        }
    }

    /// True when this is the first delivery of a message that is still
    /// inside the horizon; such a message should be handled. False means
    /// drop: a duplicate, or too stale to check.
    fn first_delivery(&mut self, message_id: Uuid, timestamp: u64) -> bool {
        self.newest = self.newest.max(timestamp);
        let cutoff = self.newest.saturating_sub(self.horizon_secs);

        while let Some(&(ts, id)) = self.order.front() {
            if ts >= cutoff {
                break;
            }
            self.order.pop_front();
            self.seen.remove(&id);
        }

        if timestamp < cutoff {
            return false;
        }
        if !self.seen.insert(message_id) {
            return false;
        }
        self.order.push_back((timestamp, message_id));
        true
    }
}

/// Spawn the alert-side consumer: sensor and score consensuses flow into
/// the alerting service. Returns the task handle; aborting it is the
/// shutdown path.
pub fn spawn_alert_consumer<A>(bus: &InMemoryEventBus, alerting: Arc<A>) -> JoinHandle<()>
where
    A: AlertApi + 'static,
{
    let mut subscription = bus.subscribe(EventFilter::topics(vec![
        EventTopic::SensorConsensus,
        EventTopic::ScoreConsensus,
    ]));

    tokio::spawn(async move {
        info!("Alert consumer subscribed to sensor and score consensus topics");
        let mut recent = RecentMessages::new();

        while let Some(message) = subscription.recv().await {
            if !recent.first_delivery(message.message_id, message.timestamp) {
                debug!(message_id = %message.message_id, "Duplicate or stale message dropped");
                continue;
            }
            BUS_MESSAGES_RECEIVED.inc();

            let result = match &message.payload {
                EwsEvent::ScoreConsensusReached(consensus) => {
                    alerting.handle_score_consensus(consensus).await.map(|_| ())
                }
                EwsEvent::SensorConsensusFormed(consensus) => {
                    alerting.handle_sensor_consensus(consensus).await.map(|_| ())
                }
                // Filter guarantees only consensus topics arrive.
                _ => Ok(()),
            };

            if let Err(e) = result {
                // The in-memory bus has no requeue; the error is surfaced
                // and the next consensus re-derives the alert state.
                warn!(message_id = %message.message_id, error = %e, "Alert handler failed");
                SERVICE_ERRORS.with_label_values(&["alerting", "handler"]).inc();
            }
        }

        info!("Alert consumer stopped (bus closed)");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ews_03_alerting::{
        Alert, AlertQuery, AlertResult, CreateAlert, Notification, NotificationQuery, Subscription,
    };
    use shared_bus::{EventPublisher, EventPublisherExt};
    use shared_types::{
        ClinicalRisk, ConsensusMethod, PatientId, ScoreConsensus, SensorConsensus, ServiceId,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct CountingAlertApi {
        score_consensuses: AtomicUsize,
        sensor_consensuses: AtomicUsize,
    }

    #[async_trait]
    impl AlertApi for CountingAlertApi {
        async fn create_alert(&self, _: CreateAlert) -> AlertResult<Alert> {
            unimplemented!("not driven by the consumer test")
        }

        async fn handle_score_consensus(
            &self,
            _: &ScoreConsensus,
        ) -> AlertResult<Option<Alert>> {
            self.score_consensuses.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        }

        async fn handle_sensor_consensus(
            &self,
            _: &SensorConsensus,
        ) -> AlertResult<Option<Alert>> {
            self.sensor_consensuses.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        }

        async fn list_alerts(&self, _: AlertQuery) -> AlertResult<Vec<Alert>> {
            Ok(vec![])
        }
        async fn get_alert(&self, _: Uuid) -> AlertResult<Option<Alert>> {
            Ok(None)
        }
        async fn acknowledge(&self, _: Uuid, _: &str) -> AlertResult<Alert> {
            unimplemented!()
        }
        async fn resolve(&self, _: Uuid, _: &str, _: Option<String>) -> AlertResult<Alert> {
            unimplemented!()
        }
        async fn escalate(&self, _: Uuid, _: Option<String>) -> AlertResult<Alert> {
            unimplemented!()
        }
        async fn create_subscription(&self, s: Subscription) -> AlertResult<Subscription> {
            Ok(s)
        }
        async fn get_subscription(&self, _: Uuid) -> AlertResult<Option<Subscription>> {
            Ok(None)
        }
        async fn update_subscription(&self, s: Subscription) -> AlertResult<Subscription> {
            Ok(s)
        }
        async fn delete_subscription(&self, _: Uuid) -> AlertResult<()> {
            Ok(())
        }
        async fn list_subscriptions(&self) -> AlertResult<Vec<Subscription>> {
            Ok(vec![])
        }
        async fn list_notifications(
            &self,
            _: NotificationQuery,
        ) -> AlertResult<Vec<Notification>> {
            Ok(vec![])
        }
        async fn resend_notification(&self, _: Uuid) -> AlertResult<Notification> {
            unimplemented!()
        }
    }

    fn score_consensus() -> ScoreConsensus {
        ScoreConsensus {
            consensus_id: Uuid::new_v4(),
            patient_id: PatientId::new("P1"),
            node_scores: vec![],
            consensus_score: 5,
            clinical_risk: ClinicalRisk::Medium,
            consensus_at: chrono::Utc::now(),
            valid: true,
            method: ConsensusMethod::Majority,
        }
    }

    #[test]
    fn test_first_delivery_accepts_then_rejects() {
        let mut recent = RecentMessages::new();
        let id = Uuid::new_v4();

        assert!(recent.first_delivery(id, 1_000));
        assert!(!recent.first_delivery(id, 1_000));
        // A different id at the same instant is still fresh.
        assert!(recent.first_delivery(Uuid::new_v4(), 1_000));
    }

    #[test]
    fn test_ids_forgotten_after_horizon_passes() {
        let mut recent = RecentMessages::new();
        let horizon = recent.horizon_secs;
        let id = Uuid::new_v4();

        assert!(recent.first_delivery(id, 1_000));

        // Stream time moves past the horizon: the id ages out, but the
        // redelivery is now stale and refused anyway.
        assert!(recent.first_delivery(Uuid::new_v4(), 1_000 + horizon + 1));
        assert!(!recent.first_delivery(id, 1_000));
        assert!(recent.seen.len() <= 2);
    }

    #[test]
    fn test_stale_message_refused() {
        let mut recent = RecentMessages::new();
        let horizon = recent.horizon_secs;

        assert!(recent.first_delivery(Uuid::new_v4(), 10_000));
        // Older than the horizon relative to the newest seen: refuse.
        assert!(!recent.first_delivery(Uuid::new_v4(), 10_000 - horizon - 1));
        // Inside the horizon: accept, even though it is out of order.
        assert!(recent.first_delivery(Uuid::new_v4(), 10_000 - horizon + 1));
    }

    #[tokio::test]
    async fn test_consumer_routes_score_consensus() {
        let bus = Arc::new(InMemoryEventBus::new());
        let api = Arc::new(CountingAlertApi::default());
        let handle = spawn_alert_consumer(&bus, api.clone());

        bus.publish_event(
            ServiceId::Scoring,
            EwsEvent::ScoreConsensusReached(score_consensus()),
        )
        .await;

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(api.score_consensuses.load(Ordering::SeqCst), 1);
        handle.abort();
    }

    #[tokio::test]
    async fn test_consumer_dedups_redelivery() {
        let bus = Arc::new(InMemoryEventBus::new());
        let api = Arc::new(CountingAlertApi::default());
        let handle = spawn_alert_consumer(&bus, api.clone());

        // The same envelope delivered twice: one handler invocation.
        let message = EventEnvelope::new(
            ServiceId::Scoring,
            EwsEvent::ScoreConsensusReached(score_consensus()),
        );
        bus.publish(message.clone()).await;
        bus.publish(message).await;

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(api.score_consensuses.load(Ordering::SeqCst), 1);
        handle.abort();
    }
}
