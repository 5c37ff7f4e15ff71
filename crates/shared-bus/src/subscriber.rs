//! # Event Subscriber
//!
//! The consuming side of the bus: a filtered view over the broadcast
//! channel.
//!
//! Loss tolerance is a property of this pipeline, not of the channel:
//! every consumer re-derives its state from persisted records (windowed
//! reductions over the store), so a message lost to channel lag costs
//! latency, never correctness. The subscription therefore absorbs lag,
//! counts it for the operator, and keeps consuming from the oldest
//! retained message instead of failing.

use crate::events::{BusMessage, EventFilter};
use tokio::sync::broadcast;
use tracing::warn;

/// A filtered consumer handle.
///
/// Obtained from [`crate::InMemoryEventBus::subscribe`]. Dropping the
/// handle detaches the consumer from the channel.
pub struct Subscription {
    receiver: broadcast::Receiver<BusMessage>,
    filter: EventFilter,
    /// Messages lost to channel lag over this subscription's lifetime.
    dropped: u64,
}

impl Subscription {
    pub(crate) fn new(receiver: broadcast::Receiver<BusMessage>, filter: EventFilter) -> Self {
        Self {
            receiver,
            filter,
            dropped: 0,
        }
    }

    /// Receive the next message that matches the filter.
    ///
    /// Returns `None` once the bus is closed and the backlog is drained.
    /// Non-matching topics are skipped silently; lag adds to
    /// [`Subscription::dropped`] and consumption resumes from the oldest
    /// message the channel still holds.
    pub async fn recv(&mut self) -> Option<BusMessage> {
        loop {
            match self.receiver.recv().await {
                Ok(message) if self.filter.matches(&message) => return Some(message),
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    self.dropped += count;
                    warn!(
                        lost = count,
                        total_lost = self.dropped,
                        "Subscriber lagged; resuming from oldest retained message"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// How many messages this subscription has lost to lag.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// The filter for this subscription.
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EwsEvent;
    use crate::publisher::{EventPublisherExt, InMemoryEventBus};
    use shared_types::ServiceId;
    use std::time::Duration;
    use tokio::time::timeout;

    fn critical(service: ServiceId) -> EwsEvent {
        EwsEvent::CriticalError {
            service,
            error: "boom".into(),
        }
    }

    #[tokio::test]
    async fn test_recv_delivers_matching_message() {
        let bus = InMemoryEventBus::new();
        let mut sub = bus.subscribe(EventFilter::all());

        bus.publish_event(ServiceId::Scoring, critical(ServiceId::Scoring))
            .await;

        let received = timeout(Duration::from_millis(100), sub.recv())
            .await
            .expect("timeout")
            .expect("message");

        assert!(matches!(received.payload, EwsEvent::CriticalError { .. }));
        assert_eq!(received.source, ServiceId::Scoring);
    }

    #[tokio::test]
    async fn test_recv_skips_filtered_sources() {
        let bus = InMemoryEventBus::new();
        let mut sub = bus.subscribe(EventFilter::from_services(vec![ServiceId::Alerting]));

        bus.publish_event(ServiceId::Scoring, critical(ServiceId::Scoring))
            .await;
        bus.publish_event(ServiceId::Alerting, critical(ServiceId::Alerting))
            .await;

        let received = timeout(Duration::from_millis(100), sub.recv())
            .await
            .expect("timeout")
            .expect("message");

        assert_eq!(received.payload.source_service(), ServiceId::Alerting);
    }

    #[tokio::test]
    async fn test_recv_none_when_bus_closed() {
        let bus = InMemoryEventBus::new();
        let mut sub = bus.subscribe(EventFilter::all());

        drop(bus);

        assert!(sub.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_lag_counted_not_fatal() {
        // Capacity 2: publishing five messages before the first recv
        // overwrites the three oldest.
        let bus = InMemoryEventBus::with_capacity(2);
        let mut sub = bus.subscribe(EventFilter::all());

        for _ in 0..5 {
            bus.publish_event(ServiceId::Ingestion, critical(ServiceId::Ingestion))
                .await;
        }

        let received = timeout(Duration::from_millis(100), sub.recv())
            .await
            .expect("timeout");
        assert!(received.is_some());
        assert_eq!(sub.dropped(), 3);
    }

    #[tokio::test]
    async fn test_drop_detaches_consumer() {
        let bus = InMemoryEventBus::new();
        {
            let _sub1 = bus.subscribe(EventFilter::all());
            let _sub2 = bus.subscribe(EventFilter::all());
            assert_eq!(bus.subscriber_count(), 2);
        }
        assert_eq!(bus.subscriber_count(), 0);
    }
}
