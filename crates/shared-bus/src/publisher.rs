//! # Event Publisher
//!
//! Defines the publishing side of the event bus.

use crate::events::{BusMessage, EventFilter, EwsEvent};
use crate::subscriber::Subscription;
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use shared_types::{EventEnvelope, ServiceId};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::{debug, warn};
use uuid::Uuid;

/// Trait for publishing events to the bus.
///
/// Publish is best-effort: a publish failure is logged by the caller and
/// never blocks the pipeline (the next upstream event re-derives state).
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an enveloped event to the bus.
    ///
    /// Returns the number of active subscribers that received the event.
    async fn publish(&self, message: BusMessage) -> usize;

    /// Get the total number of events published.
    fn events_published(&self) -> u64;
}

/// Convenience extension: wrap and publish in one call.
#[async_trait]
pub trait EventPublisherExt: EventPublisher {
    /// Publish an event in a fresh envelope.
    async fn publish_event(&self, source: ServiceId, event: EwsEvent) -> usize {
        self.publish(EventEnvelope::new(source, event)).await
    }

    /// Publish an event continuing an existing causal chain.
    async fn publish_correlated(
        &self,
        source: ServiceId,
        correlation_id: Uuid,
        event: EwsEvent,
    ) -> usize {
        self.publish(EventEnvelope::correlated(source, correlation_id, event))
            .await
    }
}

impl<P: EventPublisher + ?Sized> EventPublisherExt for P {}

/// In-memory implementation of the event bus.
///
/// Uses `tokio::sync::broadcast` for multi-producer, multi-consumer
/// semantics. Suitable for single-process operation and as the development
/// fallback when the broker is unreachable; distributed deployments put a
/// broker-backed implementation behind the same trait.
pub struct InMemoryEventBus {
    /// Broadcast sender for messages.
    sender: broadcast::Sender<BusMessage>,

    /// Total events published.
    events_published: AtomicU64,

    /// Channel capacity.
    capacity: usize,
}

impl InMemoryEventBus {
    /// Create a new in-memory event bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new in-memory event bus with specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            events_published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Subscribe to events matching a filter.
    ///
    /// Returns a [`Subscription`] handle that receives every subsequent
    /// matching message; dropping the handle detaches the consumer.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        debug!(topics = ?filter.topics, sources = ?filter.sources, "New subscription created");
        Subscription::new(self.sender.subscribe(), filter)
    }

    /// Get the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Get the channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, message: BusMessage) -> usize {
        let topic = message.payload.topic();
        let source = message.payload.source_service();

        // The counter tracks attempts, delivered or not.
        self.events_published.fetch_add(1, Ordering::Relaxed);

        match self.sender.send(message) {
            Ok(receiver_count) => {
                debug!(
                    topic = ?topic,
                    source = %source,
                    receivers = receiver_count,
                    "Event published"
                );
                receiver_count
            }
            Err(e) => {
                warn!(
                    topic = ?topic,
                    source = %source,
                    error = %e,
                    "Event dropped (no receivers)"
                );
                0
            }
        }
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}
