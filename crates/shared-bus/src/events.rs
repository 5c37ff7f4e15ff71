//! # Pipeline Events
//!
//! Defines all event types that flow through the shared bus, their topic
//! routing keys, and subscription filters.

use serde::{Deserialize, Serialize};
use shared_types::{
    AlertSeverity, AlertType, EventEnvelope, PatientId, ScoreConsensus, ScoreEvent, SensorConsensus,
    ServiceId,
};
use uuid::Uuid;

/// What actually travels on the bus.
pub type BusMessage = EventEnvelope<EwsEvent>;

/// All events that can be published to the event bus.
///
/// These drive the choreography: each service reacts to upstream events and
/// publishes its own, with no service orchestrating another.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EwsEvent {
    /// A sensor-value consensus was formed (valid or not).
    /// Source: Ingestion | Consumers: Alerting (invalid → sensor warning).
    SensorConsensusFormed(SensorConsensus),

    /// A per-node NEWS2 score was calculated and persisted.
    /// Source: Scoring | Routing key `ews.calculated`.
    ScoreCalculated(ScoreEvent),

    /// A score consensus was reached over per-node calculations.
    /// Source: Scoring | Routing key `ews.consensus`.
    /// This is the PRIMARY trigger for the read-model projector and for
    /// alert classification.
    ScoreConsensusReached(ScoreConsensus),

    /// An alert was raised by the alert service.
    AlertRaised {
        /// The new alert's identifier.
        alert_id: Uuid,
        /// The affected patient.
        patient_id: PatientId,
        /// Classified alert type.
        alert_type: AlertType,
        /// Classified severity.
        severity: AlertSeverity,
        /// Computed dispatch priority (1–100).
        priority: u8,
    },

    /// Critical error requiring operator attention (dead-letter topic).
    CriticalError {
        /// The service that encountered the error.
        service: ServiceId,
        /// Error description.
        error: String,
    },
}

impl EwsEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::SensorConsensusFormed(_) => EventTopic::SensorConsensus,
            Self::ScoreCalculated(_) => EventTopic::ScoreCalculated,
            Self::ScoreConsensusReached(_) => EventTopic::ScoreConsensus,
            Self::AlertRaised { .. } => EventTopic::Alerts,
            Self::CriticalError { .. } => EventTopic::DeadLetterQueue,
        }
    }

    /// Get the originating service.
    #[must_use]
    pub fn source_service(&self) -> ServiceId {
        match self {
            Self::SensorConsensusFormed(_) => ServiceId::Ingestion,
            Self::ScoreCalculated(_) | Self::ScoreConsensusReached(_) => ServiceId::Scoring,
            Self::AlertRaised { .. } => ServiceId::Alerting,
            Self::CriticalError { service, .. } => *service,
        }
    }

    /// The patient this event concerns, when there is one.
    #[must_use]
    pub fn patient_id(&self) -> Option<&PatientId> {
        match self {
            Self::SensorConsensusFormed(c) => Some(&c.patient_id),
            Self::ScoreCalculated(e) => Some(&e.patient_id),
            Self::ScoreConsensusReached(c) => Some(&c.patient_id),
            Self::AlertRaised { patient_id, .. } => Some(patient_id),
            Self::CriticalError { .. } => None,
        }
    }
}

/// Event topics for subscription filtering and broker routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Sensor-value consensus outcomes.
    SensorConsensus,
    /// Per-node score calculations.
    ScoreCalculated,
    /// Authoritative score consensuses.
    ScoreConsensus,
    /// Raised alerts.
    Alerts,
    /// Dead-letter queue for critical errors.
    DeadLetterQueue,
    /// All events (no filtering).
    All,
}

impl EventTopic {
    /// The broker routing key for this topic on the `ews_events` exchange.
    #[must_use]
    pub fn routing_key(self) -> &'static str {
        match self {
            Self::SensorConsensus => "sensor.consensus",
            Self::ScoreCalculated => "ews.calculated",
            Self::ScoreConsensus => "ews.consensus",
            Self::Alerts => "alerts.raised",
            Self::DeadLetterQueue => "dlq.critical",
            Self::All => "#",
        }
    }
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Source services to include. Empty means all sources.
    pub sources: Vec<ServiceId>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            sources: Vec::new(),
        }
    }

    /// Create a filter for events from specific services.
    #[must_use]
    pub fn from_services(sources: Vec<ServiceId>) -> Self {
        Self {
            topics: Vec::new(),
            sources,
        }
    }

    /// Check if a message matches this filter.
    #[must_use]
    pub fn matches(&self, message: &BusMessage) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&message.payload.topic());

        let source_match =
            self.sources.is_empty() || self.sources.contains(&message.payload.source_service());

        topic_match && source_match
    }
}
