//! # `EventEnvelope` Wrapper
//!
//! The universal wrapper for every message that crosses the event bus.
//!
//! ## Properties
//!
//! - **Versioning**: all messages include a `version` field for forward
//!   compatibility; deserializers check it before processing.
//! - **Correlation**: request/response flows reuse `correlation_id`.
//! - **Idempotence**: `message_id` is unique per publish; at-least-once
//!   consumers de-duplicate on it for the redelivery horizon.
//!
//! Delivery is at-least-once and unordered across publishers; any handler
//! fed from an envelope MUST be idempotent.

use crate::entities::ServiceId;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// The universal message envelope for all bus communication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope<T> {
    /// Protocol version for forward compatibility.
    pub version: u16,

    /// The service that published the message. The sole source of truth
    /// for origin; payloads do not duplicate it.
    pub source: ServiceId,

    /// Unique identifier of this publish. Consumers de-duplicate on it.
    pub message_id: Uuid,

    /// Identifier correlating a causal chain (a reading's consensus, the
    /// score it triggered, the alert that followed). New chains generate a
    /// fresh id; downstream publishes copy the upstream one.
    pub correlation_id: Uuid,

    /// Unix timestamp (seconds) when the message was created. Consumers
    /// bound their duplicate tracking with it: ids are remembered for the
    /// redelivery horizon, and older messages are refused rather than
    /// tracked forever.
    pub timestamp: u64,

    /// The actual message payload.
    pub payload: T,
}

impl<T> EventEnvelope<T> {
    /// Current protocol version.
    pub const CURRENT_VERSION: u16 = 1;

    /// How long consumers must remember message ids to suppress broker
    /// redeliveries, in seconds. Messages older than this relative to the
    /// newest seen are refused instead of handled twice.
    pub const REDELIVERY_HORIZON: u64 = 120;

    /// Wrap a payload in a fresh envelope starting a new causal chain.
    pub fn new(source: ServiceId, payload: T) -> Self {
        let correlation_id = Uuid::new_v4();
        Self::correlated(source, correlation_id, payload)
    }

    /// Wrap a payload continuing an existing causal chain.
    pub fn correlated(source: ServiceId, correlation_id: Uuid, payload: T) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            source,
            message_id: Uuid::new_v4(),
            correlation_id,
            timestamp: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
            payload,
        }
    }

    /// Map the payload, keeping every header field.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> EventEnvelope<U> {
        EventEnvelope {
            version: self.version,
            source: self.source,
            message_id: self.message_id,
            correlation_id: self.correlation_id,
            timestamp: self.timestamp,
            payload: f(self.payload),
        }
    }
}
