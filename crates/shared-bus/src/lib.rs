//! # Shared Bus - Event Bus for Inter-Service Communication
//!
//! All inter-service communication flows through this bus; services never
//! call each other's internals directly.
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │  Ingestion   │                    │   Scoring    │
//! │              │    publish()       │              │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Event Bus   │ ─────────┘
//!                  │ (ews_events) │  subscribe()
//!                  └──────────────┘
//! ```
//!
//! ## Delivery Contract
//!
//! - At-least-once: duplicates are possible; handlers MUST be idempotent.
//! - Unordered across publishers: consumers never assume arrival order.
//! - Every message is wrapped in `EventEnvelope<EwsEvent>`; the envelope's
//!   `message_id` is what consumer loops de-duplicate on (the envelope
//!   documents the redelivery horizon they track it for).
//! - Channel lag is survivable: consumers re-derive state from the store,
//!   so a lagged subscription resumes and counts its losses instead of
//!   failing.
//!
//! The in-memory implementation doubles as the development fallback when
//! no broker is reachable; a broker-backed implementation lives behind the
//! same [`EventPublisher`] trait.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod publisher;
pub mod subscriber;

pub use events::{BusMessage, EventFilter, EventTopic, EwsEvent};
pub use publisher::{EventPublisher, EventPublisherExt, InMemoryEventBus};
pub use subscriber::Subscription;

/// The topic exchange all routing keys are bound to.
pub const EXCHANGE: &str = "ews_events";

/// Maximum events buffered per subscriber before lag drops the oldest.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

/// Derive the durable queue name for a routing key
/// (`ews.consensus` → `ews_queue_ews_consensus`).
#[must_use]
pub fn queue_name(routing_key: &str) -> String {
    format!("ews_queue_{}", routing_key.replace('.', "_"))
}
