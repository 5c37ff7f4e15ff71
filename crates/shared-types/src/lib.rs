//! # Shared Types Crate
//!
//! This crate contains all cross-service domain entities and the
//! `EventEnvelope<T>` message wrapper used on the event bus.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: Every type that crosses a service boundary
//!   (over the bus or through a persisted store read) is defined here.
//! - **Envelope Integrity**: `EventEnvelope<T>` is the sole wrapper for bus
//!   messages; its `message_id` is what consumers de-duplicate on.
//! - **Ownership stays local**: Alerts, subscriptions and notifications are
//!   owned by the alerting service and live in its domain module; only the
//!   classification vocabulary (`AlertType`, `AlertSeverity`) is shared.

pub mod alerts;
pub mod consensus;
pub mod entities;
pub mod envelope;
pub mod readings;
pub mod scoring;
pub mod vitals;

pub use alerts::{AlertSeverity, AlertType};
pub use consensus::{ConsensusMethod, ParticipatingReading, ScoreConsensus, SensorConsensus};
pub use entities::{NodeId, PatientId, ServiceId};
pub use envelope::EventEnvelope;
pub use readings::SensorReading;
pub use scoring::{ClinicalRisk, ScoreComponents, ScoreEvent, ScoreEventKind};
pub use vitals::{Consciousness, SensorType, VitalSigns};
