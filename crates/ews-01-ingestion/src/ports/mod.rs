//! Ports for the ingestion service.
//!
//! Inbound ports are what the HTTP edge drives; outbound ports are the
//! document store, the event bus and the scoring-trigger gateway.

pub mod inbound;
pub mod outbound;

pub use inbound::{BatchOutcome, IngestionApi};
pub use outbound::{ReadingStore, ScoreCommandGateway, SensorConsensusBus, SensorConsensusStore};
