//! Ports for the scoring service.

pub mod inbound;
pub mod outbound;

pub use inbound::{BatchScoreOutcome, CalculationReceipt, ScoringApi};
pub use outbound::{ReadModelStore, ScoreConsensusStore, ScoreEventBus, ScoreEventStore};
