//! Adapters for the scoring service: in-memory stores and the JSON api
//! handler.

mod api_handler;
mod memory;

pub use api_handler::ScoringApiHandler;
pub use memory::{InMemoryReadModelStore, InMemoryScoreConsensusStore, InMemoryScoreEventStore};
