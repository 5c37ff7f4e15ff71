//! Adapters for the ingestion service: in-memory stores for tests and
//! development, and the JSON api handler the HTTP edge drives.

mod api_handler;
mod memory;

pub use api_handler::IngestionApiHandler;
pub use memory::{InMemoryReadingStore, InMemorySensorConsensusStore};
