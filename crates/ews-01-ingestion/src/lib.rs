//! # EWS-01 Ingestion - Sensor Collection & Value-Consensus Service
//!
//! ## Purpose
//!
//! Collects physiological readings from a fleet of edge nodes,
//! cross-validates them with a windowed fan-in quorum per
//! (patient, sensor type), and triggers NEWS2 scoring once a complete,
//! fresh vital-sign vector exists for a patient.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Enforcement Location |
//! |----|-----------|---------------------|
//! | INVARIANT-1 | A consensus has ≥ 1 participant | `domain/quorum.rs` - `resolve()` input contract |
//! | INVARIANT-2 | `valid = false` ⇔ `method = none` | `domain/quorum.rs` - outcome construction |
//! | INVARIANT-3 | Only the latest reading per node participates | `domain/quorum.rs` - `latest_per_node()` |
//! | INVARIANT-4 | Consensus value always populated, even when invalid | `domain/quorum.rs` - all paths set `value` |
//! | INVARIANT-5 | Storage failure aborts emission | `service/mod.rs` - persist before publish |
//!
//! ## Choreography
//!
//! ```text
//! edge node ──reading──→ INGESTION (1)
//!                            │
//!                            ├─ windowed quorum per (patient, sensor)
//!                            │
//!                            ├──SensorConsensusFormed──→ [Event Bus]
//!                            │
//!                            └─ complete vital vector?
//!                                      │ yes
//!                                      ▼
//!                            ScoreCommandGateway ──→ Scoring (2)
//! ```
//!
//! Ingestion forms value consensus ONLY - scoring and alerting react to
//! the events it publishes; nothing here calls their internals.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{InMemoryReadingStore, InMemorySensorConsensusStore, IngestionApiHandler};
pub use domain::{
    assemble_vitals, latest_per_node, resolve, ConsensusQuery, IngestionConfig, IngestionError,
    IngestionResult, QuorumOutcome, ReadingWindow, ScoreRequest,
};
pub use ports::{
    BatchOutcome, IngestionApi, ReadingStore, ScoreCommandGateway, SensorConsensusBus,
    SensorConsensusStore,
};
pub use service::{IngestionDependencies, IngestionService};
