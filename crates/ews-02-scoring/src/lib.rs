//! # EWS-02 Scoring - NEWS2 Calculation & Score-Consensus Service
//!
//! ## Purpose
//!
//! Computes the National Early Warning Score 2 from agreed vital signs,
//! reconciles concurrent per-node scores into a single authoritative
//! consensus score, and maintains the event-sourced patient read model.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Enforcement Location |
//! |----|-----------|---------------------|
//! | INVARIANT-1 | Scoring is pure and deterministic | `domain/news2.rs` - no I/O, no clock |
//! | INVARIANT-2 | Out-of-band vitals raise validation errors, never score 0 | `domain/news2.rs` - band functions |
//! | INVARIANT-3 | Score events are append-only | `ports/outbound.rs` - `ScoreEventStore` has no update |
//! | INVARIANT-4 | Read-model history holds ≤ 100 entries, ascending | `domain/read_model.rs` - `apply()` |
//! | INVARIANT-5 | Re-applying a consensus id is a no-op | `domain/read_model.rs` - `apply()` dedup |
//! | INVARIANT-6 | Newer `consensus_at` wins the current score | `domain/read_model.rs` - monotonic update |
//! | INVARIANT-7 | Invalid consensus never overwrites authoritative vitals | `domain/read_model.rs` - `apply()` |
//!
//! ## Choreography
//!
//! ```text
//! Ingestion (1) ──ScoreRequest──→ SCORING (2)
//!                                    │
//!                                    ├──ews.calculated────→ [Event Bus]
//!                                    │
//!                                    ├─ windowed score quorum
//!                                    │
//!                                    ├──ews.consensus─────→ [Event Bus] ──→ Alerting (3)
//!                                    │
//!                                    └─ project PatientReadModel (per-patient lock)
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{
    InMemoryReadModelStore, InMemoryScoreConsensusStore, InMemoryScoreEventStore, ScoringApiHandler,
};
pub use domain::{
    news2, resolve_scores, score_latest_per_node, CalculateCommand, EventQuery, PatientReadModel,
    ScoreBreakdown, ScoreError, ScoreHistoryEntry, ScoreQuorumOutcome, ScoringConfig, ScoringError,
    ScoringResult, StatsOverview,
};
pub use ports::{
    CalculationReceipt, ReadModelStore, ScoreConsensusStore, ScoreEventBus, ScoreEventStore,
    ScoringApi,
};
pub use service::{ReadModelProjector, ScoringDependencies, ScoringService};
