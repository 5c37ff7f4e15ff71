//! In-memory store adapters.

use crate::domain::{EventQuery, PatientReadModel};
use crate::ports::{ReadModelStore, ScoreConsensusStore, ScoreEventStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use shared_types::{PatientId, ScoreConsensus, ScoreEvent};
use std::collections::HashMap;
use uuid::Uuid;

/// In-memory append-only score-event store.
#[derive(Default)]
pub struct InMemoryScoreEventStore {
    events: RwLock<Vec<ScoreEvent>>,
}

impl InMemoryScoreEventStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScoreEventStore for InMemoryScoreEventStore {
    async fn append_event(&self, event: ScoreEvent) -> Result<(), String> {
        let mut events = self.events.write();
        if events.iter().any(|e| e.event_id == event.event_id) {
            return Ok(()); // idempotent append
        }
        events.push(event);
        Ok(())
    }

    async fn events_in_window(
        &self,
        patient_id: &PatientId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ScoreEvent>, String> {
        let mut matching: Vec<ScoreEvent> = self
            .events
            .read()
            .iter()
            .filter(|e| {
                &e.patient_id == patient_id && e.observed_at >= start && e.observed_at <= end
            })
            .cloned()
            .collect();
        matching.sort_by_key(|e| e.observed_at);
        Ok(matching)
    }

    async fn query(&self, query: &EventQuery) -> Result<Vec<ScoreEvent>, String> {
        let mut matching: Vec<ScoreEvent> = self
            .events
            .read()
            .iter()
            .filter(|e| {
                query
                    .patient_id
                    .as_ref()
                    .map_or(true, |p| &e.patient_id == p)
            })
            .filter(|e| query.kind.map_or(true, |k| e.kind == k))
            .filter(|e| query.from.map_or(true, |from| e.observed_at >= from))
            .filter(|e| query.to.map_or(true, |to| e.observed_at <= to))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.observed_at.cmp(&a.observed_at));
        if let Some(limit) = query.limit {
            matching.truncate(limit);
        }
        Ok(matching)
    }

    async fn count(&self) -> Result<usize, String> {
        Ok(self.events.read().len())
    }
}

/// In-memory score-consensus store.
#[derive(Default)]
pub struct InMemoryScoreConsensusStore {
    consensuses: RwLock<HashMap<Uuid, ScoreConsensus>>,
}

impl InMemoryScoreConsensusStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScoreConsensusStore for InMemoryScoreConsensusStore {
    async fn insert_consensus(&self, consensus: ScoreConsensus) -> Result<(), String> {
        self.consensuses
            .write()
            .insert(consensus.consensus_id, consensus);
        Ok(())
    }

    async fn get(&self, consensus_id: Uuid) -> Result<Option<ScoreConsensus>, String> {
        Ok(self.consensuses.read().get(&consensus_id).cloned())
    }
}

/// In-memory read-model store keyed by patient.
#[derive(Default)]
pub struct InMemoryReadModelStore {
    models: RwLock<HashMap<PatientId, PatientReadModel>>,
}

impl InMemoryReadModelStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReadModelStore for InMemoryReadModelStore {
    async fn get(&self, patient_id: &PatientId) -> Result<Option<PatientReadModel>, String> {
        Ok(self.models.read().get(patient_id).cloned())
    }

    async fn put(&self, model: PatientReadModel) -> Result<(), String> {
        self.models.write().insert(model.patient_id.clone(), model);
        Ok(())
    }

    async fn all(&self) -> Result<Vec<PatientReadModel>, String> {
        Ok(self.models.read().values().cloned().collect())
    }
}
