//! In-memory store adapters.
//!
//! Back the unit tests and the development wiring. Production puts the
//! document store behind the same ports.

use crate::domain::{ConsensusQuery, ReadingWindow};
use crate::ports::{ReadingStore, SensorConsensusStore};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{PatientId, SensorConsensus, SensorReading, SensorType};
use std::collections::HashMap;

/// In-memory reading store keyed by (patient, sensor type).
#[derive(Default)]
pub struct InMemoryReadingStore {
    readings: RwLock<HashMap<(PatientId, SensorType), Vec<SensorReading>>>,
}

impl InMemoryReadingStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total readings held (test helper).
    #[must_use]
    pub fn len(&self) -> usize {
        self.readings.read().values().map(Vec::len).sum()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ReadingStore for InMemoryReadingStore {
    async fn insert_reading(&self, reading: SensorReading) -> Result<(), String> {
        self.readings
            .write()
            .entry((reading.patient_id.clone(), reading.sensor_type))
            .or_default()
            .push(reading);
        Ok(())
    }

    async fn readings_in_window(
        &self,
        patient_id: &PatientId,
        sensor_type: SensorType,
        window: ReadingWindow,
    ) -> Result<Vec<SensorReading>, String> {
        let mut matching: Vec<SensorReading> = self
            .readings
            .read()
            .get(&(patient_id.clone(), sensor_type))
            .map(|readings| {
                readings
                    .iter()
                    .filter(|r| window.contains(r.observed_at))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        matching.sort_by_key(|r| r.observed_at);
        Ok(matching)
    }
}

/// In-memory sensor-consensus store keyed by patient.
#[derive(Default)]
pub struct InMemorySensorConsensusStore {
    consensuses: RwLock<HashMap<PatientId, Vec<SensorConsensus>>>,
}

impl InMemorySensorConsensusStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SensorConsensusStore for InMemorySensorConsensusStore {
    async fn insert_consensus(&self, consensus: SensorConsensus) -> Result<(), String> {
        self.consensuses
            .write()
            .entry(consensus.patient_id.clone())
            .or_default()
            .push(consensus);
        Ok(())
    }

    async fn latest_valid_per_type(
        &self,
        patient_id: &PatientId,
    ) -> Result<Vec<SensorConsensus>, String> {
        let guard = self.consensuses.read();
        let Some(all) = guard.get(patient_id) else {
            return Ok(Vec::new());
        };

        let mut latest: HashMap<SensorType, &SensorConsensus> = HashMap::new();
        for consensus in all.iter().filter(|c| c.valid) {
            latest
                .entry(consensus.sensor_type)
                .and_modify(|current| {
                    if consensus.consensus_at > current.consensus_at {
                        *current = consensus;
                    }
                })
                .or_insert(consensus);
        }
        Ok(latest.into_values().cloned().collect())
    }

    async fn query(
        &self,
        patient_id: &PatientId,
        query: &ConsensusQuery,
    ) -> Result<Vec<SensorConsensus>, String> {
        let guard = self.consensuses.read();
        let mut matching: Vec<SensorConsensus> = guard
            .get(patient_id)
            .map(|all| {
                all.iter()
                    .filter(|c| query.sensor_type.map_or(true, |t| c.sensor_type == t))
                    .filter(|c| query.from.map_or(true, |from| c.consensus_at >= from))
                    .filter(|c| query.to.map_or(true, |to| c.consensus_at <= to))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        matching.sort_by_key(|c| c.consensus_at);
        Ok(matching)
    }
}
