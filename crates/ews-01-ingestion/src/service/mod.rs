//! Ingestion Service - core business logic.
//!
//! One consensus round per accepted reading:
//!
//! 1. Validate and persist the reading (storage failure aborts the round).
//! 2. Collect window peers, dedup to the latest reading per node, run the
//!    quorum ladder. Fewer than the configured minimum of raw readings in
//!    the window means no round; the reading waits for company.
//! 3. Persist the consensus BEFORE publishing it; a storage failure here
//!    aborts emission and the round is naturally retried by the next
//!    arrival for the same (patient, sensor).
//! 4. Publish `SensorConsensusFormed` (best-effort).
//! 5. On a valid consensus, check vital-vector completeness and trigger
//!    scoring through the gateway.

use crate::domain::{
    assemble_vitals, latest_per_node, resolve, ConsensusQuery, IngestionConfig, IngestionError,
    IngestionResult, ReadingWindow, ScoreRequest,
};
use crate::ports::{
    BatchOutcome, IngestionApi, ReadingStore, ScoreCommandGateway, SensorConsensusBus,
    SensorConsensusStore,
};
use async_trait::async_trait;
use chrono::Duration;
use ews_telemetry::{READINGS_INGESTED, SENSOR_CONSENSUS_ROUNDS, SERVICE_ERRORS};
use shared_types::{PatientId, SensorConsensus, SensorReading, SensorType};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;


/// Ingestion service over its four outbound ports.
pub struct IngestionService<R, C, B, G>
where
    R: ReadingStore,
    C: SensorConsensusStore,
    B: SensorConsensusBus,
    G: ScoreCommandGateway,
{
    readings: Arc<R>,
    consensuses: Arc<C>,
    bus: Arc<B>,
    scoring: Arc<G>,
    config: IngestionConfig,
}

/// Dependencies for `IngestionService`.
pub struct IngestionDependencies<R, C, B, G> {
    pub readings: Arc<R>,
    pub consensuses: Arc<C>,
    pub bus: Arc<B>,
    pub scoring: Arc<G>,
    pub config: IngestionConfig,
}

impl<R, C, B, G> IngestionService<R, C, B, G>
where
    R: ReadingStore,
    C: SensorConsensusStore,
    B: SensorConsensusBus,
    G: ScoreCommandGateway,
{
    /// Create a new ingestion service.
    pub fn new(deps: IngestionDependencies<R, C, B, G>) -> Self {
        Self {
            readings: deps.readings,
            consensuses: deps.consensuses,
            bus: deps.bus,
            scoring: deps.scoring,
            config: deps.config,
        }
    }

    /// Reject malformed readings before anything touches storage.
    fn validate_reading(reading: &SensorReading) -> IngestionResult<()> {
        if reading.patient_id.as_str().is_empty() {
            return Err(IngestionError::Validation("patientId is required".into()));
        }
        if reading.node_id.as_str().is_empty() {
            return Err(IngestionError::Validation("nodeId is required".into()));
        }
        if !reading.value.is_finite() {
            return Err(IngestionError::Validation(format!(
                "value {} is not a finite number",
                reading.value
            )));
        }
        if reading.sensor_type == SensorType::Consciousness {
            let code = reading.value;
            if code.fract() != 0.0 || !(0.0..=3.0).contains(&code) {
                return Err(IngestionError::Validation(format!(
                    "consciousness value {code} is not an AVPU code (0-3)"
                )));
            }
        }
        Ok(())
    }

    /// Run one consensus round anchored on `reading`, assuming the reading
    /// is already persisted. Returns the formed consensus, if any.
    async fn consensus_round(
        &self,
        reading: &SensorReading,
    ) -> IngestionResult<Option<SensorConsensus>> {
        let window = ReadingWindow::around(
            reading.observed_at,
            self.config.window_lookback_secs,
            self.config.window_grace_secs,
        );

        let window_readings = self
            .readings
            .readings_in_window(&reading.patient_id, reading.sensor_type, window)
            .await
            .map_err(IngestionError::Storage)?;

        if window_readings.len() < self.config.min_window_readings {
            debug!(
                patient = %reading.patient_id,
                sensor = %reading.sensor_type,
                in_window = window_readings.len(),
                "Not enough readings for a consensus round"
            );
            return Ok(None);
        }

        let participants = latest_per_node(&window_readings);
        let Some(outcome) = resolve(
            &participants,
            Duration::seconds(self.config.agreement_span_secs),
            self.config.value_tolerance,
        ) else {
            return Ok(None);
        };

        let consensus = SensorConsensus {
            consensus_id: Uuid::new_v4(),
            patient_id: reading.patient_id.clone(),
            sensor_type: reading.sensor_type,
            participating: participants,
            consensus_value: outcome.value,
            consensus_at: outcome.at,
            valid: outcome.valid,
            method: outcome.method,
        };

        // Persist first; emission is aborted on storage failure and the
        // reading stays stored for the next round.
        self.consensuses
            .insert_consensus(consensus.clone())
            .await
            .map_err(IngestionError::Storage)?;

        SENSOR_CONSENSUS_ROUNDS
            .with_label_values(&[consensus.method.as_str()])
            .inc();

        if let Err(e) = self.bus.publish_sensor_consensus(consensus.clone()).await {
            // Best-effort publish: the record is persisted, consumers
            // re-derive from the store.
            warn!(
                patient = %consensus.patient_id,
                error = %e,
                "Failed to publish sensor consensus"
            );
            SERVICE_ERRORS.with_label_values(&["ingestion", "bus"]).inc();
        }

        info!(
            patient = %consensus.patient_id,
            sensor = %consensus.sensor_type,
            method = ?consensus.method,
            valid = consensus.valid,
            value = consensus.consensus_value,
            "Sensor consensus formed"
        );

        Ok(Some(consensus))
    }

    /// Completeness check per new valid consensus: assemble the freshest
    /// valid consensus per type and trigger scoring when all six vitals
    /// are present.
    async fn trigger_scoring_if_complete(
        &self,
        reading: &SensorReading,
        consensus: &SensorConsensus,
    ) -> IngestionResult<()> {
        let latest = self
            .consensuses
            .latest_valid_per_type(&consensus.patient_id)
            .await
            .map_err(IngestionError::Storage)?;

        let vitals = assemble_vitals(
            &latest,
            consensus.consensus_at,
            Duration::seconds(self.config.freshness_secs),
        )
        .map_err(IngestionError::Validation)?;

        let Some(vital_signs) = vitals else {
            debug!(patient = %consensus.patient_id, "Vital vector incomplete, scoring not triggered");
            return Ok(());
        };

        let request = ScoreRequest {
            patient_id: consensus.patient_id.clone(),
            node_id: reading.node_id.clone(),
            vital_signs,
            observed_at: consensus.consensus_at,
            correlation_id: Uuid::new_v4(),
        };

        self.scoring
            .request_score(request)
            .await
            .map_err(IngestionError::Downstream)?;

        info!(patient = %consensus.patient_id, "Complete vital vector, scoring triggered");
        Ok(())
    }
}

#[async_trait]
impl<R, C, B, G> IngestionApi for IngestionService<R, C, B, G>
where
    R: ReadingStore,
    C: SensorConsensusStore,
    B: SensorConsensusBus,
    G: ScoreCommandGateway,
{
    async fn ingest_reading(
        &self,
        reading: SensorReading,
    ) -> IngestionResult<Option<SensorConsensus>> {
        Self::validate_reading(&reading)?;

        self.readings
            .insert_reading(reading.clone())
            .await
            .map_err(IngestionError::Storage)?;
        READINGS_INGESTED.inc();

        let consensus = self.consensus_round(&reading).await?;

        if let Some(consensus) = &consensus {
            if consensus.valid {
                // Scoring-trigger failures do not fail the ingest: the
                // reading and consensus are persisted and the next arrival
                // retries the completeness path.
                if let Err(e) = self.trigger_scoring_if_complete(&reading, consensus).await {
                    warn!(
                        patient = %consensus.patient_id,
                        error = %e,
                        "Scoring trigger failed"
                    );
                    SERVICE_ERRORS
                        .with_label_values(&["ingestion", "downstream"])
                        .inc();
                }
            }
        }

        Ok(consensus)
    }

    async fn ingest_batch(&self, readings: Vec<SensorReading>) -> IngestionResult<BatchOutcome> {
        if readings.is_empty() {
            return Err(IngestionError::Validation(
                "readings must be a non-empty array".into(),
            ));
        }

        let mut outcome = BatchOutcome::default();
        for (index, reading) in readings.into_iter().enumerate() {
            match self.ingest_reading(reading).await {
                Ok(consensus) => {
                    outcome.accepted += 1;
                    if let Some(c) = consensus {
                        outcome.consensuses.push(c);
                    }
                }
                Err(e) => outcome.errors.push((index, e.to_string())),
            }
        }
        Ok(outcome)
    }

    async fn consensus_history(
        &self,
        patient_id: &PatientId,
        query: ConsensusQuery,
    ) -> IngestionResult<Vec<SensorConsensus>> {
        self.consensuses
            .query(patient_id, &query)
            .await
            .map_err(IngestionError::Storage)
    }
}
