//! Scoring Service - core business logic.
//!
//! One calculation per command:
//!
//! 1. Validate the vector through the NEWS2 bands (out-of-band values are
//!    validation errors, never silent zeros).
//! 2. Append the score event (storage failure aborts; nothing published).
//! 3. Publish `ews.calculated` (best-effort).
//! 4. Run a score-consensus round over the window; persist and publish
//!    `ews.consensus`, then project the read model.
//!
//! A failed consensus step leaves the score event persisted; the pipeline
//! self-heals because the next calculation re-reduces the window.

mod projector;

#[cfg(test)]
mod tests;

pub use projector::ReadModelProjector;

use crate::domain::{
    news2, resolve_scores, score_latest_per_node, CalculateCommand, EventQuery, PatientReadModel,
    RiskDistribution, ScoreHistoryEntry, ScoringConfig, ScoringError, ScoringResult, StatsOverview,
};
use crate::ports::{
    BatchScoreOutcome, CalculationReceipt, ReadModelStore, ScoreConsensusStore, ScoreEventBus,
    ScoreEventStore, ScoringApi,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use ews_telemetry::{SCORES_CALCULATED, SCORE_CONSENSUS_ROUNDS, SERVICE_ERRORS};
use shared_types::{
    ClinicalRisk, PatientId, ScoreConsensus, ScoreEvent, ScoreEventKind,
};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Scoring service over its outbound ports.
pub struct ScoringService<E, C, M, B>
where
    E: ScoreEventStore,
    C: ScoreConsensusStore,
    M: ReadModelStore,
    B: ScoreEventBus,
{
    events: Arc<E>,
    consensuses: Arc<C>,
    read_models: Arc<M>,
    bus: Arc<B>,
    projector: ReadModelProjector<M>,
    config: ScoringConfig,
}

/// Dependencies for `ScoringService`.
pub struct ScoringDependencies<E, C, M, B> {
    pub events: Arc<E>,
    pub consensuses: Arc<C>,
    pub read_models: Arc<M>,
    pub bus: Arc<B>,
    pub config: ScoringConfig,
}

impl<E, C, M, B> ScoringService<E, C, M, B>
where
    E: ScoreEventStore,
    C: ScoreConsensusStore,
    M: ReadModelStore,
    B: ScoreEventBus,
{
    /// Create a new scoring service.
    pub fn new(deps: ScoringDependencies<E, C, M, B>) -> Self {
        Self {
            events: deps.events,
            consensuses: deps.consensuses,
            projector: ReadModelProjector::new(deps.read_models.clone()),
            read_models: deps.read_models,
            bus: deps.bus,
            config: deps.config,
        }
    }

    /// Apply an already-persisted consensus to the read model. Exposed for
    /// the bus consumer: duplicate deliveries are no-ops.
    pub async fn project_consensus(&self, consensus: &ScoreConsensus) -> ScoringResult<bool> {
        self.projector
            .apply(consensus)
            .await
            .map_err(ScoringError::Storage)
    }

    /// Decide the event kind: a node recalculating inside the window is an
    /// update, otherwise a fresh calculation. Externally validated
    /// submissions keep their kind.
    fn event_kind(window_events: &[ScoreEvent], command: &CalculateCommand) -> ScoreEventKind {
        if command.validated {
            return ScoreEventKind::EwsValidated;
        }
        if window_events
            .iter()
            .any(|e| e.node_id == command.node_id)
        {
            ScoreEventKind::EwsUpdated
        } else {
            ScoreEventKind::EwsCalculated
        }
    }

    /// Run one score-consensus round anchored at `observed_at`, assuming
    /// the triggering event is already appended.
    async fn consensus_round(
        &self,
        patient_id: &PatientId,
        observed_at: DateTime<Utc>,
        correlation_id: Uuid,
    ) -> ScoringResult<Option<ScoreConsensus>> {
        let start = observed_at - Duration::seconds(self.config.window_lookback_secs);
        let end = observed_at + Duration::seconds(self.config.window_grace_secs);

        let window_events = self
            .events
            .events_in_window(patient_id, start, end)
            .await
            .map_err(ScoringError::Storage)?;

        if window_events.len() < self.config.min_window_events {
            debug!(
                patient = %patient_id,
                in_window = window_events.len(),
                "Not enough score events for a consensus round"
            );
            return Ok(None);
        }

        let participants = score_latest_per_node(&window_events);
        let Some(outcome) = resolve_scores(
            &participants,
            Duration::seconds(self.config.agreement_span_secs),
            self.config.score_threshold,
        ) else {
            return Ok(None);
        };

        let consensus = ScoreConsensus {
            consensus_id: Uuid::new_v4(),
            patient_id: patient_id.clone(),
            node_scores: participants,
            consensus_score: outcome.score,
            clinical_risk: ClinicalRisk::from_total(outcome.score),
            consensus_at: outcome.at,
            valid: outcome.valid,
            method: outcome.method,
        };

        // Persist before publish; a storage failure aborts emission.
        self.consensuses
            .insert_consensus(consensus.clone())
            .await
            .map_err(ScoringError::Storage)?;

        SCORE_CONSENSUS_ROUNDS
            .with_label_values(&[consensus.method.as_str()])
            .inc();

        if let Err(e) = self
            .bus
            .publish_score_consensus(consensus.clone(), correlation_id)
            .await
        {
            warn!(patient = %patient_id, error = %e, "Failed to publish score consensus");
            SERVICE_ERRORS.with_label_values(&["scoring", "bus"]).inc();
        }

        // Project directly as well: the bus round-trip also lands here,
        // and the consensus-id dedup makes the second application a no-op.
        self.project_consensus(&consensus).await?;

        info!(
            patient = %patient_id,
            score = consensus.consensus_score,
            method = ?consensus.method,
            valid = consensus.valid,
            "Score consensus reached"
        );

        Ok(Some(consensus))
    }
}

#[async_trait]
impl<E, C, M, B> ScoringApi for ScoringService<E, C, M, B>
where
    E: ScoreEventStore,
    C: ScoreConsensusStore,
    M: ReadModelStore,
    B: ScoreEventBus,
{
    async fn calculate(&self, command: CalculateCommand) -> ScoringResult<CalculationReceipt> {
        if command.patient_id.as_str().is_empty() {
            return Err(ScoringError::Validation("patientId is required".into()));
        }
        if command.node_id.as_str().is_empty() {
            return Err(ScoringError::Validation("nodeId is required".into()));
        }

        let breakdown =
            news2::score(&command.vital_signs).map_err(|e| ScoringError::Validation(e.to_string()))?;

        let observed_at = command.observed_at.unwrap_or_else(Utc::now);
        let correlation_id = command.correlation_id.unwrap_or_else(Uuid::new_v4);

        // Kind depends on what the window already holds for this node.
        let start = observed_at - Duration::seconds(self.config.window_lookback_secs);
        let end = observed_at + Duration::seconds(self.config.window_grace_secs);
        let window_events = self
            .events
            .events_in_window(&command.patient_id, start, end)
            .await
            .map_err(ScoringError::Storage)?;

        let event = ScoreEvent {
            event_id: Uuid::new_v4(),
            patient_id: command.patient_id.clone(),
            node_id: command.node_id.clone(),
            kind: Self::event_kind(&window_events, &command),
            observed_at,
            vital_signs: command.vital_signs.clone(),
            score_components: breakdown.components,
            total_score: breakdown.total_score,
            clinical_risk: breakdown.clinical_risk,
            metadata: command.metadata.clone(),
        };

        self.events
            .append_event(event.clone())
            .await
            .map_err(ScoringError::Storage)?;
        SCORES_CALCULATED.inc();

        if let Err(e) = self
            .bus
            .publish_score_calculated(event.clone(), correlation_id)
            .await
        {
            warn!(patient = %event.patient_id, error = %e, "Failed to publish score event");
            SERVICE_ERRORS.with_label_values(&["scoring", "bus"]).inc();
        }

        let consensus = self
            .consensus_round(&command.patient_id, observed_at, correlation_id)
            .await?;

        Ok(CalculationReceipt {
            event_id: event.event_id,
            total_score: breakdown.total_score,
            clinical_risk: breakdown.clinical_risk,
            consensus,
        })
    }

    async fn calculate_batch(
        &self,
        commands: Vec<CalculateCommand>,
    ) -> ScoringResult<BatchScoreOutcome> {
        if commands.is_empty() {
            return Err(ScoringError::Validation(
                "calculations must be a non-empty array".into(),
            ));
        }

        let mut outcome = BatchScoreOutcome::default();
        for (index, command) in commands.into_iter().enumerate() {
            match self.calculate(command).await {
                Ok(receipt) => outcome.results.push(receipt),
                Err(e) => outcome.errors.push((index, e.to_string())),
            }
        }
        Ok(outcome)
    }

    async fn latest(&self, patient_id: &PatientId) -> ScoringResult<Option<PatientReadModel>> {
        self.read_models
            .get(patient_id)
            .await
            .map_err(ScoringError::Storage)
    }

    async fn history(
        &self,
        patient_id: &PatientId,
        limit: usize,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> ScoringResult<Vec<ScoreHistoryEntry>> {
        let model = self
            .read_models
            .get(patient_id)
            .await
            .map_err(ScoringError::Storage)?
            .ok_or_else(|| ScoringError::NotFound(format!("patient {patient_id}")))?;

        let mut entries: Vec<ScoreHistoryEntry> = model
            .score_history
            .into_iter()
            .filter(|e| from.map_or(true, |from| e.timestamp >= from))
            .filter(|e| to.map_or(true, |to| e.timestamp <= to))
            .collect();
        entries.reverse(); // most recent first
        entries.truncate(limit);
        Ok(entries)
    }

    async fn consensus_by_id(&self, consensus_id: Uuid) -> ScoringResult<Option<ScoreConsensus>> {
        self.consensuses
            .get(consensus_id)
            .await
            .map_err(ScoringError::Storage)
    }

    async fn events(&self, query: EventQuery) -> ScoringResult<Vec<ScoreEvent>> {
        self.events.query(&query).await.map_err(ScoringError::Storage)
    }

    async fn stats_overview(&self) -> ScoringResult<StatsOverview> {
        let models = self
            .read_models
            .all()
            .await
            .map_err(ScoringError::Storage)?;
        let total_events = self.events.count().await.map_err(ScoringError::Storage)?;

        let mut distribution = RiskDistribution::default();
        let mut score_sum = 0u64;
        for model in &models {
            score_sum += u64::from(model.current_score);
            match model.clinical_risk {
                ClinicalRisk::Low => distribution.low += 1,
                ClinicalRisk::LowMedium => distribution.low_medium += 1,
                ClinicalRisk::Medium => distribution.medium += 1,
                ClinicalRisk::High => distribution.high += 1,
            }
        }

        let average_score = if models.is_empty() {
            0.0
        } else {
            score_sum as f64 / models.len() as f64
        };

        Ok(StatsOverview {
            patients: models.len(),
            average_score,
            risk_distribution: distribution,
            total_events,
        })
    }

    async fn high_risk_patients(&self, min_score: u8) -> ScoringResult<Vec<PatientReadModel>> {
        let mut models = self
            .read_models
            .all()
            .await
            .map_err(ScoringError::Storage)?;
        models.retain(|m| m.current_score >= min_score);
        models.sort_by(|a, b| b.current_score.cmp(&a.current_score));
        Ok(models)
    }
}
