//! Driving ports (inbound API): the command and query surface the HTTP
//! edge and the ingestion gateway drive.

use crate::domain::{
    CalculateCommand, EventQuery, PatientReadModel, ScoreHistoryEntry, ScoringResult,
    StatsOverview,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::{ClinicalRisk, PatientId, ScoreConsensus, ScoreEvent};
use uuid::Uuid;

/// What a calculate command returns to its caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationReceipt {
    /// The appended score event's id.
    pub event_id: Uuid,
    /// The calculated NEWS2 total.
    pub total_score: u8,
    /// Risk band for the total.
    pub clinical_risk: ClinicalRisk,
    /// The consensus formed by this calculation's round, if any.
    pub consensus: Option<ScoreConsensus>,
}

/// Outcome of a batch calculate.
#[derive(Debug, Default)]
pub struct BatchScoreOutcome {
    /// Per-item receipts for successful calculations.
    pub results: Vec<CalculationReceipt>,
    /// Per-item errors (index, message).
    pub errors: Vec<(usize, String)>,
}

/// Primary scoring API.
#[async_trait]
pub trait ScoringApi: Send + Sync {
    /// Calculate a NEWS2 score: validate, band, append the score event,
    /// publish it, then run a score-consensus round and project the read
    /// model when a consensus forms.
    async fn calculate(&self, command: CalculateCommand) -> ScoringResult<CalculationReceipt>;

    /// Calculate a batch. Partial success: per-item errors are collected,
    /// the rest proceed.
    async fn calculate_batch(
        &self,
        commands: Vec<CalculateCommand>,
    ) -> ScoringResult<BatchScoreOutcome>;

    /// Latest read model for a patient.
    async fn latest(&self, patient_id: &PatientId) -> ScoringResult<Option<PatientReadModel>>;

    /// Score history for a patient, most recent first, bounded by `limit`.
    async fn history(
        &self,
        patient_id: &PatientId,
        limit: usize,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> ScoringResult<Vec<ScoreHistoryEntry>>;

    /// Fetch one consensus by id.
    async fn consensus_by_id(&self, consensus_id: Uuid) -> ScoringResult<Option<ScoreConsensus>>;

    /// Query score events.
    async fn events(&self, query: EventQuery) -> ScoringResult<Vec<ScoreEvent>>;

    /// Fleet statistics.
    async fn stats_overview(&self) -> ScoringResult<StatsOverview>;

    /// Patients whose current score is at least `min_score`, highest
    /// score first.
    async fn high_risk_patients(&self, min_score: u8) -> ScoringResult<Vec<PatientReadModel>>;
}
