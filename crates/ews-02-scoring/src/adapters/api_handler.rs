//! # Scoring API Handler
//!
//! Translates JSON command/query payloads from the HTTP edge into typed
//! calls on the inbound port.

use crate::domain::{CalculateCommand, EventQuery, ScoringError};
use crate::ports::ScoringApi;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use shared_types::{Consciousness, PatientId, ScoreEventKind, VitalSigns};
use uuid::Uuid;

/// Default page size for history queries.
const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Default threshold for the high-risk query.
const DEFAULT_HIGH_RISK_MIN_SCORE: u8 = 5;

/// JSON api handler for the scoring service.
pub struct ScoringApiHandler<S: ScoringApi> {
    service: S,
}

impl<S: ScoringApi> ScoringApiHandler<S> {
    /// Create a new handler over an inbound-port implementation.
    pub fn new(service: S) -> Self {
        Self { service }
    }

    /// Handle `POST /api/command/calculate-ews`.
    pub async fn handle_calculate(&self, body: &Value) -> Value {
        let command = match parse_command(body) {
            Ok(c) => c,
            Err(message) => return error_response(400, &message),
        };

        match self.service.calculate(command).await {
            Ok(receipt) => json!({
                "result": {
                    "eventId": receipt.event_id,
                    "totalScore": receipt.total_score,
                    "clinicalRisk": receipt.clinical_risk,
                    "consensus": receipt.consensus,
                }
            }),
            Err(e) => error_from(&e),
        }
    }

    /// Handle `POST /api/command/batch-calculate-ews`.
    pub async fn handle_batch_calculate(&self, body: &Value) -> Value {
        let Some(items) = body.get("calculations").and_then(Value::as_array) else {
            return error_response(400, "calculations must be a non-empty array");
        };
        if items.is_empty() {
            return error_response(400, "calculations must be a non-empty array");
        }

        let mut commands = Vec::with_capacity(items.len());
        let mut parse_errors = Vec::new();
        for (index, item) in items.iter().enumerate() {
            match parse_command(item) {
                Ok(command) => commands.push(command),
                Err(message) => parse_errors.push(json!({"index": index, "message": message})),
            }
        }

        if commands.is_empty() {
            return json!({ "result": { "results": [], "errors": parse_errors } });
        }

        match self.service.calculate_batch(commands).await {
            Ok(outcome) => {
                let mut errors = parse_errors;
                errors.extend(
                    outcome
                        .errors
                        .iter()
                        .map(|(index, message)| json!({"index": index, "message": message})),
                );
                let results: Vec<Value> = outcome
                    .results
                    .iter()
                    .map(|r| {
                        json!({
                            "eventId": r.event_id,
                            "totalScore": r.total_score,
                            "clinicalRisk": r.clinical_risk,
                        })
                    })
                    .collect();
                json!({ "result": { "results": results, "errors": errors } })
            }
            Err(e) => error_from(&e),
        }
    }

    /// Handle `GET /api/query/patient/{patientId}/latest`.
    pub async fn handle_latest(&self, patient_id: &str) -> Value {
        match self.service.latest(&PatientId::new(patient_id)).await {
            Ok(Some(model)) => json!({ "result": model }),
            Ok(None) => error_response(404, &format!("No read model for patient {patient_id}")),
            Err(e) => error_from(&e),
        }
    }

    /// Handle `GET /api/query/patient/{patientId}/history`.
    pub async fn handle_history(&self, patient_id: &str, params: &Value) -> Value {
        let limit = params
            .get("limit")
            .and_then(Value::as_u64)
            .map(|l| l as usize)
            .unwrap_or(DEFAULT_HISTORY_LIMIT);

        let from = match parse_optional_time(params, "from") {
            Ok(v) => v,
            Err(message) => return error_response(400, &message),
        };
        let to = match parse_optional_time(params, "to") {
            Ok(v) => v,
            Err(message) => return error_response(400, &message),
        };

        match self
            .service
            .history(&PatientId::new(patient_id), limit, from, to)
            .await
        {
            Ok(entries) => json!({ "result": entries }),
            Err(e) => error_from(&e),
        }
    }

    /// Handle `GET /api/query/consensus/{consensusId}`.
    pub async fn handle_consensus(&self, consensus_id: &str) -> Value {
        let Ok(id) = Uuid::parse_str(consensus_id) else {
            return error_response(400, &format!("Bad consensus id: {consensus_id}"));
        };
        match self.service.consensus_by_id(id).await {
            Ok(Some(consensus)) => json!({ "result": consensus }),
            Ok(None) => error_response(404, &format!("No consensus {consensus_id}")),
            Err(e) => error_from(&e),
        }
    }

    /// Handle `GET /api/query/events`.
    pub async fn handle_events(&self, params: &Value) -> Value {
        let mut query = EventQuery {
            patient_id: params
                .get("patientId")
                .and_then(Value::as_str)
                .map(PatientId::new),
            limit: params
                .get("limit")
                .and_then(Value::as_u64)
                .map(|l| l as usize),
            ..Default::default()
        };

        if let Some(raw) = params.get("eventType").and_then(Value::as_str) {
            query.kind = match raw {
                "EWS_CALCULATED" => Some(ScoreEventKind::EwsCalculated),
                "EWS_UPDATED" => Some(ScoreEventKind::EwsUpdated),
                "EWS_VALIDATED" => Some(ScoreEventKind::EwsValidated),
                other => return error_response(400, &format!("Unknown eventType: {other}")),
            };
        }
        match parse_optional_time(params, "from") {
            Ok(v) => query.from = v,
            Err(message) => return error_response(400, &message),
        }
        match parse_optional_time(params, "to") {
            Ok(v) => query.to = v,
            Err(message) => return error_response(400, &message),
        }

        match self.service.events(query).await {
            Ok(events) => json!({ "result": events }),
            Err(e) => error_from(&e),
        }
    }

    /// Handle `GET /api/query/stats/overview`.
    pub async fn handle_stats(&self) -> Value {
        match self.service.stats_overview().await {
            Ok(stats) => json!({ "result": stats }),
            Err(e) => error_from(&e),
        }
    }

    /// Handle `GET /api/query/high-risk-patients`.
    pub async fn handle_high_risk(&self, params: &Value) -> Value {
        let min_score = params
            .get("minScore")
            .and_then(Value::as_u64)
            .map(|s| s.min(20) as u8)
            .unwrap_or(DEFAULT_HIGH_RISK_MIN_SCORE);

        match self.service.high_risk_patients(min_score).await {
            Ok(models) => json!({ "result": models }),
            Err(e) => error_from(&e),
        }
    }
}

/// Required vital fields as the command API names them.
const REQUIRED_VITALS: [&str; 6] = [
    "respiratoryRate",
    "oxygenSaturation",
    "temperature",
    "systolicBP",
    "heartRate",
    "consciousness",
];

fn parse_command(body: &Value) -> Result<CalculateCommand, String> {
    let patient_id = body
        .get("patientId")
        .and_then(Value::as_str)
        .ok_or("Missing required field: patientId")?;
    let node_id = body
        .get("nodeId")
        .and_then(Value::as_str)
        .ok_or("Missing required field: nodeId")?;
    let vitals = body
        .get("vitalSigns")
        .ok_or("Missing required field: vitalSigns")?;

    for field in REQUIRED_VITALS {
        if vitals.get(field).map_or(true, Value::is_null) {
            return Err(format!("Missing required vital: {field}"));
        }
    }

    let consciousness_raw = &vitals["consciousness"];
    let consciousness = if let Some(s) = consciousness_raw.as_str() {
        Consciousness::parse(s).ok_or_else(|| format!("Invalid consciousness: {s}"))?
    } else if let Some(code) = consciousness_raw.as_i64() {
        Consciousness::from_code(code).map_err(|e| e.to_string())?
    } else {
        return Err("Invalid consciousness: expected AVPU string or 0-3 code".into());
    };

    let number = |field: &str| -> Result<f64, String> {
        vitals[field]
            .as_f64()
            .ok_or_else(|| format!("{field} must be a number"))
    };

    let observed_at = match body.get("timestamp") {
        None | Some(Value::Null) => None,
        Some(value) => Some(parse_time(value)?),
    };

    Ok(CalculateCommand {
        patient_id: PatientId::new(patient_id),
        node_id: node_id.into(),
        vital_signs: VitalSigns {
            respiratory_rate: number("respiratoryRate")?,
            oxygen_saturation: number("oxygenSaturation")?,
            temperature: number("temperature")?,
            systolic_bp: number("systolicBP")?,
            heart_rate: number("heartRate")?,
            consciousness,
        },
        observed_at,
        validated: body
            .get("validated")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        metadata: body.get("metadata").cloned().unwrap_or(Value::Null),
        correlation_id: body
            .get("correlationId")
            .and_then(Value::as_str)
            .and_then(|s| Uuid::parse_str(s).ok()),
    })
}

fn parse_time(value: &Value) -> Result<DateTime<Utc>, String> {
    let raw = value
        .as_str()
        .ok_or_else(|| "timestamp must be an ISO 8601 string".to_string())?;
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("Bad timestamp {raw}: {e}"))
}

fn parse_optional_time(params: &Value, field: &str) -> Result<Option<DateTime<Utc>>, String> {
    match params.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => parse_time(value).map(Some),
    }
}

fn error_response(code: u16, message: &str) -> Value {
    json!({ "error": { "code": code, "message": message } })
}

fn error_from(error: &ScoringError) -> Value {
    let code = match error {
        ScoringError::Validation(_) => 400,
        ScoringError::NotFound(_) => 404,
        ScoringError::Storage(_) | ScoringError::Bus(_) => 500,
    };
    error_response(code, &error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{
        InMemoryReadModelStore, InMemoryScoreConsensusStore, InMemoryScoreEventStore,
    };
    use crate::domain::ScoringConfig;
    use crate::ports::ScoreEventBus;
    use crate::service::{ScoringDependencies, ScoringService};
    use async_trait::async_trait;
    use shared_types::{ScoreConsensus, ScoreEvent};
    use std::sync::Arc;

    struct NullBus;

    #[async_trait]
    impl ScoreEventBus for NullBus {
        async fn publish_score_calculated(&self, _: ScoreEvent, _: Uuid) -> Result<(), String> {
            Ok(())
        }
        async fn publish_score_consensus(&self, _: ScoreConsensus, _: Uuid) -> Result<(), String> {
            Ok(())
        }
    }

    fn handler() -> ScoringApiHandler<
        ScoringService<
            InMemoryScoreEventStore,
            InMemoryScoreConsensusStore,
            InMemoryReadModelStore,
            NullBus,
        >,
    > {
        let service = ScoringService::new(ScoringDependencies {
            events: Arc::new(InMemoryScoreEventStore::new()),
            consensuses: Arc::new(InMemoryScoreConsensusStore::new()),
            read_models: Arc::new(InMemoryReadModelStore::new()),
            bus: Arc::new(NullBus),
            config: ScoringConfig::default(),
        });
        ScoringApiHandler::new(service)
    }

    fn command_body(node: &str, secs: u32) -> Value {
        json!({
            "patientId": "P1",
            "nodeId": node,
            "timestamp": format!("2026-03-01T12:00:{secs:02}Z"),
            "vitalSigns": {
                "respiratoryRate": 18.0,
                "oxygenSaturation": 96.0,
                "temperature": 37.1,
                "systolicBP": 125.0,
                "heartRate": 72.0,
                "consciousness": "Alert",
            }
        })
    }

    #[tokio::test]
    async fn test_calculate_returns_receipt() {
        let handler = handler();
        let response = handler.handle_calculate(&command_body("node-1", 0)).await;
        assert_eq!(response["result"]["totalScore"], 0);
        assert_eq!(response["result"]["clinicalRisk"], "Low");
        assert!(response["result"]["eventId"].is_string());
    }

    #[tokio::test]
    async fn test_calculate_rejects_missing_vital() {
        let handler = handler();
        let mut body = command_body("node-1", 0);
        body["vitalSigns"].as_object_mut().unwrap().remove("heartRate");

        let response = handler.handle_calculate(&body).await;
        assert_eq!(response["error"]["code"], 400);
        assert!(response["error"]["message"]
            .as_str()
            .unwrap()
            .contains("heartRate"));
    }

    #[tokio::test]
    async fn test_calculate_rejects_bad_consciousness() {
        let handler = handler();
        let mut body = command_body("node-1", 0);
        body["vitalSigns"]["consciousness"] = json!("Sleepy");

        let response = handler.handle_calculate(&body).await;
        assert_eq!(response["error"]["code"], 400);
    }

    #[tokio::test]
    async fn test_second_node_forms_consensus() {
        let handler = handler();
        handler.handle_calculate(&command_body("node-1", 0)).await;
        let response = handler.handle_calculate(&command_body("node-2", 1)).await;
        assert_eq!(response["result"]["consensus"]["method"], "majority");
        assert_eq!(response["result"]["consensus"]["consensusScore"], 0);
    }

    #[tokio::test]
    async fn test_latest_404_before_consensus() {
        let handler = handler();
        let response = handler.handle_latest("P1").await;
        assert_eq!(response["error"]["code"], 404);
    }

    #[tokio::test]
    async fn test_latest_after_consensus() {
        let handler = handler();
        handler.handle_calculate(&command_body("node-1", 0)).await;
        handler.handle_calculate(&command_body("node-2", 1)).await;

        let response = handler.handle_latest("P1").await;
        assert_eq!(response["result"]["currentScore"], 0);
        assert_eq!(response["result"]["clinicalRisk"], "Low");
    }

    #[tokio::test]
    async fn test_batch_partial_success() {
        let handler = handler();
        let mut bad = command_body("node-1", 2);
        bad["vitalSigns"]["respiratoryRate"] = json!(8.5); // out of band

        let response = handler
            .handle_batch_calculate(&json!({ "calculations": [
                command_body("node-1", 0),
                bad,
            ]}))
            .await;
        assert_eq!(response["result"]["results"].as_array().unwrap().len(), 1);
        assert_eq!(response["result"]["errors"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_stats_and_high_risk() {
        let handler = handler();
        handler.handle_calculate(&command_body("node-1", 0)).await;
        handler.handle_calculate(&command_body("node-2", 1)).await;

        let stats = handler.handle_stats().await;
        assert_eq!(stats["result"]["patients"], 1);
        assert_eq!(stats["result"]["totalEvents"], 2);

        let high_risk = handler.handle_high_risk(&json!({})).await;
        assert_eq!(high_risk["result"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_events_query() {
        let handler = handler();
        handler.handle_calculate(&command_body("node-1", 0)).await;
        handler.handle_calculate(&command_body("node-2", 1)).await;

        let response = handler
            .handle_events(&json!({ "patientId": "P1", "limit": 1 }))
            .await;
        assert_eq!(response["result"].as_array().unwrap().len(), 1);
    }
}
