//! # Ingestion API Handler
//!
//! Translates JSON command/query payloads from the HTTP edge into typed
//! calls on the inbound port. Responses follow the
//! `{"result": ...}` / `{"error": {"code", "message"}}` convention; codes
//! mirror the HTTP statuses the edge maps them to.

use crate::domain::{ConsensusQuery, IngestionError};
use crate::ports::IngestionApi;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use shared_types::{PatientId, SensorReading, SensorType};

/// Required fields for a sensor reading payload, checked before
/// deserialization so the caller gets a field-level message.
const REQUIRED_READING_FIELDS: [&str; 5] =
    ["patientId", "sensorType", "value", "timestamp", "nodeId"];

/// JSON api handler for the ingestion service.
pub struct IngestionApiHandler<S: IngestionApi> {
    service: S,
}

impl<S: IngestionApi> IngestionApiHandler<S> {
    /// Create a new handler over an inbound-port implementation.
    pub fn new(service: S) -> Self {
        Self { service }
    }

    /// Handle `POST /api/data/sensor`.
    pub async fn handle_ingest(&self, body: &Value) -> Value {
        let reading = match parse_reading(body) {
            Ok(r) => r,
            Err(message) => return error_response(400, &message),
        };

        match self.service.ingest_reading(reading).await {
            Ok(consensus) => json!({
                "result": {
                    "status": "stored",
                    "consensus": consensus,
                }
            }),
            Err(e) => error_from(&e),
        }
    }

    /// Handle `POST /api/data/batch`.
    pub async fn handle_batch(&self, body: &Value) -> Value {
        let Some(items) = body.get("readings").and_then(Value::as_array) else {
            return error_response(400, "readings must be a non-empty array");
        };
        if items.is_empty() {
            return error_response(400, "readings must be a non-empty array");
        }

        let mut readings = Vec::with_capacity(items.len());
        let mut parse_errors = Vec::new();
        for (index, item) in items.iter().enumerate() {
            match parse_reading(item) {
                Ok(reading) => readings.push(reading),
                Err(message) => parse_errors.push(json!({"index": index, "message": message})),
            }
        }

        match self.service.ingest_batch(readings).await {
            Ok(outcome) => {
                let mut errors = parse_errors;
                errors.extend(
                    outcome
                        .errors
                        .iter()
                        .map(|(index, message)| json!({"index": index, "message": message})),
                );
                json!({
                    "result": {
                        "accepted": outcome.accepted,
                        "consensuses": outcome.consensuses,
                        "errors": errors,
                    }
                })
            }
            Err(e) => error_from(&e),
        }
    }

    /// Handle `GET /api/data/patient/{patientId}` with optional `from`,
    /// `to` (RFC 3339) and `sensorType` filters.
    pub async fn handle_patient_consensus(&self, patient_id: &str, params: &Value) -> Value {
        let mut query = ConsensusQuery::default();

        if let Some(raw) = params.get("sensorType").and_then(Value::as_str) {
            match SensorType::parse(raw) {
                Some(t) => query.sensor_type = Some(t),
                None => return error_response(400, &format!("Unknown sensorType: {raw}")),
            }
        }
        match parse_optional_time(params, "from") {
            Ok(from) => query.from = from,
            Err(message) => return error_response(400, &message),
        }
        match parse_optional_time(params, "to") {
            Ok(to) => query.to = to,
            Err(message) => return error_response(400, &message),
        }

        match self
            .service
            .consensus_history(&PatientId::new(patient_id), query)
            .await
        {
            Ok(consensuses) if consensuses.is_empty() => {
                error_response(404, &format!("No consensus data for patient {patient_id}"))
            }
            Ok(consensuses) => json!({ "result": consensuses }),
            Err(e) => error_from(&e),
        }
    }
}

fn parse_reading(body: &Value) -> Result<SensorReading, String> {
    for field in REQUIRED_READING_FIELDS {
        if body.get(field).map_or(true, Value::is_null) {
            return Err(format!("Missing required field: {field}"));
        }
    }

    let sensor_raw = body["sensorType"].as_str().unwrap_or_default();
    let sensor_type = SensorType::parse(sensor_raw)
        .ok_or_else(|| format!("Unknown sensorType: {sensor_raw}"))?;

    let value = body["value"]
        .as_f64()
        .ok_or_else(|| "value must be a number".to_string())?;

    let observed_at = parse_time(&body["timestamp"])?;

    let patient_id = body["patientId"]
        .as_str()
        .ok_or_else(|| "patientId must be a string".to_string())?;
    let node_id = body["nodeId"]
        .as_str()
        .ok_or_else(|| "nodeId must be a string".to_string())?;

    Ok(SensorReading {
        patient_id: PatientId::new(patient_id),
        sensor_type,
        value,
        unit: body
            .get("unit")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        observed_at,
        node_id: node_id.into(),
        metadata: body.get("metadata").cloned().unwrap_or(Value::Null),
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

fn error_from(error: &IngestionError) -> Value {
    let code = match error {
        IngestionError::Validation(_) => 400,
        IngestionError::NotFound(_) => 404,
        IngestionError::Storage(_) | IngestionError::Bus(_) | IngestionError::Downstream(_) => 500,
    };
    error_response(code, &error.to_string())
}
