//! # Alert API Handler
//!
//! Translates JSON command/query payloads from the HTTP edge into typed
//! calls on the inbound port.

use crate::domain::{
    AlertError, AlertQuery, AlertStatus, ChannelKind, CreateAlert, NotificationQuery,
    NotificationStatus, SubscriberType, Subscription, SubscriptionChannel,
};
use crate::ports::AlertApi;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use shared_types::{AlertSeverity, AlertType, PatientId};
use uuid::Uuid;

/// JSON api handler for the alerting service.
pub struct AlertApiHandler<S: AlertApi> {
    service: S,
}

impl<S: AlertApi> AlertApiHandler<S> {
    /// Create a new handler over an inbound-port implementation.
    pub fn new(service: S) -> Self {
        Self { service }
    }

    /// Handle `POST /api/alerts`.
    pub async fn handle_create(&self, body: &Value) -> Value {
        let command = match parse_create(body) {
            Ok(c) => c,
            Err(message) => return error_response(400, &message),
        };

        match self.service.create_alert(command).await {
            Ok(alert) => json!({ "result": alert }),
            Err(e) => error_from(&e),
        }
    }

    /// Handle `GET /api/alerts`.
    pub async fn handle_list(&self, params: &Value) -> Value {
        let mut query = AlertQuery {
            patient_id: params
                .get("patientId")
                .and_then(Value::as_str)
                .map(PatientId::new),
            limit: params
                .get("limit")
                .and_then(Value::as_u64)
                .map(|l| l as usize),
            offset: params
                .get("offset")
                .and_then(Value::as_u64)
                .map(|o| o as usize),
            ..Default::default()
        };

        if let Some(raw) = params.get("status").and_then(Value::as_str) {
            match AlertStatus::parse(raw) {
                Some(status) => query.status = Some(status),
                None => return error_response(400, &format!("Unknown status: {raw}")),
            }
        }
        if let Some(raw) = params.get("severity").and_then(Value::as_str) {
            match AlertSeverity::parse(raw) {
                Some(severity) => query.severity = Some(severity),
                None => return error_response(400, &format!("Unknown severity: {raw}")),
            }
        }
        match parse_optional_time(params, "from") {
            Ok(v) => query.from = v,
            Err(message) => return error_response(400, &message),
        }
        match parse_optional_time(params, "to") {
            Ok(v) => query.to = v,
            Err(message) => return error_response(400, &message),
        }

        match self.service.list_alerts(query).await {
            Ok(alerts) => json!({ "result": alerts }),
            Err(e) => error_from(&e),
        }
    }

    /// Handle `PUT /api/alerts/{alertId}/acknowledge`.
    pub async fn handle_acknowledge(&self, alert_id: &str, body: &Value) -> Value {
        let Ok(id) = Uuid::parse_str(alert_id) else {
            return error_response(400, &format!("Bad alert id: {alert_id}"));
        };
        let Some(user_id) = body.get("userId").and_then(Value::as_str) else {
            return error_response(400, "Missing required field: userId");
        };

        match self.service.acknowledge(id, user_id).await {
            Ok(alert) => json!({ "result": alert }),
            Err(e) => error_from(&e),
        }
    }

    /// Handle `PUT /api/alerts/{alertId}/resolve`.
    pub async fn handle_resolve(&self, alert_id: &str, body: &Value) -> Value {
        let Ok(id) = Uuid::parse_str(alert_id) else {
            return error_response(400, &format!("Bad alert id: {alert_id}"));
        };
        let Some(user_id) = body.get("userId").and_then(Value::as_str) else {
            return error_response(400, "Missing required field: userId");
        };
        let resolution = body
            .get("resolution")
            .and_then(Value::as_str)
            .map(str::to_owned);

        match self.service.resolve(id, user_id, resolution).await {
            Ok(alert) => json!({ "result": alert }),
            Err(e) => error_from(&e),
        }
    }

    /// Handle `PUT /api/alerts/{alertId}/escalate`.
    pub async fn handle_escalate(&self, alert_id: &str, body: &Value) -> Value {
        let Ok(id) = Uuid::parse_str(alert_id) else {
            return error_response(400, &format!("Bad alert id: {alert_id}"));
        };
        let reason = body
            .get("reason")
            .and_then(Value::as_str)
            .map(str::to_owned);

        match self.service.escalate(id, reason).await {
            Ok(alert) => json!({ "result": alert }),
            Err(e) => error_from(&e),
        }
    }

    /// Handle `POST /api/subscriptions`.
    pub async fn handle_create_subscription(&self, body: &Value) -> Value {
        let subscription = match parse_subscription(body, None) {
            Ok(s) => s,
            Err(message) => return error_response(400, &message),
        };
        match self.service.create_subscription(subscription).await {
            Ok(subscription) => json!({ "result": subscription }),
            Err(e) => error_from(&e),
        }
    }

    /// Handle `PUT /api/subscriptions/{subscriptionId}`.
    pub async fn handle_update_subscription(&self, subscription_id: &str, body: &Value) -> Value {
        let Ok(id) = Uuid::parse_str(subscription_id) else {
            return error_response(400, &format!("Bad subscription id: {subscription_id}"));
        };
        let subscription = match parse_subscription(body, Some(id)) {
            Ok(s) => s,
            Err(message) => return error_response(400, &message),
        };
        match self.service.update_subscription(subscription).await {
            Ok(subscription) => json!({ "result": subscription }),
            Err(e) => error_from(&e),
        }
    }

    /// Handle `GET /api/subscriptions/{subscriptionId}`.
    pub async fn handle_get_subscription(&self, subscription_id: &str) -> Value {
        let Ok(id) = Uuid::parse_str(subscription_id) else {
            return error_response(400, &format!("Bad subscription id: {subscription_id}"));
        };
        match self.service.get_subscription(id).await {
            Ok(Some(subscription)) => json!({ "result": subscription }),
            Ok(None) => error_response(404, &format!("No subscription {subscription_id}")),
            Err(e) => error_from(&e),
        }
    }

    /// Handle `DELETE /api/subscriptions/{subscriptionId}`.
    pub async fn handle_delete_subscription(&self, subscription_id: &str) -> Value {
        let Ok(id) = Uuid::parse_str(subscription_id) else {
            return error_response(400, &format!("Bad subscription id: {subscription_id}"));
        };
        match self.service.delete_subscription(id).await {
            Ok(()) => json!({ "result": { "deleted": true } }),
            Err(e) => error_from(&e),
        }
    }

    /// Handle `GET /api/subscriptions`.
    pub async fn handle_list_subscriptions(&self) -> Value {
        match self.service.list_subscriptions().await {
            Ok(subscriptions) => json!({ "result": subscriptions }),
            Err(e) => error_from(&e),
        }
    }

    /// Handle `GET /api/notifications`.
    pub async fn handle_list_notifications(&self, params: &Value) -> Value {
        let mut query = NotificationQuery {
            alert_id: params
                .get("alertId")
                .and_then(Value::as_str)
                .and_then(|s| Uuid::parse_str(s).ok()),
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

        if let Some(raw) = params.get("status").and_then(Value::as_str) {
            match NotificationStatus::parse(raw) {
                Some(status) => query.status = Some(status),
                None => return error_response(400, &format!("Unknown status: {raw}")),
            }
        }

        match self.service.list_notifications(query).await {
            Ok(notifications) => json!({ "result": notifications }),
            Err(e) => error_from(&e),
        }
    }

    /// Handle `POST /api/notifications/{notificationId}/resend`.
    pub async fn handle_resend(&self, notification_id: &str) -> Value {
        let Ok(id) = Uuid::parse_str(notification_id) else {
            return error_response(400, &format!("Bad notification id: {notification_id}"));
        };
        match self.service.resend_notification(id).await {
            Ok(notification) => json!({ "result": notification }),
            Err(e) => error_from(&e),
        }
    }
}

fn parse_create(body: &Value) -> Result<CreateAlert, String> {
    let patient_id = body
        .get("patientId")
        .and_then(Value::as_str)
        .ok_or("Missing required field: patientId")?;
    let source_service = body
        .get("sourceService")
        .and_then(Value::as_str)
        .ok_or("Missing required field: sourceService")?;
    let type_raw = body
        .get("alertType")
        .and_then(Value::as_str)
        .ok_or("Missing required field: alertType")?;
    let severity_raw = body
        .get("alertSeverity")
        .and_then(Value::as_str)
        .ok_or("Missing required field: alertSeverity")?;
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .ok_or("Missing required field: message")?;

    let alert_type =
        AlertType::parse(type_raw).ok_or_else(|| format!("Unknown alertType: {type_raw}"))?;
    let alert_severity = AlertSeverity::parse(severity_raw)
        .ok_or_else(|| format!("Invalid alertSeverity: {severity_raw}"))?;

    let observed_at = match body.get("timestamp") {
        None | Some(Value::Null) => None,
        Some(value) => Some(parse_time(value)?),
    };

    Ok(CreateAlert {
        patient_id: PatientId::new(patient_id),
        source_service: source_service.to_owned(),
        alert_type,
        alert_severity,
        message: message.to_owned(),
        observed_at,
        sensor_data: body.get("sensorData").cloned().unwrap_or(Value::Null),
        ews_data: body.get("ewsData").cloned().unwrap_or(Value::Null),
    })
}

fn parse_subscription(body: &Value, existing_id: Option<Uuid>) -> Result<Subscription, String> {
    let type_raw = body
        .get("subscriberType")
        .and_then(Value::as_str)
        .ok_or("Missing required field: subscriberType")?;
    let subscriber_type = SubscriberType::parse(type_raw)
        .ok_or_else(|| format!("Unknown subscriberType: {type_raw}"))?;

    let subscriber_id = body
        .get("subscriberId")
        .and_then(Value::as_str)
        .ok_or("Missing required field: subscriberId")?;

    let min_severity = match body.get("minSeverity").and_then(Value::as_str) {
        Some(raw) => {
            AlertSeverity::parse(raw).ok_or_else(|| format!("Invalid minSeverity: {raw}"))?
        }
        None => AlertSeverity::Low,
    };

    let alert_types = match body.get("alertTypes").and_then(Value::as_array) {
        Some(items) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .and_then(AlertType::parse)
                    .ok_or_else(|| format!("Unknown alertType in alertTypes: {item}"))
            })
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };

    let channels = match body.get("channels").and_then(Value::as_array) {
        Some(items) => items
            .iter()
            .map(|item| {
                let kind_raw = item
                    .get("kind")
                    .and_then(Value::as_str)
                    .ok_or("Channel requires a kind")?;
                let kind = ChannelKind::parse(kind_raw)
                    .ok_or_else(|| format!("Unknown channel kind: {kind_raw}"))?;
                let contact = item
                    .get("contact")
                    .and_then(Value::as_str)
                    .ok_or("Channel requires a contact")?;
                Ok(SubscriptionChannel {
                    kind,
                    contact: contact.to_owned(),
                    enabled: item.get("enabled").and_then(Value::as_bool).unwrap_or(true),
                })
            })
            .collect::<Result<Vec<_>, String>>()?,
        None => Vec::new(),
    };

    Ok(Subscription {
        subscription_id: existing_id.unwrap_or_else(Uuid::new_v4),
        subscriber_type,
        subscriber_id: subscriber_id.to_owned(),
        patient_id: body
            .get("patientId")
            .and_then(Value::as_str)
            .map(PatientId::new),
        alert_types,
        min_severity,
        channels,
        active: body.get("active").and_then(Value::as_bool).unwrap_or(true),
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

fn error_from(error: &AlertError) -> Value {
    let code = match error {
        AlertError::Validation(_) | AlertError::InvalidTransition(_) => 400,
        AlertError::NotFound(_) => 404,
        AlertError::Storage(_) | AlertError::Bus(_) => 500,
    };
    error_response(code, &error.to_string())
}
