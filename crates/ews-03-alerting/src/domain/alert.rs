//! The alert work item and its lifecycle.
//!
//! `NEW → ACKNOWLEDGED → RESOLVED`, with
//! `NEW → ESCALATED → ACKNOWLEDGED → RESOLVED` as the alternate arc.

use crate::domain::error::{AlertError, AlertResult};
use crate::domain::priority::escalate_priority;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::{AlertSeverity, AlertType, PatientId};
use uuid::Uuid;

/// Lifecycle state of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertStatus {
    /// Freshly raised, nobody has taken it.
    #[serde(rename = "NEW")]
    New,
    /// A user has taken ownership.
    #[serde(rename = "ACKNOWLEDGED")]
    Acknowledged,
    /// Closed.
    #[serde(rename = "RESOLVED")]
    Resolved,
    /// Raised to the escalation tier.
    #[serde(rename = "ESCALATED")]
    Escalated,
}

impl AlertStatus {
    /// The wire name of this status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Acknowledged => "ACKNOWLEDGED",
            Self::Resolved => "RESOLVED",
            Self::Escalated => "ESCALATED",
        }
    }

    /// Parse a wire name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "NEW" => Some(Self::New),
            "ACKNOWLEDGED" => Some(Self::Acknowledged),
            "RESOLVED" => Some(Self::Resolved),
            "ESCALATED" => Some(Self::Escalated),
            _ => None,
        }
    }
}

/// A priority-ordered alert work item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    /// Unique identifier.
    pub alert_id: Uuid,
    /// The affected patient.
    pub patient_id: PatientId,
    /// The service that raised the alert.
    pub source_service: String,
    /// Classified type.
    pub alert_type: AlertType,
    /// Classified severity.
    pub alert_severity: AlertSeverity,
    /// Human-readable summary.
    pub message: String,
    /// When the underlying observation happened.
    pub observed_at: DateTime<Utc>,
    /// Attached sensor payload, when sensor-sourced.
    #[serde(default)]
    pub sensor_data: Value,
    /// Attached score payload, when score-sourced.
    #[serde(default)]
    pub ews_data: Value,
    /// Lifecycle state.
    pub status: AlertStatus,
    /// Dispatch priority (1–100).
    pub priority: u8,
    /// Who acknowledged, when.
    pub acknowledged_by: Option<String>,
    pub acknowledged_at: Option<DateTime<Utc>>,
    /// Who resolved, when and how.
    pub resolved_by: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolution: Option<String>,
    /// When the alert was escalated, and why.
    pub escalated_at: Option<DateTime<Utc>>,
    pub escalation_reason: Option<String>,
    /// Notifications dispatched for this alert, by id (one-way ownership;
    /// notifications carry `alert_id` as a foreign key).
    pub notification_ids: Vec<Uuid>,
    /// When the alert record was created.
    pub created_at: DateTime<Utc>,
}

/// Command to create an alert (the HTTP surface and the classifiers both
/// funnel through this).
#[derive(Debug, Clone)]
pub struct CreateAlert {
    pub patient_id: PatientId,
    pub source_service: String,
    pub alert_type: AlertType,
    pub alert_severity: AlertSeverity,
    pub message: String,
    pub observed_at: Option<DateTime<Utc>>,
    pub sensor_data: Value,
    pub ews_data: Value,
}

/// Filters for the alert list API.
#[derive(Debug, Clone, Default)]
pub struct AlertQuery {
    pub patient_id: Option<PatientId>,
    pub status: Option<AlertStatus>,
    pub severity: Option<AlertSeverity>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl Alert {
    /// Acknowledge: permitted from NEW or ESCALATED.
    pub fn acknowledge(&mut self, user_id: &str, at: DateTime<Utc>) -> AlertResult<()> {
        match self.status {
            AlertStatus::New | AlertStatus::Escalated => {
                self.status = AlertStatus::Acknowledged;
                self.acknowledged_by = Some(user_id.to_owned());
                self.acknowledged_at = Some(at);
                Ok(())
            }
            status => Err(AlertError::InvalidTransition(format!(
                "cannot acknowledge alert in status {}",
                status.as_str()
            ))),
        }
    }

    /// Resolve: permitted from anything but RESOLVED.
    pub fn resolve(
        &mut self,
        user_id: &str,
        resolution: Option<String>,
        at: DateTime<Utc>,
    ) -> AlertResult<()> {
        if self.status == AlertStatus::Resolved {
            return Err(AlertError::InvalidTransition(
                "alert is already resolved".into(),
            ));
        }
        self.status = AlertStatus::Resolved;
        self.resolved_by = Some(user_id.to_owned());
        self.resolved_at = Some(at);
        self.resolution = resolution;
        Ok(())
    }

    /// Escalate: rejected on RESOLVED. Lifts status and priority; the
    /// service re-notifies the escalation tier.
    pub fn escalate(&mut self, reason: Option<String>, at: DateTime<Utc>) -> AlertResult<()> {
        if self.status == AlertStatus::Resolved {
            return Err(AlertError::InvalidTransition(
                "cannot escalate a resolved alert".into(),
            ));
        }
        self.status = AlertStatus::Escalated;
        self.priority = escalate_priority(self.priority);
        self.escalated_at = Some(at);
        self.escalation_reason = reason;
        Ok(())
    }
}
