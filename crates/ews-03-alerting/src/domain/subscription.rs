//! Subscription routing rules.

use crate::domain::alert::Alert;
use crate::domain::error::{AlertError, AlertResult};
use crate::domain::ChannelKind;
use serde::{Deserialize, Serialize};
use shared_types::{AlertSeverity, AlertType, PatientId};
use uuid::Uuid;

/// Who subscribes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubscriberType {
    /// A clinical staff member.
    #[serde(rename = "STAFF")]
    Staff,
    /// A ward or department inbox (escalation tier).
    #[serde(rename = "DEPARTMENT")]
    Department,
    /// A patient's relative.
    #[serde(rename = "PATIENT_RELATIVE")]
    PatientRelative,
}

impl SubscriberType {
    /// Parse a wire name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "STAFF" => Some(Self::Staff),
            "DEPARTMENT" => Some(Self::Department),
            "PATIENT_RELATIVE" => Some(Self::PatientRelative),
            _ => None,
        }
    }
}

/// One delivery channel on a subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionChannel {
    /// Channel kind.
    pub kind: ChannelKind,
    /// Address for the kind (email address, phone number, device token).
    pub contact: String,
    /// Disabled channels are skipped at dispatch.
    pub enabled: bool,
}

/// A routing rule from alerts to a subscriber.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    /// Unique identifier.
    pub subscription_id: Uuid,
    /// Who subscribes.
    pub subscriber_type: SubscriberType,
    /// Subscriber's identifier in its own system.
    pub subscriber_id: String,
    /// Restrict to one patient; `None` means any patient.
    pub patient_id: Option<PatientId>,
    /// Allowed alert types; empty means all.
    pub alert_types: Vec<AlertType>,
    /// Minimum severity the subscriber wants to hear about.
    pub min_severity: AlertSeverity,
    /// Delivery channels. At least one.
    pub channels: Vec<SubscriptionChannel>,
    /// Inactive subscriptions never match.
    pub active: bool,
}

impl Subscription {
    /// A subscription must carry at least one channel.
    pub fn validate(&self) -> AlertResult<()> {
        if self.channels.is_empty() {
            return Err(AlertError::Validation(
                "subscription requires at least one channel".into(),
            ));
        }
        if self.subscriber_id.is_empty() {
            return Err(AlertError::Validation("subscriberId is required".into()));
        }
        Ok(())
    }

    /// Whether this subscription matches an alert:
    /// active, patient-compatible, severe enough and of an allowed type.
    #[must_use]
    pub fn matches(&self, alert: &Alert) -> bool {
        if !self.active {
            return false;
        }
        if let Some(patient_id) = &self.patient_id {
            if patient_id != &alert.patient_id {
                return false;
            }
        }
        if alert.alert_severity < self.min_severity {
            return false;
        }
        self.alert_types.is_empty() || self.alert_types.contains(&alert.alert_type)
    }

    /// The narrower escalation-tier rule: department-level subscriptions
    /// with HIGH minimum severity, patient-scoped or global.
    #[must_use]
    pub fn matches_escalation(&self, alert: &Alert) -> bool {
        if !self.active
            || self.subscriber_type != SubscriberType::Department
            || self.min_severity != AlertSeverity::High
        {
            return false;
        }
        match &self.patient_id {
            Some(patient_id) => patient_id == &alert.patient_id,
            None => true,
        }
    }

    /// Channels that are enabled for dispatch.
    #[must_use]
    pub fn enabled_channels(&self) -> impl Iterator<Item = &SubscriptionChannel> {
        self.channels.iter().filter(|c| c.enabled)
    }
}
