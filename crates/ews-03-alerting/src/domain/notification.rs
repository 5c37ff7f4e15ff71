//! The notification delivery record and its state machine.
//!
//! `PENDING → (SENT → DELIVERED) | FAILED`. Terminal states re-enter
//! PENDING only through an explicit resend, and a resend reuses the same
//! record: a notification id identifies a recipient+content pair, not a
//! delivery attempt.

use crate::domain::error::{AlertError, AlertResult};
use crate::domain::ChannelKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::PatientId;
use uuid::Uuid;

/// Delivery state of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationStatus {
    /// Created, not yet handed to a channel.
    #[serde(rename = "PENDING")]
    Pending,
    /// Accepted by the channel adapter.
    #[serde(rename = "SENT")]
    Sent,
    /// The channel reported delivery. Channels without receipts stay SENT.
    #[serde(rename = "DELIVERED")]
    Delivered,
    /// The channel refused or errored.
    #[serde(rename = "FAILED")]
    Failed,
}

impl NotificationStatus {
    /// The wire name of this status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Sent => "SENT",
            Self::Delivered => "DELIVERED",
            Self::Failed => "FAILED",
        }
    }

    /// Parse a wire name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(Self::Pending),
            "SENT" => Some(Self::Sent),
            "DELIVERED" => Some(Self::Delivered),
            "FAILED" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// One notification to one recipient over one channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Unique identifier (stable across resends).
    pub notification_id: Uuid,
    /// The alert this notification belongs to (foreign key).
    pub alert_id: Uuid,
    /// The affected patient.
    pub patient_id: PatientId,
    /// Delivery channel kind.
    pub channel: ChannelKind,
    /// Channel-specific recipient address.
    pub recipient: String,
    /// Composed message body (opaque to the state machine).
    pub content: String,
    /// Delivery state.
    pub status: NotificationStatus,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the channel accepted it.
    pub sent_at: Option<DateTime<Utc>>,
    /// When the channel reported delivery.
    pub delivered_at: Option<DateTime<Utc>>,
    /// Last delivery error.
    pub error_message: Option<String>,
}

/// Filters for the notification list API.
#[derive(Debug, Clone, Default)]
pub struct NotificationQuery {
    pub alert_id: Option<Uuid>,
    pub patient_id: Option<PatientId>,
    pub status: Option<NotificationStatus>,
    pub limit: Option<usize>,
}

impl Notification {
    /// Create a PENDING notification.
    #[must_use]
    pub fn pending(
        alert_id: Uuid,
        patient_id: PatientId,
        channel: ChannelKind,
        recipient: String,
        content: String,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            notification_id: Uuid::new_v4(),
            alert_id,
            patient_id,
            channel,
            recipient,
            content,
            status: NotificationStatus::Pending,
            created_at: at,
            sent_at: None,
            delivered_at: None,
            error_message: None,
        }
    }

    /// The channel accepted the message.
    pub fn mark_sent(&mut self, at: DateTime<Utc>) {
        self.status = NotificationStatus::Sent;
        self.sent_at = Some(at);
        self.error_message = None;
    }

    /// The channel reported delivery. Only meaningful after SENT.
    pub fn mark_delivered(&mut self, at: DateTime<Utc>) -> AlertResult<()> {
        if self.status != NotificationStatus::Sent {
            return Err(AlertError::InvalidTransition(format!(
                "cannot mark {} notification as delivered",
                self.status.as_str()
            )));
        }
        self.status = NotificationStatus::Delivered;
        self.delivered_at = Some(at);
        Ok(())
    }

    /// The channel refused or errored.
    pub fn mark_failed(&mut self, error: String) {
        self.status = NotificationStatus::Failed;
        self.error_message = Some(error);
    }

    /// Resend: permitted from FAILED or PENDING only. The record returns
    /// to PENDING in place, keeping its id and content.
    pub fn resend(&mut self) -> AlertResult<()> {
        match self.status {
            NotificationStatus::Failed | NotificationStatus::Pending => {
                self.status = NotificationStatus::Pending;
                self.sent_at = None;
                self.delivered_at = None;
                self.error_message = None;
                Ok(())
            }
            status => Err(AlertError::InvalidTransition(format!(
                "cannot resend a {} notification",
                status.as_str()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification() -> Notification {
        Notification::pending(
            Uuid::new_v4(),
            PatientId::new("P1"),
            ChannelKind::Email,
            "ward@example.org".into(),
            "NEWS2 score 7".into(),
            Utc::now(),
        )
    }

    #[test]
    fn test_happy_delivery() {
        let mut n = notification();
        n.mark_sent(Utc::now());
        assert_eq!(n.status, NotificationStatus::Sent);
        n.mark_delivered(Utc::now()).unwrap();
        assert_eq!(n.status, NotificationStatus::Delivered);
    }

    #[test]
    fn test_delivered_requires_sent() {
        let mut n = notification();
        assert!(matches!(
            n.mark_delivered(Utc::now()),
            Err(AlertError::InvalidTransition(_))
        ));
    }

    #[test]
    fn test_resend_from_failed_keeps_identity() {
        let mut n = notification();
        let id = n.notification_id;
        let content = n.content.clone();

        n.mark_failed("smtp timeout".into());
        assert_eq!(n.status, NotificationStatus::Failed);

        n.resend().unwrap();
        assert_eq!(n.status, NotificationStatus::Pending);
        assert_eq!(n.notification_id, id);
        assert_eq!(n.content, content);
        assert!(n.error_message.is_none());
    }

    #[test]
    fn test_resend_rejected_from_sent_and_delivered() {
        let mut n = notification();
        n.mark_sent(Utc::now());
        assert!(n.resend().is_err());

        n.mark_delivered(Utc::now()).unwrap();
        assert!(n.resend().is_err());
    }
}
