//! Domain logic for the alerting service.

mod alert;
mod classify;
mod error;
mod notification;
mod priority;
mod subscription;

pub use alert::{Alert, AlertQuery, AlertStatus, CreateAlert};
pub use classify::{classify_score_consensus, classify_sensor_consensus, Classification};
pub use error::{AlertError, AlertResult};
pub use notification::{Notification, NotificationQuery, NotificationStatus};
pub use priority::{compute_priority, escalate_priority};
pub use subscription::{SubscriberType, Subscription, SubscriptionChannel};

use serde::{Deserialize, Serialize};

/// Delivery channel kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelKind {
    /// Email delivery.
    #[serde(rename = "EMAIL")]
    Email,
    /// SMS delivery.
    #[serde(rename = "SMS")]
    Sms,
    /// Mobile push delivery.
    #[serde(rename = "PUSH")]
    Push,
}

impl ChannelKind {
    /// The wire name of this channel kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "EMAIL",
            Self::Sms => "SMS",
            Self::Push => "PUSH",
        }
    }

    /// Parse a wire name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "EMAIL" => Some(Self::Email),
            "SMS" => Some(Self::Sms),
            "PUSH" => Some(Self::Push),
            _ => None,
        }
    }
}
