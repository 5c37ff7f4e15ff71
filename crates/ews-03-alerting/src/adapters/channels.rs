//! Channel adapters.
//!
//! The real transports (SMTP, SMS gateways, push services) are external
//! collaborators behind the `NotificationChannel` port. In-tree adapters
//! cover development and tests.

use crate::domain::{ChannelKind, Notification};
use crate::ports::NotificationChannel;
use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::info;

/// Logs deliveries instead of sending them. The development default.
pub struct LogChannel {
    kind: ChannelKind,
}

impl LogChannel {
    /// Create a logging adapter for a channel kind.
    #[must_use]
    pub fn new(kind: ChannelKind) -> Self {
        Self { kind }
    }
}

#[async_trait]
impl NotificationChannel for LogChannel {
    fn kind(&self) -> ChannelKind {
        self.kind
    }

    async fn deliver(&self, notification: &Notification) -> Result<(), String> {
        info!(
            channel = self.kind.as_str(),
            recipient = %notification.recipient,
            alert = %notification.alert_id,
            "Would deliver notification"
        );
        Ok(())
    }
}

/// Records deliveries for assertions; can be told to fail.
#[derive(Default)]
pub struct RecordingChannel {
    kind: Option<ChannelKind>,
    delivered: Mutex<Vec<Notification>>,
    fail_with: Mutex<Option<String>>,
}

impl RecordingChannel {
    /// Create a recording adapter for a channel kind.
    #[must_use]
    pub fn new(kind: ChannelKind) -> Self {
        Self {
            kind: Some(kind),
            delivered: Mutex::new(Vec::new()),
            fail_with: Mutex::new(None),
        }
    }

    /// Everything delivered so far.
    #[must_use]
    pub fn delivered(&self) -> Vec<Notification> {
        self.delivered.lock().clone()
    }

    /// Make subsequent deliveries fail with `error`.
    pub fn fail_with(&self, error: impl Into<String>) {
        *self.fail_with.lock() = Some(error.into());
    }

    /// Make subsequent deliveries succeed again.
    pub fn succeed(&self) {
        *self.fail_with.lock() = None;
    }
}

#[async_trait]
impl NotificationChannel for RecordingChannel {
    fn kind(&self) -> ChannelKind {
        self.kind.unwrap_or(ChannelKind::Email)
    }

    async fn deliver(&self, notification: &Notification) -> Result<(), String> {
        if let Some(error) = self.fail_with.lock().clone() {
            return Err(error);
        }
        self.delivered.lock().push(notification.clone());
        Ok(())
    }
}
