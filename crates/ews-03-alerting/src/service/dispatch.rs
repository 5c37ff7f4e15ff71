//! Notification composition and dispatch.

use crate::domain::{Alert, ChannelKind, Notification, SubscriptionChannel};
use crate::ports::{NotificationChannel, NotificationStore};
use chrono::Utc;
use ews_telemetry::{NOTIFICATIONS_FAILED, NOTIFICATIONS_SENT};
use shared_types::AlertSeverity;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Dispatches notifications over registered channel adapters.
pub struct NotificationDispatcher<N: NotificationStore> {
    store: Arc<N>,
    channels: HashMap<ChannelKind, Arc<dyn NotificationChannel>>,
}

impl<N: NotificationStore> NotificationDispatcher<N> {
    /// Create a dispatcher over a notification store and channel adapters.
    /// One adapter per kind; later registrations replace earlier ones.
    pub fn new(store: Arc<N>, adapters: Vec<Arc<dyn NotificationChannel>>) -> Self {
        let mut channels = HashMap::new();
        for adapter in adapters {
            channels.insert(adapter.kind(), adapter);
        }
        Self { store, channels }
    }

    /// Compose channel-appropriate content for an alert.
    #[must_use]
    pub fn compose(alert: &Alert, kind: ChannelKind) -> String {
        match kind {
            // SMS keeps it to one short line.
            ChannelKind::Sms => format!(
                "[{}] {}: patient {}, priority {}",
                alert.alert_severity.as_str(),
                alert.alert_type.as_str(),
                alert.patient_id,
                alert.priority
            ),
            ChannelKind::Push => format!(
                "{} / patient {}: {}",
                alert.alert_type.as_str(),
                alert.patient_id,
                alert.message
            ),
            ChannelKind::Email => {
                let urgency = match alert.alert_severity {
                    AlertSeverity::High => "Immediate attention required.",
                    AlertSeverity::Medium => "Review this shift.",
                    AlertSeverity::Low => "For awareness.",
                };
                format!(
                    "Alert {} for patient {}\n\n{}\n\nSeverity: {}\nPriority: {}\nRaised: {}\n\n{}",
                    alert.alert_type.as_str(),
                    alert.patient_id,
                    alert.message,
                    alert.alert_severity.as_str(),
                    alert.priority,
                    alert.created_at.to_rfc3339(),
                    urgency
                )
            }
        }
    }

    /// Create a PENDING notification for one subscription channel, hand it
    /// to the adapter and record the outcome. Returns the final record.
    ///
    /// A missing adapter for the channel kind fails the notification
    /// rather than dropping it silently.
    pub async fn dispatch(
        &self,
        alert: &Alert,
        channel: &SubscriptionChannel,
    ) -> Result<Notification, String> {
        let mut notification = Notification::pending(
            alert.alert_id,
            alert.patient_id.clone(),
            channel.kind,
            channel.contact.clone(),
            Self::compose(alert, channel.kind),
            Utc::now(),
        );
        self.store.insert_notification(notification.clone()).await?;

        self.send(&mut notification).await?;
        Ok(notification)
    }

    /// Run the delivery attempt for an already-stored PENDING notification
    /// and persist the resulting state.
    pub async fn send(&self, notification: &mut Notification) -> Result<(), String> {
        match self.channels.get(&notification.channel) {
            Some(adapter) => match adapter.deliver(notification).await {
                Ok(()) => {
                    notification.mark_sent(Utc::now());
                    NOTIFICATIONS_SENT.inc();
                    debug!(
                        notification = %notification.notification_id,
                        channel = notification.channel.as_str(),
                        "Notification sent"
                    );
                }
                Err(error) => {
                    warn!(
                        notification = %notification.notification_id,
                        channel = notification.channel.as_str(),
                        error = %error,
                        "Notification delivery failed"
                    );
                    notification.mark_failed(error);
                    NOTIFICATIONS_FAILED.inc();
                }
            },
            None => {
                notification.mark_failed(format!(
                    "no adapter registered for channel {}",
                    notification.channel.as_str()
                ));
                NOTIFICATIONS_FAILED.inc();
            }
        }

        self.store.update(notification.clone()).await
    }
}
