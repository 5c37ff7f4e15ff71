//! Alert Service - core business logic.
//!
//! Raising an alert:
//!
//! 1. Persist the alert (storage failure aborts; nothing dispatched).
//! 2. Publish `AlertRaised` (best-effort).
//! 3. Match active subscriptions; one PENDING notification per enabled
//!    channel of every match; deliver and record each outcome.
//!
//! Consumers feeding this service from the bus de-duplicate on the
//! envelope message id; the service itself is intentionally free of
//! consensus-id bookkeeping.

mod dispatch;

#[cfg(test)]
mod tests;

pub use dispatch::NotificationDispatcher;

use crate::domain::{
    classify_score_consensus, classify_sensor_consensus, compute_priority, Alert, AlertError,
    AlertQuery, AlertResult, AlertStatus, Classification, CreateAlert, Notification,
    NotificationQuery, Subscription,
};
use crate::ports::{
    AlertApi, AlertEventBus, AlertStore, NotificationChannel, NotificationStore, SubscriptionStore,
};
use async_trait::async_trait;
use chrono::Utc;
use ews_telemetry::{ALERTS_RAISED, SERVICE_ERRORS};
use serde_json::json;
use shared_types::{ScoreConsensus, SensorConsensus};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Alert service over its outbound ports.
pub struct AlertService<A, S, N, B>
where
    A: AlertStore,
    S: SubscriptionStore,
    N: NotificationStore,
    B: AlertEventBus,
{
    alerts: Arc<A>,
    subscriptions: Arc<S>,
    notifications: Arc<N>,
    bus: Arc<B>,
    dispatcher: NotificationDispatcher<N>,
}

/// Dependencies for `AlertService`.
pub struct AlertDependencies<A, S, N, B> {
    pub alerts: Arc<A>,
    pub subscriptions: Arc<S>,
    pub notifications: Arc<N>,
    pub bus: Arc<B>,
    pub channels: Vec<Arc<dyn NotificationChannel>>,
}

impl<A, S, N, B> AlertService<A, S, N, B>
where
    A: AlertStore,
    S: SubscriptionStore,
    N: NotificationStore,
    B: AlertEventBus,
{
    /// Create a new alert service.
    pub fn new(deps: AlertDependencies<A, S, N, B>) -> Self {
        Self {
            alerts: deps.alerts,
            subscriptions: deps.subscriptions,
            dispatcher: NotificationDispatcher::new(deps.notifications.clone(), deps.channels),
            notifications: deps.notifications,
            bus: deps.bus,
        }
    }

    fn build_alert(command: CreateAlert) -> Alert {
        let now = Utc::now();
        Alert {
            alert_id: Uuid::new_v4(),
            patient_id: command.patient_id,
            source_service: command.source_service,
            alert_type: command.alert_type,
            alert_severity: command.alert_severity,
            message: command.message,
            observed_at: command.observed_at.unwrap_or(now),
            sensor_data: command.sensor_data,
            ews_data: command.ews_data,
            status: AlertStatus::New,
            priority: compute_priority(command.alert_severity, command.alert_type),
            acknowledged_by: None,
            acknowledged_at: None,
            resolved_by: None,
            resolved_at: None,
            resolution: None,
            escalated_at: None,
            escalation_reason: None,
            notification_ids: Vec::new(),
            created_at: now,
        }
    }

    /// Dispatch notifications for the subscriptions matched by `filter`,
    /// appending the new notification ids to the alert record.
    async fn notify_matching(
        &self,
        alert: &mut Alert,
        filter: impl Fn(&Subscription, &Alert) -> bool,
    ) -> AlertResult<()> {
        let subscriptions = self
            .subscriptions
            .all()
            .await
            .map_err(AlertError::Storage)?;

        let mut dispatched = 0usize;
        let matched_subscriptions: Vec<&Subscription> =
            subscriptions.iter().filter(|s| filter(s, alert)).collect();
        for subscription in matched_subscriptions {
            for channel in subscription.enabled_channels() {
                match self.dispatcher.dispatch(alert, channel).await {
                    Ok(notification) => {
                        alert.notification_ids.push(notification.notification_id);
                        dispatched += 1;
                    }
                    Err(e) => {
                        warn!(
                            alert = %alert.alert_id,
                            subscriber = %subscription.subscriber_id,
                            error = %e,
                            "Notification dispatch failed"
                        );
                        SERVICE_ERRORS
                            .with_label_values(&["alerting", "storage"])
                            .inc();
                    }
                }
            }
        }

        if dispatched > 0 {
            self.alerts
                .update(alert.clone())
                .await
                .map_err(AlertError::Storage)?;
        }

        info!(
            alert = %alert.alert_id,
            patient = %alert.patient_id,
            notifications = dispatched,
            "Alert notifications dispatched"
        );
        Ok(())
    }

    async fn raise(&self, classification: Classification, command: CreateAlert) -> AlertResult<Alert> {
        let command = CreateAlert {
            alert_type: classification.alert_type,
            alert_severity: classification.severity,
            message: classification.message,
            ..command
        };
        self.create_alert(command).await
    }

    async fn load_alert(&self, alert_id: Uuid) -> AlertResult<Alert> {
        self.alerts
            .get(alert_id)
            .await
            .map_err(AlertError::Storage)?
            .ok_or_else(|| AlertError::NotFound(format!("alert {alert_id}")))
    }
}

#[async_trait]
impl<A, S, N, B> AlertApi for AlertService<A, S, N, B>
where
    A: AlertStore,
    S: SubscriptionStore,
    N: NotificationStore,
    B: AlertEventBus,
{
    async fn create_alert(&self, command: CreateAlert) -> AlertResult<Alert> {
        if command.patient_id.as_str().is_empty() {
            return Err(AlertError::Validation("patientId is required".into()));
        }
        if command.message.is_empty() {
            return Err(AlertError::Validation("message is required".into()));
        }

        let mut alert = Self::build_alert(command);

        self.alerts
            .insert_alert(alert.clone())
            .await
            .map_err(AlertError::Storage)?;

        ALERTS_RAISED
            .with_label_values(&[alert.alert_type.as_str()])
            .inc();

        if let Err(e) = self.bus.publish_alert_raised(&alert).await {
            warn!(alert = %alert.alert_id, error = %e, "Failed to publish alert");
            SERVICE_ERRORS.with_label_values(&["alerting", "bus"]).inc();
        }

        self.notify_matching(&mut alert, |s, a| s.matches(a)).await?;

        Ok(alert)
    }

    async fn handle_score_consensus(
        &self,
        consensus: &ScoreConsensus,
    ) -> AlertResult<Option<Alert>> {
        let Some(classification) = classify_score_consensus(consensus) else {
            return Ok(None);
        };

        let command = CreateAlert {
            patient_id: consensus.patient_id.clone(),
            source_service: "scoring".into(),
            alert_type: classification.alert_type,
            alert_severity: classification.severity,
            message: String::new(),
            observed_at: Some(consensus.consensus_at),
            sensor_data: serde_json::Value::Null,
            ews_data: json!({
                "consensusId": consensus.consensus_id,
                "consensusScore": consensus.consensus_score,
                "clinicalRisk": consensus.clinical_risk,
                "method": consensus.method,
                "valid": consensus.valid,
            }),
        };
        self.raise(classification, command).await.map(Some)
    }

    async fn handle_sensor_consensus(
        &self,
        consensus: &SensorConsensus,
    ) -> AlertResult<Option<Alert>> {
        let Some(classification) = classify_sensor_consensus(consensus) else {
            return Ok(None);
        };

        let command = CreateAlert {
            patient_id: consensus.patient_id.clone(),
            source_service: "ingestion".into(),
            alert_type: classification.alert_type,
            alert_severity: classification.severity,
            message: String::new(),
            observed_at: Some(consensus.consensus_at),
            sensor_data: json!({
                "consensusId": consensus.consensus_id,
                "sensorType": consensus.sensor_type,
                "consensusValue": consensus.consensus_value,
                "method": consensus.method,
                "valid": consensus.valid,
            }),
            ews_data: serde_json::Value::Null,
        };
        self.raise(classification, command).await.map(Some)
    }

    async fn list_alerts(&self, query: AlertQuery) -> AlertResult<Vec<Alert>> {
        self.alerts.list(&query).await.map_err(AlertError::Storage)
    }

    async fn get_alert(&self, alert_id: Uuid) -> AlertResult<Option<Alert>> {
        self.alerts.get(alert_id).await.map_err(AlertError::Storage)
    }

    async fn acknowledge(&self, alert_id: Uuid, user_id: &str) -> AlertResult<Alert> {
        let mut alert = self.load_alert(alert_id).await?;
        alert.acknowledge(user_id, Utc::now())?;
        self.alerts
            .update(alert.clone())
            .await
            .map_err(AlertError::Storage)?;
        info!(alert = %alert_id, user = user_id, "Alert acknowledged");
        Ok(alert)
    }

    async fn resolve(
        &self,
        alert_id: Uuid,
        user_id: &str,
        resolution: Option<String>,
    ) -> AlertResult<Alert> {
        let mut alert = self.load_alert(alert_id).await?;
        alert.resolve(user_id, resolution, Utc::now())?;
        self.alerts
            .update(alert.clone())
            .await
            .map_err(AlertError::Storage)?;
        info!(alert = %alert_id, user = user_id, "Alert resolved");
        Ok(alert)
    }

    async fn escalate(&self, alert_id: Uuid, reason: Option<String>) -> AlertResult<Alert> {
        let mut alert = self.load_alert(alert_id).await?;
        alert.escalate(reason, Utc::now())?;
        self.alerts
            .update(alert.clone())
            .await
            .map_err(AlertError::Storage)?;

        // A fresh round of notifications against the escalation tier.
        self.notify_matching(&mut alert, |s, a| s.matches_escalation(a))
            .await?;

        info!(alert = %alert_id, priority = alert.priority, "Alert escalated");
        Ok(alert)
    }

    async fn create_subscription(&self, subscription: Subscription) -> AlertResult<Subscription> {
        subscription.validate()?;
        self.subscriptions
            .insert_subscription(subscription.clone())
            .await
            .map_err(AlertError::Storage)?;
        Ok(subscription)
    }

    async fn get_subscription(&self, subscription_id: Uuid) -> AlertResult<Option<Subscription>> {
        self.subscriptions
            .get(subscription_id)
            .await
            .map_err(AlertError::Storage)
    }

    async fn update_subscription(&self, subscription: Subscription) -> AlertResult<Subscription> {
        subscription.validate()?;
        if self
            .subscriptions
            .get(subscription.subscription_id)
            .await
            .map_err(AlertError::Storage)?
            .is_none()
        {
            return Err(AlertError::NotFound(format!(
                "subscription {}",
                subscription.subscription_id
            )));
        }
        self.subscriptions
            .update(subscription.clone())
            .await
            .map_err(AlertError::Storage)?;
        Ok(subscription)
    }

    async fn delete_subscription(&self, subscription_id: Uuid) -> AlertResult<()> {
        let deleted = self
            .subscriptions
            .delete(subscription_id)
            .await
            .map_err(AlertError::Storage)?;
        if deleted {
            Ok(())
        } else {
            Err(AlertError::NotFound(format!(
                "subscription {subscription_id}"
            )))
        }
    }

    async fn list_subscriptions(&self) -> AlertResult<Vec<Subscription>> {
        self.subscriptions.all().await.map_err(AlertError::Storage)
    }

    async fn list_notifications(
        &self,
        query: NotificationQuery,
    ) -> AlertResult<Vec<Notification>> {
        self.notifications
            .list(&query)
            .await
            .map_err(AlertError::Storage)
    }

    async fn resend_notification(&self, notification_id: Uuid) -> AlertResult<Notification> {
        let mut notification = self
            .notifications
            .get(notification_id)
            .await
            .map_err(AlertError::Storage)?
            .ok_or_else(|| AlertError::NotFound(format!("notification {notification_id}")))?;

        notification.resend()?;
        self.notifications
            .update(notification.clone())
            .await
            .map_err(AlertError::Storage)?;

        self.dispatcher
            .send(&mut notification)
            .await
            .map_err(AlertError::Storage)?;

        Ok(notification)
    }
}
