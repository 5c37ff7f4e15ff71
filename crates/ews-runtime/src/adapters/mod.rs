//! Port-bridging adapters.
//!
//! Each service declares narrow outbound ports; these adapters implement
//! them over the shared bus and over sibling services, keeping the
//! service crates free of each other and of the bus internals.

use async_trait::async_trait;
use ews_01_ingestion::{ScoreCommandGateway, SensorConsensusBus};
use ews_02_scoring::{CalculateCommand, ScoreEventBus, ScoringApi};
use ews_03_alerting::{Alert, AlertEventBus};
use ews_telemetry::BUS_MESSAGES_PUBLISHED;
use shared_bus::{EventPublisherExt, EwsEvent, InMemoryEventBus};
use shared_types::{ScoreConsensus, ScoreEvent, SensorConsensus, ServiceId};
use std::sync::Arc;
use uuid::Uuid;

/// Publishes ingestion's consensus outcomes onto the shared bus.
pub struct IngestionBusAdapter {
    bus: Arc<InMemoryEventBus>,
}

impl IngestionBusAdapter {
    pub fn new(bus: Arc<InMemoryEventBus>) -> Self {
        Self { bus }
    }
}

#[async_trait]
impl SensorConsensusBus for IngestionBusAdapter {
    async fn publish_sensor_consensus(&self, consensus: SensorConsensus) -> Result<(), String> {
        self.bus
            .publish_event(
                ServiceId::Ingestion,
                EwsEvent::SensorConsensusFormed(consensus),
            )
            .await;
        BUS_MESSAGES_PUBLISHED.inc();
        Ok(())
    }
}

/// Publishes scoring's events and consensuses onto the shared bus.
pub struct ScoringBusAdapter {
    bus: Arc<InMemoryEventBus>,
}

impl ScoringBusAdapter {
    pub fn new(bus: Arc<InMemoryEventBus>) -> Self {
        Self { bus }
    }
}

#[async_trait]
impl ScoreEventBus for ScoringBusAdapter {
    async fn publish_score_calculated(
        &self,
        event: ScoreEvent,
        correlation_id: Uuid,
    ) -> Result<(), String> {
        self.bus
            .publish_correlated(
                ServiceId::Scoring,
                correlation_id,
                EwsEvent::ScoreCalculated(event),
            )
            .await;
        BUS_MESSAGES_PUBLISHED.inc();
        Ok(())
    }

    async fn publish_score_consensus(
        &self,
        consensus: ScoreConsensus,
        correlation_id: Uuid,
    ) -> Result<(), String> {
        self.bus
            .publish_correlated(
                ServiceId::Scoring,
                correlation_id,
                EwsEvent::ScoreConsensusReached(consensus),
            )
            .await;
        BUS_MESSAGES_PUBLISHED.inc();
        Ok(())
    }
}

/// Publishes raised alerts onto the shared bus.
pub struct AlertBusAdapter {
    bus: Arc<InMemoryEventBus>,
}

impl AlertBusAdapter {
    pub fn new(bus: Arc<InMemoryEventBus>) -> Self {
        Self { bus }
    }
}

#[async_trait]
impl AlertEventBus for AlertBusAdapter {
    async fn publish_alert_raised(&self, alert: &Alert) -> Result<(), String> {
        self.bus
            .publish_event(
                ServiceId::Alerting,
                EwsEvent::AlertRaised {
                    alert_id: alert.alert_id,
                    patient_id: alert.patient_id.clone(),
                    alert_type: alert.alert_type,
                    severity: alert.alert_severity,
                    priority: alert.priority,
                },
            )
            .await;
        BUS_MESSAGES_PUBLISHED.inc();
        Ok(())
    }
}

/// Bridges ingestion's scoring trigger straight onto the scoring service.
///
/// The deployment equivalent is an HTTP call to `EWS_SERVICE_URL`; in a
/// single process the port is satisfied by a direct adapter.
pub struct DirectScoreGateway<S: ScoringApi> {
    scoring: Arc<S>,
}

impl<S: ScoringApi> DirectScoreGateway<S> {
    pub fn new(scoring: Arc<S>) -> Self {
        Self { scoring }
    }
}

#[async_trait]
impl<S: ScoringApi> ScoreCommandGateway for DirectScoreGateway<S> {
    async fn request_score(
        &self,
        request: ews_01_ingestion::ScoreRequest,
    ) -> Result<(), String> {
        self.scoring
            .calculate(CalculateCommand {
                patient_id: request.patient_id,
                node_id: request.node_id,
                vital_signs: request.vital_signs,
                observed_at: Some(request.observed_at),
                validated: false,
                metadata: serde_json::Value::Null,
                correlation_id: Some(request.correlation_id),
            })
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}
