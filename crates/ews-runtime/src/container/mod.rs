//! # Dependency Container
//!
//! Constructs the bus, stores and services, injects the port adapters,
//! and owns every lifecycle. Shutting the container down aborts the
//! consumer tasks and drops the bus, which closes all subscriptions.

use crate::adapters::{
    AlertBusAdapter, DirectScoreGateway, IngestionBusAdapter, ScoringBusAdapter,
};
use crate::config::AppConfig;
use crate::wiring;
use ews_01_ingestion::{
    InMemoryReadingStore, InMemorySensorConsensusStore, IngestionConfig, IngestionDependencies,
    IngestionService,
};
use ews_02_scoring::{
    InMemoryReadModelStore, InMemoryScoreConsensusStore, InMemoryScoreEventStore, ScoringConfig,
    ScoringDependencies, ScoringService,
};
use ews_03_alerting::{
    AlertDependencies, AlertService, ChannelKind, InMemoryAlertStore, InMemoryNotificationStore,
    InMemorySubscriptionStore, LogChannel, NotificationChannel,
};
use shared_bus::InMemoryEventBus;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

/// Concrete scoring service as wired by this container.
pub type Scoring = ScoringService<
    InMemoryScoreEventStore,
    InMemoryScoreConsensusStore,
    InMemoryReadModelStore,
    ScoringBusAdapter,
>;

/// Concrete ingestion service as wired by this container.
pub type Ingestion = IngestionService<
    InMemoryReadingStore,
    InMemorySensorConsensusStore,
    IngestionBusAdapter,
    DirectScoreGateway<Scoring>,
>;

/// Concrete alert service as wired by this container.
pub type Alerting = AlertService<
    InMemoryAlertStore,
    InMemorySubscriptionStore,
    InMemoryNotificationStore,
    AlertBusAdapter,
>;

/// The wired application.
pub struct Container {
    /// The shared event bus. Held so late subscribers can attach.
    pub bus: Arc<InMemoryEventBus>,
    /// Ingestion & sensor-consensus service.
    pub ingestion: Arc<Ingestion>,
    /// Scoring & score-consensus service.
    pub scoring: Arc<Scoring>,
    /// Alert dispatch service.
    pub alerting: Arc<Alerting>,
    /// Consumer task handles, aborted on shutdown.
    consumers: Vec<JoinHandle<()>>,
}

impl Container {
    /// Build and wire the full pipeline.
    ///
    /// The in-memory bus and stores stand in for the broker and document
    /// store behind the same ports; production adapters replace them at
    /// this one seam. In production the configuration is validated first
    /// so the fallback never masks a missing broker.
    pub fn build(config: &AppConfig) -> Result<Self, String> {
        config.validate_for_production()?;

        let bus = Arc::new(InMemoryEventBus::new());
        info!(
            env = ?config.node_env,
            amqp = %config.amqp_url,
            store = %config.mongodb_uri,
            "Building pipeline container (in-memory adapters)"
        );

        let scoring = Arc::new(ScoringService::new(ScoringDependencies {
            events: Arc::new(InMemoryScoreEventStore::new()),
            consensuses: Arc::new(InMemoryScoreConsensusStore::new()),
            read_models: Arc::new(InMemoryReadModelStore::new()),
            bus: Arc::new(ScoringBusAdapter::new(bus.clone())),
            config: ScoringConfig::default(),
        }));

        let ingestion = Arc::new(IngestionService::new(IngestionDependencies {
            readings: Arc::new(InMemoryReadingStore::new()),
            consensuses: Arc::new(InMemorySensorConsensusStore::new()),
            bus: Arc::new(IngestionBusAdapter::new(bus.clone())),
            scoring: Arc::new(DirectScoreGateway::new(scoring.clone())),
            config: IngestionConfig::default(),
        }));

        let channels: Vec<Arc<dyn NotificationChannel>> = vec![
            Arc::new(LogChannel::new(ChannelKind::Email)),
            Arc::new(LogChannel::new(ChannelKind::Sms)),
            Arc::new(LogChannel::new(ChannelKind::Push)),
        ];
        let alerting = Arc::new(AlertService::new(AlertDependencies {
            alerts: Arc::new(InMemoryAlertStore::new()),
            subscriptions: Arc::new(InMemorySubscriptionStore::new()),
            notifications: Arc::new(InMemoryNotificationStore::new()),
            bus: Arc::new(AlertBusAdapter::new(bus.clone())),
            channels,
        }));

        let consumers = vec![wiring::spawn_alert_consumer(&bus, alerting.clone())];

        Ok(Self {
            bus,
            ingestion,
            scoring,
            alerting,
            consumers,
        })
    }

    /// Abort consumer tasks and release the bus.
    pub fn shutdown(self) {
        for handle in &self.consumers {
            handle.abort();
        }
        info!("Container shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_container_builds_and_shuts_down() {
        let container = Container::build(&AppConfig::default()).unwrap();
        assert_eq!(container.bus.subscriber_count(), 1);
        container.shutdown();
    }
}
