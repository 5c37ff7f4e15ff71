use super::*;
use crate::adapters::{
    InMemoryReadModelStore, InMemoryScoreConsensusStore, InMemoryScoreEventStore,
};
use chrono::TimeZone;
use parking_lot::Mutex;
use shared_types::{Consciousness, ConsensusMethod, VitalSigns};
use std::sync::atomic::{AtomicBool, Ordering};

// Mock implementations for testing

#[derive(Default)]
struct MockBus {
    calculated: Mutex<Vec<ScoreEvent>>,
    consensuses: Mutex<Vec<ScoreConsensus>>,
}

#[async_trait]
impl ScoreEventBus for MockBus {
    async fn publish_score_calculated(
        &self,
        event: ScoreEvent,
        _correlation_id: Uuid,
    ) -> Result<(), String> {
        self.calculated.lock().push(event);
        Ok(())
    }

    async fn publish_score_consensus(
        &self,
        consensus: ScoreConsensus,
        _correlation_id: Uuid,
    ) -> Result<(), String> {
        self.consensuses.lock().push(consensus);
        Ok(())
    }
}

/// Consensus store that can be told to refuse writes.
#[derive(Default)]
struct FailableConsensusStore {
    inner: InMemoryScoreConsensusStore,
    fail_inserts: AtomicBool,
}

#[async_trait]
impl ScoreConsensusStore for FailableConsensusStore {
    async fn insert_consensus(&self, consensus: ScoreConsensus) -> Result<(), String> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err("write refused".into());
        }
        self.inner.insert_consensus(consensus).await
    }

    async fn get(&self, consensus_id: Uuid) -> Result<Option<ScoreConsensus>, String> {
        self.inner.get(consensus_id).await
    }
}

type TestService = ScoringService<
    InMemoryScoreEventStore,
    FailableConsensusStore,
    InMemoryReadModelStore,
    MockBus,
>;

struct Harness {
    service: TestService,
    bus: Arc<MockBus>,
    consensuses: Arc<FailableConsensusStore>,
    read_models: Arc<InMemoryReadModelStore>,
}

fn harness() -> Harness {
    let events = Arc::new(InMemoryScoreEventStore::new());
    let consensuses = Arc::new(FailableConsensusStore::default());
    let read_models = Arc::new(InMemoryReadModelStore::new());
    let bus = Arc::new(MockBus::default());
    let service = ScoringService::new(ScoringDependencies {
        events,
        consensuses: consensuses.clone(),
        read_models: read_models.clone(),
        bus: bus.clone(),
        config: ScoringConfig::default(),
    });
    Harness {
        service,
        bus,
        consensuses,
        read_models,
    }
}

fn at(secs: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap() + Duration::seconds(i64::from(secs))
}

/// A vector scoring 5: rr 22 (2) + spo2 94 (1) + bp 105 (1) + hr 95 (1).
fn medium_vitals() -> VitalSigns {
    VitalSigns {
        respiratory_rate: 22.0,
        oxygen_saturation: 94.0,
        temperature: 37.0,
        systolic_bp: 105.0,
        heart_rate: 95.0,
        consciousness: Consciousness::Alert,
    }
}

fn command(node: &str, vitals: VitalSigns, secs: u32) -> CalculateCommand {
    CalculateCommand {
        patient_id: PatientId::new("P1"),
        node_id: node.into(),
        vital_signs: vitals,
        observed_at: Some(at(secs)),
        validated: false,
        metadata: serde_json::Value::Null,
        correlation_id: None,
    }
}

#[tokio::test]
async fn test_first_calculation_no_consensus() {
    let h = harness();
    let receipt = h
        .service
        .calculate(command("node-1", medium_vitals(), 0))
        .await
        .unwrap();

    assert_eq!(receipt.total_score, 5);
    assert_eq!(receipt.clinical_risk, ClinicalRisk::Medium);
    assert!(receipt.consensus.is_none());
    assert_eq!(h.bus.calculated.lock().len(), 1);
    assert!(h.bus.consensuses.lock().is_empty());
}

#[tokio::test]
async fn test_two_nodes_same_score_majority_consensus() {
    // Two nodes each push full vectors scoring 5, one second apart.
    let h = harness();
    h.service
        .calculate(command("node-1", medium_vitals(), 0))
        .await
        .unwrap();
    let receipt = h
        .service
        .calculate(command("node-2", medium_vitals(), 1))
        .await
        .unwrap();

    let consensus = receipt.consensus.expect("second node forms a consensus");
    assert_eq!(consensus.consensus_score, 5);
    assert_eq!(consensus.method, ConsensusMethod::Majority);
    assert!(consensus.valid);
    assert_eq!(consensus.clinical_risk, ClinicalRisk::Medium);

    // Read model projected.
    let model = h
        .service
        .latest(&PatientId::new("P1"))
        .await
        .unwrap()
        .expect("read model exists");
    assert_eq!(model.current_score, 5);
    assert_eq!(model.clinical_risk, ClinicalRisk::Medium);
    assert_eq!(model.score_history.len(), 1);

    assert_eq!(h.bus.consensuses.lock().len(), 1);
}

#[tokio::test]
async fn test_divergent_scores_invalid_consensus() {
    // Node scores 3 and 8 within one second.
    let h = harness();
    let low = VitalSigns {
        respiratory_rate: 21.0, // 2
        oxygen_saturation: 96.0,
        temperature: 37.0,
        systolic_bp: 105.0, // 1
        heart_rate: 72.0,
        consciousness: Consciousness::Alert,
    }; // total 3
    let high = VitalSigns {
        respiratory_rate: 25.0,  // 3
        oxygen_saturation: 93.0, // 2
        temperature: 37.0,
        systolic_bp: 100.0, // 2
        heart_rate: 95.0,   // 1
        consciousness: Consciousness::Alert,
    }; // total 8

    h.service.calculate(command("node-1", low, 0)).await.unwrap();
    let receipt = h.service.calculate(command("node-2", high, 1)).await.unwrap();

    let consensus = receipt.consensus.expect("round ran");
    assert!(!consensus.valid);
    assert_eq!(consensus.method, ConsensusMethod::None);
    assert_eq!(consensus.consensus_score, 6); // round(5.5)

    // Score and history still project; vitals do not (first consensus for
    // this patient was invalid, so no authoritative vitals exist yet).
    let model = h.service.latest(&PatientId::new("P1")).await.unwrap().unwrap();
    assert_eq!(model.current_score, 6);
    assert!(model.vital_signs.is_none());
}

#[tokio::test]
async fn test_out_of_band_vitals_rejected() {
    let h = harness();
    let mut vitals = medium_vitals();
    vitals.respiratory_rate = 8.5;

    let result = h.service.calculate(command("node-1", vitals, 0)).await;
    assert!(matches!(result, Err(ScoringError::Validation(_))));
    assert!(h.bus.calculated.lock().is_empty());
}

#[tokio::test]
async fn test_consensus_storage_failure_aborts_publish() {
    let h = harness();
    h.service
        .calculate(command("node-1", medium_vitals(), 0))
        .await
        .unwrap();

    h.consensuses.fail_inserts.store(true, Ordering::SeqCst);
    let result = h
        .service
        .calculate(command("node-2", medium_vitals(), 1))
        .await;

    assert!(matches!(result, Err(ScoringError::Storage(_))));
    assert!(h.bus.consensuses.lock().is_empty());
    // Both score events made it to the store and bus regardless.
    assert_eq!(h.bus.calculated.lock().len(), 2);
}

#[tokio::test]
async fn test_projection_idempotent_under_redelivery() {
    let h = harness();
    h.service
        .calculate(command("node-1", medium_vitals(), 0))
        .await
        .unwrap();
    let receipt = h
        .service
        .calculate(command("node-2", medium_vitals(), 1))
        .await
        .unwrap();
    let consensus = receipt.consensus.unwrap();

    let model_before = h.service.latest(&PatientId::new("P1")).await.unwrap().unwrap();

    // Simulate the bus redelivering the same consensus.
    let applied = h.service.project_consensus(&consensus).await.unwrap();
    assert!(!applied);

    let model_after = h.service.latest(&PatientId::new("P1")).await.unwrap().unwrap();
    assert_eq!(model_before, model_after);
}

#[tokio::test]
async fn test_event_kind_update_on_recalculation() {
    let h = harness();
    let first = h
        .service
        .calculate(command("node-1", medium_vitals(), 0))
        .await
        .unwrap();
    let _ = first;

    h.service
        .calculate(command("node-1", medium_vitals(), 2))
        .await
        .unwrap();

    let events = h
        .service
        .events(EventQuery {
            patient_id: Some(PatientId::new("P1")),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(events.len(), 2);
    // Most recent first: the recalculation is an update.
    assert_eq!(events[0].kind, ScoreEventKind::EwsUpdated);
    assert_eq!(events[1].kind, ScoreEventKind::EwsCalculated);
}

#[tokio::test]
async fn test_batch_partial_success() {
    let h = harness();
    let mut bad_vitals = medium_vitals();
    bad_vitals.oxygen_saturation = 91.5; // out of band

    let outcome = h
        .service
        .calculate_batch(vec![
            command("node-1", medium_vitals(), 0),
            command("node-2", bad_vitals, 1),
        ])
        .await
        .unwrap();

    assert_eq!(outcome.results.len(), 1);
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].0, 1);
}

#[tokio::test]
async fn test_history_most_recent_first_with_limit() {
    let h = harness();
    for round in 0u32..5 {
        h.service
            .calculate(command("node-1", medium_vitals(), round * 60))
            .await
            .unwrap();
        h.service
            .calculate(command("node-2", medium_vitals(), round * 60 + 1))
            .await
            .unwrap();
    }

    let history = h
        .service
        .history(&PatientId::new("P1"), 3, None, None)
        .await
        .unwrap();
    assert_eq!(history.len(), 3);
    assert!(history[0].timestamp > history[1].timestamp);
}

#[tokio::test]
async fn test_history_unknown_patient_not_found() {
    let h = harness();
    let result = h.service.history(&PatientId::new("P9"), 20, None, None).await;
    assert!(matches!(result, Err(ScoringError::NotFound(_))));
}

#[tokio::test]
async fn test_consensus_lookup_by_id() {
    let h = harness();
    h.service
        .calculate(command("node-1", medium_vitals(), 0))
        .await
        .unwrap();
    let receipt = h
        .service
        .calculate(command("node-2", medium_vitals(), 1))
        .await
        .unwrap();
    let consensus = receipt.consensus.unwrap();

    let fetched = h
        .service
        .consensus_by_id(consensus.consensus_id)
        .await
        .unwrap()
        .expect("stored consensus is queryable");
    assert_eq!(fetched.consensus_score, 5);

    assert!(h
        .service
        .consensus_by_id(Uuid::new_v4())
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_high_risk_threshold() {
    let h = harness();
    h.service
        .calculate(command("node-1", medium_vitals(), 0))
        .await
        .unwrap();
    h.service
        .calculate(command("node-2", medium_vitals(), 1))
        .await
        .unwrap();

    let at_five = h.service.high_risk_patients(5).await.unwrap();
    assert_eq!(at_five.len(), 1);

    let at_six = h.service.high_risk_patients(6).await.unwrap();
    assert!(at_six.is_empty());
}

#[tokio::test]
async fn test_read_models_rebuildable_from_consensus() {
    // The projector writes through the same store the queries read.
    let h = harness();
    h.service
        .calculate(command("node-1", medium_vitals(), 0))
        .await
        .unwrap();
    h.service
        .calculate(command("node-2", medium_vitals(), 1))
        .await
        .unwrap();

    let all = h.read_models.all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].patient_id.as_str(), "P1");
}
