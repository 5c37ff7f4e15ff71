//! Read-model projector.
//!
//! Applies score consensuses to `PatientReadModel` rows. Two concurrent
//! consensuses for the same patient race on read-modify-write, so the
//! projector serialises per patient with a lock table; distinct patients
//! proceed in parallel. Idempotence lives in the model itself
//! (`apply` is a no-op per known consensus id), which makes the projector
//! safe under at-least-once redelivery.

use crate::domain::PatientReadModel;
use crate::ports::ReadModelStore;
use ews_telemetry::READ_MODEL_UPDATES;
use parking_lot::Mutex;
use shared_types::{PatientId, ScoreConsensus};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Serialises read-model updates per patient.
pub struct ReadModelProjector<M: ReadModelStore> {
    store: Arc<M>,
    locks: Mutex<HashMap<PatientId, Arc<tokio::sync::Mutex<()>>>>,
}

impl<M: ReadModelStore> ReadModelProjector<M> {
    /// Create a projector over a read-model store.
    pub fn new(store: Arc<M>) -> Self {
        Self {
            store,
            locks: Mutex::new(HashMap::new()),
        }
    }

    fn patient_lock(&self, patient_id: &PatientId) -> Arc<tokio::sync::Mutex<()>> {
        self.locks
            .lock()
            .entry(patient_id.clone())
            .or_default()
            .clone()
    }

    /// Apply one consensus. Returns `false` when the consensus id had
    /// already been applied (duplicate delivery).
    pub async fn apply(&self, consensus: &ScoreConsensus) -> Result<bool, String> {
        let lock = self.patient_lock(&consensus.patient_id);
        let _guard = lock.lock().await;

        let applied = match self.store.get(&consensus.patient_id).await? {
            Some(mut model) => {
                let applied = model.apply(consensus);
                if applied {
                    self.store.put(model).await?;
                }
                applied
            }
            None => {
                self.store
                    .put(PatientReadModel::create_from(consensus))
                    .await?;
                true
            }
        };

        if applied {
            READ_MODEL_UPDATES.inc();
        } else {
            debug!(
                patient = %consensus.patient_id,
                consensus = %consensus.consensus_id,
                "Duplicate consensus ignored by projector"
            );
        }
        Ok(applied)
    }
}
