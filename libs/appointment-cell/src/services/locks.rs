// libs/appointment-cell/src/services/locks.rs
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::AppointmentError;

const PRUNE_THRESHOLD: usize = 1024;

/// One async mutex per practitioner, serialising check-then-commit for that
/// practitioner while leaving other practitioners unaffected.
#[derive(Default)]
pub struct PractitionerLocks {
    locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl PractitionerLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(
        &self,
        practitioner_id: Uuid,
        limit: Duration,
    ) -> Result<OwnedMutexGuard<()>, AppointmentError> {
        let lock = {
            let mut locks = self.locks.lock().await;
            if locks.len() >= PRUNE_THRESHOLD {
                // Entries nobody holds or waits on can be dropped.
                locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            }
            Arc::clone(locks.entry(practitioner_id).or_default())
        };

        match tokio::time::timeout(limit, lock.lock_owned()).await {
            Ok(guard) => {
                debug!("Acquired booking lock for practitioner {}", practitioner_id);
                Ok(guard)
            }
            Err(_) => {
                warn!(
                    "Timed out after {:?} waiting for booking lock of practitioner {}",
                    limit, practitioner_id
                );
                Err(AppointmentError::Unavailable(format!(
                    "booking lock for practitioner {} not acquired within {}ms",
                    practitioner_id,
                    limit.as_millis()
                )))
            }
        }
    }

    pub async fn tracked(&self) -> usize {
        self.locks.lock().await.len()
    }
}
