// libs/appointment-cell/src/services/store.rs
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::warn;
use uuid::Uuid;

use shared_models::TimeInterval;

use crate::models::{Appointment, AppointmentError};

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Appointment not found: {0}")]
    NotFound(Uuid),

    /// The store refused a write that would overlap committed appointments.
    /// Ids are empty when the backend cannot name the colliding rows.
    #[error("Write rejected by uniqueness constraint")]
    UniqueConflict { conflicting_ids: Vec<Uuid> },

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Stored row could not be decoded: {0}")]
    Corrupt(String),
}

impl From<StoreError> for AppointmentError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => AppointmentError::AppointmentNotFound(id),
            StoreError::UniqueConflict { conflicting_ids } => AppointmentError::Conflict(conflicting_ids),
            StoreError::Unavailable(msg) => AppointmentError::Unavailable(msg),
            StoreError::Corrupt(msg) => AppointmentError::Internal(msg),
        }
    }
}

/// Persistence for committed appointments.
///
/// Implementations must reject an `insert`/`replace` that would overlap another
/// appointment of the same practitioner with `UniqueConflict`, so the
/// no-overlap invariant holds even across service instances.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// Appointments of `practitioner_id` whose interval overlaps `range`, ordered by start.
    async fn find_by_practitioner_and_range(
        &self,
        practitioner_id: Uuid,
        range: TimeInterval,
    ) -> Result<Vec<Appointment>, StoreError>;

    async fn insert(&self, appointment: Appointment) -> Result<Appointment, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Appointment, StoreError>;

    async fn replace(&self, id: Uuid, appointment: Appointment) -> Result<Appointment, StoreError>;

    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;

    /// Every committed appointment, ordered by start.
    async fn list_all(&self) -> Result<Vec<Appointment>, StoreError>;
}

/// Run a collaborator call under a deadline; expiry surfaces as `Unavailable`.
pub(crate) async fn bounded<T, E, F>(limit: Duration, operation: &str, fut: F) -> Result<T, AppointmentError>
where
    F: Future<Output = Result<T, E>>,
    E: Into<AppointmentError>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(Into::into),
        Err(_) => {
            warn!("{} timed out after {:?}", operation, limit);
            Err(AppointmentError::Unavailable(format!(
                "{} timed out after {}ms",
                operation,
                limit.as_millis()
            )))
        }
    }
}

// ==============================================================================
// IN-MEMORY STORE
// ==============================================================================

#[derive(Default)]
pub struct InMemoryAppointmentStore {
    appointments: RwLock<HashMap<Uuid, Appointment>>,
}

impl InMemoryAppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.appointments.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.appointments.read().await.is_empty()
    }

    fn colliding_ids(
        appointments: &HashMap<Uuid, Appointment>,
        candidate: &Appointment,
        exclude: Option<Uuid>,
    ) -> Vec<Uuid> {
        let interval = candidate.interval();
        let mut ids: Vec<(chrono::DateTime<chrono::Utc>, Uuid)> = appointments
            .values()
            .filter(|existing| existing.practitioner_id == candidate.practitioner_id)
            .filter(|existing| Some(existing.id) != exclude)
            .filter(|existing| existing.interval().overlaps(&interval))
            .map(|existing| (existing.start_time, existing.id))
            .collect();
        ids.sort();
        ids.into_iter().map(|(_, id)| id).collect()
    }
}

fn sorted_by_start(mut appointments: Vec<Appointment>) -> Vec<Appointment> {
    appointments.sort_by(|a, b| a.start_time.cmp(&b.start_time).then(a.id.cmp(&b.id)));
    appointments
}

#[async_trait]
impl AppointmentStore for InMemoryAppointmentStore {
    async fn find_by_practitioner_and_range(
        &self,
        practitioner_id: Uuid,
        range: TimeInterval,
    ) -> Result<Vec<Appointment>, StoreError> {
        let appointments = self.appointments.read().await;
        let matching = appointments
            .values()
            .filter(|a| a.practitioner_id == practitioner_id && a.interval().overlaps(&range))
            .cloned()
            .collect();
        Ok(sorted_by_start(matching))
    }

    async fn insert(&self, appointment: Appointment) -> Result<Appointment, StoreError> {
        let mut appointments = self.appointments.write().await;

        if appointments.contains_key(&appointment.id) {
            return Err(StoreError::UniqueConflict {
                conflicting_ids: vec![appointment.id],
            });
        }

        let conflicting_ids = Self::colliding_ids(&appointments, &appointment, None);
        if !conflicting_ids.is_empty() {
            return Err(StoreError::UniqueConflict { conflicting_ids });
        }

        appointments.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Appointment, StoreError> {
        self.appointments
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn replace(&self, id: Uuid, appointment: Appointment) -> Result<Appointment, StoreError> {
        let mut appointments = self.appointments.write().await;

        if !appointments.contains_key(&id) {
            return Err(StoreError::NotFound(id));
        }

        let conflicting_ids = Self::colliding_ids(&appointments, &appointment, Some(id));
        if !conflicting_ids.is_empty() {
            return Err(StoreError::UniqueConflict { conflicting_ids });
        }

        let stored = Appointment { id, ..appointment };
        appointments.insert(id, stored.clone());
        Ok(stored)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.appointments
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }

    async fn list_all(&self) -> Result<Vec<Appointment>, StoreError> {
        let all = self.appointments.read().await.values().cloned().collect();
        Ok(sorted_by_start(all))
    }
}
