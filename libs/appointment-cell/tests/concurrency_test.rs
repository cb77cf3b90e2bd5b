mod common;

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use async_trait::async_trait;
use futures::future::join_all;
use tokio::sync::RwLock;
use uuid::Uuid;

use appointment_cell::{
    Appointment, AppointmentError, AppointmentStore, InMemoryAppointmentStore, SchedulingService,
    StoreError,
};
use shared_models::TimeInterval;

use common::{at, booking, practitioner, roster, STORE_TIMEOUT};

/// A store with no overlap constraint whose reads are slow, so unserialised
/// check-then-insert callers would all see an empty calendar.
#[derive(Default)]
struct UnconstrainedStore {
    rows: RwLock<Vec<Appointment>>,
}

#[async_trait]
impl AppointmentStore for UnconstrainedStore {
    async fn find_by_practitioner_and_range(
        &self,
        practitioner_id: Uuid,
        range: TimeInterval,
    ) -> Result<Vec<Appointment>, StoreError> {
        let snapshot: Vec<Appointment> = self
            .rows
            .read()
            .await
            .iter()
            .filter(|a| a.practitioner_id == practitioner_id && a.interval().overlaps(&range))
            .cloned()
            .collect();
        tokio::time::sleep(Duration::from_millis(10)).await;
        Ok(snapshot)
    }

    async fn insert(&self, appointment: Appointment) -> Result<Appointment, StoreError> {
        self.rows.write().await.push(appointment.clone());
        Ok(appointment)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Appointment, StoreError> {
        self.rows
            .read()
            .await
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn replace(&self, id: Uuid, appointment: Appointment) -> Result<Appointment, StoreError> {
        let mut rows = self.rows.write().await;
        let slot = rows.iter_mut().find(|a| a.id == id).ok_or(StoreError::NotFound(id))?;
        *slot = appointment.clone();
        Ok(appointment)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|a| a.id != id);
        if rows.len() == before {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Appointment>, StoreError> {
        Ok(self.rows.read().await.clone())
    }
}

/// Every call parks forever.
struct HangingStore;

#[async_trait]
impl AppointmentStore for HangingStore {
    async fn find_by_practitioner_and_range(
        &self,
        _practitioner_id: Uuid,
        _range: TimeInterval,
    ) -> Result<Vec<Appointment>, StoreError> {
        futures::future::pending().await
    }

    async fn insert(&self, _appointment: Appointment) -> Result<Appointment, StoreError> {
        futures::future::pending().await
    }

    async fn find_by_id(&self, _id: Uuid) -> Result<Appointment, StoreError> {
        futures::future::pending().await
    }

    async fn replace(&self, _id: Uuid, _appointment: Appointment) -> Result<Appointment, StoreError> {
        futures::future::pending().await
    }

    async fn delete(&self, _id: Uuid) -> Result<(), StoreError> {
        futures::future::pending().await
    }

    async fn list_all(&self) -> Result<Vec<Appointment>, StoreError> {
        futures::future::pending().await
    }
}

fn assert_one_winner(results: Vec<Result<Appointment, AppointmentError>>) -> Appointment {
    let (wins, losses): (Vec<_>, Vec<_>) = results.into_iter().partition(Result::is_ok);
    assert_eq!(wins.len(), 1, "exactly one booking must succeed");

    let winner = wins.into_iter().next().unwrap().unwrap();
    for loss in losses {
        assert_matches!(loss, Err(AppointmentError::Conflict(ids)) if ids == vec![winner.id]);
    }
    winner
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_for_one_slot_admit_exactly_one() {
    let doc = practitioner(9, 12);
    let store = Arc::new(UnconstrainedStore::default());
    let service = Arc::new(SchedulingService::new(
        roster(vec![doc.clone()]),
        Arc::clone(&store) as Arc<dyn AppointmentStore>,
        Duration::from_secs(5),
    ));

    // Pairwise overlapping but not identical proposals.
    let starts = [at(10, 0), at(10, 0), at(9, 30), at(10, 30), at(10, 0), at(9, 30), at(10, 0), at(10, 30)];
    let tasks = starts.iter().map(|start| {
        let service = Arc::clone(&service);
        let request = booking(doc.id, *start, 90);
        tokio::spawn(async move { service.create_appointment(request).await })
    });

    let results: Vec<_> = join_all(tasks).await.into_iter().map(|joined| joined.unwrap()).collect();

    let (ok, _): (Vec<_>, Vec<_>) = results.iter().partition(|r| r.is_ok());
    assert_eq!(ok.len(), 1);
    assert_eq!(store.rows.read().await.len(), 1);
    for result in results.into_iter().filter(Result::is_err) {
        assert_matches!(result, Err(AppointmentError::Conflict(ids)) if ids.len() == 1);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn identical_concurrent_creates_report_the_winner() {
    let doc = practitioner(9, 12);
    let store = Arc::new(UnconstrainedStore::default());
    let service = Arc::new(SchedulingService::new(
        roster(vec![doc.clone()]),
        store as Arc<dyn AppointmentStore>,
        Duration::from_secs(5),
    ));

    let tasks = (0..10).map(|_| {
        let service = Arc::clone(&service);
        let request = booking(doc.id, at(11, 0), 30);
        tokio::spawn(async move { service.create_appointment(request).await })
    });
    let results = join_all(tasks).await.into_iter().map(|joined| joined.unwrap()).collect();

    let winner = assert_one_winner(results);
    assert_eq!(winner.start_time, at(11, 0));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn separate_service_instances_sharing_a_store_admit_exactly_one() {
    let doc = practitioner(9, 12);
    let store: Arc<dyn AppointmentStore> = Arc::new(InMemoryAppointmentStore::new());

    // Each instance has its own lock table, so only the store constraint serialises them.
    let instances: Vec<Arc<SchedulingService>> = (0..4)
        .map(|_| {
            Arc::new(SchedulingService::new(
                roster(vec![doc.clone()]),
                Arc::clone(&store),
                STORE_TIMEOUT,
            ))
        })
        .collect();

    let tasks = instances.iter().cycle().take(12).map(|service| {
        let service = Arc::clone(service);
        let request = booking(doc.id, at(9, 0), 30);
        tokio::spawn(async move { service.create_appointment(request).await })
    });
    let results = join_all(tasks).await.into_iter().map(|joined| joined.unwrap()).collect();

    assert_one_winner(results);
    assert_eq!(store.list_all().await.unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn non_overlapping_concurrent_creates_all_succeed() {
    let doc = practitioner(9, 12);
    let store = Arc::new(UnconstrainedStore::default());
    let service = Arc::new(SchedulingService::new(
        roster(vec![doc.clone()]),
        Arc::clone(&store) as Arc<dyn AppointmentStore>,
        Duration::from_secs(5),
    ));

    let tasks = [at(9, 0), at(9, 30), at(10, 0), at(10, 30), at(11, 0), at(11, 30)]
        .into_iter()
        .map(|start| {
            let service = Arc::clone(&service);
            let request = booking(doc.id, start, 30);
            tokio::spawn(async move { service.create_appointment(request).await })
        });

    for joined in join_all(tasks).await {
        assert!(joined.unwrap().is_ok());
    }
    assert_eq!(store.rows.read().await.len(), 6);
}

#[tokio::test]
async fn hanging_store_surfaces_as_unavailable() {
    let doc = practitioner(9, 12);
    let service = SchedulingService::new(
        roster(vec![doc.clone()]),
        Arc::new(HangingStore),
        Duration::from_millis(50),
    );

    let slots = service.list_slots(doc.id, common::day()).await;
    let created = service.create_appointment(booking(doc.id, at(9, 0), 30)).await;
    let deleted = service.delete_appointment(Uuid::new_v4()).await;

    assert!(created.as_ref().is_err_and(AppointmentError::is_retryable));
    assert_matches!(slots, Err(AppointmentError::Unavailable(_)));
    assert_matches!(created, Err(AppointmentError::Unavailable(_)));
    assert_matches!(deleted, Err(AppointmentError::Unavailable(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn waiting_on_a_stuck_booking_lock_times_out() {
    let doc = practitioner(9, 12);
    let service = Arc::new(SchedulingService::new(
        roster(vec![doc.clone()]),
        Arc::new(HangingStore),
        Duration::from_millis(100),
    ));

    // Both callers either time out on the store while holding the lock, or
    // time out waiting for it. Neither may hang.
    let practitioner_id = doc.id;
    let first = {
        let service = Arc::clone(&service);
        tokio::spawn(async move { service.create_appointment(booking(practitioner_id, at(9, 0), 30)).await })
    };
    let second = {
        let service = Arc::clone(&service);
        tokio::spawn(async move { service.create_appointment(booking(practitioner_id, at(9, 30), 30)).await })
    };

    let outcome = tokio::time::timeout(Duration::from_secs(2), join_all([first, second]))
        .await
        .expect("scheduling calls must not block indefinitely");

    for joined in outcome {
        assert_matches!(joined.unwrap(), Err(AppointmentError::Unavailable(_)));
    }
}
