// libs/appointment-cell/src/services/scheduling.rs
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use practitioner_cell::{Practitioner, PractitionerSource};
use shared_models::TimeInterval;

use crate::models::{
    slot_granularity, Appointment, AppointmentError, AppointmentType, ConflictCheck,
    CreateAppointmentRequest, UpdateAppointmentRequest,
};
use crate::services::availability::AvailabilityFilter;
use crate::services::conflict::BookingValidator;
use crate::services::locks::PractitionerLocks;
use crate::services::slots::SlotGenerator;
use crate::services::store::{bounded, AppointmentStore};

pub struct SchedulingService {
    roster: Arc<dyn PractitionerSource>,
    store: Arc<dyn AppointmentStore>,
    validator: BookingValidator,
    filter: AvailabilityFilter,
    locks: PractitionerLocks,
    store_timeout: Duration,
}

impl SchedulingService {
    /// `store_timeout` bounds every collaborator call and every lock wait.
    pub fn new(
        roster: Arc<dyn PractitionerSource>,
        store: Arc<dyn AppointmentStore>,
        store_timeout: Duration,
    ) -> Self {
        Self {
            validator: BookingValidator::new(Arc::clone(&store), store_timeout),
            filter: AvailabilityFilter::new(slot_granularity()),
            locks: PractitionerLocks::new(),
            roster,
            store,
            store_timeout,
        }
    }

    pub fn validator(&self) -> &BookingValidator {
        &self.validator
    }

    // ==============================================================================
    // SLOTS
    // ==============================================================================

    /// Free slot starts for a practitioner on `date`, earliest first.
    ///
    /// Takes no lock: a slot reported here may be taken before the caller
    /// books it, and the booking path re-validates.
    pub async fn list_available_slots(
        &self,
        practitioner_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<DateTime<Utc>>, AppointmentError> {
        debug!("Calculating available slots for practitioner {} on {}", practitioner_id, date);

        let practitioner = self.load_practitioner(practitioner_id).await?;
        let generator = SlotGenerator::for_date(&practitioner.working_hours, date)?;

        let booked: Vec<TimeInterval> = bounded(
            self.store_timeout,
            "booked appointments lookup",
            self.store
                .find_by_practitioner_and_range(practitioner_id, generator.window()),
        )
        .await?
        .iter()
        .map(Appointment::interval)
        .collect();

        let free = self.filter.free_slots(&generator, &booked);
        debug!("Found {} available slots", free.len());
        Ok(free)
    }

    /// Same as [`list_available_slots`](Self::list_available_slots), formatted as `"HH:MM"`.
    pub async fn list_slots(
        &self,
        practitioner_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<String>, AppointmentError> {
        Ok(self
            .list_available_slots(practitioner_id, date)
            .await?
            .into_iter()
            .map(|slot| slot.format("%H:%M").to_string())
            .collect())
    }

    // ==============================================================================
    // APPOINTMENT LIFECYCLE
    // ==============================================================================

    pub async fn create_appointment(
        &self,
        request: CreateAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        info!(
            "Booking appointment for practitioner {} at {}",
            request.practitioner_id, request.start_time
        );

        validate_details(&request.patient_name, &request.appointment_type)?;
        let practitioner = self.load_practitioner(request.practitioner_id).await?;

        // Cheap checks first so hopeless requests never queue on the lock.
        let proposed = self
            .validator
            .proposed_interval(request.start_time, request.duration_minutes)?;
        self.validator.validate_within_hours(&practitioner, &proposed)?;

        let _guard = self.locks.acquire(practitioner.id, self.store_timeout).await?;

        let interval = self
            .validator
            .validate(&practitioner, request.start_time, request.duration_minutes, None)
            .await?;

        let now = Utc::now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            practitioner_id: practitioner.id,
            start_time: interval.start,
            duration_minutes: request.duration_minutes,
            appointment_type: request.appointment_type,
            patient_name: request.patient_name.trim().to_string(),
            notes: request.notes,
            created_at: now,
            updated_at: now,
        };

        let created = match bounded(
            self.store_timeout,
            "appointment insert",
            self.store.insert(appointment),
        )
        .await
        {
            Ok(created) => created,
            Err(AppointmentError::Conflict(ids)) => {
                return Err(self.resolve_store_conflict(practitioner.id, interval, None, ids).await)
            }
            Err(e) => return Err(e),
        };

        info!(
            "Appointment {} booked with practitioner {} for {} - {}",
            created.id,
            created.practitioner_id,
            created.start_time,
            created.end_time()
        );
        Ok(created)
    }

    /// Full replacement of time, type and patient fields. The appointment keeps
    /// its id and practitioner and never conflicts with its own current interval.
    pub async fn update_appointment(
        &self,
        appointment_id: Uuid,
        request: UpdateAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Updating appointment: {}", appointment_id);

        validate_details(&request.patient_name, &request.appointment_type)?;
        let current = self.load_appointment(appointment_id).await?;
        let practitioner = self.load_practitioner(current.practitioner_id).await?;

        let proposed = self
            .validator
            .proposed_interval(request.start_time, request.duration_minutes)?;
        self.validator.validate_within_hours(&practitioner, &proposed)?;

        let _guard = self.locks.acquire(practitioner.id, self.store_timeout).await?;

        // Re-read under the lock; a concurrent delete wins.
        let current = self.load_appointment(appointment_id).await?;

        let interval = self
            .validator
            .validate(
                &practitioner,
                request.start_time,
                request.duration_minutes,
                Some(appointment_id),
            )
            .await?;

        let replacement = Appointment {
            id: current.id,
            practitioner_id: current.practitioner_id,
            start_time: interval.start,
            duration_minutes: request.duration_minutes,
            appointment_type: request.appointment_type,
            patient_name: request.patient_name.trim().to_string(),
            notes: request.notes,
            created_at: current.created_at,
            updated_at: Utc::now(),
        };

        let updated = match bounded(
            self.store_timeout,
            "appointment replace",
            self.store.replace(appointment_id, replacement),
        )
        .await
        {
            Ok(updated) => updated,
            Err(AppointmentError::Conflict(ids)) => {
                return Err(self
                    .resolve_store_conflict(practitioner.id, interval, Some(appointment_id), ids)
                    .await)
            }
            Err(e) => return Err(e),
        };

        info!("Appointment {} updated to {} - {}", updated.id, updated.start_time, updated.end_time());
        Ok(updated)
    }

    /// Unconditional removal; freeing time cannot break the no-overlap invariant.
    pub async fn delete_appointment(&self, appointment_id: Uuid) -> Result<(), AppointmentError> {
        bounded(
            self.store_timeout,
            "appointment delete",
            self.store.delete(appointment_id),
        )
        .await?;

        info!("Appointment {} deleted", appointment_id);
        Ok(())
    }

    pub async fn get_appointment(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        self.load_appointment(appointment_id).await
    }

    pub async fn list_appointments(&self) -> Result<Vec<Appointment>, AppointmentError> {
        bounded(self.store_timeout, "appointment listing", self.store.list_all()).await
    }

    // ==============================================================================
    // PRIVATE HELPER METHODS
    // ==============================================================================

    async fn load_practitioner(&self, practitioner_id: Uuid) -> Result<Practitioner, AppointmentError> {
        bounded(
            self.store_timeout,
            "practitioner lookup",
            self.roster.get_practitioner(practitioner_id),
        )
        .await
    }

    async fn load_appointment(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        bounded(
            self.store_timeout,
            "appointment lookup",
            self.store.find_by_id(appointment_id),
        )
        .await
    }

    /// The store refused the write. Name the colliding appointments when the
    /// store could not; never retry the write itself.
    async fn resolve_store_conflict(
        &self,
        practitioner_id: Uuid,
        interval: TimeInterval,
        exclude_appointment_id: Option<Uuid>,
        ids: Vec<Uuid>,
    ) -> AppointmentError {
        warn!("Store rejected overlapping booking for practitioner {}", practitioner_id);
        if !ids.is_empty() {
            return AppointmentError::Conflict(ids);
        }

        match self
            .validator
            .check_conflicts(practitioner_id, interval, exclude_appointment_id)
            .await
        {
            Ok(ConflictCheck::Conflict(ids)) => AppointmentError::Conflict(ids),
            _ => AppointmentError::Conflict(Vec::new()),
        }
    }
}

fn validate_details(patient_name: &str, appointment_type: &AppointmentType) -> Result<(), AppointmentError> {
    if patient_name.trim().is_empty() {
        return Err(AppointmentError::InvalidRequest("patient name is required".to_string()));
    }
    if appointment_type.is_blank() {
        return Err(AppointmentError::InvalidRequest("appointment type is required".to_string()));
    }
    Ok(())
}
