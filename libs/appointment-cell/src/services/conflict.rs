// libs/appointment-cell/src/services/conflict.rs
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use practitioner_cell::Practitioner;
use shared_models::TimeInterval;

use crate::models::{slot_granularity, AppointmentError, ConflictCheck};
use crate::services::store::{bounded, AppointmentStore};

/// Longest appointment the engine will consider; nothing longer fits in a day.
const MAX_DURATION_MINUTES: i64 = 24 * 60;

/// Read-only validation of a proposed appointment. Committing is left to the caller.
pub struct BookingValidator {
    store: Arc<dyn AppointmentStore>,
    granularity: Duration,
    store_timeout: StdDuration,
}

impl BookingValidator {
    pub fn new(store: Arc<dyn AppointmentStore>, store_timeout: StdDuration) -> Self {
        Self {
            store,
            granularity: slot_granularity(),
            store_timeout,
        }
    }

    /// Accepts positive multiples of the slot granularity and returns the length.
    pub fn validate_duration(&self, duration_minutes: i64) -> Result<Duration, AppointmentError> {
        let step = self.granularity.num_minutes();
        if duration_minutes <= 0
            || duration_minutes > MAX_DURATION_MINUTES
            || duration_minutes % step != 0
        {
            return Err(AppointmentError::InvalidDuration(duration_minutes));
        }
        Ok(Duration::minutes(duration_minutes))
    }

    /// `[start, start + duration)` after the duration check. A start so late
    /// that the end is unrepresentable is rejected rather than wrapped.
    pub fn proposed_interval(
        &self,
        start: DateTime<Utc>,
        duration_minutes: i64,
    ) -> Result<TimeInterval, AppointmentError> {
        let length = self.validate_duration(duration_minutes)?;
        TimeInterval::starting_at(start, length).ok_or_else(|| {
            AppointmentError::InvalidRequest(format!("start time {} is out of range", start))
        })
    }

    /// The whole interval must sit inside the practitioner's window on its start date.
    pub fn validate_within_hours(
        &self,
        practitioner: &Practitioner,
        interval: &TimeInterval,
    ) -> Result<(), AppointmentError> {
        let window = practitioner.working_hours.window_on(interval.start.date_naive());
        if !window.contains(interval) {
            debug!(
                "Interval {} - {} falls outside working hours of practitioner {}",
                interval.start, interval.end, practitioner.id
            );
            return Err(AppointmentError::out_of_hours(interval, &window));
        }
        Ok(())
    }

    /// Committed appointments of the practitioner overlapping `interval`,
    /// ignoring `exclude_appointment_id` (the appointment being edited).
    pub async fn check_conflicts(
        &self,
        practitioner_id: Uuid,
        interval: TimeInterval,
        exclude_appointment_id: Option<Uuid>,
    ) -> Result<ConflictCheck, AppointmentError> {
        debug!(
            "Checking conflicts for practitioner {} from {} to {}",
            practitioner_id, interval.start, interval.end
        );

        let existing = bounded(
            self.store_timeout,
            "conflict lookup",
            self.store.find_by_practitioner_and_range(practitioner_id, interval),
        )
        .await?;

        let conflicting: Vec<Uuid> = existing
            .iter()
            .filter(|appointment| Some(appointment.id) != exclude_appointment_id)
            .filter(|appointment| appointment.interval().overlaps(&interval))
            .map(|appointment| appointment.id)
            .collect();

        if conflicting.is_empty() {
            return Ok(ConflictCheck::NoConflict);
        }

        warn!(
            "Conflict detected for practitioner {} - {} conflicting appointments",
            practitioner_id,
            conflicting.len()
        );
        Ok(ConflictCheck::Conflict(conflicting))
    }

    /// Duration, then working hours, then overlap. Returns the validated interval.
    pub async fn validate(
        &self,
        practitioner: &Practitioner,
        start: DateTime<Utc>,
        duration_minutes: i64,
        exclude_appointment_id: Option<Uuid>,
    ) -> Result<TimeInterval, AppointmentError> {
        let interval = self.proposed_interval(start, duration_minutes)?;
        self.validate_within_hours(practitioner, &interval)?;

        match self
            .check_conflicts(practitioner.id, interval, exclude_appointment_id)
            .await?
        {
            ConflictCheck::NoConflict => Ok(interval),
            ConflictCheck::Conflict(ids) => Err(AppointmentError::Conflict(ids)),
        }
    }
}
