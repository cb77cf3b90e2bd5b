// libs/appointment-cell/src/services/slots.rs
use std::iter::FusedIterator;

use chrono::{DateTime, Duration, NaiveDate, Utc};

use practitioner_cell::WorkingHours;
use shared_models::TimeInterval;

use crate::models::{slot_granularity, AppointmentError};

/// Candidate slot starts for one practitioner on one date.
///
/// Slots start at the opening time and step by the granularity; a slot is
/// produced only if it ends at or before closing time, so a trailing
/// remainder shorter than the granularity is dropped rather than reported.
/// The generator is a cheap value and can be iterated any number of times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotGenerator {
    window: TimeInterval,
    granularity: Duration,
}

impl SlotGenerator {
    pub fn new(
        hours: &WorkingHours,
        date: NaiveDate,
        granularity: Duration,
    ) -> Result<Self, AppointmentError> {
        if hours.start >= hours.end {
            return Err(AppointmentError::InvalidWindow(format!(
                "start {} must be before end {}",
                hours.start.format("%H:%M"),
                hours.end.format("%H:%M")
            )));
        }
        if granularity <= Duration::zero() {
            return Err(AppointmentError::InvalidWindow(format!(
                "slot granularity must be positive, got {} minutes",
                granularity.num_minutes()
            )));
        }

        Ok(Self {
            window: hours.window_on(date),
            granularity,
        })
    }

    pub fn for_date(hours: &WorkingHours, date: NaiveDate) -> Result<Self, AppointmentError> {
        Self::new(hours, date, slot_granularity())
    }

    pub fn window(&self) -> TimeInterval {
        self.window
    }

    pub fn granularity(&self) -> Duration {
        self.granularity
    }

    pub fn iter(&self) -> SlotIter {
        SlotIter {
            next: self.window.start,
            close: self.window.end,
            step: self.granularity,
        }
    }
}

impl IntoIterator for &SlotGenerator {
    type Item = DateTime<Utc>;
    type IntoIter = SlotIter;

    fn into_iter(self) -> SlotIter {
        self.iter()
    }
}

#[derive(Debug, Clone)]
pub struct SlotIter {
    next: DateTime<Utc>,
    close: DateTime<Utc>,
    step: Duration,
}

impl Iterator for SlotIter {
    type Item = DateTime<Utc>;

    fn next(&mut self) -> Option<Self::Item> {
        // Past chrono's range counts as past closing time.
        let slot_end = self.next.checked_add_signed(self.step)?;
        if slot_end > self.close {
            return None;
        }
        let slot = self.next;
        self.next = slot_end;
        Some(slot)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.close - self.next).num_milliseconds();
        let step = self.step.num_milliseconds();
        if step <= 0 {
            return (0, None);
        }
        let count = if remaining <= 0 { 0 } else { (remaining / step) as usize };
        (count, Some(count))
    }
}

impl FusedIterator for SlotIter {}
