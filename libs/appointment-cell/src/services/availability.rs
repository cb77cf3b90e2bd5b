// libs/appointment-cell/src/services/availability.rs
use chrono::{DateTime, Duration, Utc};

use shared_models::TimeInterval;

use crate::models::slot_granularity;

/// Drops candidate slots that intersect a committed appointment.
///
/// Each candidate is widened to `[start, start + granularity)` and compared
/// against the full booked interval, so an appointment longer than one slot,
/// or one that starts off-grid, removes every slot it touches.
#[derive(Debug, Clone, Copy)]
pub struct AvailabilityFilter {
    granularity: Duration,
}

impl Default for AvailabilityFilter {
    fn default() -> Self {
        Self::new(slot_granularity())
    }
}

impl AvailabilityFilter {
    pub fn new(granularity: Duration) -> Self {
        Self { granularity }
    }

    /// A slot whose end is unrepresentable is never free.
    pub fn is_free(&self, slot_start: DateTime<Utc>, booked: &[TimeInterval]) -> bool {
        match TimeInterval::starting_at(slot_start, self.granularity) {
            Some(slot) => !booked.iter().any(|interval| interval.overlaps(&slot)),
            None => false,
        }
    }

    /// Free slot starts, in candidate order.
    pub fn free_slots<I>(&self, candidates: I, booked: &[TimeInterval]) -> Vec<DateTime<Utc>>
    where
        I: IntoIterator<Item = DateTime<Utc>>,
    {
        candidates
            .into_iter()
            .filter(|slot_start| self.is_free(*slot_start, booked))
            .collect()
    }
}
