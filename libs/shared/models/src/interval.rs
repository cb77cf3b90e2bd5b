use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Half-open time range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeInterval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// `[start, start + length)`, or `None` when the end falls outside chrono's range.
    pub fn starting_at(start: DateTime<Utc>, length: Duration) -> Option<Self> {
        start
            .checked_add_signed(length)
            .map(|end| Self { start, end })
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Two intervals overlap if start1 < end2 AND start2 < end1.
    /// Touching intervals (one ends exactly when the other begins) do not.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains(&self, inner: &TimeInterval) -> bool {
        inner.start >= self.start && inner.end <= self.end
    }
}
