// libs/practitioner-cell/src/models.rs
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_models::TimeInterval;

// ==============================================================================
// CORE PRACTITIONER MODELS
// ==============================================================================

/// Daily window during which a practitioner accepts appointments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawWorkingHours")]
pub struct WorkingHours {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

#[derive(Deserialize)]
struct RawWorkingHours {
    #[serde(with = "hhmm")]
    start: NaiveTime,
    #[serde(with = "hhmm")]
    end: NaiveTime,
}

impl TryFrom<RawWorkingHours> for WorkingHours {
    type Error = PractitionerError;

    fn try_from(raw: RawWorkingHours) -> Result<Self, Self::Error> {
        WorkingHours::new(raw.start, raw.end)
    }
}

impl WorkingHours {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, PractitionerError> {
        if start >= end {
            return Err(PractitionerError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// The working window on a calendar date, as absolute UTC instants.
    pub fn window_on(&self, date: NaiveDate) -> TimeInterval {
        TimeInterval::new(
            date.and_time(self.start).and_utc(),
            date.and_time(self.end).and_utc(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Practitioner {
    pub id: Uuid,
    pub name: String,
    pub working_hours: WorkingHours,
    pub specialization: Option<String>,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, Clone, Error)]
pub enum PractitionerError {
    #[error("Practitioner not found: {0}")]
    NotFound(Uuid),

    #[error("Invalid working hours: start {start} must be before end {end}")]
    InvalidWindow { start: NaiveTime, end: NaiveTime },

    #[error("Invalid practitioner record: {0}")]
    InvalidRecord(String),

    #[error("Practitioner source unavailable: {0}")]
    Unavailable(String),
}

// ==============================================================================
// "HH:MM" SERIALIZATION
// ==============================================================================

/// Working hours travel as `"09:00"`; `"09:00:00"` is accepted on input.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%H:%M";

    pub fn parse(raw: &str) -> Result<NaiveTime, chrono::ParseError> {
        NaiveTime::parse_from_str(raw, FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
    }

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(|e| D::Error::custom(format!("invalid time '{}': {}", raw, e)))
    }
}
