// libs/appointment-cell/src/models.rs
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use practitioner_cell::PractitionerError;
use shared_models::TimeInterval;

/// Step between two consecutive bookable slots.
pub const SLOT_GRANULARITY_MINUTES: i64 = 30;

pub fn slot_granularity() -> Duration {
    Duration::minutes(SLOT_GRANULARITY_MINUTES)
}

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub practitioner_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: i64,
    pub appointment_type: AppointmentType,
    pub patient_name: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Saturates at the end of representable time for rows that were never validated.
    pub fn end_time(&self) -> DateTime<Utc> {
        self.start_time
            .checked_add_signed(Duration::minutes(self.duration_minutes))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// `[start_time, start_time + duration)`
    pub fn interval(&self) -> TimeInterval {
        TimeInterval::new(self.start_time, self.end_time())
    }
}

/// Appointment category. Known categories are matched loosely; anything else
/// is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AppointmentType {
    RoutineCheckUp,
    Ultrasound,
    Operation,
    Other(String),
}

impl AppointmentType {
    pub fn is_blank(&self) -> bool {
        matches!(self, AppointmentType::Other(label) if label.trim().is_empty())
    }
}

impl From<String> for AppointmentType {
    fn from(raw: String) -> Self {
        let normalized: String = raw
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "routinecheckup" | "checkup" | "routine" => AppointmentType::RoutineCheckUp,
            "ultrasound" | "scan" => AppointmentType::Ultrasound,
            "operation" | "surgery" => AppointmentType::Operation,
            _ => AppointmentType::Other(raw.trim().to_string()),
        }
    }
}

impl From<&str> for AppointmentType {
    fn from(raw: &str) -> Self {
        AppointmentType::from(raw.to_string())
    }
}

impl From<AppointmentType> for String {
    fn from(kind: AppointmentType) -> Self {
        kind.to_string()
    }
}

impl fmt::Display for AppointmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentType::RoutineCheckUp => write!(f, "Routine Check-Up"),
            AppointmentType::Ultrasound => write!(f, "Ultrasound"),
            AppointmentType::Operation => write!(f, "Operation"),
            AppointmentType::Other(label) => write!(f, "{}", label),
        }
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

/// Field names of the original booking client are accepted as aliases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    #[serde(alias = "practitionerId", alias = "doctorId")]
    pub practitioner_id: Uuid,
    #[serde(alias = "date")]
    pub start_time: DateTime<Utc>,
    #[serde(alias = "duration")]
    pub duration_minutes: i64,
    #[serde(alias = "appointmentType")]
    pub appointment_type: AppointmentType,
    #[serde(alias = "patientName")]
    pub patient_name: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Full replacement of the time and patient fields; practitioner is kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAppointmentRequest {
    #[serde(alias = "date")]
    pub start_time: DateTime<Utc>,
    #[serde(alias = "duration")]
    pub duration_minutes: i64,
    #[serde(alias = "appointmentType")]
    pub appointment_type: AppointmentType,
    #[serde(alias = "patientName")]
    pub patient_name: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlotsQuery {
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentIdResponse {
    pub id: Uuid,
}

/// Outcome of a read-only overlap check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictCheck {
    NoConflict,
    Conflict(Vec<Uuid>),
}

impl ConflictCheck {
    pub fn has_conflict(&self) -> bool {
        matches!(self, ConflictCheck::Conflict(_))
    }
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AppointmentError {
    #[error("Practitioner not found: {0}")]
    PractitionerNotFound(Uuid),

    #[error("Appointment not found: {0}")]
    AppointmentNotFound(Uuid),

    #[error("Invalid working hours window: {0}")]
    InvalidWindow(String),

    #[error("Requested time {requested_start} - {requested_end} is outside working hours {window_start} - {window_end}")]
    OutOfHours {
        requested_start: DateTime<Utc>,
        requested_end: DateTime<Utc>,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    },

    #[error("Invalid duration {0} minutes: must be a positive multiple of the slot granularity")]
    InvalidDuration(i64),

    #[error("Appointment conflicts with existing booking(s): {0:?}")]
    Conflict(Vec<Uuid>),

    #[error("Scheduling backend unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A stored record could not be decoded. Retrying cannot help.
    #[error("Corrupt scheduling record: {0}")]
    Internal(String),
}

impl AppointmentError {
    /// Stable code callers branch on.
    pub fn kind(&self) -> &'static str {
        match self {
            AppointmentError::PractitionerNotFound(_) => "practitioner_not_found",
            AppointmentError::AppointmentNotFound(_) => "appointment_not_found",
            AppointmentError::InvalidWindow(_) => "invalid_window",
            AppointmentError::OutOfHours { .. } => "out_of_hours",
            AppointmentError::InvalidDuration(_) => "invalid_duration",
            AppointmentError::Conflict(_) => "conflict",
            AppointmentError::Unavailable(_) => "unavailable",
            AppointmentError::InvalidRequest(_) => "invalid_request",
            AppointmentError::Internal(_) => "internal",
        }
    }

    pub fn out_of_hours(requested: &TimeInterval, window: &TimeInterval) -> Self {
        AppointmentError::OutOfHours {
            requested_start: requested.start,
            requested_end: requested.end,
            window_start: window.start,
            window_end: window.end,
        }
    }

    /// Only `Unavailable` is worth retrying, and only after re-validation.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppointmentError::Unavailable(_))
    }
}

impl From<PractitionerError> for AppointmentError {
    fn from(e: PractitionerError) -> Self {
        match e {
            PractitionerError::NotFound(id) => AppointmentError::PractitionerNotFound(id),
            PractitionerError::InvalidWindow { .. } => AppointmentError::InvalidWindow(e.to_string()),
            PractitionerError::InvalidRecord(msg) => AppointmentError::Internal(msg),
            PractitionerError::Unavailable(msg) => AppointmentError::Unavailable(msg),
        }
    }
}
