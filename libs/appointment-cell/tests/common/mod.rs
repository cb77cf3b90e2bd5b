#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use uuid::Uuid;

use appointment_cell::{
    AppointmentStore, AppointmentType, CreateAppointmentRequest, InMemoryAppointmentStore,
    SchedulingService, UpdateAppointmentRequest,
};
use practitioner_cell::{InMemoryRoster, Practitioner, PractitionerSource, WorkingHours};

pub const STORE_TIMEOUT: Duration = Duration::from_millis(500);

pub fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
}

pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, hour, minute, 0).unwrap()
}

pub fn hours(start: u32, end: u32) -> WorkingHours {
    WorkingHours::new(
        NaiveTime::from_hms_opt(start, 0, 0).unwrap(),
        NaiveTime::from_hms_opt(end, 0, 0).unwrap(),
    )
    .unwrap()
}

pub fn practitioner(start: u32, end: u32) -> Practitioner {
    Practitioner {
        id: Uuid::new_v4(),
        name: "Dr. Mensah".to_string(),
        working_hours: hours(start, end),
        specialization: Some("Obstetrics".to_string()),
    }
}

pub fn roster(practitioners: Vec<Practitioner>) -> Arc<dyn PractitionerSource> {
    Arc::new(InMemoryRoster::with_practitioners(practitioners))
}

/// Service over an in-memory roster and store; the store is returned for inspection.
pub fn service_for(practitioner: &Practitioner) -> (SchedulingService, Arc<InMemoryAppointmentStore>) {
    let store = Arc::new(InMemoryAppointmentStore::new());
    let service = SchedulingService::new(
        roster(vec![practitioner.clone()]),
        Arc::clone(&store) as Arc<dyn AppointmentStore>,
        STORE_TIMEOUT,
    );
    (service, store)
}

pub fn booking(practitioner_id: Uuid, start: DateTime<Utc>, duration_minutes: i64) -> CreateAppointmentRequest {
    CreateAppointmentRequest {
        practitioner_id,
        start_time: start,
        duration_minutes,
        appointment_type: AppointmentType::RoutineCheckUp,
        patient_name: "Ama Owusu".to_string(),
        notes: None,
    }
}

pub fn reschedule(start: DateTime<Utc>, duration_minutes: i64) -> UpdateAppointmentRequest {
    UpdateAppointmentRequest {
        start_time: start,
        duration_minutes,
        appointment_type: AppointmentType::RoutineCheckUp,
        patient_name: "Ama Owusu".to_string(),
        notes: None,
    }
}

pub fn hhmm(slots: &[&str]) -> Vec<String> {
    slots.iter().map(|s| s.to_string()).collect()
}
