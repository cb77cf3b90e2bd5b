mod common;

use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use uuid::Uuid;

use appointment_cell::{
    Appointment, AppointmentError, AppointmentStore, AppointmentType, BookingValidator,
    ConflictCheck, InMemoryAppointmentStore,
};
use shared_models::TimeInterval;

use common::{at, practitioner, STORE_TIMEOUT};

fn committed(practitioner_id: Uuid, start_hour: u32, start_minute: u32, minutes: i64) -> Appointment {
    let now = Utc::now();
    Appointment {
        id: Uuid::new_v4(),
        practitioner_id,
        start_time: at(start_hour, start_minute),
        duration_minutes: minutes,
        appointment_type: AppointmentType::Ultrasound,
        patient_name: "Efua Boateng".to_string(),
        notes: None,
        created_at: now,
        updated_at: now,
    }
}

async fn validator_with(existing: Vec<Appointment>) -> BookingValidator {
    let store = Arc::new(InMemoryAppointmentStore::new());
    for appointment in existing {
        store.insert(appointment).await.unwrap();
    }
    BookingValidator::new(store, STORE_TIMEOUT)
}

#[tokio::test]
async fn durations_must_be_positive_multiples_of_thirty() {
    let validator = validator_with(vec![]).await;

    assert_eq!(validator.validate_duration(30).unwrap(), Duration::minutes(30));
    assert_eq!(validator.validate_duration(90).unwrap(), Duration::minutes(90));
    for bad in [0, -30, 20, 45, 24 * 60 + 30] {
        assert_matches!(
            validator.validate_duration(bad),
            Err(AppointmentError::InvalidDuration(d)) if d == bad
        );
    }
}

#[tokio::test]
async fn interval_must_sit_inside_working_hours() {
    let validator = validator_with(vec![]).await;
    let doc = practitioner(9, 12);

    let inside = TimeInterval::new(at(11, 30), at(12, 0));
    let early = TimeInterval::new(at(8, 30), at(9, 0));
    let late = TimeInterval::new(at(11, 30), at(12, 30));

    assert!(validator.validate_within_hours(&doc, &inside).is_ok());
    assert_matches!(
        validator.validate_within_hours(&doc, &early),
        Err(AppointmentError::OutOfHours { requested_start, window_start, .. })
            if requested_start == at(8, 30) && window_start == at(9, 0)
    );
    assert_matches!(
        validator.validate_within_hours(&doc, &late),
        Err(AppointmentError::OutOfHours { window_end, .. }) if window_end == at(12, 0)
    );
}

#[tokio::test]
async fn overlapping_booking_is_reported_by_id() {
    let doc = practitioner(9, 12);
    let existing = committed(doc.id, 10, 0, 30);
    let validator = validator_with(vec![existing.clone()]).await;

    let check = validator
        .check_conflicts(doc.id, TimeInterval::new(at(10, 0), at(10, 30)), None)
        .await
        .unwrap();

    assert_eq!(check, ConflictCheck::Conflict(vec![existing.id]));
    assert!(check.has_conflict());
}

#[tokio::test]
async fn adjacent_bookings_do_not_conflict() {
    let doc = practitioner(9, 12);
    let validator = validator_with(vec![committed(doc.id, 10, 0, 30)]).await;

    let before = validator
        .check_conflicts(doc.id, TimeInterval::new(at(9, 30), at(10, 0)), None)
        .await
        .unwrap();
    let after = validator
        .check_conflicts(doc.id, TimeInterval::new(at(10, 30), at(11, 0)), None)
        .await
        .unwrap();

    assert_eq!(before, ConflictCheck::NoConflict);
    assert_eq!(after, ConflictCheck::NoConflict);
}

#[tokio::test]
async fn excluded_appointment_never_conflicts_with_itself() {
    let doc = practitioner(9, 12);
    let existing = committed(doc.id, 10, 0, 60);
    let validator = validator_with(vec![existing.clone()]).await;

    let check = validator
        .check_conflicts(doc.id, existing.interval(), Some(existing.id))
        .await
        .unwrap();

    assert_eq!(check, ConflictCheck::NoConflict);
}

#[tokio::test]
async fn other_practitioners_bookings_are_ignored() {
    let doc = practitioner(9, 12);
    let colleague = practitioner(9, 12);
    let validator = validator_with(vec![committed(colleague.id, 10, 0, 30)]).await;

    let check = validator
        .check_conflicts(doc.id, TimeInterval::new(at(10, 0), at(10, 30)), None)
        .await
        .unwrap();

    assert_eq!(check, ConflictCheck::NoConflict);
}

#[tokio::test]
async fn validate_runs_duration_then_hours_then_overlap() {
    let doc = practitioner(9, 12);
    let existing = committed(doc.id, 10, 0, 30);
    let validator = validator_with(vec![existing.clone()]).await;

    // Misaligned duration is reported even though the time is also out of hours.
    assert_matches!(
        validator.validate(&doc, at(8, 0), 45, None).await,
        Err(AppointmentError::InvalidDuration(45))
    );
    assert_matches!(
        validator.validate(&doc, at(8, 30), 30, None).await,
        Err(AppointmentError::OutOfHours { .. })
    );
    assert_matches!(
        validator.validate(&doc, at(9, 30), 60, None).await,
        Err(AppointmentError::Conflict(ids)) if ids == vec![existing.id]
    );

    let interval = validator.validate(&doc, at(10, 30), 90, None).await.unwrap();
    assert_eq!(interval, TimeInterval::new(at(10, 30), at(12, 0)));
}
