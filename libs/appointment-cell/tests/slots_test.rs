mod common;

use assert_matches::assert_matches;
use chrono::{Duration, NaiveDate, NaiveTime};

use appointment_cell::{AppointmentError, AvailabilityFilter, SlotGenerator};
use practitioner_cell::WorkingHours;
use shared_models::TimeInterval;

use common::{at, day, hours};

fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

#[test]
fn morning_window_yields_six_half_hour_slots() {
    let generator = SlotGenerator::for_date(&hours(9, 12), day()).unwrap();
    let slots: Vec<_> = generator.iter().collect();

    assert_eq!(
        slots,
        vec![at(9, 0), at(9, 30), at(10, 0), at(10, 30), at(11, 0), at(11, 30)]
    );
}

#[test]
fn generator_can_be_iterated_twice() {
    let generator = SlotGenerator::for_date(&hours(9, 12), day()).unwrap();

    let first: Vec<_> = generator.iter().collect();
    let second: Vec<_> = (&generator).into_iter().collect();

    assert_eq!(first, second);
}

#[test]
fn trailing_partial_slot_is_truncated() {
    let ragged = WorkingHours::new(time(9, 0), time(10, 45)).unwrap();
    let slots: Vec<_> = SlotGenerator::for_date(&ragged, day()).unwrap().iter().collect();

    assert_eq!(slots, vec![at(9, 0), at(9, 30), at(10, 0)]);
}

#[test]
fn window_shorter_than_one_slot_yields_nothing() {
    let short = WorkingHours::new(time(9, 0), time(9, 20)).unwrap();
    let generator = SlotGenerator::for_date(&short, day()).unwrap();

    assert_eq!(generator.iter().count(), 0);
}

#[test]
fn inverted_or_empty_window_is_rejected() {
    let inverted = WorkingHours { start: time(12, 0), end: time(9, 0) };
    let empty = WorkingHours { start: time(9, 0), end: time(9, 0) };

    assert_matches!(
        SlotGenerator::for_date(&inverted, day()),
        Err(AppointmentError::InvalidWindow(_))
    );
    assert_matches!(
        SlotGenerator::for_date(&empty, day()),
        Err(AppointmentError::InvalidWindow(_))
    );
}

#[test]
fn non_positive_granularity_is_rejected() {
    assert_matches!(
        SlotGenerator::new(&hours(9, 12), day(), Duration::zero()),
        Err(AppointmentError::InvalidWindow(_))
    );
}

#[test]
fn slots_fit_the_window_and_strictly_increase() {
    let windows = [
        (time(0, 0), time(23, 59)),
        (time(8, 0), time(17, 0)),
        (time(9, 15), time(13, 10)),
        (time(22, 0), time(23, 30)),
    ];

    for (start, end) in windows {
        for step in [15, 30, 45, 60] {
            let granularity = Duration::minutes(step);
            let hours = WorkingHours::new(start, end).unwrap();
            let generator = SlotGenerator::new(&hours, day(), granularity).unwrap();
            let window = generator.window();
            let slots: Vec<_> = generator.iter().collect();

            for slot in &slots {
                assert!(*slot >= window.start);
                assert!(*slot + granularity <= window.end);
                assert_eq!((*slot - window.start).num_minutes() % step, 0);
            }
            assert!(slots.windows(2).all(|pair| pair[0] < pair[1]));

            // Exactly the slots that fit: one more would overrun closing time.
            let next = window.start + granularity * slots.len() as i32;
            assert!(next + granularity > window.end);
        }
    }
}

#[test]
fn filter_keeps_order_and_drops_only_the_booked_slot() {
    let generator = SlotGenerator::for_date(&hours(9, 12), day()).unwrap();
    let booked = [TimeInterval::new(at(10, 0), at(10, 30))];

    let free = AvailabilityFilter::default().free_slots(&generator, &booked);

    assert_eq!(free, vec![at(9, 0), at(9, 30), at(10, 30), at(11, 0), at(11, 30)]);
}

#[test]
fn long_booking_removes_every_slot_it_covers() {
    let generator = SlotGenerator::for_date(&hours(9, 12), day()).unwrap();
    let booked = [TimeInterval::new(at(9, 30), at(11, 0))];

    let free = AvailabilityFilter::default().free_slots(&generator, &booked);

    assert_eq!(free, vec![at(9, 0), at(11, 0), at(11, 30)]);
}

#[test]
fn free_slots_never_intersect_bookings() {
    let generator = SlotGenerator::for_date(&hours(8, 18), day()).unwrap();
    let booked = [
        TimeInterval::new(at(8, 10), at(8, 50)),
        TimeInterval::new(at(12, 0), at(13, 30)),
        TimeInterval::new(at(17, 45), at(18, 0)),
    ];
    let filter = AvailabilityFilter::default();

    let free = filter.free_slots(&generator, &booked);

    assert!(!free.is_empty());
    for slot in free {
        let candidate = TimeInterval::starting_at(slot, generator.granularity()).unwrap();
        assert!(booked.iter().all(|b| !b.overlaps(&candidate)), "{slot} overlaps a booking");
    }
}

#[test]
fn last_representable_day_stops_before_running_out_of_time() {
    let late = WorkingHours::new(time(22, 0), time(23, 59)).unwrap();
    let generator = SlotGenerator::for_date(&late, NaiveDate::MAX).unwrap();

    let slots: Vec<_> = generator.iter().map(|s| s.format("%H:%M").to_string()).collect();

    assert_eq!(slots, vec!["22:00", "22:30", "23:00"]);
    assert!(AvailabilityFilter::default().is_free(generator.window().start, &[]));
}
