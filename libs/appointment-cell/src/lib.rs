pub mod handlers;
pub mod router;
pub mod models;
pub mod services;

pub use models::{
    Appointment, AppointmentError, AppointmentType, ConflictCheck, CreateAppointmentRequest,
    UpdateAppointmentRequest, SLOT_GRANULARITY_MINUTES,
};
pub use services::{
    AppointmentStore, AvailabilityFilter, BookingValidator, InMemoryAppointmentStore,
    SchedulingService, SlotGenerator, StoreError, SupabaseAppointmentStore,
};
