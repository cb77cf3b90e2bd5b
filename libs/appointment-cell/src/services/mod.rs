pub mod availability;
pub mod conflict;
pub mod locks;
pub mod scheduling;
pub mod slots;
pub mod store;
pub mod supabase_store;

pub use availability::AvailabilityFilter;
pub use conflict::BookingValidator;
pub use locks::PractitionerLocks;
pub use scheduling::SchedulingService;
pub use slots::{SlotGenerator, SlotIter};
pub use store::{AppointmentStore, InMemoryAppointmentStore, StoreError};
pub use supabase_store::SupabaseAppointmentStore;
