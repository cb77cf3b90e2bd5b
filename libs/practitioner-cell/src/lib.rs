pub mod handlers;
pub mod router;
pub mod models;
pub mod services;

pub use models::{Practitioner, PractitionerError, WorkingHours};
pub use services::{InMemoryRoster, PractitionerSource, SupabaseRoster};
