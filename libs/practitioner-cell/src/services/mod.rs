pub mod roster;
pub mod supabase;

pub use roster::{InMemoryRoster, PractitionerSource};
pub use supabase::SupabaseRoster;
