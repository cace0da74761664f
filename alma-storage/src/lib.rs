//! ALMA Storage - Calendar Storage Traits and Mock Implementation
//!
//! Defines the storage abstraction for calendar instances, role assignments
//! and participant rosters. The PostgreSQL implementation lives in `alma-api`.

mod mock;
mod store;

pub use mock::MockStorage;
pub use store::{CalendarBackend, CalendarStore, VolunteerDirectory};

// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================
