//! API Request and Response Types
//!
//! Wire types for the calendar REST surface. Domain records live in
//! `alma-core`; these types own the JSON field names and request defaults.

use serde::{Deserialize, Deserializer};

// Calendar instance types
mod instance;
pub use instance::*;

// Role assignment types
mod assignment;
pub use assignment::*;

// Participant roster types
mod participant;
pub use participant::*;

// Generation, bulk and rich listing types
mod schedule;
pub use schedule::*;

/// Deserialize a present field (including `null`) as `Some`, so that
/// `Option<Option<T>>` can tell an explicit `null` from an absent field.
pub(crate) fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}
