//! Identity types for calendar entities

use chrono::{DateTime, Utc};

/// Surrogate key of a calendar instance.
pub type InstanceId = i64;

/// Surrogate key of a role assignment.
pub type AssignmentId = i64;

/// Surrogate key of a roster row (instance <-> participant link).
pub type RosterEntryId = i64;

/// Volunteer key owned by the volunteer directory.
pub type VolunteerId = i64;

/// Participant key owned by the participant directory.
pub type ParticipantId = i64;

/// Key into the group, workshop or activity registry, selected by instance type.
pub type SourceId = i64;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Current wall-clock timestamp.
pub fn now() -> Timestamp {
    Utc::now()
}
