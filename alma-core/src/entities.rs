//! Core entity structures

use crate::{
    AssignmentId, AssignmentRole, AttendanceStatus, InstanceId, InstanceKind, InstanceStatus,
    ParticipantId, RosterEntryId, SourceId, Timestamp, VolunteerId,
};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

// ============================================================================
// CALENDAR SOURCE
// ============================================================================

/// What an instance is a meeting of, together with the id into the registry
/// that kind selects. Activities created ad hoc carry no source id.
///
/// Serializes flat as `{"type": "...", "source_id": ...}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "source_id")]
pub enum CalendarSource {
    #[serde(rename = "grupo")]
    Group(Option<SourceId>),
    #[serde(rename = "taller")]
    Workshop(Option<SourceId>),
    #[serde(rename = "actividad")]
    Activity(Option<SourceId>),
}

impl CalendarSource {
    pub fn from_parts(kind: InstanceKind, source_id: Option<SourceId>) -> Self {
        match kind {
            InstanceKind::Group => CalendarSource::Group(source_id),
            InstanceKind::Workshop => CalendarSource::Workshop(source_id),
            InstanceKind::Activity => CalendarSource::Activity(source_id),
        }
    }

    pub fn kind(&self) -> InstanceKind {
        match self {
            CalendarSource::Group(_) => InstanceKind::Group,
            CalendarSource::Workshop(_) => InstanceKind::Workshop,
            CalendarSource::Activity(_) => InstanceKind::Activity,
        }
    }

    pub fn source_id(&self) -> Option<SourceId> {
        match *self {
            CalendarSource::Group(id)
            | CalendarSource::Workshop(id)
            | CalendarSource::Activity(id) => id,
        }
    }

    /// Same source id reinterpreted under another kind.
    pub fn with_kind(self, kind: InstanceKind) -> Self {
        Self::from_parts(kind, self.source_id())
    }

    pub fn with_source_id(self, source_id: Option<SourceId>) -> Self {
        Self::from_parts(self.kind(), source_id)
    }
}

// ============================================================================
// CALENDAR INSTANCE
// ============================================================================

/// A scheduled occurrence of a group, workshop or activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarInstance {
    pub id: InstanceId,
    #[serde(flatten)]
    pub source: CalendarSource,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub notes: Option<String>,
    pub status: InstanceStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CalendarInstance {
    pub fn kind(&self) -> InstanceKind {
        self.source.kind()
    }

    pub fn source_id(&self) -> Option<SourceId> {
        self.source.source_id()
    }

    /// Sort key used by every listing: date, then start time, then id.
    pub fn schedule_key(&self) -> (NaiveDate, NaiveTime, InstanceId) {
        (self.date, self.start_time, self.id)
    }
}

/// Fields for a new instance; the store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInstance {
    pub source: CalendarSource,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub notes: Option<String>,
    pub status: InstanceStatus,
}

impl NewInstance {
    pub fn into_instance(self, id: InstanceId, at: Timestamp) -> CalendarInstance {
        CalendarInstance {
            id,
            source: self.source,
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
            notes: self.notes,
            status: self.status,
            created_at: at,
            updated_at: at,
        }
    }
}

/// Partial update of an instance.
///
/// `None` leaves a field unchanged. For the nullable fields `Some(None)`
/// clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceUpdate {
    pub kind: Option<InstanceKind>,
    pub source_id: Option<Option<SourceId>>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub notes: Option<Option<String>>,
    pub status: Option<InstanceStatus>,
}

impl InstanceUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the supplied fields. Changing the kind without a source id keeps
    /// the existing source id under the new kind.
    pub fn apply(&self, instance: &mut CalendarInstance, at: Timestamp) {
        if let Some(kind) = self.kind {
            instance.source = instance.source.with_kind(kind);
        }
        if let Some(source_id) = self.source_id {
            instance.source = instance.source.with_source_id(source_id);
        }
        if let Some(date) = self.date {
            instance.date = date;
        }
        if let Some(start_time) = self.start_time {
            instance.start_time = start_time;
        }
        if let Some(end_time) = self.end_time {
            instance.end_time = end_time;
        }
        if let Some(notes) = &self.notes {
            instance.notes = notes.clone();
        }
        if let Some(status) = self.status {
            instance.status = status;
        }
        instance.updated_at = at;
    }
}

// ============================================================================
// ASSIGNMENTS
// ============================================================================

/// One volunteer holding one role on one instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarAssignment {
    pub id: AssignmentId,
    pub instance_id: InstanceId,
    pub volunteer_id: VolunteerId,
    pub role: AssignmentRole,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewAssignment {
    pub instance_id: InstanceId,
    pub volunteer_id: VolunteerId,
    pub role: AssignmentRole,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssignmentUpdate {
    pub volunteer_id: Option<VolunteerId>,
    pub role: Option<AssignmentRole>,
}

impl AssignmentUpdate {
    pub fn apply(&self, assignment: &mut CalendarAssignment, at: Timestamp) {
        if let Some(volunteer_id) = self.volunteer_id {
            assignment.volunteer_id = volunteer_id;
        }
        if let Some(role) = self.role {
            assignment.role = role;
        }
        assignment.updated_at = at;
    }
}

// ============================================================================
// PARTICIPANT ROSTER
// ============================================================================

/// A participant enrolled on an instance, with attendance state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEventParticipant {
    pub id: RosterEntryId,
    pub event_id: InstanceId,
    pub participant_id: ParticipantId,
    pub status: AttendanceStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewParticipant {
    pub event_id: InstanceId,
    pub participant_id: ParticipantId,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParticipantUpdate {
    pub status: Option<AttendanceStatus>,
}

// ============================================================================
// VOLUNTEER DIRECTORY PROJECTION
// ============================================================================

/// Read-only view of a volunteer as supplied by the volunteer directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct VolunteerRef {
    pub id: VolunteerId,
    pub name: String,
    pub last_name: String,
}

impl VolunteerRef {
    /// Build from directory columns; a missing last name renders as empty.
    pub fn new(id: VolunteerId, name: impl Into<String>, last_name: Option<String>) -> Self {
        Self {
            id,
            name: name.into(),
            last_name: last_name.unwrap_or_default(),
        }
    }
}
