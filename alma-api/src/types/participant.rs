//! Participant roster API types

use alma_core::{
    AttendanceStatus, CalendarEventParticipant, InstanceId, ParticipantId, ParticipantUpdate,
    RosterEntryId, Timestamp,
};
use serde::{Deserialize, Serialize};

/// Request to put a participant on an instance's roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AddParticipantRequest {
    pub participant_id: ParticipantId,
    /// Defaults to `inscripto`
    #[serde(default)]
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateParticipantRequest {
    #[serde(default)]
    pub status: Option<AttendanceStatus>,
}

impl From<UpdateParticipantRequest> for ParticipantUpdate {
    fn from(req: UpdateParticipantRequest) -> Self {
        ParticipantUpdate { status: req.status }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ParticipantResponse {
    pub id: RosterEntryId,
    pub event_id: InstanceId,
    pub participant_id: ParticipantId,
    pub status: AttendanceStatus,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,
}

impl From<CalendarEventParticipant> for ParticipantResponse {
    fn from(p: CalendarEventParticipant) -> Self {
        Self {
            id: p.id,
            event_id: p.event_id,
            participant_id: p.participant_id,
            status: p.status,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}
