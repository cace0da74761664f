//! Role assignment API types

use alma_core::{
    AssignmentId, AssignmentRole, AssignmentUpdate, CalendarAssignment, InstanceId, Timestamp,
    VolunteerId,
};
use serde::{Deserialize, Serialize};

/// Request to create an assignment on an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateAssignmentRequest {
    pub volunteer_id: VolunteerId,
    pub role: AssignmentRole,
}

/// Body of the upsert-by-role endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpsertAssignmentRequest {
    pub volunteer_id: VolunteerId,
}

/// Partial update of an assignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateAssignmentRequest {
    #[serde(default)]
    pub volunteer_id: Option<VolunteerId>,
    #[serde(default)]
    pub role: Option<AssignmentRole>,
}

impl From<UpdateAssignmentRequest> for AssignmentUpdate {
    fn from(req: UpdateAssignmentRequest) -> Self {
        AssignmentUpdate {
            volunteer_id: req.volunteer_id,
            role: req.role,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AssignmentResponse {
    pub id: AssignmentId,
    pub instance_id: InstanceId,
    pub volunteer_id: VolunteerId,
    pub role: AssignmentRole,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,
}

impl From<CalendarAssignment> for AssignmentResponse {
    fn from(a: CalendarAssignment) -> Self {
        Self {
            id: a.id,
            instance_id: a.instance_id,
            volunteer_id: a.volunteer_id,
            role: a.role,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}
