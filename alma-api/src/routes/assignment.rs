//! Role Assignment REST API Routes
//!
//! Assignments are listed and created per instance. Upsert-by-role is the
//! canonical way to set a coordinator or co-coordinator.

use alma_core::{AssignmentId, AssignmentRole, InstanceId, NewAssignment};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};

use crate::{
    error::{ApiError, ApiResult},
    extractors::{ApiJson, ApiPath},
    state::{AppState, SharedStore},
    types::{
        AssignmentResponse, CreateAssignmentRequest, UpdateAssignmentRequest,
        UpsertAssignmentRequest,
    },
};

fn parse_role(role: &str) -> ApiResult<AssignmentRole> {
    AssignmentRole::from_db_str(role).map_err(|e| {
        ApiError::invalid_input(e.to_string())
            .with_details(serde_json::json!({ "field": "role" }))
    })
}

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /api/v1/calendar/instances/{id}/assignments - List an instance's assignments
#[utoipa::path(
    get,
    path = "/api/v1/calendar/instances/{id}/assignments",
    tag = "Assignments",
    params(("id" = i64, Path, description = "Instance ID")),
    responses(
        (status = 200, description = "Assignments, coordinator first", body = Vec<AssignmentResponse>),
    ),
)]
pub async fn list_assignments(
    State(store): State<SharedStore>,
    ApiPath(instance_id): ApiPath<InstanceId>,
) -> ApiResult<Json<Vec<AssignmentResponse>>> {
    let assignments = store.assignment_list_for_instance(instance_id).await?;
    Ok(Json(assignments.into_iter().map(Into::into).collect()))
}

/// POST /api/v1/calendar/instances/{id}/assignments - Create an assignment
#[utoipa::path(
    post,
    path = "/api/v1/calendar/instances/{id}/assignments",
    tag = "Assignments",
    params(("id" = i64, Path, description = "Instance ID")),
    request_body = CreateAssignmentRequest,
    responses(
        (status = 201, description = "Assignment created", body = AssignmentResponse),
        (status = 404, description = "Instance or volunteer not found", body = ApiError),
        (status = 409, description = "Role slot already filled", body = ApiError),
    ),
)]
pub async fn create_assignment(
    State(store): State<SharedStore>,
    ApiPath(instance_id): ApiPath<InstanceId>,
    ApiJson(req): ApiJson<CreateAssignmentRequest>,
) -> ApiResult<impl IntoResponse> {
    let assignment = store
        .assignment_insert(&NewAssignment {
            instance_id,
            volunteer_id: req.volunteer_id,
            role: req.role,
        })
        .await?;
    tracing::info!(
        instance_id,
        assignment_id = assignment.id,
        role = %assignment.role,
        "Assignment created"
    );
    Ok((StatusCode::CREATED, Json(AssignmentResponse::from(assignment))))
}

/// PUT /api/v1/calendar/instances/{id}/assignments/by-role/{role} - Set a role holder
#[utoipa::path(
    put,
    path = "/api/v1/calendar/instances/{id}/assignments/by-role/{role}",
    tag = "Assignments",
    params(
        ("id" = i64, Path, description = "Instance ID"),
        ("role" = String, Path, description = "coordinator or co_coordinator"),
    ),
    request_body = UpsertAssignmentRequest,
    responses(
        (status = 200, description = "Role holder set", body = AssignmentResponse),
        (status = 400, description = "Unknown role", body = ApiError),
        (status = 404, description = "Instance or volunteer not found", body = ApiError),
    ),
)]
pub async fn upsert_assignment_by_role(
    State(store): State<SharedStore>,
    ApiPath((instance_id, role)): ApiPath<(InstanceId, String)>,
    ApiJson(req): ApiJson<UpsertAssignmentRequest>,
) -> ApiResult<Json<AssignmentResponse>> {
    let role = parse_role(&role)?;
    let assignment = store
        .assignment_upsert_by_role(instance_id, role, req.volunteer_id)
        .await?;
    tracing::info!(
        instance_id,
        assignment_id = assignment.id,
        role = %role,
        volunteer_id = req.volunteer_id,
        "Role holder set"
    );
    Ok(Json(assignment.into()))
}

/// DELETE /api/v1/calendar/instances/{id}/assignments/by-role/{role} - Clear a role
#[utoipa::path(
    delete,
    path = "/api/v1/calendar/instances/{id}/assignments/by-role/{role}",
    tag = "Assignments",
    params(
        ("id" = i64, Path, description = "Instance ID"),
        ("role" = String, Path, description = "coordinator or co_coordinator"),
    ),
    responses(
        (status = 204, description = "Role cleared"),
        (status = 404, description = "No assignment for that role", body = ApiError),
    ),
)]
pub async fn delete_assignment_by_role(
    State(store): State<SharedStore>,
    ApiPath((instance_id, role)): ApiPath<(InstanceId, String)>,
) -> ApiResult<StatusCode> {
    let role = parse_role(&role)?;
    store.assignment_delete_by_role(instance_id, role).await?;
    tracing::info!(instance_id, role = %role, "Role cleared");
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/calendar/assignments/{id} - Update an assignment
#[utoipa::path(
    put,
    path = "/api/v1/calendar/assignments/{id}",
    tag = "Assignments",
    params(("id" = i64, Path, description = "Assignment ID")),
    request_body = UpdateAssignmentRequest,
    responses(
        (status = 200, description = "Assignment updated", body = AssignmentResponse),
        (status = 404, description = "Assignment not found", body = ApiError),
        (status = 409, description = "Role slot already filled", body = ApiError),
    ),
)]
pub async fn update_assignment(
    State(store): State<SharedStore>,
    ApiPath(id): ApiPath<AssignmentId>,
    ApiJson(req): ApiJson<UpdateAssignmentRequest>,
) -> ApiResult<Json<AssignmentResponse>> {
    let assignment = store.assignment_update(id, &req.into()).await?;
    Ok(Json(assignment.into()))
}

/// DELETE /api/v1/calendar/assignments/{id} - Delete an assignment
#[utoipa::path(
    delete,
    path = "/api/v1/calendar/assignments/{id}",
    tag = "Assignments",
    params(("id" = i64, Path, description = "Assignment ID")),
    responses(
        (status = 204, description = "Assignment deleted"),
        (status = 404, description = "Assignment not found", body = ApiError),
    ),
)]
pub async fn delete_assignment(
    State(store): State<SharedStore>,
    ApiPath(id): ApiPath<AssignmentId>,
) -> ApiResult<StatusCode> {
    store.assignment_delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// ROUTER SETUP
// ============================================================================

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route(
            "/instances/:id/assignments",
            get(list_assignments).post(create_assignment),
        )
        .route(
            "/instances/:id/assignments/by-role/:role",
            put(upsert_assignment_by_role).delete(delete_assignment_by_role),
        )
        .route(
            "/assignments/:id",
            put(update_assignment).delete(delete_assignment),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_parse_role() {
        assert_eq!(parse_role("coordinator").unwrap(), AssignmentRole::Coordinator);
        assert_eq!(parse_role("co_coordinator").unwrap(), AssignmentRole::CoCoordinator);
        assert_eq!(parse_role("chair").unwrap_err().code, ErrorCode::InvalidInput);
    }
}
