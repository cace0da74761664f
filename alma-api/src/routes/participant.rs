//! Participant Roster REST API Routes

use alma_core::{InstanceId, NewParticipant, RosterEntryId};
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
    types::{AddParticipantRequest, ParticipantResponse, UpdateParticipantRequest},
};

/// GET /api/v1/calendar/instances/{id}/participants - List an instance's roster
#[utoipa::path(
    get,
    path = "/api/v1/calendar/instances/{id}/participants",
    tag = "Participants",
    params(("id" = i64, Path, description = "Instance ID")),
    responses(
        (status = 200, description = "Roster entries", body = Vec<ParticipantResponse>),
    ),
)]
pub async fn list_participants(
    State(store): State<SharedStore>,
    ApiPath(event_id): ApiPath<InstanceId>,
) -> ApiResult<Json<Vec<ParticipantResponse>>> {
    let roster = store.participant_list_for_event(event_id).await?;
    Ok(Json(roster.into_iter().map(Into::into).collect()))
}

/// POST /api/v1/calendar/instances/{id}/participants - Add a participant
#[utoipa::path(
    post,
    path = "/api/v1/calendar/instances/{id}/participants",
    tag = "Participants",
    params(("id" = i64, Path, description = "Instance ID")),
    request_body = AddParticipantRequest,
    responses(
        (status = 201, description = "Participant added", body = ParticipantResponse),
        (status = 404, description = "Instance or participant not found", body = ApiError),
        (status = 409, description = "Participant already on the roster", body = ApiError),
    ),
)]
pub async fn add_participant(
    State(store): State<SharedStore>,
    ApiPath(event_id): ApiPath<InstanceId>,
    ApiJson(req): ApiJson<AddParticipantRequest>,
) -> ApiResult<impl IntoResponse> {
    let entry = store
        .participant_add(&NewParticipant {
            event_id,
            participant_id: req.participant_id,
            status: req.status,
        })
        .await?;
    tracing::info!(
        event_id,
        participant_id = req.participant_id,
        "Participant added to roster"
    );
    Ok((StatusCode::CREATED, Json(ParticipantResponse::from(entry))))
}

/// PUT /api/v1/calendar/event-participants/{id} - Update attendance
#[utoipa::path(
    put,
    path = "/api/v1/calendar/event-participants/{id}",
    tag = "Participants",
    params(("id" = i64, Path, description = "Roster entry ID")),
    request_body = UpdateParticipantRequest,
    responses(
        (status = 200, description = "Roster entry updated", body = ParticipantResponse),
        (status = 404, description = "Roster entry not found", body = ApiError),
    ),
)]
pub async fn update_participant(
    State(store): State<SharedStore>,
    ApiPath(id): ApiPath<RosterEntryId>,
    ApiJson(req): ApiJson<UpdateParticipantRequest>,
) -> ApiResult<Json<ParticipantResponse>> {
    let entry = store.participant_update(id, &req.into()).await?;
    Ok(Json(entry.into()))
}

/// DELETE /api/v1/calendar/event-participants/{id} - Remove from roster
#[utoipa::path(
    delete,
    path = "/api/v1/calendar/event-participants/{id}",
    tag = "Participants",
    params(("id" = i64, Path, description = "Roster entry ID")),
    responses(
        (status = 204, description = "Roster entry deleted"),
        (status = 404, description = "Roster entry not found", body = ApiError),
    ),
)]
pub async fn delete_participant(
    State(store): State<SharedStore>,
    ApiPath(id): ApiPath<RosterEntryId>,
) -> ApiResult<StatusCode> {
    store.participant_delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route(
            "/instances/:id/participants",
            get(list_participants).post(add_participant),
        )
        .route(
            "/event-participants/:id",
            put(update_participant).delete(delete_participant),
        )
}
