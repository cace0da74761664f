//! Calendar Instance REST API Routes
//!
//! Point operations on calendar instances.

use std::sync::Arc;

use alma_core::InstanceId;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::{
    config::ApiConfig,
    error::{ApiError, ApiResult},
    extractors::{ApiJson, ApiPath, ApiQuery},
    state::{AppState, SharedStore},
    types::{CreateInstanceRequest, InstanceResponse, ListInstancesQuery, UpdateInstanceRequest},
};

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /api/v1/calendar/instances - List instances
#[utoipa::path(
    get,
    path = "/api/v1/calendar/instances",
    tag = "Instances",
    params(
        ("skip" = Option<u32>, Query, description = "Rows to skip (default 0)"),
        ("limit" = Option<u32>, Query, description = "Page size (default 100)"),
        ("type" = Option<String>, Query, description = "grupo, taller or actividad"),
        ("status" = Option<String>, Query, description = "programado, realizado or cancelado"),
        ("date_from" = Option<String>, Query, description = "Earliest date (inclusive)"),
        ("date_to" = Option<String>, Query, description = "Latest date (inclusive)"),
        ("source_id" = Option<i64>, Query, description = "Group, workshop or activity id"),
    ),
    responses(
        (status = 200, description = "Instances ordered by date and start time", body = Vec<InstanceResponse>),
        (status = 400, description = "Invalid query", body = ApiError),
    ),
)]
pub async fn list_instances(
    State(store): State<SharedStore>,
    State(config): State<Arc<ApiConfig>>,
    ApiQuery(query): ApiQuery<ListInstancesQuery>,
) -> ApiResult<Json<Vec<InstanceResponse>>> {
    let page = query.page(&config)?;
    let instances = store.instance_list(&query.filter(), Some(page)).await?;
    Ok(Json(instances.into_iter().map(Into::into).collect()))
}

/// GET /api/v1/calendar/instances/{id} - Get an instance
#[utoipa::path(
    get,
    path = "/api/v1/calendar/instances/{id}",
    tag = "Instances",
    params(("id" = i64, Path, description = "Instance ID")),
    responses(
        (status = 200, description = "Instance found", body = InstanceResponse),
        (status = 404, description = "Instance not found", body = ApiError),
    ),
)]
pub async fn get_instance(
    State(store): State<SharedStore>,
    ApiPath(id): ApiPath<InstanceId>,
) -> ApiResult<Json<InstanceResponse>> {
    let instance = store.instance_get(id).await?;
    Ok(Json(instance.into()))
}

/// POST /api/v1/calendar/instances - Create an instance
#[utoipa::path(
    post,
    path = "/api/v1/calendar/instances",
    tag = "Instances",
    request_body = CreateInstanceRequest,
    responses(
        (status = 201, description = "Instance created", body = InstanceResponse),
        (status = 400, description = "Invalid request", body = ApiError),
    ),
)]
pub async fn create_instance(
    State(store): State<SharedStore>,
    ApiJson(req): ApiJson<CreateInstanceRequest>,
) -> ApiResult<impl IntoResponse> {
    let instance = store.instance_insert(&req.into_new()).await?;
    tracing::info!(
        instance_id = instance.id,
        kind = %instance.kind(),
        date = %instance.date,
        "Calendar instance created"
    );
    Ok((StatusCode::CREATED, Json(InstanceResponse::from(instance))))
}

/// PUT /api/v1/calendar/instances/{id} - Partially update an instance
#[utoipa::path(
    put,
    path = "/api/v1/calendar/instances/{id}",
    tag = "Instances",
    params(("id" = i64, Path, description = "Instance ID")),
    request_body = UpdateInstanceRequest,
    responses(
        (status = 200, description = "Instance updated", body = InstanceResponse),
        (status = 404, description = "Instance not found", body = ApiError),
    ),
)]
pub async fn update_instance(
    State(store): State<SharedStore>,
    ApiPath(id): ApiPath<InstanceId>,
    ApiJson(req): ApiJson<UpdateInstanceRequest>,
) -> ApiResult<Json<InstanceResponse>> {
    let instance = store.instance_update(id, &req.into_update()).await?;
    tracing::info!(instance_id = id, "Calendar instance updated");
    Ok(Json(instance.into()))
}

/// DELETE /api/v1/calendar/instances/{id} - Delete an instance with its children
#[utoipa::path(
    delete,
    path = "/api/v1/calendar/instances/{id}",
    tag = "Instances",
    params(("id" = i64, Path, description = "Instance ID")),
    responses(
        (status = 204, description = "Instance deleted"),
        (status = 404, description = "Instance not found", body = ApiError),
    ),
)]
pub async fn delete_instance(
    State(store): State<SharedStore>,
    ApiPath(id): ApiPath<InstanceId>,
) -> ApiResult<StatusCode> {
    store.instance_delete(id).await?;
    tracing::info!(instance_id = id, "Calendar instance deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// ROUTER SETUP
// ============================================================================

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/instances", get(list_instances).post(create_instance))
        .route(
            "/instances/:id",
            get(get_instance).put(update_instance).delete(delete_instance),
        )
}
