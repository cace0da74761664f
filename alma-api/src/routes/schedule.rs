//! Schedule-level REST API Routes
//!
//! Rich listing, series generation and bulk count/delete. The handlers parse
//! and validate input, then hand off to `services`.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use crate::{
    error::{ApiError, ApiResult},
    extractors::{ApiJson, ApiQuery},
    services,
    state::{AppState, SharedStore},
    types::{
        BulkCountResponse, BulkDeleteResponse, BulkFiltersRequest, GenerateRequest,
        GenerateResponse, RichQueryParams,
    },
};
use alma_core::RichInstance;

/// GET /api/v1/calendar/instances-rich - Instances with embedded role holders
#[utoipa::path(
    get,
    path = "/api/v1/calendar/instances-rich",
    tag = "Schedule",
    params(
        ("year" = i32, Query, description = "Calendar year (required)"),
        ("month" = Option<u32>, Query, description = "Month 1-12"),
        ("type" = Option<String>, Query, description = "grupo, taller or actividad"),
        ("volunteer_id" = Option<i64>, Query, description = "Only instances where this volunteer holds a role"),
    ),
    responses(
        (status = 200, description = "Rich instances ordered by date and start time", body = Vec<RichInstance>),
        (status = 400, description = "Missing year or invalid month", body = ApiError),
    ),
)]
pub async fn list_instances_rich(
    State(store): State<SharedStore>,
    ApiQuery(params): ApiQuery<RichQueryParams>,
) -> ApiResult<Json<Vec<RichInstance>>> {
    let query = params.to_query()?;
    let rich = services::list_rich(&*store, &query).await?;
    Ok(Json(rich))
}

/// POST /api/v1/calendar/generate - Generate an alternating series
#[utoipa::path(
    post,
    path = "/api/v1/calendar/generate",
    tag = "Schedule",
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "Series generated", body = GenerateResponse),
        (status = 400, description = "Invalid plan, nothing persisted", body = ApiError),
    ),
)]
pub async fn generate(
    State(store): State<SharedStore>,
    ApiJson(req): ApiJson<GenerateRequest>,
) -> ApiResult<Json<GenerateResponse>> {
    let created = services::generate_series(&*store, &req.plan()).await?;
    let instances = services::rich_from_created(&created);
    Ok(Json(GenerateResponse {
        created: instances.len(),
        instances,
    }))
}

/// POST /api/v1/calendar/bulk-count - Count instances a bulk delete would remove
#[utoipa::path(
    post,
    path = "/api/v1/calendar/bulk-count",
    tag = "Schedule",
    request_body = BulkFiltersRequest,
    responses(
        (status = 200, description = "Matching instance count", body = BulkCountResponse),
        (status = 400, description = "Invalid scope", body = ApiError),
    ),
)]
pub async fn bulk_count(
    State(store): State<SharedStore>,
    ApiJson(req): ApiJson<BulkFiltersRequest>,
) -> ApiResult<Json<BulkCountResponse>> {
    let scope = req.to_scope()?;
    let count = services::bulk_count(&*store, &scope).await?;
    Ok(Json(BulkCountResponse { count }))
}

/// POST /api/v1/calendar/bulk-delete - Delete every instance in a scope
#[utoipa::path(
    post,
    path = "/api/v1/calendar/bulk-delete",
    tag = "Schedule",
    request_body = BulkFiltersRequest,
    responses(
        (status = 200, description = "Instances deleted", body = BulkDeleteResponse),
        (status = 400, description = "Invalid scope", body = ApiError),
    ),
)]
pub async fn bulk_delete(
    State(store): State<SharedStore>,
    ApiJson(req): ApiJson<BulkFiltersRequest>,
) -> ApiResult<Json<BulkDeleteResponse>> {
    let scope = req.to_scope()?;
    let deleted = services::bulk_delete(&*store, &scope).await?;
    Ok(Json(BulkDeleteResponse { deleted }))
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/instances-rich", get(list_instances_rich))
        .route("/generate", post(generate))
        .route("/bulk-count", post(bulk_count))
        .route("/bulk-delete", post(bulk_delete))
}
