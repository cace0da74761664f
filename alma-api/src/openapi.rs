//! OpenAPI Specification for the ALMA calendar API
//!
//! Built with utoipa from the route annotations and the wire types.

use utoipa::OpenApi;

use crate::error::{ApiError, ErrorCode};
use crate::routes::health::{HealthReport, HealthStatus};
use crate::routes::{assignment, health, instance, participant, schedule};
use crate::types::*;

use alma_core::{
    AssignmentRole, AttendanceStatus, InstanceKind, InstanceStatus, RichInstance, VolunteerRef,
};

/// OpenAPI document for the calendar API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "ALMA Calendar API",
        version = "0.3.0",
        description = "Calendar instances, role assignments, participant rosters and series generation",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:8001", description = "Local Development")
    ),
    tags(
        (name = "Instances", description = "Scheduled calendar occurrences"),
        (name = "Assignments", description = "Coordinator and co-coordinator slots per instance"),
        (name = "Participants", description = "Attendance roster per instance"),
        (name = "Schedule", description = "Rich listing, series generation and bulk operations"),
        (name = "Health", description = "Liveness and readiness checks"),
        (name = "Observability", description = "Prometheus metrics")
    ),
    paths(
        // === Instance Routes ===
        instance::list_instances,
        instance::get_instance,
        instance::create_instance,
        instance::update_instance,
        instance::delete_instance,

        // === Assignment Routes ===
        assignment::list_assignments,
        assignment::create_assignment,
        assignment::upsert_assignment_by_role,
        assignment::delete_assignment_by_role,
        assignment::update_assignment,
        assignment::delete_assignment,

        // === Participant Routes ===
        participant::list_participants,
        participant::add_participant,
        participant::update_participant,
        participant::delete_participant,

        // === Schedule Routes ===
        schedule::list_instances_rich,
        schedule::generate,
        schedule::bulk_count,
        schedule::bulk_delete,

        // === Operational Routes ===
        health::ping,
        health::liveness,
        health::readiness,
        crate::telemetry::metrics::metrics_handler,
    ),
    components(
        schemas(
            // === Error Types ===
            ApiError, ErrorCode,

            // === Instance Types ===
            CreateInstanceRequest, UpdateInstanceRequest, InstanceResponse,
            InstanceKind, InstanceStatus,

            // === Assignment Types ===
            CreateAssignmentRequest, UpsertAssignmentRequest, UpdateAssignmentRequest,
            AssignmentResponse, AssignmentRole,

            // === Participant Types ===
            AddParticipantRequest, UpdateParticipantRequest, ParticipantResponse,
            AttendanceStatus,

            // === Schedule Types ===
            GenerateRequest, GenerateResponse, BulkFiltersRequest, BulkCountResponse,
            BulkDeleteResponse, RichInstance, VolunteerRef,

            // === Health Types ===
            HealthReport, HealthStatus,
        )
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    /// Generate OpenAPI spec as JSON string.
    pub fn to_json() -> Result<String, serde_json::Error> {
        let openapi = Self::openapi();
        serde_json::to_string_pretty(&openapi)
    }
}
