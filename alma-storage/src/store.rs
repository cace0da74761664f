//! Async storage traits for calendar data.
//!
//! `CalendarStore` owns instances, role assignments and rosters.
//! `VolunteerDirectory` is the read-only view onto volunteers owned elsewhere.
//! Both are implemented by the in-memory [`crate::MockStorage`] and by the
//! PostgreSQL client in `alma-api`.

use ::async_trait::async_trait;
use alma_core::{
    AlmaResult, AssignmentId, AssignmentRole, AssignmentUpdate, BulkScope, CalendarAssignment,
    CalendarEventParticipant, CalendarInstance, InstanceFilter, InstanceId, InstanceUpdate,
    NewAssignment, NewInstance, NewParticipant, Page, ParticipantUpdate, RosterEntryId,
    VolunteerId, VolunteerRef,
};
use std::collections::HashMap;

/// Persistence for the calendar aggregate.
///
/// Listings are ordered by `(date, start_time, id)`. Every mutation is atomic:
/// a failed call leaves no partial state behind.
#[async_trait]
pub trait CalendarStore: Send + Sync {
    // ========================================================================
    // INSTANCE OPERATIONS
    // ========================================================================

    /// List instances matching `filter`, optionally paginated.
    async fn instance_list(
        &self,
        filter: &InstanceFilter,
        page: Option<Page>,
    ) -> AlmaResult<Vec<CalendarInstance>>;

    /// Get an instance. `NotFound` if absent.
    async fn instance_get(&self, id: InstanceId) -> AlmaResult<CalendarInstance>;

    /// Insert one instance and return it with its assigned id.
    async fn instance_insert(&self, new: &NewInstance) -> AlmaResult<CalendarInstance>;

    /// Insert a whole series in one transaction, preserving input order.
    async fn instance_insert_batch(
        &self,
        batch: &[NewInstance],
    ) -> AlmaResult<Vec<CalendarInstance>>;

    /// Apply a partial update. `NotFound` if absent.
    async fn instance_update(
        &self,
        id: InstanceId,
        update: &InstanceUpdate,
    ) -> AlmaResult<CalendarInstance>;

    /// Delete an instance with its assignments and roster. `NotFound` if absent.
    async fn instance_delete(&self, id: InstanceId) -> AlmaResult<()>;

    /// Count instances selected by a bulk scope.
    async fn instance_count_matching(&self, scope: &BulkScope) -> AlmaResult<u64>;

    /// Delete every instance selected by a bulk scope in one set operation.
    /// Returns the number of instances removed.
    async fn instance_delete_matching(&self, scope: &BulkScope) -> AlmaResult<u64>;

    // ========================================================================
    // ASSIGNMENT OPERATIONS
    // ========================================================================

    /// Assignments of one instance, coordinator first.
    async fn assignment_list_for_instance(
        &self,
        instance_id: InstanceId,
    ) -> AlmaResult<Vec<CalendarAssignment>>;

    /// Assignments of many instances in one round-trip.
    async fn assignment_list_for_instances(
        &self,
        instance_ids: &[InstanceId],
    ) -> AlmaResult<Vec<CalendarAssignment>>;

    /// Create an assignment. `NotFound` for a missing instance, `Conflict` if
    /// the role slot is already filled.
    async fn assignment_insert(&self, new: &NewAssignment) -> AlmaResult<CalendarAssignment>;

    /// Put `volunteer_id` into the role slot of an instance. An existing row
    /// keeps its id and only changes volunteer.
    async fn assignment_upsert_by_role(
        &self,
        instance_id: InstanceId,
        role: AssignmentRole,
        volunteer_id: VolunteerId,
    ) -> AlmaResult<CalendarAssignment>;

    /// Change volunteer and/or role of an assignment.
    async fn assignment_update(
        &self,
        id: AssignmentId,
        update: &AssignmentUpdate,
    ) -> AlmaResult<CalendarAssignment>;

    /// Delete an assignment by its own id.
    async fn assignment_delete(&self, id: AssignmentId) -> AlmaResult<()>;

    /// Empty a role slot. `NotFound` if nobody holds it.
    async fn assignment_delete_by_role(
        &self,
        instance_id: InstanceId,
        role: AssignmentRole,
    ) -> AlmaResult<()>;

    // ========================================================================
    // ROSTER OPERATIONS
    // ========================================================================

    /// Roster of one instance in enrollment order.
    async fn participant_list_for_event(
        &self,
        event_id: InstanceId,
    ) -> AlmaResult<Vec<CalendarEventParticipant>>;

    /// Enroll a participant. `NotFound` for a missing instance, `Conflict` if
    /// already enrolled.
    async fn participant_add(&self, new: &NewParticipant) -> AlmaResult<CalendarEventParticipant>;

    /// Change attendance status of a roster entry.
    async fn participant_update(
        &self,
        id: RosterEntryId,
        update: &ParticipantUpdate,
    ) -> AlmaResult<CalendarEventParticipant>;

    /// Remove a roster entry.
    async fn participant_delete(&self, id: RosterEntryId) -> AlmaResult<()>;

    // ========================================================================
    // HEALTH
    // ========================================================================

    /// Cheap round-trip proving the backend answers.
    async fn health_check(&self) -> AlmaResult<()>;
}

/// Read-only access to the volunteer directory.
#[async_trait]
pub trait VolunteerDirectory: Send + Sync {
    /// Resolve many volunteers at once. Unknown ids are absent from the map.
    async fn volunteer_lookup(
        &self,
        ids: &[VolunteerId],
    ) -> AlmaResult<HashMap<VolunteerId, VolunteerRef>>;
}

/// Everything the calendar services need from a backend.
pub trait CalendarBackend: CalendarStore + VolunteerDirectory {}

impl<T: CalendarStore + VolunteerDirectory + ?Sized> CalendarBackend for T {}
