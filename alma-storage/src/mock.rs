//! In-memory calendar storage.
//!
//! All tables sit behind one `RwLock`, so every write (including cascades and
//! bulk deletes) is atomic with respect to readers.

use crate::{CalendarStore, VolunteerDirectory};
use ::async_trait::async_trait;
use alma_core::{
    now, AlmaResult, AssignmentId, AssignmentRole, AssignmentUpdate, BulkScope,
    CalendarAssignment, CalendarEventParticipant, CalendarInstance, EntityType, InstanceFilter,
    InstanceId, InstanceUpdate, NewAssignment, NewInstance, NewParticipant, Page, ParticipantId,
    ParticipantUpdate, RosterEntryId, StorageError, VolunteerId, VolunteerRef,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct Tables {
    instances: BTreeMap<InstanceId, CalendarInstance>,
    assignments: BTreeMap<AssignmentId, CalendarAssignment>,
    roster: BTreeMap<RosterEntryId, CalendarEventParticipant>,
    volunteers: HashMap<VolunteerId, VolunteerRef>,
    participants: HashSet<ParticipantId>,
    last_instance_id: InstanceId,
    last_assignment_id: AssignmentId,
    last_roster_id: RosterEntryId,
}

impl Tables {
    fn next_instance_id(&mut self) -> InstanceId {
        self.last_instance_id += 1;
        self.last_instance_id
    }

    fn next_assignment_id(&mut self) -> AssignmentId {
        self.last_assignment_id += 1;
        self.last_assignment_id
    }

    fn next_roster_id(&mut self) -> RosterEntryId {
        self.last_roster_id += 1;
        self.last_roster_id
    }

    fn require_instance(&self, id: InstanceId) -> Result<&CalendarInstance, StorageError> {
        self.instances
            .get(&id)
            .ok_or_else(|| StorageError::not_found(EntityType::Instance, id))
    }

    fn require_volunteer(&self, id: VolunteerId) -> Result<(), StorageError> {
        if self.volunteers.contains_key(&id) {
            Ok(())
        } else {
            Err(StorageError::missing_reference(
                EntityType::Volunteer,
                format!("volunteer {id} does not exist"),
            ))
        }
    }

    /// Id of the assignment currently holding a role slot.
    fn slot(&self, instance_id: InstanceId, role: AssignmentRole) -> Option<AssignmentId> {
        self.assignments
            .values()
            .find(|a| a.instance_id == instance_id && a.role == role)
            .map(|a| a.id)
    }

    fn slot_taken(instance_id: InstanceId, role: AssignmentRole) -> StorageError {
        StorageError::conflict(
            EntityType::Assignment,
            format!("instance {instance_id} already has a {role}"),
        )
    }

    /// Remove instances together with their assignments and roster rows.
    fn remove_instances(&mut self, ids: &HashSet<InstanceId>) -> u64 {
        let before = self.instances.len();
        self.instances.retain(|id, _| !ids.contains(id));
        self.assignments.retain(|_, a| !ids.contains(&a.instance_id));
        self.roster.retain(|_, p| !ids.contains(&p.event_id));
        (before - self.instances.len()) as u64
    }
}

// ============================================================================
// MOCK STORAGE
// ============================================================================

/// In-memory storage for tests and local runs.
#[derive(Debug, Clone, Default)]
pub struct MockStorage {
    tables: Arc<RwLock<Tables>>,
}

impl MockStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StorageError> {
        self.tables.read().map_err(|_| StorageError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StorageError> {
        self.tables.write().map_err(|_| StorageError::LockPoisoned)
    }

    /// Drop every row, keeping id counters.
    pub fn clear(&self) -> AlmaResult<()> {
        let mut t = self.write()?;
        t.instances.clear();
        t.assignments.clear();
        t.roster.clear();
        t.volunteers.clear();
        t.participants.clear();
        Ok(())
    }

    // === Directory fixtures ===

    /// Add or replace a volunteer in the directory.
    pub fn volunteer_register(&self, volunteer: VolunteerRef) -> AlmaResult<()> {
        self.write()?.volunteers.insert(volunteer.id, volunteer);
        Ok(())
    }

    /// Remove a volunteer. Refused while any assignment references them.
    pub fn volunteer_remove(&self, id: VolunteerId) -> AlmaResult<()> {
        let mut t = self.write()?;
        if !t.volunteers.contains_key(&id) {
            return Err(StorageError::not_found(EntityType::Volunteer, id).into());
        }
        if t.assignments.values().any(|a| a.volunteer_id == id) {
            return Err(StorageError::conflict(
                EntityType::Volunteer,
                format!("volunteer {id} still holds calendar roles"),
            )
            .into());
        }
        t.volunteers.remove(&id);
        Ok(())
    }

    /// Make a participant known to the store.
    pub fn participant_register(&self, id: ParticipantId) -> AlmaResult<()> {
        self.write()?.participants.insert(id);
        Ok(())
    }

    /// Remove a participant together with their roster entries.
    pub fn participant_remove(&self, id: ParticipantId) -> AlmaResult<()> {
        let mut t = self.write()?;
        if !t.participants.remove(&id) {
            return Err(StorageError::not_found(EntityType::Participant, id).into());
        }
        t.roster.retain(|_, p| p.participant_id != id);
        Ok(())
    }

    // === Counters ===

    pub fn instance_count(&self) -> AlmaResult<usize> {
        Ok(self.read()?.instances.len())
    }

    pub fn assignment_count(&self) -> AlmaResult<usize> {
        Ok(self.read()?.assignments.len())
    }

    pub fn roster_count(&self) -> AlmaResult<usize> {
        Ok(self.read()?.roster.len())
    }
}

#[async_trait]
impl CalendarStore for MockStorage {
    // === Instance Operations ===

    async fn instance_list(
        &self,
        filter: &InstanceFilter,
        page: Option<Page>,
    ) -> AlmaResult<Vec<CalendarInstance>> {
        let t = self.read()?;
        let mut rows: Vec<CalendarInstance> = t
            .instances
            .values()
            .filter(|i| filter.matches(i))
            .cloned()
            .collect();
        rows.sort_by_key(CalendarInstance::schedule_key);
        Ok(match page {
            Some(page) => rows
                .into_iter()
                .skip(page.skip as usize)
                .take(page.limit as usize)
                .collect(),
            None => rows,
        })
    }

    async fn instance_get(&self, id: InstanceId) -> AlmaResult<CalendarInstance> {
        Ok(self.read()?.require_instance(id)?.clone())
    }

    async fn instance_insert(&self, new: &NewInstance) -> AlmaResult<CalendarInstance> {
        let mut t = self.write()?;
        let id = t.next_instance_id();
        let instance = new.clone().into_instance(id, now());
        t.instances.insert(id, instance.clone());
        Ok(instance)
    }

    async fn instance_insert_batch(
        &self,
        batch: &[NewInstance],
    ) -> AlmaResult<Vec<CalendarInstance>> {
        let mut t = self.write()?;
        let at = now();
        let mut created = Vec::with_capacity(batch.len());
        for new in batch {
            let id = t.next_instance_id();
            let instance = new.clone().into_instance(id, at);
            t.instances.insert(id, instance.clone());
            created.push(instance);
        }
        Ok(created)
    }

    async fn instance_update(
        &self,
        id: InstanceId,
        update: &InstanceUpdate,
    ) -> AlmaResult<CalendarInstance> {
        let mut t = self.write()?;
        let instance = t
            .instances
            .get_mut(&id)
            .ok_or_else(|| StorageError::not_found(EntityType::Instance, id))?;
        update.apply(instance, now());
        Ok(instance.clone())
    }

    async fn instance_delete(&self, id: InstanceId) -> AlmaResult<()> {
        let mut t = self.write()?;
        t.require_instance(id)?;
        t.remove_instances(&HashSet::from([id]));
        Ok(())
    }

    async fn instance_count_matching(&self, scope: &BulkScope) -> AlmaResult<u64> {
        let t = self.read()?;
        Ok(t.instances.values().filter(|i| scope.matches(i)).count() as u64)
    }

    async fn instance_delete_matching(&self, scope: &BulkScope) -> AlmaResult<u64> {
        let mut t = self.write()?;
        let doomed: HashSet<InstanceId> = t
            .instances
            .values()
            .filter(|i| scope.matches(i))
            .map(|i| i.id)
            .collect();
        Ok(t.remove_instances(&doomed))
    }

    // === Assignment Operations ===

    async fn assignment_list_for_instance(
        &self,
        instance_id: InstanceId,
    ) -> AlmaResult<Vec<CalendarAssignment>> {
        self.assignment_list_for_instances(&[instance_id]).await
    }

    async fn assignment_list_for_instances(
        &self,
        instance_ids: &[InstanceId],
    ) -> AlmaResult<Vec<CalendarAssignment>> {
        let t = self.read()?;
        let wanted: HashSet<&InstanceId> = instance_ids.iter().collect();
        let mut rows: Vec<CalendarAssignment> = t
            .assignments
            .values()
            .filter(|a| wanted.contains(&a.instance_id))
            .cloned()
            .collect();
        rows.sort_by_key(|a| (a.instance_id, a.role != AssignmentRole::Coordinator, a.id));
        Ok(rows)
    }

    async fn assignment_insert(&self, new: &NewAssignment) -> AlmaResult<CalendarAssignment> {
        let mut t = self.write()?;
        t.require_instance(new.instance_id)?;
        t.require_volunteer(new.volunteer_id)?;
        if t.slot(new.instance_id, new.role).is_some() {
            return Err(Tables::slot_taken(new.instance_id, new.role).into());
        }
        let id = t.next_assignment_id();
        let at = now();
        let assignment = CalendarAssignment {
            id,
            instance_id: new.instance_id,
            volunteer_id: new.volunteer_id,
            role: new.role,
            created_at: at,
            updated_at: at,
        };
        t.assignments.insert(id, assignment.clone());
        Ok(assignment)
    }

    async fn assignment_upsert_by_role(
        &self,
        instance_id: InstanceId,
        role: AssignmentRole,
        volunteer_id: VolunteerId,
    ) -> AlmaResult<CalendarAssignment> {
        let mut t = self.write()?;
        t.require_instance(instance_id)?;
        t.require_volunteer(volunteer_id)?;
        let at = now();

        if let Some(existing) = t.slot(instance_id, role) {
            let assignment = t
                .assignments
                .get_mut(&existing)
                .ok_or_else(|| StorageError::not_found(EntityType::Assignment, existing))?;
            assignment.volunteer_id = volunteer_id;
            assignment.updated_at = at;
            return Ok(assignment.clone());
        }

        let id = t.next_assignment_id();
        let assignment = CalendarAssignment {
            id,
            instance_id,
            volunteer_id,
            role,
            created_at: at,
            updated_at: at,
        };
        t.assignments.insert(id, assignment.clone());
        Ok(assignment)
    }

    async fn assignment_update(
        &self,
        id: AssignmentId,
        update: &AssignmentUpdate,
    ) -> AlmaResult<CalendarAssignment> {
        let mut t = self.write()?;
        let current = t
            .assignments
            .get(&id)
            .cloned()
            .ok_or_else(|| StorageError::not_found(EntityType::Assignment, id))?;
        if let Some(volunteer_id) = update.volunteer_id {
            t.require_volunteer(volunteer_id)?;
        }
        if let Some(role) = update.role {
            if matches!(t.slot(current.instance_id, role), Some(holder) if holder != id) {
                return Err(Tables::slot_taken(current.instance_id, role).into());
            }
        }
        let assignment = t
            .assignments
            .get_mut(&id)
            .ok_or_else(|| StorageError::not_found(EntityType::Assignment, id))?;
        update.apply(assignment, now());
        Ok(assignment.clone())
    }

    async fn assignment_delete(&self, id: AssignmentId) -> AlmaResult<()> {
        self.write()?
            .assignments
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StorageError::not_found(EntityType::Assignment, id).into())
    }

    async fn assignment_delete_by_role(
        &self,
        instance_id: InstanceId,
        role: AssignmentRole,
    ) -> AlmaResult<()> {
        let mut t = self.write()?;
        let id = t.slot(instance_id, role).ok_or_else(|| {
            StorageError::missing_reference(
                EntityType::Assignment,
                format!("instance {instance_id} has no {role}"),
            )
        })?;
        t.assignments.remove(&id);
        Ok(())
    }

    // === Roster Operations ===

    async fn participant_list_for_event(
        &self,
        event_id: InstanceId,
    ) -> AlmaResult<Vec<CalendarEventParticipant>> {
        let t = self.read()?;
        Ok(t.roster
            .values()
            .filter(|p| p.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn participant_add(&self, new: &NewParticipant) -> AlmaResult<CalendarEventParticipant> {
        let mut t = self.write()?;
        t.require_instance(new.event_id)?;
        if !t.participants.contains(&new.participant_id) {
            return Err(StorageError::missing_reference(
                EntityType::Participant,
                format!("participant {} does not exist", new.participant_id),
            )
            .into());
        }
        if t.roster
            .values()
            .any(|p| p.event_id == new.event_id && p.participant_id == new.participant_id)
        {
            return Err(StorageError::conflict(
                EntityType::RosterEntry,
                format!(
                    "participant {} is already on instance {}",
                    new.participant_id, new.event_id
                ),
            )
            .into());
        }
        let id = t.next_roster_id();
        let at = now();
        let entry = CalendarEventParticipant {
            id,
            event_id: new.event_id,
            participant_id: new.participant_id,
            status: new.status,
            created_at: at,
            updated_at: at,
        };
        t.roster.insert(id, entry.clone());
        Ok(entry)
    }

    async fn participant_update(
        &self,
        id: RosterEntryId,
        update: &ParticipantUpdate,
    ) -> AlmaResult<CalendarEventParticipant> {
        let mut t = self.write()?;
        let entry = t
            .roster
            .get_mut(&id)
            .ok_or_else(|| StorageError::not_found(EntityType::RosterEntry, id))?;
        if let Some(status) = update.status {
            entry.status = status;
        }
        entry.updated_at = now();
        Ok(entry.clone())
    }

    async fn participant_delete(&self, id: RosterEntryId) -> AlmaResult<()> {
        self.write()?
            .roster
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StorageError::not_found(EntityType::RosterEntry, id).into())
    }

    async fn health_check(&self) -> AlmaResult<()> {
        let _tables = self.read()?;
        Ok(())
    }
}

#[async_trait]
impl VolunteerDirectory for MockStorage {
    async fn volunteer_lookup(
        &self,
        ids: &[VolunteerId],
    ) -> AlmaResult<HashMap<VolunteerId, VolunteerRef>> {
        let t = self.read()?;
        Ok(ids
            .iter()
            .filter_map(|id| t.volunteers.get(id).map(|v| (*id, v.clone())))
            .collect())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use alma_core::{
        AlmaError, AttendanceStatus, CalendarSource, InstanceKind, InstanceStatus,
    };
    use chrono::{NaiveDate, NaiveTime};

    fn make_test_new_instance(source: CalendarSource, y: i32, m: u32, d: u32) -> NewInstance {
        NewInstance {
            source,
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            start_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            notes: None,
            status: InstanceStatus::Scheduled,
        }
    }

    fn make_test_storage() -> MockStorage {
        let storage = MockStorage::new();
        for (id, name) in [(2, "Ana"), (9, "Luis")] {
            storage
                .volunteer_register(VolunteerRef::new(id, name, None))
                .unwrap();
        }
        storage.participant_register(100).unwrap();
        storage
    }

    fn is_not_found(err: &AlmaError) -> bool {
        matches!(err, AlmaError::Storage(StorageError::NotFound { .. }))
    }

    fn is_conflict(err: &AlmaError) -> bool {
        matches!(err, AlmaError::Storage(StorageError::Conflict { .. }))
    }

    #[tokio::test]
    async fn test_instance_insert_get() {
        let storage = make_test_storage();
        let created = storage
            .instance_insert(&make_test_new_instance(CalendarSource::Group(Some(1)), 2025, 3, 1))
            .await
            .unwrap();
        let fetched = storage.instance_get(created.id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.status, InstanceStatus::Scheduled);
    }

    #[tokio::test]
    async fn test_instance_get_missing() {
        let storage = make_test_storage();
        let err = storage.instance_get(77).await.unwrap_err();
        assert!(is_not_found(&err));
    }

    #[tokio::test]
    async fn test_instance_list_ordering_and_paging() {
        let storage = make_test_storage();
        let mut late = make_test_new_instance(CalendarSource::Group(None), 2025, 3, 1);
        late.start_time = NaiveTime::from_hms_opt(16, 0, 0).unwrap();
        let a = storage.instance_insert(&late).await.unwrap();
        let b = storage
            .instance_insert(&make_test_new_instance(CalendarSource::Group(None), 2025, 3, 1))
            .await
            .unwrap();
        let c = storage
            .instance_insert(&make_test_new_instance(CalendarSource::Group(None), 2025, 2, 1))
            .await
            .unwrap();

        let all = storage
            .instance_list(&InstanceFilter::default(), None)
            .await
            .unwrap();
        let ids: Vec<_> = all.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![c.id, b.id, a.id]);

        let page = storage
            .instance_list(&InstanceFilter::default(), Some(Page::new(1, 1)))
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, b.id);
    }

    #[tokio::test]
    async fn test_instance_update_partial() {
        let storage = make_test_storage();
        let created = storage
            .instance_insert(&make_test_new_instance(CalendarSource::Workshop(Some(7)), 2025, 3, 1))
            .await
            .unwrap();
        let updated = storage
            .instance_update(
                created.id,
                &InstanceUpdate {
                    kind: Some(InstanceKind::Group),
                    notes: Some(Some("moved".to_string())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.source, CalendarSource::Group(Some(7)));
        assert_eq!(updated.notes.as_deref(), Some("moved"));
        assert_eq!(updated.date, created.date);

        let err = storage
            .instance_update(999, &InstanceUpdate::default())
            .await
            .unwrap_err();
        assert!(is_not_found(&err));
    }

    #[tokio::test]
    async fn test_instance_delete_cascades() {
        let storage = make_test_storage();
        let keep = storage
            .instance_insert(&make_test_new_instance(CalendarSource::Group(None), 2025, 3, 1))
            .await
            .unwrap();
        let doomed = storage
            .instance_insert(&make_test_new_instance(CalendarSource::Group(None), 2025, 3, 2))
            .await
            .unwrap();
        for id in [keep.id, doomed.id] {
            storage
                .assignment_upsert_by_role(id, AssignmentRole::Coordinator, 2)
                .await
                .unwrap();
            storage
                .participant_add(&NewParticipant {
                    event_id: id,
                    participant_id: 100,
                    status: AttendanceStatus::Enrolled,
                })
                .await
                .unwrap();
        }

        storage.instance_delete(doomed.id).await.unwrap();

        assert_eq!(storage.instance_count().unwrap(), 1);
        assert!(storage
            .assignment_list_for_instance(doomed.id)
            .await
            .unwrap()
            .is_empty());
        assert!(storage
            .participant_list_for_event(doomed.id)
            .await
            .unwrap()
            .is_empty());
        assert_eq!(storage.assignment_count().unwrap(), 1);
        assert_eq!(storage.roster_count().unwrap(), 1);

        let err = storage.instance_delete(doomed.id).await.unwrap_err();
        assert!(is_not_found(&err));
    }

    #[tokio::test]
    async fn test_upsert_by_role_replaces_in_place() {
        let storage = make_test_storage();
        let instance = storage
            .instance_insert(&make_test_new_instance(CalendarSource::Group(None), 2025, 3, 1))
            .await
            .unwrap();

        let first = storage
            .assignment_upsert_by_role(instance.id, AssignmentRole::Coordinator, 2)
            .await
            .unwrap();
        let second = storage
            .assignment_upsert_by_role(instance.id, AssignmentRole::Coordinator, 9)
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.volunteer_id, 9);
        let rows = storage
            .assignment_list_for_instance(instance.id)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].volunteer_id, 9);
    }

    #[tokio::test]
    async fn test_upsert_requires_instance_and_volunteer() {
        let storage = make_test_storage();
        let err = storage
            .assignment_upsert_by_role(5, AssignmentRole::Coordinator, 2)
            .await
            .unwrap_err();
        assert!(is_not_found(&err));

        let instance = storage
            .instance_insert(&make_test_new_instance(CalendarSource::Group(None), 2025, 3, 1))
            .await
            .unwrap();
        let err = storage
            .assignment_upsert_by_role(instance.id, AssignmentRole::Coordinator, 404)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AlmaError::Storage(StorageError::MissingReference { .. })
        ));
    }

    #[tokio::test]
    async fn test_assignment_insert_conflict_on_taken_slot() {
        let storage = make_test_storage();
        let instance = storage
            .instance_insert(&make_test_new_instance(CalendarSource::Group(None), 2025, 3, 1))
            .await
            .unwrap();
        let new = NewAssignment {
            instance_id: instance.id,
            volunteer_id: 2,
            role: AssignmentRole::Coordinator,
        };
        storage.assignment_insert(&new).await.unwrap();
        let err = storage
            .assignment_insert(&NewAssignment {
                volunteer_id: 9,
                ..new
            })
            .await
            .unwrap_err();
        assert!(is_conflict(&err));
    }

    #[tokio::test]
    async fn test_assignment_update_role_conflict() {
        let storage = make_test_storage();
        let instance = storage
            .instance_insert(&make_test_new_instance(CalendarSource::Group(None), 2025, 3, 1))
            .await
            .unwrap();
        storage
            .assignment_upsert_by_role(instance.id, AssignmentRole::Coordinator, 2)
            .await
            .unwrap();
        let co = storage
            .assignment_upsert_by_role(instance.id, AssignmentRole::CoCoordinator, 9)
            .await
            .unwrap();

        let err = storage
            .assignment_update(
                co.id,
                &AssignmentUpdate {
                    role: Some(AssignmentRole::Coordinator),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(is_conflict(&err));

        // Keeping its own role is not a conflict.
        let same = storage
            .assignment_update(
                co.id,
                &AssignmentUpdate {
                    volunteer_id: Some(2),
                    role: Some(AssignmentRole::CoCoordinator),
                },
            )
            .await
            .unwrap();
        assert_eq!(same.volunteer_id, 2);
    }

    #[tokio::test]
    async fn test_delete_by_role() {
        let storage = make_test_storage();
        let instance = storage
            .instance_insert(&make_test_new_instance(CalendarSource::Group(None), 2025, 3, 1))
            .await
            .unwrap();
        storage
            .assignment_upsert_by_role(instance.id, AssignmentRole::CoCoordinator, 9)
            .await
            .unwrap();

        storage
            .assignment_delete_by_role(instance.id, AssignmentRole::CoCoordinator)
            .await
            .unwrap();
        assert_eq!(storage.assignment_count().unwrap(), 0);

        let err = storage
            .assignment_delete_by_role(instance.id, AssignmentRole::CoCoordinator)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AlmaError::Storage(StorageError::MissingReference { .. })
        ));
    }

    #[tokio::test]
    async fn test_series_scope_leaves_null_source() {
        let storage = make_test_storage();
        storage
            .instance_insert_batch(&[
                make_test_new_instance(CalendarSource::Workshop(Some(7)), 2025, 3, 1),
                make_test_new_instance(CalendarSource::Workshop(Some(7)), 2025, 3, 15),
                make_test_new_instance(CalendarSource::Workshop(None), 2025, 3, 8),
                make_test_new_instance(CalendarSource::Group(Some(7)), 2025, 3, 8),
            ])
            .await
            .unwrap();
        let scope = BulkScope::Series {
            kind: InstanceKind::Workshop,
            source_id: Some(7),
        };

        let counted = storage.instance_count_matching(&scope).await.unwrap();
        let deleted = storage.instance_delete_matching(&scope).await.unwrap();
        assert_eq!(counted, 2);
        assert_eq!(deleted, counted);

        let left = storage
            .instance_list(&InstanceFilter::default(), None)
            .await
            .unwrap();
        let sources: Vec<_> = left.iter().map(|i| i.source).collect();
        assert_eq!(
            sources,
            vec![CalendarSource::Workshop(None), CalendarSource::Group(Some(7))]
        );
    }

    #[tokio::test]
    async fn test_roster_duplicate_and_missing_instance() {
        let storage = make_test_storage();
        let instance = storage
            .instance_insert(&make_test_new_instance(CalendarSource::Activity(None), 2025, 3, 1))
            .await
            .unwrap();
        let new = NewParticipant {
            event_id: instance.id,
            participant_id: 100,
            status: AttendanceStatus::default(),
        };
        let entry = storage.participant_add(&new).await.unwrap();
        assert_eq!(entry.status, AttendanceStatus::Enrolled);

        let err = storage.participant_add(&new).await.unwrap_err();
        assert!(is_conflict(&err));

        let err = storage
            .participant_add(&NewParticipant {
                event_id: 999,
                ..new
            })
            .await
            .unwrap_err();
        assert!(is_not_found(&err));

        let updated = storage
            .participant_update(
                entry.id,
                &ParticipantUpdate {
                    status: Some(AttendanceStatus::Attended),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, AttendanceStatus::Attended);

        storage.participant_delete(entry.id).await.unwrap();
        let err = storage.participant_delete(entry.id).await.unwrap_err();
        assert!(is_not_found(&err));
    }

    #[tokio::test]
    async fn test_participant_remove_cascades_roster() {
        let storage = make_test_storage();
        let instance = storage
            .instance_insert(&make_test_new_instance(CalendarSource::Activity(None), 2025, 3, 1))
            .await
            .unwrap();
        storage
            .participant_add(&NewParticipant {
                event_id: instance.id,
                participant_id: 100,
                status: AttendanceStatus::Enrolled,
            })
            .await
            .unwrap();
        storage.participant_remove(100).unwrap();
        assert_eq!(storage.roster_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_volunteer_remove_restricted_while_assigned() {
        let storage = make_test_storage();
        let instance = storage
            .instance_insert(&make_test_new_instance(CalendarSource::Group(None), 2025, 3, 1))
            .await
            .unwrap();
        storage
            .assignment_upsert_by_role(instance.id, AssignmentRole::Coordinator, 2)
            .await
            .unwrap();

        let err = storage.volunteer_remove(2).unwrap_err();
        assert!(is_conflict(&err));
        storage.volunteer_remove(9).unwrap();

        let found = storage.volunteer_lookup(&[2, 9]).await.unwrap();
        assert!(found.contains_key(&2));
        assert!(!found.contains_key(&9));
    }

    #[tokio::test]
    async fn test_health_check_reports_poisoned_tables() {
        let storage = make_test_storage();
        storage.health_check().await.unwrap();

        let tables = storage.tables.clone();
        let _ = std::thread::spawn(move || {
            let _guard = tables.write().unwrap();
            panic!("poison the calendar tables");
        })
        .join();

        let err = storage.health_check().await.unwrap_err();
        assert!(matches!(err, AlmaError::Storage(StorageError::LockPoisoned)));
    }
}
