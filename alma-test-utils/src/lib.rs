//! ALMA Test Utilities
//!
//! Shared test infrastructure for the ALMA workspace:
//! - Proptest generators for calendar values and plans
//! - Fixtures for common scenarios, including a seeded `MockStorage`
//! - Assertions for the error taxonomy

// Re-export mock storage from its source crate
pub use alma_storage::MockStorage;

// Re-export core types for convenience
pub use alma_core::{
    AlmaError, AlmaResult, AssignmentRole, AttendanceStatus, BulkScope, CalendarInstance,
    CalendarSource, EntityType, InstanceKind, InstanceStatus, NewInstance, RecurrencePlan,
    SourceId, StorageError, VolunteerRef,
};

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for calendar values.

    use super::*;
    use chrono::{Days, NaiveDate, NaiveTime};
    use proptest::prelude::*;

    pub fn arb_instance_kind() -> impl Strategy<Value = InstanceKind> {
        prop_oneof![
            Just(InstanceKind::Group),
            Just(InstanceKind::Workshop),
            Just(InstanceKind::Activity),
        ]
    }

    /// Kinds a generated series may start with.
    pub fn arb_series_kind() -> impl Strategy<Value = InstanceKind> {
        prop_oneof![Just(InstanceKind::Group), Just(InstanceKind::Workshop)]
    }

    pub fn arb_instance_status() -> impl Strategy<Value = InstanceStatus> {
        prop_oneof![
            Just(InstanceStatus::Scheduled),
            Just(InstanceStatus::Held),
            Just(InstanceStatus::Cancelled),
        ]
    }

    pub fn arb_assignment_role() -> impl Strategy<Value = AssignmentRole> {
        prop_oneof![
            Just(AssignmentRole::Coordinator),
            Just(AssignmentRole::CoCoordinator),
        ]
    }

    pub fn arb_attendance_status() -> impl Strategy<Value = AttendanceStatus> {
        prop_oneof![
            Just(AttendanceStatus::Enrolled),
            Just(AttendanceStatus::Cancelled),
            Just(AttendanceStatus::Attended),
        ]
    }

    pub fn arb_source_id() -> impl Strategy<Value = Option<SourceId>> {
        proptest::option::of(1i64..6)
    }

    /// A date in 2024-2026.
    pub fn arb_date() -> impl Strategy<Value = NaiveDate> {
        (0u64..(3 * 365)).prop_map(|offset| {
            NaiveDate::from_ymd_opt(2024, 1, 1)
                .and_then(|d| d.checked_add_days(Days::new(offset)))
                .unwrap_or_default()
        })
    }

    /// A start time that leaves room for a full session before midnight.
    pub fn arb_start_time() -> impl Strategy<Value = NaiveTime> {
        (6u32..22, prop_oneof![Just(0u32), Just(15), Just(30), Just(45)])
            .prop_map(|(h, m)| NaiveTime::from_hms_opt(h, m, 0).unwrap_or_default())
    }

    pub fn arb_new_instance() -> impl Strategy<Value = NewInstance> {
        (
            arb_instance_kind(),
            arb_source_id(),
            arb_date(),
            arb_start_time(),
            arb_instance_status(),
        )
            .prop_map(|(kind, source_id, date, start_time, status)| NewInstance {
                source: CalendarSource::from_parts(kind, source_id),
                date,
                start_time,
                end_time: start_time + chrono::TimeDelta::hours(2),
                notes: None,
                status,
            })
    }

    /// A valid series plan spanning up to four months.
    pub fn arb_recurrence_plan() -> impl Strategy<Value = RecurrencePlan> {
        (
            arb_date(),
            0u64..120,
            1i64..31,
            arb_series_kind(),
            arb_start_time(),
            arb_source_id(),
            arb_source_id(),
        )
            .prop_map(|(start, span, interval, kind, time, group, workshop)| {
                let end = start.checked_add_days(Days::new(span)).unwrap_or(start);
                RecurrencePlan::new(start, end, kind)
                    .with_start_time(time)
                    .with_interval_days(interval)
                    .with_sources(group, workshop)
            })
    }

    pub fn arb_bulk_scope() -> impl Strategy<Value = BulkScope> {
        prop_oneof![
            (2024i32..2027, 1u32..13).prop_map(|(year, month)| BulkScope::Month { year, month }),
            arb_instance_kind().prop_map(|kind| BulkScope::Kind { kind }),
            (arb_instance_kind(), arb_source_id())
                .prop_map(|(kind, source_id)| BulkScope::Series { kind, source_id }),
            Just(BulkScope::All),
        ]
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built fixtures for common testing scenarios.

    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
    }

    /// A scheduled 10:00-12:00 session.
    pub fn session(kind: InstanceKind, source_id: Option<SourceId>, on: NaiveDate) -> NewInstance {
        NewInstance {
            source: CalendarSource::from_parts(kind, source_id),
            date: on,
            start_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap_or_default(),
            end_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default(),
            notes: None,
            status: InstanceStatus::Scheduled,
        }
    }

    /// Fortnightly March 2025 series starting with a group session.
    pub fn march_series_plan() -> RecurrencePlan {
        RecurrencePlan::new(date(2025, 3, 1), date(2025, 3, 29), InstanceKind::Group)
    }

    /// Volunteers known to [`seeded_storage`].
    pub fn volunteers() -> Vec<VolunteerRef> {
        vec![
            VolunteerRef::new(2, "Ana", Some("Paz".to_string())),
            VolunteerRef::new(5, "Marta", Some("Rios".to_string())),
            VolunteerRef::new(9, "Luis", None),
        ]
    }

    /// Participant ids known to [`seeded_storage`].
    pub const PARTICIPANT_IDS: [i64; 3] = [1, 2, 3];

    /// Empty calendar with the volunteer and participant directories filled.
    pub fn seeded_storage() -> AlmaResult<MockStorage> {
        let storage = MockStorage::new();
        for volunteer in volunteers() {
            storage.volunteer_register(volunteer)?;
        }
        for id in PARTICIPANT_IDS {
            storage.participant_register(id)?;
        }
        Ok(storage)
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions over the ALMA error taxonomy and generated series.

    use super::*;

    pub fn assert_not_found<T: std::fmt::Debug>(result: &AlmaResult<T>, entity_type: EntityType) {
        match result {
            Err(AlmaError::Storage(StorageError::NotFound { entity_type: e, .. })) => {
                assert_eq!(*e, entity_type, "NotFound for unexpected entity type");
            }
            other => panic!("Expected NotFound({entity_type}), got {other:?}"),
        }
    }

    pub fn assert_missing_reference<T: std::fmt::Debug>(
        result: &AlmaResult<T>,
        entity_type: EntityType,
    ) {
        match result {
            Err(AlmaError::Storage(StorageError::MissingReference { entity_type: e, .. })) => {
                assert_eq!(*e, entity_type, "MissingReference for unexpected entity type");
            }
            other => panic!("Expected MissingReference({entity_type}), got {other:?}"),
        }
    }

    pub fn assert_conflict<T: std::fmt::Debug>(result: &AlmaResult<T>) {
        assert!(
            matches!(result, Err(AlmaError::Storage(StorageError::Conflict { .. }))),
            "Expected Conflict, got {result:?}"
        );
    }

    /// Types alternate between group and workshop from `first`, and each
    /// source id matches the type-appropriate source.
    pub fn assert_alternates(
        sources: &[CalendarSource],
        first: InstanceKind,
        group_id: Option<SourceId>,
        workshop_id: Option<SourceId>,
    ) {
        let offset = if first == InstanceKind::Group { 0 } else { 1 };
        for (i, source) in sources.iter().enumerate() {
            let expected = match InstanceKind::ALTERNATION[(i + offset) % 2] {
                InstanceKind::Group => CalendarSource::Group(group_id),
                _ => CalendarSource::Workshop(workshop_id),
            };
            assert_eq!(*source, expected, "session {i} breaks the alternation");
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
