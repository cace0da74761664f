//! Property-Based Tests for Series Generation and Bulk Operations
//!
//! - A generated series holds `floor(span / interval) + 1` sessions that
//!   alternate between group and workshop and each last two hours.
//! - For any scope, bulk count equals the number bulk delete removes.
//! - The rich listing shows the last volunteer written to each role slot.
//! - A participant appears at most once on an instance's roster.

use alma_api::services;
use alma_core::{
    AssignmentRole, BulkScope, EntityType, InstanceKind, NewAssignment, NewParticipant, RichQuery,
};
use alma_storage::CalendarStore;
use alma_test_utils::{assertions, fixtures, generators::*, MockStorage};
use std::collections::HashMap;
use chrono::TimeDelta;
use proptest::prelude::*;
use tokio::runtime::Runtime;

fn test_runtime() -> Result<Runtime, TestCaseError> {
    Runtime::new().map_err(|e| TestCaseError::fail(format!("Failed to create runtime: {}", e)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_generated_series_alternates(plan in arb_recurrence_plan()) {
        let rt = test_runtime()?;
        let storage = MockStorage::new();

        let created = rt
            .block_on(services::generate_series(&storage, &plan))
            .map_err(|e| TestCaseError::fail(format!("generate failed: {}", e)))?;

        prop_assert_eq!(created.len(), plan.session_count());
        prop_assert_eq!(storage.instance_count().unwrap(), created.len());

        let sources: Vec<_> = created.iter().map(|i| i.source).collect();
        assertions::assert_alternates(&sources, plan.first_kind, plan.group_id, plan.workshop_id);

        for pair in created.windows(2) {
            prop_assert_eq!((pair[1].date - pair[0].date).num_days(), plan.interval_days);
        }
        for instance in &created {
            prop_assert!(instance.date >= plan.start_date && instance.date <= plan.end_date);
            prop_assert_eq!(instance.start_time, plan.start_time);
            prop_assert_eq!(instance.end_time - instance.start_time, TimeDelta::hours(2));
        }
    }

    #[test]
    fn prop_bulk_count_equals_deleted(
        instances in prop::collection::vec(arb_new_instance(), 0..24),
        scope in arb_bulk_scope(),
    ) {
        let rt = test_runtime()?;
        let storage = MockStorage::new();

        let (counted, deleted) = rt.block_on(async {
            storage.instance_insert_batch(&instances).await?;
            let counted = services::bulk_count(&storage, &scope).await?;
            let deleted = services::bulk_delete(&storage, &scope).await?;
            Ok::<_, alma_api::ApiError>((counted, deleted))
        })
        .map_err(|e| TestCaseError::fail(format!("bulk failed: {}", e)))?;

        prop_assert_eq!(counted, deleted);
        let expected = instances
            .iter()
            .filter(|n| match scope {
                BulkScope::All => true,
                BulkScope::Kind { kind } => n.source.kind() == kind,
                BulkScope::Series { kind, source_id } => {
                    n.source.kind() == kind && n.source.source_id() == source_id
                }
                BulkScope::Month { year, month } => {
                    use chrono::Datelike;
                    n.date.year() == year && n.date.month() == month
                }
            })
            .count() as u64;
        prop_assert_eq!(deleted, expected);
        prop_assert_eq!(storage.instance_count().unwrap() as u64, instances.len() as u64 - deleted);
    }

    #[test]
    fn prop_activity_never_starts_a_series(plan in arb_recurrence_plan()) {
        let rt = test_runtime()?;
        let storage = MockStorage::new();
        let plan = alma_core::RecurrencePlan { first_kind: InstanceKind::Activity, ..plan };

        let result = rt.block_on(services::generate_series(&storage, &plan));
        prop_assert!(result.is_err());
        prop_assert_eq!(storage.instance_count().unwrap(), 0);
    }

    #[test]
    fn prop_rich_listing_shows_last_role_holder(
        writes in prop::collection::vec((arb_assignment_role(), 0usize..3), 1..16),
    ) {
        let rt = test_runtime()?;
        let storage = fixtures::seeded_storage()
            .map_err(|e| TestCaseError::fail(format!("seed failed: {}", e)))?;
        let volunteers = fixtures::volunteers();

        let rich = rt.block_on(async {
            let instance = storage
                .instance_insert(&fixtures::session(
                    InstanceKind::Group,
                    Some(4),
                    fixtures::date(2025, 3, 1),
                ))
                .await?;
            for (role, pick) in &writes {
                storage
                    .assignment_upsert_by_role(instance.id, *role, volunteers[*pick].id)
                    .await?;
            }
            let rich = services::list_rich(&storage, &RichQuery::for_year(2025)).await?;
            Ok::<_, alma_api::ApiError>(rich)
        })
        .map_err(|e| TestCaseError::fail(format!("upsert failed: {}", e)))?;

        let mut last = HashMap::new();
        for (role, pick) in &writes {
            last.insert(*role, volunteers[*pick].clone());
        }
        prop_assert_eq!(rich.len(), 1);
        prop_assert_eq!(&rich[0].coordinator, &last.get(&AssignmentRole::Coordinator).cloned());
        prop_assert_eq!(
            &rich[0].co_coordinator,
            &last.get(&AssignmentRole::CoCoordinator).cloned()
        );
        prop_assert_eq!(storage.assignment_count().unwrap(), last.len());
    }

    #[test]
    fn prop_roster_holds_participant_once(
        status in arb_attendance_status(),
        again in arb_attendance_status(),
        pick in 0usize..3,
    ) {
        let rt = test_runtime()?;
        let storage = fixtures::seeded_storage()
            .map_err(|e| TestCaseError::fail(format!("seed failed: {}", e)))?;
        let participant_id = fixtures::PARTICIPANT_IDS[pick];

        let instance = rt
            .block_on(storage.instance_insert(&fixtures::session(
                InstanceKind::Workshop,
                None,
                fixtures::date(2025, 3, 15),
            )))
            .map_err(|e| TestCaseError::fail(format!("insert failed: {}", e)))?;
        let entry = NewParticipant { event_id: instance.id, participant_id, status };

        let added = rt
            .block_on(storage.participant_add(&entry))
            .map_err(|e| TestCaseError::fail(format!("add failed: {}", e)))?;
        prop_assert_eq!(added.status, status);

        let duplicate = rt.block_on(storage.participant_add(&NewParticipant { status: again, ..entry }));
        assertions::assert_conflict(&duplicate);

        let stranger = rt.block_on(storage.participant_add(&NewParticipant {
            participant_id: 99,
            ..entry
        }));
        assertions::assert_missing_reference(&stranger, EntityType::Participant);
        prop_assert_eq!(storage.roster_count().unwrap(), 1);
    }

    #[test]
    fn prop_assigned_volunteer_cannot_be_removed(role in arb_assignment_role()) {
        let rt = test_runtime()?;
        let storage = fixtures::seeded_storage()
            .map_err(|e| TestCaseError::fail(format!("seed failed: {}", e)))?;

        let instance = rt
            .block_on(storage.instance_insert(&fixtures::session(
                InstanceKind::Activity,
                None,
                fixtures::date(2025, 4, 10),
            )))
            .map_err(|e| TestCaseError::fail(format!("insert failed: {}", e)))?;

        let unknown = rt.block_on(storage.assignment_insert(&NewAssignment {
            instance_id: instance.id,
            volunteer_id: 42,
            role,
        }));
        assertions::assert_missing_reference(&unknown, EntityType::Volunteer);

        rt.block_on(storage.assignment_insert(&NewAssignment {
            instance_id: instance.id,
            volunteer_id: 9,
            role,
        }))
        .map_err(|e| TestCaseError::fail(format!("assign failed: {}", e)))?;
        assertions::assert_conflict(&storage.volunteer_remove(9));
    }
}
