//! Calendar Service
//!
//! Operations that compose several storage calls: series generation, bulk
//! count/delete over a scope, and the rich read model.

use std::collections::BTreeSet;

use alma_core::{
    compose_rich, BulkScope, CalendarInstance, RecurrencePlan, RichInstance, RichQuery,
    VolunteerId,
};
use alma_storage::{CalendarStore, VolunteerDirectory};

use crate::error::ApiResult;
use crate::telemetry::metrics::with_metrics;

/// Expand a recurrence plan and persist the whole series in one batch.
///
/// Validation happens before any write, so a rejected plan persists nothing.
/// An empty date range yields an empty series.
pub async fn generate_series<S>(store: &S, plan: &RecurrencePlan) -> ApiResult<Vec<CalendarInstance>>
where
    S: CalendarStore + ?Sized,
{
    let batch = plan.expand()?;
    if batch.is_empty() {
        tracing::info!(
            start_date = %plan.start_date,
            end_date = %plan.end_date,
            "Series range is empty, nothing generated"
        );
        return Ok(Vec::new());
    }

    let created = store.instance_insert_batch(&batch).await?;

    with_metrics(|m| {
        for kind in alma_core::InstanceKind::ALTERNATION {
            let n = created.iter().filter(|i| i.kind() == kind).count();
            if n > 0 {
                m.record_generated(kind.as_db_str(), n);
            }
        }
    });
    tracing::info!(
        created = created.len(),
        start_date = %plan.start_date,
        end_date = %plan.end_date,
        first_type = %plan.first_kind,
        interval_days = plan.interval_days,
        "Generated calendar series"
    );
    Ok(created)
}

/// Render freshly generated instances for the response body.
pub fn rich_from_created(created: &[CalendarInstance]) -> Vec<RichInstance> {
    let mut rich: Vec<_> = created.iter().map(RichInstance::bare).collect();
    rich.sort_by(|a, b| (&a.date, &a.start_time, a.id).cmp(&(&b.date, &b.start_time, b.id)));
    rich
}

/// Number of instances a bulk delete over `scope` would remove.
pub async fn bulk_count<S>(store: &S, scope: &BulkScope) -> ApiResult<u64>
where
    S: CalendarStore + ?Sized,
{
    let count = store.instance_count_matching(scope).await?;
    tracing::debug!(scope = %scope, count, "Bulk count");
    Ok(count)
}

/// Delete every instance matching `scope`, children included.
pub async fn bulk_delete<S>(store: &S, scope: &BulkScope) -> ApiResult<u64>
where
    S: CalendarStore + ?Sized,
{
    let deleted = store.instance_delete_matching(scope).await?;
    with_metrics(|m| m.record_bulk_delete(scope.name(), deleted));
    tracing::info!(scope = %scope, deleted, "Bulk deleted calendar instances");
    Ok(deleted)
}

/// Instances in the requested period with their role holders embedded.
///
/// One instance query, one batched assignment query and one directory lookup.
pub async fn list_rich<S>(store: &S, query: &RichQuery) -> ApiResult<Vec<RichInstance>>
where
    S: CalendarStore + VolunteerDirectory + ?Sized,
{
    let filter = query.instance_filter()?;
    let instances = store.instance_list(&filter, None).await?;
    if instances.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<_> = instances.iter().map(|i| i.id).collect();
    let assignments = store.assignment_list_for_instances(&ids).await?;

    let volunteer_ids: Vec<VolunteerId> = assignments
        .iter()
        .map(|a| a.volunteer_id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let volunteers = store.volunteer_lookup(&volunteer_ids).await?;

    Ok(compose_rich(
        instances,
        &assignments,
        &volunteers,
        query.volunteer_id,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use alma_core::{AssignmentRole, CalendarSource, InstanceKind, VolunteerRef};
    use alma_storage::MockStorage;
    use chrono::{NaiveDate, NaiveTime};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_generate_march_series() {
        let storage = MockStorage::new();
        let plan = RecurrencePlan::new(date(2025, 3, 1), date(2025, 3, 29), InstanceKind::Group)
            .with_sources(Some(4), Some(7));

        let created = generate_series(&storage, &plan).await.unwrap();
        let got: Vec<_> = created.iter().map(|i| (i.date, i.source)).collect();
        assert_eq!(
            got,
            vec![
                (date(2025, 3, 1), CalendarSource::Group(Some(4))),
                (date(2025, 3, 15), CalendarSource::Workshop(Some(7))),
                (date(2025, 3, 29), CalendarSource::Group(Some(4))),
            ]
        );
        assert!(created
            .iter()
            .all(|i| i.end_time == NaiveTime::from_hms_opt(12, 0, 0).unwrap()));

        let rich = rich_from_created(&created);
        assert_eq!(rich.len(), 3);
        assert!(rich.iter().all(|r| r.coordinator.is_none() && r.co_coordinator.is_none()));
    }

    #[tokio::test]
    async fn test_generate_rejects_before_writing() {
        let storage = MockStorage::new();
        let plan = RecurrencePlan::new(date(2025, 3, 1), date(2025, 3, 29), InstanceKind::Group)
            .with_interval_days(0);
        let err = generate_series(&storage, &plan).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRange);
        assert_eq!(storage.instance_count().unwrap(), 0);

        let plan =
            RecurrencePlan::new(date(2025, 3, 1), date(2025, 3, 29), InstanceKind::Activity);
        assert!(generate_series(&storage, &plan).await.is_err());
        assert_eq!(storage.instance_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_generate_empty_range() {
        let storage = MockStorage::new();
        let plan = RecurrencePlan::new(date(2025, 4, 1), date(2025, 3, 1), InstanceKind::Workshop);
        assert!(generate_series(&storage, &plan).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bulk_count_then_delete_agree() {
        let storage = MockStorage::new();
        let plan = RecurrencePlan::new(date(2025, 1, 1), date(2025, 12, 31), InstanceKind::Group)
            .with_sources(Some(1), Some(2));
        generate_series(&storage, &plan).await.unwrap();

        let scope = BulkScope::Month { year: 2025, month: 3 };
        let counted = bulk_count(&storage, &scope).await.unwrap();
        assert!(counted > 0);
        assert_eq!(bulk_delete(&storage, &scope).await.unwrap(), counted);
        assert_eq!(bulk_count(&storage, &scope).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_rich_embeds_and_filters_by_volunteer() {
        let storage = MockStorage::new();
        storage
            .volunteer_register(VolunteerRef::new(2, "Ana", Some("Paz".to_string())))
            .unwrap();
        storage.volunteer_register(VolunteerRef::new(9, "Luis", None)).unwrap();

        let plan = RecurrencePlan::new(date(2025, 3, 1), date(2025, 3, 29), InstanceKind::Group);
        let created = generate_series(&storage, &plan).await.unwrap();
        storage
            .assignment_upsert_by_role(created[1].id, AssignmentRole::Coordinator, 2)
            .await
            .unwrap();
        storage
            .assignment_upsert_by_role(created[2].id, AssignmentRole::CoCoordinator, 9)
            .await
            .unwrap();

        let all = list_rich(&storage, &RichQuery::for_year(2025)).await.unwrap();
        assert_eq!(all.len(), 3);
        assert!(all[0].coordinator.is_none());
        assert_eq!(all[1].coordinator.as_ref().map(|v| v.name.as_str()), Some("Ana"));
        assert_eq!(all[2].co_coordinator.as_ref().map(|v| v.last_name.as_str()), Some(""));

        let mine = list_rich(
            &storage,
            &RichQuery {
                volunteer_id: Some(9),
                ..RichQuery::for_year(2025)
            },
        )
        .await
        .unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, created[2].id);

        let other_year = list_rich(&storage, &RichQuery::for_year(2024)).await.unwrap();
        assert!(other_year.is_empty());
    }
}
