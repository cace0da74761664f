//! Denormalized instance listing with embedded role holders

use crate::{
    bulk::{month_range, year_range},
    time_fmt::ClockText,
    AssignmentRole, CalendarAssignment, CalendarInstance, InstanceFilter, InstanceId,
    InstanceKind, InstanceStatus, SourceId, ValidationError, VolunteerId, VolunteerRef,
};
use chrono::Days;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Period and criteria for a rich listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RichQuery {
    pub year: i32,
    pub month: Option<u32>,
    pub kind: Option<InstanceKind>,
    pub volunteer_id: Option<VolunteerId>,
}

impl RichQuery {
    pub fn for_year(year: i32) -> Self {
        Self {
            year,
            month: None,
            kind: None,
            volunteer_id: None,
        }
    }

    /// Instance filter covering the requested year or month.
    pub fn instance_filter(&self) -> Result<InstanceFilter, ValidationError> {
        let (from, to) = match self.month {
            Some(month) if !(1..=12).contains(&month) => {
                return Err(ValidationError::out_of_range(
                    "month",
                    format!("must be between 1 and 12, got {month}"),
                ));
            }
            Some(month) => {
                let (first, next) = month_range(self.year, month)?;
                let last = next
                    .checked_sub_days(Days::new(1))
                    .ok_or_else(|| ValidationError::out_of_range("month", "no last day"))?;
                (first, last)
            }
            None => year_range(self.year)?,
        };
        Ok(InstanceFilter::between(from, to).with_kind(self.kind))
    }
}

/// An instance as calendar views consume it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RichInstance {
    pub id: InstanceId,
    #[serde(rename = "type")]
    pub kind: InstanceKind,
    pub source_id: Option<SourceId>,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM:SS`
    pub start_time: String,
    /// `HH:MM:SS`
    pub end_time: String,
    pub notes: Option<String>,
    pub status: InstanceStatus,
    pub coordinator: Option<VolunteerRef>,
    pub co_coordinator: Option<VolunteerRef>,
}

impl RichInstance {
    /// Instance with no role holders, as right after generation.
    pub fn bare(instance: &CalendarInstance) -> Self {
        Self {
            id: instance.id,
            kind: instance.kind(),
            source_id: instance.source_id(),
            date: instance.date.format("%Y-%m-%d").to_string(),
            start_time: instance.start_time.clock_text(),
            end_time: instance.end_time.clock_text(),
            notes: instance.notes.clone(),
            status: instance.status,
            coordinator: None,
            co_coordinator: None,
        }
    }
}

/// Join instances with their assignments and the volunteer directory.
///
/// Output keeps the `(date, start_time, id)` order. A role whose volunteer the
/// directory does not know renders as `None`. With `volunteer_id` set, only
/// instances where that volunteer holds either role are kept.
pub fn compose_rich(
    mut instances: Vec<CalendarInstance>,
    assignments: &[CalendarAssignment],
    volunteers: &HashMap<VolunteerId, VolunteerRef>,
    volunteer_id: Option<VolunteerId>,
) -> Vec<RichInstance> {
    let mut holders: HashMap<(InstanceId, AssignmentRole), VolunteerId> = HashMap::new();
    for a in assignments {
        holders.insert((a.instance_id, a.role), a.volunteer_id);
    }

    instances.sort_by_key(CalendarInstance::schedule_key);
    instances
        .iter()
        .filter(|instance| match volunteer_id {
            Some(vid) => AssignmentRole::ALL
                .iter()
                .any(|role| holders.get(&(instance.id, *role)) == Some(&vid)),
            None => true,
        })
        .map(|instance| {
            let lookup = |role| {
                holders
                    .get(&(instance.id, role))
                    .and_then(|vid| volunteers.get(vid))
                    .cloned()
            };
            RichInstance {
                coordinator: lookup(AssignmentRole::Coordinator),
                co_coordinator: lookup(AssignmentRole::CoCoordinator),
                ..RichInstance::bare(instance)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CalendarSource, NewInstance};
    use chrono::{NaiveDate, NaiveTime, Utc};

    fn make_test_instance(id: InstanceId, day: u32, hour: u32) -> CalendarInstance {
        NewInstance {
            source: CalendarSource::Group(Some(1)),
            date: NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
            start_time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(hour + 2, 0, 0).unwrap(),
            notes: None,
            status: InstanceStatus::Scheduled,
        }
        .into_instance(id, Utc::now())
    }

    fn make_test_assignment(id: i64, instance_id: InstanceId, volunteer_id: VolunteerId, role: AssignmentRole) -> CalendarAssignment {
        let at = Utc::now();
        CalendarAssignment {
            id,
            instance_id,
            volunteer_id,
            role,
            created_at: at,
            updated_at: at,
        }
    }

    fn directory() -> HashMap<VolunteerId, VolunteerRef> {
        [
            (2, VolunteerRef::new(2, "Ana", Some("Paz".into()))),
            (9, VolunteerRef::new(9, "Luis", None)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_unassigned_instance_has_null_roles() {
        let rich = compose_rich(vec![make_test_instance(1, 1, 10)], &[], &directory(), None);
        assert_eq!(rich.len(), 1);
        assert_eq!(rich[0].coordinator, None);
        assert_eq!(rich[0].co_coordinator, None);
        assert_eq!(rich[0].date, "2025-03-01");
        assert_eq!(rich[0].start_time, "10:00:00");
        assert_eq!(rich[0].end_time, "12:00:00");
    }

    #[test]
    fn test_roles_are_embedded() {
        let assignments = vec![
            make_test_assignment(1, 1, 2, AssignmentRole::Coordinator),
            make_test_assignment(2, 1, 9, AssignmentRole::CoCoordinator),
        ];
        let rich = compose_rich(vec![make_test_instance(1, 1, 10)], &assignments, &directory(), None);
        assert_eq!(rich[0].coordinator.as_ref().map(|v| v.name.as_str()), Some("Ana"));
        let co = rich[0].co_coordinator.as_ref().unwrap();
        assert_eq!(co.id, 9);
        assert_eq!(co.last_name, "");
    }

    #[test]
    fn test_unknown_volunteer_renders_null() {
        let assignments = vec![make_test_assignment(1, 1, 404, AssignmentRole::Coordinator)];
        let rich = compose_rich(vec![make_test_instance(1, 1, 10)], &assignments, &directory(), None);
        assert_eq!(rich[0].coordinator, None);
    }

    #[test]
    fn test_volunteer_filter_matches_either_role() {
        let instances = vec![
            make_test_instance(1, 1, 10),
            make_test_instance(2, 2, 10),
            make_test_instance(3, 3, 10),
        ];
        let assignments = vec![
            make_test_assignment(1, 1, 9, AssignmentRole::Coordinator),
            make_test_assignment(2, 2, 9, AssignmentRole::CoCoordinator),
            make_test_assignment(3, 3, 2, AssignmentRole::Coordinator),
        ];
        let rich = compose_rich(instances, &assignments, &directory(), Some(9));
        let ids: Vec<_> = rich.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_ordered_by_date_then_start_time() {
        let instances = vec![
            make_test_instance(1, 5, 10),
            make_test_instance(2, 1, 16),
            make_test_instance(3, 1, 9),
        ];
        let rich = compose_rich(instances, &[], &directory(), None);
        let ids: Vec<_> = rich.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn test_query_month_filter_bounds() {
        let query = RichQuery {
            month: Some(2),
            ..RichQuery::for_year(2024)
        };
        let filter = query.instance_filter().unwrap();
        assert_eq!(filter.date_from, NaiveDate::from_ymd_opt(2024, 2, 1));
        assert_eq!(filter.date_to, NaiveDate::from_ymd_opt(2024, 2, 29));
    }

    #[test]
    fn test_query_year_filter_bounds() {
        let filter = RichQuery::for_year(2025).instance_filter().unwrap();
        assert_eq!(filter.date_from, NaiveDate::from_ymd_opt(2025, 1, 1));
        assert_eq!(filter.date_to, NaiveDate::from_ymd_opt(2025, 12, 31));
        assert!(RichQuery { month: Some(0), ..RichQuery::for_year(2025) }
            .instance_filter()
            .is_err());
    }
}
