//! Listing filters and pagination for calendar instances

use crate::{CalendarInstance, InstanceKind, InstanceStatus, SourceId};
use chrono::NaiveDate;

/// Conjunction of optional criteria; an unset field matches everything.
/// Date bounds are inclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstanceFilter {
    pub kind: Option<InstanceKind>,
    pub status: Option<InstanceStatus>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub source_id: Option<SourceId>,
}

impl InstanceFilter {
    pub fn between(date_from: NaiveDate, date_to: NaiveDate) -> Self {
        Self {
            date_from: Some(date_from),
            date_to: Some(date_to),
            ..Default::default()
        }
    }

    pub fn with_kind(mut self, kind: Option<InstanceKind>) -> Self {
        self.kind = kind;
        self
    }

    pub fn matches(&self, instance: &CalendarInstance) -> bool {
        self.kind.map_or(true, |k| instance.kind() == k)
            && self.status.map_or(true, |s| instance.status == s)
            && self.date_from.map_or(true, |d| instance.date >= d)
            && self.date_to.map_or(true, |d| instance.date <= d)
            && self.source_id.map_or(true, |id| instance.source_id() == Some(id))
    }
}

/// Offset pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: u32,
    pub limit: u32,
}

impl Page {
    pub const DEFAULT_LIMIT: u32 = 100;

    pub fn new(skip: u32, limit: u32) -> Self {
        Self { skip, limit }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CalendarSource, NewInstance};
    use chrono::{NaiveTime, Utc};

    fn make_test_instance(source: CalendarSource, status: InstanceStatus, day: u32) -> CalendarInstance {
        NewInstance {
            source,
            date: NaiveDate::from_ymd_opt(2025, 6, day).unwrap(),
            start_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            notes: None,
            status,
        }
        .into_instance(1, Utc::now())
    }

    #[test]
    fn test_empty_filter_matches_all() {
        let instance = make_test_instance(CalendarSource::Activity(None), InstanceStatus::Cancelled, 3);
        assert!(InstanceFilter::default().matches(&instance));
    }

    #[test]
    fn test_date_bounds_inclusive() {
        let filter = InstanceFilter::between(
            NaiveDate::from_ymd_opt(2025, 6, 3).unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 5).unwrap(),
        );
        for (day, expected) in [(2, false), (3, true), (5, true), (6, false)] {
            let instance = make_test_instance(CalendarSource::Group(None), InstanceStatus::Scheduled, day);
            assert_eq!(filter.matches(&instance), expected, "day {day}");
        }
    }

    #[test]
    fn test_source_filter_excludes_null_source() {
        let filter = InstanceFilter {
            source_id: Some(4),
            ..Default::default()
        };
        let with = make_test_instance(CalendarSource::Group(Some(4)), InstanceStatus::Scheduled, 1);
        let without = make_test_instance(CalendarSource::Group(None), InstanceStatus::Scheduled, 1);
        assert!(filter.matches(&with));
        assert!(!filter.matches(&without));
    }

    #[test]
    fn test_kind_and_status() {
        let filter = InstanceFilter {
            kind: Some(InstanceKind::Workshop),
            status: Some(InstanceStatus::Held),
            ..Default::default()
        };
        let hit = make_test_instance(CalendarSource::Workshop(None), InstanceStatus::Held, 1);
        let wrong_status = make_test_instance(CalendarSource::Workshop(None), InstanceStatus::Scheduled, 1);
        assert!(filter.matches(&hit));
        assert!(!filter.matches(&wrong_status));
    }
}
