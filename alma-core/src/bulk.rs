//! Bulk scopes: which instances a bulk count or bulk delete touches.

use crate::{CalendarInstance, InstanceKind, SourceId, ValidationError};
use chrono::{Datelike, NaiveDate};
use std::fmt;

/// Selector for bulk count and bulk delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkScope {
    /// Every instance dated within one calendar month.
    Month { year: i32, month: u32 },
    /// Every instance of one kind.
    Kind { kind: InstanceKind },
    /// One series: a kind plus a source id, where no id means ad-hoc rows with
    /// a null source.
    Series {
        kind: InstanceKind,
        source_id: Option<SourceId>,
    },
    /// Every instance.
    All,
}

impl BulkScope {
    /// Build from the loose request fields. The scope name must be one of
    /// `month`, `type`, `series` or `all`.
    pub fn parse(
        scope: &str,
        year: Option<i32>,
        month: Option<u32>,
        kind: Option<InstanceKind>,
        source_id: Option<SourceId>,
    ) -> Result<Self, ValidationError> {
        match scope.trim().to_lowercase().as_str() {
            "month" => {
                let year = year.ok_or_else(|| ValidationError::missing("year"))?;
                let month = month.ok_or_else(|| ValidationError::missing("month"))?;
                if !(1..=12).contains(&month) {
                    return Err(ValidationError::out_of_range(
                        "month",
                        format!("must be between 1 and 12, got {month}"),
                    ));
                }
                let scope = BulkScope::Month { year, month };
                scope.month_bounds()?;
                Ok(scope)
            }
            "type" => {
                let kind = kind.ok_or_else(|| ValidationError::missing("type"))?;
                Ok(BulkScope::Kind { kind })
            }
            "series" => {
                let kind = kind.ok_or_else(|| ValidationError::missing("type"))?;
                Ok(BulkScope::Series { kind, source_id })
            }
            "all" => Ok(BulkScope::All),
            other => Err(ValidationError::invalid(
                "scope",
                format!("expected one of month, type, series, all; got '{other}'"),
            )),
        }
    }

    /// Scope name as accepted by [`BulkScope::parse`].
    pub fn name(&self) -> &'static str {
        match self {
            BulkScope::Month { .. } => "month",
            BulkScope::Kind { .. } => "type",
            BulkScope::Series { .. } => "series",
            BulkScope::All => "all",
        }
    }

    /// Pure predicate shared by every in-memory count and delete.
    pub fn matches(&self, instance: &CalendarInstance) -> bool {
        match *self {
            BulkScope::Month { year, month } => {
                instance.date.year() == year && instance.date.month() == month
            }
            BulkScope::Kind { kind } => instance.kind() == kind,
            BulkScope::Series { kind, source_id } => {
                instance.kind() == kind && instance.source_id() == source_id
            }
            BulkScope::All => true,
        }
    }

    /// Half-open date range `[first of month, first of next month)` for a
    /// month scope, `None` for the other variants.
    pub fn month_bounds(&self) -> Result<Option<(NaiveDate, NaiveDate)>, ValidationError> {
        let BulkScope::Month { year, month } = *self else {
            return Ok(None);
        };
        month_range(year, month).map(Some)
    }
}

/// Half-open range covering one calendar month.
pub fn month_range(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), ValidationError> {
    let invalid = || {
        ValidationError::out_of_range("year", format!("{year}-{month:02} is not a representable month"))
    };
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(invalid)?;
    Ok((first, next))
}

/// Inclusive range covering one calendar year.
pub fn year_range(year: i32) -> Result<(NaiveDate, NaiveDate), ValidationError> {
    let invalid = || ValidationError::out_of_range("year", format!("{year} is not representable"));
    let first = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(invalid)?;
    let last = NaiveDate::from_ymd_opt(year, 12, 31).ok_or_else(invalid)?;
    Ok((first, last))
}

impl fmt::Display for BulkScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BulkScope::Month { year, month } => write!(f, "month {year}-{month:02}"),
            BulkScope::Kind { kind } => write!(f, "type {kind}"),
            BulkScope::Series {
                kind,
                source_id: Some(id),
            } => write!(f, "series {kind}/{id}"),
            BulkScope::Series {
                kind,
                source_id: None,
            } => write!(f, "series {kind}/none"),
            BulkScope::All => f.write_str("all"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CalendarSource, InstanceStatus, NewInstance};
    use chrono::{NaiveTime, Utc};

    fn make_test_instance(id: i64, source: CalendarSource, y: i32, m: u32, d: u32) -> CalendarInstance {
        NewInstance {
            source,
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            start_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            notes: None,
            status: InstanceStatus::Scheduled,
        }
        .into_instance(id, Utc::now())
    }

    #[test]
    fn test_parse_month_requires_fields() {
        assert!(matches!(
            BulkScope::parse("month", None, Some(3), None, None),
            Err(ValidationError::RequiredFieldMissing { ref field }) if field == "year"
        ));
        assert!(matches!(
            BulkScope::parse("month", Some(2025), None, None, None),
            Err(ValidationError::RequiredFieldMissing { ref field }) if field == "month"
        ));
        assert!(matches!(
            BulkScope::parse("month", Some(2025), Some(13), None, None),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert_eq!(
            BulkScope::parse("month", Some(2025), Some(3), None, None),
            Ok(BulkScope::Month { year: 2025, month: 3 })
        );
    }

    #[test]
    fn test_parse_type_and_series_require_kind() {
        assert!(BulkScope::parse("type", None, None, None, None).is_err());
        assert!(BulkScope::parse("series", None, None, None, Some(7)).is_err());
        assert_eq!(
            BulkScope::parse("series", None, None, Some(InstanceKind::Workshop), None),
            Ok(BulkScope::Series {
                kind: InstanceKind::Workshop,
                source_id: None
            })
        );
    }

    #[test]
    fn test_unknown_scope_rejected() {
        assert!(matches!(
            BulkScope::parse("everything", None, None, None, None),
            Err(ValidationError::InvalidValue { ref field, .. }) if field == "scope"
        ));
        assert_eq!(BulkScope::parse(" ALL ", None, None, None, None), Ok(BulkScope::All));
    }

    #[test]
    fn test_series_distinguishes_null_source() {
        let with_source = make_test_instance(1, CalendarSource::Workshop(Some(7)), 2025, 3, 1);
        let ad_hoc = make_test_instance(2, CalendarSource::Workshop(None), 2025, 3, 1);
        let other_kind = make_test_instance(3, CalendarSource::Group(Some(7)), 2025, 3, 1);

        let series = BulkScope::Series {
            kind: InstanceKind::Workshop,
            source_id: Some(7),
        };
        assert!(series.matches(&with_source));
        assert!(!series.matches(&ad_hoc));
        assert!(!series.matches(&other_kind));

        let ad_hoc_series = BulkScope::Series {
            kind: InstanceKind::Workshop,
            source_id: None,
        };
        assert!(ad_hoc_series.matches(&ad_hoc));
        assert!(!ad_hoc_series.matches(&with_source));
    }

    #[test]
    fn test_month_matches_calendar_month() {
        let scope = BulkScope::Month { year: 2025, month: 12 };
        assert!(scope.matches(&make_test_instance(1, CalendarSource::Group(None), 2025, 12, 31)));
        assert!(!scope.matches(&make_test_instance(2, CalendarSource::Group(None), 2026, 1, 1)));
        assert!(!scope.matches(&make_test_instance(3, CalendarSource::Group(None), 2024, 12, 1)));
    }

    #[test]
    fn test_month_bounds_rolls_over_year() {
        let (first, next) = BulkScope::Month { year: 2025, month: 12 }
            .month_bounds()
            .unwrap()
            .unwrap();
        assert_eq!(first, NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());
        assert_eq!(next, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        assert_eq!(BulkScope::All.month_bounds(), Ok(None));
    }

    #[test]
    fn test_all_matches_everything() {
        let instance = make_test_instance(1, CalendarSource::Activity(None), 1999, 1, 1);
        assert!(BulkScope::All.matches(&instance));
    }
}
