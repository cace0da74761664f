//! Recurrence planning for alternating group/workshop series
//!
//! A plan walks a cursor from `start_date` to `end_date` (inclusive) in steps of
//! `interval_days`, alternating between group and workshop sessions starting
//! at `first_kind`. Every session lasts exactly [`SESSION_HOURS`] hours.

use crate::{
    CalendarSource, InstanceKind, InstanceStatus, NewInstance, SourceId, ValidationError,
};
use chrono::{Days, NaiveDate, NaiveTime, TimeDelta};

/// Interval between sessions when the caller does not pick one.
pub const DEFAULT_INTERVAL_DAYS: i64 = 14;

/// Length in hours of every generated session.
pub const SESSION_HOURS: i64 = 2;

/// Start time used when the caller does not pick one.
pub fn default_start_time() -> NaiveTime {
    NaiveTime::from_hms_opt(10, 0, 0).unwrap_or_default()
}

/// End time used for single instances created without one.
pub fn default_end_time() -> NaiveTime {
    NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default()
}

/// Parameters of one generated series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrencePlan {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub first_kind: InstanceKind,
    pub start_time: NaiveTime,
    pub interval_days: i64,
    pub group_id: Option<SourceId>,
    pub workshop_id: Option<SourceId>,
}

impl RecurrencePlan {
    /// Plan with default start time and interval.
    pub fn new(start_date: NaiveDate, end_date: NaiveDate, first_kind: InstanceKind) -> Self {
        Self {
            start_date,
            end_date,
            first_kind,
            start_time: default_start_time(),
            interval_days: DEFAULT_INTERVAL_DAYS,
            group_id: None,
            workshop_id: None,
        }
    }

    pub fn with_start_time(mut self, start_time: NaiveTime) -> Self {
        self.start_time = start_time;
        self
    }

    pub fn with_interval_days(mut self, interval_days: i64) -> Self {
        self.interval_days = interval_days;
        self
    }

    pub fn with_sources(mut self, group_id: Option<SourceId>, workshop_id: Option<SourceId>) -> Self {
        self.group_id = group_id;
        self.workshop_id = workshop_id;
        self
    }

    /// Check the plan before anything is persisted.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.interval_days <= 0 {
            return Err(ValidationError::out_of_range(
                "interval_days",
                format!("must be positive, got {}", self.interval_days),
            ));
        }
        if !InstanceKind::ALTERNATION.contains(&self.first_kind) {
            return Err(ValidationError::invalid(
                "first_type",
                format!("series alternate grupo/taller, got {}", self.first_kind),
            ));
        }
        self.end_time()?;
        Ok(())
    }

    /// Session end: start plus two hours on the same day.
    pub fn end_time(&self) -> Result<NaiveTime, ValidationError> {
        let (end, wrapped_secs) = self.start_time
            .overflowing_add_signed(TimeDelta::hours(SESSION_HOURS));
        if wrapped_secs != 0 {
            return Err(ValidationError::out_of_range(
                "start_time",
                format!(
                    "{} plus {}h runs past midnight",
                    self.start_time.format("%H:%M:%S"),
                    SESSION_HOURS
                ),
            ));
        }
        Ok(end)
    }

    /// Number of sessions the plan produces, `floor(span / interval) + 1`.
    pub fn session_count(&self) -> usize {
        if self.start_date > self.end_date || self.interval_days <= 0 {
            return 0;
        }
        let span = (self.end_date - self.start_date).num_days();
        (span / self.interval_days) as usize + 1
    }

    fn source_for(&self, kind: InstanceKind) -> CalendarSource {
        match kind {
            InstanceKind::Group => CalendarSource::Group(self.group_id),
            _ => CalendarSource::Workshop(self.workshop_id),
        }
    }

    /// Validate and expand into the ordered list of instances to insert.
    pub fn expand(&self) -> Result<Vec<NewInstance>, ValidationError> {
        self.validate()?;
        let end_time = self.end_time()?;
        let step = Days::new(self.interval_days.unsigned_abs());
        let offset = match self.first_kind {
            InstanceKind::Group => 0,
            _ => 1,
        };

        let mut sessions = Vec::with_capacity(self.session_count());
        let mut cursor = self.start_date;
        let mut index = offset;
        while cursor <= self.end_date {
            let kind = InstanceKind::ALTERNATION[index % 2];
            sessions.push(NewInstance {
                source: self.source_for(kind),
                date: cursor,
                start_time: self.start_time,
                end_time,
                notes: None,
                status: InstanceStatus::Scheduled,
            });
            index += 1;
            cursor = match cursor.checked_add_days(step) {
                Some(next) => next,
                None => break,
            };
        }
        Ok(sessions)
    }
}
