//! Series generation, bulk operation and rich listing types

use alma_core::{
    default_start_time, BulkScope, InstanceKind, RecurrencePlan, RichInstance, RichQuery,
    SourceId, ValidationError, VolunteerId, DEFAULT_INTERVAL_DAYS,
};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

fn default_interval_days() -> i64 {
    DEFAULT_INTERVAL_DAYS
}

/// Parameters for generating an alternating group/workshop series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct GenerateRequest {
    /// First date of the series (inclusive)
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date"))]
    pub start_date: NaiveDate,
    /// Last date a session may fall on (inclusive)
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date"))]
    pub end_date: NaiveDate,
    /// `grupo` or `taller`
    pub first_type: InstanceKind,
    #[serde(default = "default_start_time")]
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "10:00:00"))]
    pub start_time: NaiveTime,
    #[serde(default = "default_interval_days")]
    pub interval_days: i64,
    #[serde(default)]
    pub source_group_id: Option<SourceId>,
    #[serde(default)]
    pub source_workshop_id: Option<SourceId>,
}

impl GenerateRequest {
    pub fn plan(&self) -> RecurrencePlan {
        RecurrencePlan::new(self.start_date, self.end_date, self.first_type)
            .with_start_time(self.start_time)
            .with_interval_days(self.interval_days)
            .with_sources(self.source_group_id, self.source_workshop_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct GenerateResponse {
    pub created: usize,
    pub instances: Vec<RichInstance>,
}

/// Selector shared by bulk count and bulk delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BulkFiltersRequest {
    /// `month`, `type`, `series` or `all`
    pub scope: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub month: Option<u32>,
    #[serde(rename = "type", default)]
    pub kind: Option<InstanceKind>,
    #[serde(default)]
    pub source_id: Option<SourceId>,
}

impl BulkFiltersRequest {
    pub fn to_scope(&self) -> Result<BulkScope, ValidationError> {
        BulkScope::parse(&self.scope, self.year, self.month, self.kind, self.source_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BulkCountResponse {
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BulkDeleteResponse {
    pub deleted: u64,
}

/// Query string for the rich listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichQueryParams {
    pub year: Option<i32>,
    pub month: Option<u32>,
    #[serde(rename = "type")]
    pub kind: Option<InstanceKind>,
    pub volunteer_id: Option<VolunteerId>,
}

impl RichQueryParams {
    pub fn to_query(&self) -> Result<RichQuery, ValidationError> {
        let year = self.year.ok_or_else(|| ValidationError::missing("year"))?;
        Ok(RichQuery {
            year,
            month: self.month,
            kind: self.kind,
            volunteer_id: self.volunteer_id,
        })
    }
}
