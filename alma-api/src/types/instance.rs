//! Calendar instance API types

use alma_core::{
    default_end_time, default_start_time, CalendarInstance, CalendarSource, InstanceFilter,
    InstanceId, InstanceKind, InstanceStatus, InstanceUpdate, NewInstance, Page, SourceId,
    Timestamp,
};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::deserialize_some;
use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};

/// Request to create a calendar instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateInstanceRequest {
    #[serde(rename = "type")]
    pub kind: InstanceKind,
    #[serde(default)]
    pub source_id: Option<SourceId>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date"))]
    pub date: NaiveDate,
    /// Defaults to 10:00:00
    #[serde(default = "default_start_time")]
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "10:00:00"))]
    pub start_time: NaiveTime,
    /// Defaults to 12:00:00
    #[serde(default = "default_end_time")]
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "12:00:00"))]
    pub end_time: NaiveTime,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub status: InstanceStatus,
}

impl CreateInstanceRequest {
    pub fn into_new(self) -> NewInstance {
        NewInstance {
            source: CalendarSource::from_parts(self.kind, self.source_id),
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
            notes: self.notes,
            status: self.status,
        }
    }
}

/// Partial update of a calendar instance.
///
/// `source_id` and `notes` distinguish an absent field (unchanged) from an
/// explicit `null` (cleared).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateInstanceRequest {
    #[serde(rename = "type", default)]
    pub kind: Option<InstanceKind>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<i64>))]
    pub source_id: Option<Option<SourceId>>,
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date"))]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>))]
    pub start_time: Option<NaiveTime>,
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>))]
    pub end_time: Option<NaiveTime>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>))]
    pub notes: Option<Option<String>>,
    #[serde(default)]
    pub status: Option<InstanceStatus>,
}

impl UpdateInstanceRequest {
    pub fn into_update(self) -> InstanceUpdate {
        InstanceUpdate {
            kind: self.kind,
            source_id: self.source_id,
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
            notes: self.notes,
            status: self.status,
        }
    }
}

/// Query string for the instance listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListInstancesQuery {
    pub skip: Option<u32>,
    pub limit: Option<u32>,
    #[serde(rename = "type")]
    pub kind: Option<InstanceKind>,
    pub status: Option<InstanceStatus>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub source_id: Option<SourceId>,
}

impl ListInstancesQuery {
    pub fn filter(&self) -> InstanceFilter {
        InstanceFilter {
            kind: self.kind,
            status: self.status,
            date_from: self.date_from,
            date_to: self.date_to,
            source_id: self.source_id,
        }
    }

    /// Page window, with `limit` defaulted and bounded by configuration.
    pub fn page(&self, config: &ApiConfig) -> ApiResult<Page> {
        let limit = self.limit.unwrap_or(config.default_page_limit);
        if limit > config.max_page_limit {
            return Err(ApiError::invalid_range("limit", 0, config.max_page_limit));
        }
        Ok(Page::new(self.skip.unwrap_or(0), limit))
    }
}

/// Calendar instance as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct InstanceResponse {
    pub id: InstanceId,
    #[serde(rename = "type")]
    pub kind: InstanceKind,
    pub source_id: Option<SourceId>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date"))]
    pub date: NaiveDate,
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub start_time: NaiveTime,
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub end_time: NaiveTime,
    pub notes: Option<String>,
    pub status: InstanceStatus,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,
}

impl From<CalendarInstance> for InstanceResponse {
    fn from(instance: CalendarInstance) -> Self {
        Self {
            id: instance.id,
            kind: instance.kind(),
            source_id: instance.source_id(),
            date: instance.date,
            start_time: instance.start_time,
            end_time: instance.end_time,
            notes: instance.notes,
            status: instance.status,
            created_at: instance.created_at,
            updated_at: instance.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_defaults() {
        let req: CreateInstanceRequest =
            serde_json::from_str(r#"{"type": "taller", "date": "2025-03-01"}"#).unwrap();
        assert_eq!(req.start_time, NaiveTime::from_hms_opt(10, 0, 0).unwrap());
        assert_eq!(req.end_time, NaiveTime::from_hms_opt(12, 0, 0).unwrap());
        assert_eq!(req.status, InstanceStatus::Scheduled);
        assert_eq!(req.into_new().source, CalendarSource::Workshop(None));
    }

    #[test]
    fn test_update_request_distinguishes_null_from_absent() {
        let req: UpdateInstanceRequest = serde_json::from_str(r#"{"notes": null}"#).unwrap();
        assert_eq!(req.notes, Some(None));
        assert_eq!(req.source_id, None);

        let req: UpdateInstanceRequest =
            serde_json::from_str(r#"{"source_id": 4, "status": "realizado"}"#).unwrap();
        assert_eq!(req.source_id, Some(Some(4)));
        assert_eq!(req.status, Some(InstanceStatus::Held));
        assert!(req.notes.is_none());
    }

    #[test]
    fn test_list_query_page_bounds() {
        let config = ApiConfig::default();
        let page = ListInstancesQuery::default().page(&config).unwrap();
        assert_eq!(page, Page::new(0, 100));

        let too_big = ListInstancesQuery {
            limit: Some(config.max_page_limit + 1),
            ..Default::default()
        };
        assert!(too_big.page(&config).is_err());
    }
}
