//! Enum types for calendar entities
//!
//! Every enum round-trips through the string stored in the database
//! (`as_db_str` / `from_db_str`), which is also its JSON representation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error when parsing an enum from its stored string form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {kind}: '{value}'")]
pub struct EnumParseError {
    pub kind: &'static str,
    pub value: String,
}

impl EnumParseError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

// ============================================================================
// ENTITY TYPE
// ============================================================================

/// Entity type discriminator used in error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum EntityType {
    Instance,
    Assignment,
    RosterEntry,
    Volunteer,
    Participant,
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityType::Instance => "Calendar instance",
            EntityType::Assignment => "Assignment",
            EntityType::RosterEntry => "Event participant",
            EntityType::Volunteer => "Volunteer",
            EntityType::Participant => "Participant",
        };
        f.write_str(name)
    }
}

// ============================================================================
// INSTANCE KIND
// ============================================================================

/// What a calendar instance is a meeting of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum InstanceKind {
    /// A session of a recurring group
    #[serde(rename = "grupo")]
    Group,
    /// A workshop session
    #[serde(rename = "taller")]
    Workshop,
    /// A standalone activity
    #[serde(rename = "actividad")]
    Activity,
}

impl InstanceKind {
    /// The two kinds the recurrence generator alternates between, in order.
    pub const ALTERNATION: [InstanceKind; 2] = [InstanceKind::Group, InstanceKind::Workshop];

    /// Convert to database string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            InstanceKind::Group => "grupo",
            InstanceKind::Workshop => "taller",
            InstanceKind::Activity => "actividad",
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Result<Self, EnumParseError> {
        match s.trim().to_lowercase().as_str() {
            "grupo" => Ok(InstanceKind::Group),
            "taller" => Ok(InstanceKind::Workshop),
            "actividad" => Ok(InstanceKind::Activity),
            _ => Err(EnumParseError::new("instance type", s)),
        }
    }
}

impl fmt::Display for InstanceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_db_str())
    }
}

impl FromStr for InstanceKind {
    type Err = EnumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_db_str(s)
    }
}

// ============================================================================
// INSTANCE STATUS
// ============================================================================

/// Lifecycle status of a calendar instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum InstanceStatus {
    /// Planned, not yet held
    #[default]
    #[serde(rename = "programado")]
    Scheduled,
    /// Held
    #[serde(rename = "realizado")]
    Held,
    /// Called off
    #[serde(rename = "cancelado")]
    Cancelled,
}

impl InstanceStatus {
    /// Convert to database string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            InstanceStatus::Scheduled => "programado",
            InstanceStatus::Held => "realizado",
            InstanceStatus::Cancelled => "cancelado",
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Result<Self, EnumParseError> {
        match s.trim().to_lowercase().as_str() {
            "programado" => Ok(InstanceStatus::Scheduled),
            "realizado" => Ok(InstanceStatus::Held),
            "cancelado" => Ok(InstanceStatus::Cancelled),
            _ => Err(EnumParseError::new("instance status", s)),
        }
    }
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_db_str())
    }
}

impl FromStr for InstanceStatus {
    type Err = EnumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_db_str(s)
    }
}

// ============================================================================
// ASSIGNMENT ROLE
// ============================================================================

/// Function a volunteer performs for an instance. One volunteer per role per instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum AssignmentRole {
    Coordinator,
    CoCoordinator,
}

impl AssignmentRole {
    pub const ALL: [AssignmentRole; 2] = [AssignmentRole::Coordinator, AssignmentRole::CoCoordinator];

    /// Convert to database string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            AssignmentRole::Coordinator => "coordinator",
            AssignmentRole::CoCoordinator => "co_coordinator",
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Result<Self, EnumParseError> {
        match s.trim().to_lowercase().as_str() {
            "coordinator" => Ok(AssignmentRole::Coordinator),
            "co_coordinator" => Ok(AssignmentRole::CoCoordinator),
            _ => Err(EnumParseError::new("assignment role", s)),
        }
    }
}

impl fmt::Display for AssignmentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_db_str())
    }
}

impl FromStr for AssignmentRole {
    type Err = EnumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_db_str(s)
    }
}

// ============================================================================
// ATTENDANCE STATUS
// ============================================================================

/// Attendance state of a participant on an instance roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum AttendanceStatus {
    #[default]
    #[serde(rename = "inscripto")]
    Enrolled,
    #[serde(rename = "cancelado")]
    Cancelled,
    #[serde(rename = "asistio")]
    Attended,
}

impl AttendanceStatus {
    /// Convert to database string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Enrolled => "inscripto",
            AttendanceStatus::Cancelled => "cancelado",
            AttendanceStatus::Attended => "asistio",
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Result<Self, EnumParseError> {
        match s.trim().to_lowercase().as_str() {
            "inscripto" => Ok(AttendanceStatus::Enrolled),
            "cancelado" => Ok(AttendanceStatus::Cancelled),
            "asistio" => Ok(AttendanceStatus::Attended),
            _ => Err(EnumParseError::new("attendance status", s)),
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_db_str())
    }
}

impl FromStr for AttendanceStatus {
    type Err = EnumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_db_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_kind_db_roundtrip() {
        for kind in [InstanceKind::Group, InstanceKind::Workshop, InstanceKind::Activity] {
            assert_eq!(InstanceKind::from_db_str(kind.as_db_str()), Ok(kind));
        }
        assert!(InstanceKind::from_db_str("reunion").is_err());
    }

    #[test]
    fn test_instance_kind_serde_uses_db_names() -> Result<(), serde_json::Error> {
        assert_eq!(serde_json::to_string(&InstanceKind::Workshop)?, "\"taller\"");
        let kind: InstanceKind = serde_json::from_str("\"grupo\"")?;
        assert_eq!(kind, InstanceKind::Group);
        Ok(())
    }

    #[test]
    fn test_status_defaults() {
        assert_eq!(InstanceStatus::default(), InstanceStatus::Scheduled);
        assert_eq!(AttendanceStatus::default(), AttendanceStatus::Enrolled);
    }

    #[test]
    fn test_role_parsing_is_case_insensitive() {
        assert_eq!("Co_Coordinator".parse::<AssignmentRole>(), Ok(AssignmentRole::CoCoordinator));
        assert_eq!(
            serde_json::to_string(&AssignmentRole::CoCoordinator).ok().as_deref(),
            Some("\"co_coordinator\"")
        );
    }

    #[test]
    fn test_parse_error_message() {
        let err = AttendanceStatus::from_db_str("ausente").unwrap_err();
        assert_eq!(err.to_string(), "Invalid attendance status: 'ausente'");
    }
}
