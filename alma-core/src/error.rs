//! Error types for ALMA calendar operations

use crate::EntityType;
use thiserror::Error;

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("{entity_type} {id} not found")]
    NotFound { entity_type: EntityType, id: i64 },

    #[error("Referenced {entity_type} does not exist: {reason}")]
    MissingReference { entity_type: EntityType, reason: String },

    #[error("Conflict on {entity_type}: {reason}")]
    Conflict { entity_type: EntityType, reason: String },

    #[error("Transaction failed: {reason}")]
    TransactionFailed { reason: String },

    #[error("Storage backend error: {reason}")]
    Backend { reason: String },

    #[error("Storage unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

impl StorageError {
    pub fn not_found(entity_type: EntityType, id: i64) -> Self {
        StorageError::NotFound { entity_type, id }
    }

    pub fn conflict(entity_type: EntityType, reason: impl Into<String>) -> Self {
        StorageError::Conflict {
            entity_type,
            reason: reason.into(),
        }
    }

    pub fn missing_reference(entity_type: EntityType, reason: impl Into<String>) -> Self {
        StorageError::MissingReference {
            entity_type,
            reason: reason.into(),
        }
    }
}

/// Validation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Value for {field} out of range: {reason}")]
    OutOfRange { field: String, reason: String },
}

impl ValidationError {
    pub fn missing(field: impl Into<String>) -> Self {
        ValidationError::RequiredFieldMissing {
            field: field.into(),
        }
    }

    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn out_of_range(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Master error type for all ALMA calendar errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AlmaError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Result type alias for ALMA calendar operations.
pub type AlmaResult<T> = Result<T, AlmaError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = StorageError::not_found(EntityType::Instance, 42);
        assert_eq!(err.to_string(), "Calendar instance 42 not found");
    }

    #[test]
    fn test_conflict_display() {
        let err = StorageError::conflict(EntityType::Assignment, "role coordinator already filled");
        assert!(err.to_string().contains("role coordinator already filled"));
    }

    #[test]
    fn test_validation_display() {
        let err = ValidationError::out_of_range("month", "must be between 1 and 12");
        assert_eq!(
            err.to_string(),
            "Value for month out of range: must be between 1 and 12"
        );
    }

    #[test]
    fn test_alma_error_from_storage() {
        let err: AlmaError = StorageError::LockPoisoned.into();
        assert!(matches!(err, AlmaError::Storage(StorageError::LockPoisoned)));
        assert!(err.to_string().starts_with("Storage error:"));
    }

    #[test]
    fn test_alma_error_from_validation() {
        let err: AlmaError = ValidationError::missing("year").into();
        assert!(matches!(err, AlmaError::Validation(_)));
    }
}
