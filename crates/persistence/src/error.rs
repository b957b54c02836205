//! # Persistence Errors
//!
//! Error types for the persistence layer, wrapping sqlx errors.

use thiserror::Error;

/// Persistence layer errors
#[derive(Debug, Error)]
pub enum PersistenceError {
    // === Database errors ===
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Record already exists: {entity} with id {id}")]
    AlreadyExists { entity: String, id: String },

    // === Concurrency errors ===
    #[error("Version conflict: {entity} {id} is no longer at version {expected}")]
    VersionConflict {
        entity: String,
        id: String,
        expected: i64,
    },

    // === Conversion errors ===
    #[error("Invalid enum value: {field} = {value}")]
    InvalidEnumValue { field: String, value: String },

    // === Configuration errors ===
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type alias for PersistenceError
pub type PersistenceResult<T> = Result<T, PersistenceError>;

impl PersistenceError {
    pub fn not_found(entity: &str, id: &str) -> Self {
        Self::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    pub fn already_exists(entity: &str, id: &str) -> Self {
        Self::AlreadyExists {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    pub fn version_conflict(entity: &str, id: &str, expected: i64) -> Self {
        Self::VersionConflict {
            entity: entity.to_string(),
            id: id.to_string(),
            expected,
        }
    }

    pub fn invalid_enum(field: &str, value: &str) -> Self {
        Self::InvalidEnumValue {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_version_conflict(&self) -> bool {
        matches!(self, Self::VersionConflict { .. })
    }

    /// Map a unique-constraint violation to `AlreadyExists`
    pub(crate) fn from_insert(err: sqlx::Error, entity: &str, id: &str) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Self::already_exists(entity, id)
            }
            _ => Self::Database(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PersistenceError::not_found("Tender", "t-1");
        assert_eq!(err.to_string(), "Record not found: Tender with id t-1");
        assert!(err.is_not_found());

        let err = PersistenceError::version_conflict("Bid", "b-1", 3);
        assert!(err.to_string().contains("version 3"));
        assert!(err.is_version_conflict());
    }
}
