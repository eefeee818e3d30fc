// ABOUTME: Structured error types for database operations
// ABOUTME: Wraps sqlx failures with the entity and operation that produced them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 TutorLink Contributors

use super::{AppError, ErrorCode};

/// Storage-layer failure with enough context to log usefully
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// Row not found where one was required
    #[error("{entity_type} '{entity_id}' not found")]
    NotFound {
        /// Entity kind (doubt, conversation, ...)
        entity_type: &'static str,
        /// Identifier that was looked up
        entity_id: String,
    },

    /// A unique constraint rejected the write
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Stored value could not be decoded into a domain type
    #[error("Invalid stored value for {field}: {reason}")]
    InvalidData {
        /// Column or field name
        field: &'static str,
        /// Why decoding failed
        reason: String,
    },

    /// Migration failure
    #[error("Migration failed: {0}")]
    MigrationError(String),

    /// Underlying sqlx error
    #[error("Query failed during {operation}: {source}")]
    QueryError {
        /// What was being attempted
        operation: &'static str,
        /// Driver error
        #[source]
        source: sqlx::Error,
    },
}

impl DatabaseError {
    /// Wrap a sqlx error with the operation that failed
    #[must_use]
    pub fn query(operation: &'static str, source: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &source {
            if db.is_unique_violation() {
                return Self::ConstraintViolation(db.message().to_owned());
            }
        }
        Self::QueryError { operation, source }
    }

    /// True when the failure was a unique-key collision
    #[must_use]
    pub const fn is_unique_violation(&self) -> bool {
        matches!(self, Self::ConstraintViolation(_))
    }
}

impl From<DatabaseError> for AppError {
    fn from(error: DatabaseError) -> Self {
        match &error {
            DatabaseError::NotFound { entity_type, .. } => Self::not_found(*entity_type),
            DatabaseError::ConstraintViolation(msg) => {
                Self::new(ErrorCode::ResourceAlreadyExists, msg.clone())
            }
            DatabaseError::InvalidData { .. }
            | DatabaseError::MigrationError(_)
            | DatabaseError::QueryError { .. } => {
                Self::new(ErrorCode::DatabaseError, error.to_string()).with_source(error)
            }
        }
    }
}
