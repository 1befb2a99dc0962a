//! Error types for the Mentora system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MentoraError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Conflict: {reason}")]
    Conflict { reason: String },

    #[error("Access denied: {reason}")]
    AccessDenied { reason: String },

    #[error("Validation error on '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Integration error ({service}): {reason}")]
    Integration { service: String, reason: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MentoraError {
    /// Shorthand for a field-level validation failure.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        MentoraError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub type MentoraResult<T> = Result<T, MentoraError>;
