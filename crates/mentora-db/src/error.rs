//! Database-specific error types and conversions.

use mentora_core::error::MentoraError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Record already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Invalid stored value: {0}")]
    Corrupt(String),
}

impl From<DbError> for MentoraError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => MentoraError::NotFound { entity, id },
            DbError::AlreadyExists { entity } => MentoraError::Conflict {
                reason: format!("{entity} already exists"),
            },
            other => MentoraError::Database(other.to_string()),
        }
    }
}
