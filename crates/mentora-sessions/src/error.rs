//! Session service error types.

use thiserror::Error;
use uuid::Uuid;

use mentora_core::error::MentoraError;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("actor is not a party to this mentorship request")]
    NotParty,

    #[error("session start time must be before end time")]
    InvalidTimes,

    #[error("request {0} has no confirmed match")]
    NotMatched(Uuid),

    #[error("at least one criterion score is required")]
    EmptyScores,

    #[error("score for '{criterion}' exceeds the scale of {scale}")]
    ScoreOutOfScale { criterion: String, scale: u8 },
}

impl From<SessionError> for MentoraError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotParty => MentoraError::AccessDenied {
                reason: err.to_string(),
            },
            SessionError::InvalidTimes => MentoraError::validation("start_time", err.to_string()),
            SessionError::NotMatched(_) => MentoraError::validation("status", err.to_string()),
            SessionError::EmptyScores => MentoraError::validation("scores", err.to_string()),
            SessionError::ScoreOutOfScale { ref criterion, .. } => {
                let field = criterion.clone();
                MentoraError::validation(field, err.to_string())
            }
        }
    }
}
