//! Request lifecycle error types.

use thiserror::Error;

use mentora_core::error::MentoraError;
use mentora_core::models::request::RequestStatus;

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("request is not open (status: {0:?})")]
    NotOpen(RequestStatus),

    #[error("request is already cancelled")]
    AlreadyCancelled,

    #[error("a completed request cannot be cancelled")]
    CompletedRequest,

    #[error("the creator cannot take the counterpart side of their own request")]
    OwnRequest,

    #[error("actor is not the creator or a matched party of this request")]
    NotAuthorized,
}

impl From<MatchError> for MentoraError {
    fn from(err: MatchError) -> Self {
        match err {
            MatchError::NotOpen(_) | MatchError::AlreadyCancelled | MatchError::CompletedRequest => {
                MentoraError::Conflict {
                    reason: err.to_string(),
                }
            }
            MatchError::OwnRequest => MentoraError::validation("counterpart_id", err.to_string()),
            MatchError::NotAuthorized => MentoraError::AccessDenied {
                reason: err.to_string(),
            },
        }
    }
}
