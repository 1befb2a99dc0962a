//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Services receive these traits
//! by value and never reach into a global store; uniqueness invariants
//! (one session per request and date, one rating per session and
//! author) are enforced by the implementations at write time.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::error::MentoraResult;
use crate::models::rating::{CreateRating, Rating};
use crate::models::request::{
    CreateRequest, MentorshipRequest, ParticipantRole, RequestStatus, UpdateRequest,
};
use crate::models::session::{Approval, CreateSession, Session};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

pub trait RequestRepository: Send + Sync {
    fn create(
        &self,
        input: CreateRequest,
    ) -> impl Future<Output = MentoraResult<MentorshipRequest>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = MentoraResult<MentorshipRequest>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateRequest,
    ) -> impl Future<Output = MentoraResult<MentorshipRequest>> + Send;
    /// Delete a request and everything it owns (sessions, their
    /// ratings).
    fn delete(&self, id: Uuid) -> impl Future<Output = MentoraResult<()>> + Send;
    fn list_by_status(
        &self,
        status: RequestStatus,
        pagination: Pagination,
    ) -> impl Future<Output = MentoraResult<PaginatedResult<MentorshipRequest>>> + Send;
}

pub trait SessionRepository: Send + Sync {
    /// Create a session. Fails with a conflict when a session already
    /// exists for the same (request, date).
    fn create(&self, input: CreateSession) -> impl Future<Output = MentoraResult<Session>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = MentoraResult<Session>> + Send;
    /// All sessions of a request, ascending by date.
    fn list_by_request(
        &self,
        request_id: Uuid,
    ) -> impl Future<Output = MentoraResult<Vec<Session>>> + Send;
    /// Set one role's approval flag and its timestamp.
    fn set_approval(
        &self,
        id: Uuid,
        role: ParticipantRole,
        approval: Approval,
        at: DateTime<Utc>,
    ) -> impl Future<Output = MentoraResult<Session>> + Send;
    /// Whether any session of the request is dated strictly after
    /// `date`.
    fn exists_after(
        &self,
        request_id: Uuid,
        date: NaiveDate,
    ) -> impl Future<Output = MentoraResult<bool>> + Send;
}

pub trait RatingRepository: Send + Sync {
    /// Create a rating. Fails with a conflict when the author already
    /// rated the session; the existing rating is never overwritten.
    fn create(&self, input: CreateRating) -> impl Future<Output = MentoraResult<Rating>> + Send;
    fn get_by_session_and_author(
        &self,
        session_id: Uuid,
        author_id: Uuid,
    ) -> impl Future<Output = MentoraResult<Rating>> + Send;
    /// All ratings authored by a user, ascending by creation time.
    fn list_by_author(
        &self,
        author_id: Uuid,
    ) -> impl Future<Output = MentoraResult<Vec<Rating>>> + Send;
}
