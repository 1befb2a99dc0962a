//! SurrealDB repository implementations.

mod rating;
mod request;
mod session;

pub use rating::SurrealRatingRepository;
pub use request::SurrealRequestRepository;
pub use session::SurrealSessionRepository;

/// Whether a SurrealDB error is a UNIQUE index violation.
///
/// SurrealDB reports these as a query error mentioning the value the
/// index already contains; there is no structured error code to match
/// on.
pub(crate) fn is_unique_violation(err: &surrealdb::Error) -> bool {
    err.to_string().contains("already contains")
}
