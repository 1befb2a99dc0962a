//! Mentora Sessions — expected-date generation, schedule
//! reconciliation, and the session approval state machine.

pub mod config;
pub mod error;
pub mod ratings;
pub mod reconcile;
pub mod recurrence;
pub mod service;

pub use config::SessionConfig;
pub use error::SessionError;
pub use ratings::{RatingService, RatingSummary};
pub use reconcile::{ExpectedSession, ScheduleStatus};
pub use service::SessionService;
