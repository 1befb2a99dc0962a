//! External service contracts.
//!
//! The concrete HTTP clients live outside this repository; the core
//! only depends on these traits. Every call here is a best-effort
//! side effect from the caller's perspective: failures are surfaced
//! as [`MentoraError::Integration`] and must never roll back
//! persisted state.
//!
//! [`MentoraError::Integration`]: crate::error::MentoraError::Integration

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::MentoraResult;

/// A person as known to the directory/people service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    /// External placement/engagement status, when known.
    pub placement: Option<String>,
}

pub trait DirectoryService: Send + Sync {
    fn get_user_by_id(&self, id: Uuid) -> impl Future<Output = MentoraResult<DirectoryUser>> + Send;
    /// Resolve a batch of emails; unknown addresses are simply absent
    /// from the result.
    fn get_users_by_email(
        &self,
        emails: &[String],
    ) -> impl Future<Output = MentoraResult<Vec<DirectoryUser>>> + Send;
}

pub trait ChatService: Send + Sync {
    fn send_message(
        &self,
        recipient: &str,
        text: &str,
    ) -> impl Future<Output = MentoraResult<()>> + Send;
}

/// Account handle in the external time-tracking service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerAccount {
    pub id: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeEntry {
    pub date: NaiveDate,
    pub account_id: String,
    pub minutes: i64,
    pub description: String,
    pub project_id: String,
}

pub trait TimeTracker: Send + Sync {
    fn get_account_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = MentoraResult<TrackerAccount>> + Send;
    fn post_entry(&self, entry: TimeEntry) -> impl Future<Output = MentoraResult<()>> + Send;
}

/// Mail dispatch payload. The core decides the template name, the
/// recipients, and the data; rendering happens elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailMessage {
    pub template: String,
    pub recipients: Vec<String>,
    pub payload: serde_json::Value,
}

pub trait Mailer: Send + Sync {
    fn send(&self, message: MailMessage) -> impl Future<Output = MentoraResult<()>> + Send;
}
