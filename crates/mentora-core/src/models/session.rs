//! Logged session domain model.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::request::ParticipantRole;

/// Per-role approval state of a logged session.
///
/// Explicit tri-state: a session that has not been acted on by a role
/// is `Unset`, never a null boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Approval {
    Unset,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub request_id: Uuid,
    /// Calendar date of the meeting. At most one session exists per
    /// (request, date).
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub mentee_approval: Approval,
    pub mentee_logged_at: Option<DateTime<Utc>>,
    pub mentor_approval: Approval,
    pub mentor_logged_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn approval_for(&self, role: ParticipantRole) -> Approval {
        match role {
            ParticipantRole::Mentor => self.mentor_approval,
            ParticipantRole::Mentee => self.mentee_approval,
        }
    }

    /// Fully confirmed: both parties approved.
    pub fn is_confirmed(&self) -> bool {
        self.mentee_approval == Approval::Approved && self.mentor_approval == Approval::Approved
    }

    /// Explicitly rejected by at least one party. The other party's
    /// flag is independent, so a session can be rejected on one side
    /// and still pending on the other.
    pub fn is_rejected(&self) -> bool {
        self.mentee_approval == Approval::Rejected || self.mentor_approval == Approval::Rejected
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSession {
    pub request_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub mentee_approval: Approval,
    pub mentee_logged_at: Option<DateTime<Utc>>,
    pub mentor_approval: Approval,
    pub mentor_logged_at: Option<DateTime<Utc>>,
}
