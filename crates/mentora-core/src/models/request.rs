//! Mentorship request domain model.
//!
//! The request is the root entity of an engagement: it owns its
//! sessions (cascade) and carries the pairing schedule used for every
//! expected-date computation.

use chrono::{DateTime, Days, Months, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::pairing::Pairing;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    Open,
    Matched,
    Completed,
    Cancelled,
}

/// Which side of the pairing the creator is looking to fill.
///
/// A `SeekingMentor` request was opened by the prospective mentee;
/// matching assigns the counterpart as mentor, and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestKind {
    SeekingMentor,
    SeekingMentee,
}

/// Role a user holds within a matched request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticipantRole {
    Mentor,
    Mentee,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MentorshipRequest {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub mentor_id: Option<Uuid>,
    pub mentee_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub kind: RequestKind,
    pub status: RequestStatus,
    pub cancel_reason: Option<String>,
    /// Set when the request transitions to `Matched`; non-null iff
    /// status is `Matched` or `Completed`.
    pub match_date: Option<DateTime<Utc>>,
    /// Engagement length in months; fractional values allowed.
    pub duration_months: f64,
    pub pairing: Pairing,
    /// Users who expressed interest while the request was `Open`.
    pub interested: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MentorshipRequest {
    /// Role the given user holds on this request, by exact id equality.
    pub fn participant_role(&self, user_id: Uuid) -> Option<ParticipantRole> {
        if self.mentor_id == Some(user_id) {
            Some(ParticipantRole::Mentor)
        } else if self.mentee_id == Some(user_id) {
            Some(ParticipantRole::Mentee)
        } else {
            None
        }
    }

    pub fn is_participant(&self, user_id: Uuid) -> bool {
        self.participant_role(user_id).is_some()
    }

    /// End of the engagement window: `match_date + duration_months`.
    ///
    /// Whole months use calendar month arithmetic; the fractional
    /// remainder is converted at 30 days per month.
    pub fn engagement_end(&self) -> Option<DateTime<Utc>> {
        self.match_date
            .map(|start| add_duration_months(start, self.duration_months))
    }
}

fn add_duration_months(start: DateTime<Utc>, months: f64) -> DateTime<Utc> {
    let whole = months.trunc().max(0.0) as u32;
    let extra_days = (months.fract().max(0.0) * 30.0).round() as u64;
    start + Months::new(whole) + Days::new(extra_days)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRequest {
    pub creator_id: Uuid,
    pub title: String,
    pub description: String,
    pub kind: RequestKind,
    pub duration_months: f64,
    pub pairing: Pairing,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<RequestStatus>,
    pub mentor_id: Option<Uuid>,
    pub mentee_id: Option<Uuid>,
    /// `Some(Some(val))` = set, `Some(None)` = clear, `None` = no change.
    pub match_date: Option<Option<DateTime<Utc>>>,
    pub cancel_reason: Option<String>,
    pub interested: Option<Vec<Uuid>>,
    pub pairing: Option<Pairing>,
}
