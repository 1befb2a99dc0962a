//! Inactivity detection over matched engagements.
//!
//! An engagement is inactive when no session has been logged inside
//! the trailing window bounded by its antepenultimate expected
//! session date: the third-most-recent pairing day strictly before
//! now, walking backward through the weekday pattern cyclically.

use chrono::{DateTime, NaiveDate, Utc, Weekday};
use tracing::debug;

use mentora_core::error::MentoraResult;
use mentora_core::models::request::{MentorshipRequest, RequestStatus};
use mentora_core::repository::{Pagination, RequestRepository, SessionRepository};
use mentora_sessions::recurrence::trailing_session_dates;

/// A matched request flagged as inactive, with the threshold date
/// that bounded its trailing window.
#[derive(Debug, Clone)]
pub struct InactiveEngagement {
    pub request: MentorshipRequest,
    pub threshold: NaiveDate,
}

/// The antepenultimate expected session date before `today`.
///
/// `None` when the backward walk runs out of calendar, which only
/// happens with a `today` at the very edge of the supported range.
pub fn inactivity_threshold(days: &[Weekday], today: NaiveDate) -> Option<NaiveDate> {
    let trailing = trailing_session_dates(today, days, 3);
    if trailing.len() == 3 {
        Some(trailing[2])
    } else {
        None
    }
}

pub struct InactivityDetector<R, S>
where
    R: RequestRepository,
    S: SessionRepository,
{
    request_repo: R,
    session_repo: S,
}

impl<R, S> InactivityDetector<R, S>
where
    R: RequestRepository,
    S: SessionRepository,
{
    pub fn new(request_repo: R, session_repo: S) -> Self {
        Self {
            request_repo,
            session_repo,
        }
    }

    /// Scan matched requests and return those with no session logged
    /// after their threshold date.
    ///
    /// A request only qualifies once the threshold lies after its
    /// match date, i.e. the engagement is old enough to have had
    /// three scheduled sessions. A session dated after the threshold
    /// counts as recent activity and excludes the request.
    pub async fn find_inactive(
        &self,
        now: DateTime<Utc>,
    ) -> MentoraResult<Vec<InactiveEngagement>> {
        let mut inactive = Vec::new();
        let mut offset = 0;
        loop {
            let page = self
                .request_repo
                .list_by_status(RequestStatus::Matched, Pagination { offset, limit: 100 })
                .await?;
            let fetched = page.items.len() as u64;

            for request in page.items {
                if let Some(found) = self.check_request(request, now).await? {
                    inactive.push(found);
                }
            }

            offset += fetched;
            if fetched == 0 || offset >= page.total {
                break;
            }
        }
        Ok(inactive)
    }

    async fn check_request(
        &self,
        request: MentorshipRequest,
        now: DateTime<Utc>,
    ) -> MentoraResult<Option<InactiveEngagement>> {
        let Some(match_date) = request.match_date else {
            debug!(request_id = %request.id, "matched request without match_date, skipping");
            return Ok(None);
        };

        // All calendar math happens in the request's own timezone.
        let tz = request.pairing.timezone;
        let today = now.with_timezone(&tz).date_naive();
        let matched_on = match_date.with_timezone(&tz).date_naive();

        let Some(threshold) = inactivity_threshold(&request.pairing.days, today) else {
            return Ok(None);
        };
        // Too young to have had three scheduled sessions.
        if threshold <= matched_on {
            return Ok(None);
        }

        if self.session_repo.exists_after(request.id, threshold).await? {
            return Ok(None);
        }

        debug!(
            request_id = %request.id,
            threshold = %threshold,
            "no session logged after threshold, flagging inactive"
        );
        Ok(Some(InactiveEngagement { request, threshold }))
    }
}
