//! Stale open-request detection.

use chrono::{DateTime, Duration, Utc};

use mentora_core::error::MentoraResult;
use mentora_core::models::request::{MentorshipRequest, RequestStatus};
use mentora_core::repository::{Pagination, RequestRepository};

pub struct UnmatchedDetector<R: RequestRepository> {
    request_repo: R,
}

impl<R: RequestRepository> UnmatchedDetector<R> {
    pub fn new(request_repo: R) -> Self {
        Self { request_repo }
    }

    /// Open requests created at or before `now - age_threshold_hours`.
    ///
    /// A pure age filter; placement lookups and notification routing
    /// happen downstream in [`crate::notify::Notifier`].
    pub async fn find_unmatched(
        &self,
        age_threshold_hours: i64,
        now: DateTime<Utc>,
    ) -> MentoraResult<Vec<MentorshipRequest>> {
        let cutoff = now - Duration::hours(age_threshold_hours);

        let mut stale = Vec::new();
        let mut offset = 0;
        loop {
            let page = self
                .request_repo
                .list_by_status(RequestStatus::Open, Pagination { offset, limit: 100 })
                .await?;
            let fetched = page.items.len() as u64;

            stale.extend(
                page.items
                    .into_iter()
                    .filter(|request| request.created_at <= cutoff),
            );

            offset += fetched;
            if fetched == 0 || offset >= page.total {
                break;
            }
        }
        Ok(stale)
    }
}
