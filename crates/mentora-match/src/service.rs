//! Request service — lifecycle orchestration for mentorship requests.

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use mentora_core::error::{MentoraError, MentoraResult};
use mentora_core::integrations::{ChatService, DirectoryService};
use mentora_core::models::request::{
    CreateRequest, MentorshipRequest, RequestKind, RequestStatus, UpdateRequest,
};
use mentora_core::repository::{Pagination, RequestRepository};

use crate::error::MatchError;

/// Request lifecycle service.
///
/// Generic over the repository and integration implementations; chat
/// notifications are best-effort and never affect the persisted
/// transition.
pub struct RequestService<R, D, C>
where
    R: RequestRepository,
    D: DirectoryService,
    C: ChatService,
{
    request_repo: R,
    directory: D,
    chat: C,
}

impl<R, D, C> RequestService<R, D, C>
where
    R: RequestRepository,
    D: DirectoryService,
    C: ChatService,
{
    pub fn new(request_repo: R, directory: D, chat: C) -> Self {
        Self {
            request_repo,
            directory,
            chat,
        }
    }

    /// Open a new mentorship request.
    pub async fn open_request(&self, input: CreateRequest) -> MentoraResult<MentorshipRequest> {
        if input.title.trim().is_empty() {
            return Err(MentoraError::validation("title", "title is required"));
        }
        if input.duration_months <= 0.0 {
            return Err(MentoraError::validation(
                "duration_months",
                "duration must be positive",
            ));
        }
        input.pairing.validate()?;

        self.request_repo.create(input).await
    }

    /// Record a user's interest in an open request.
    ///
    /// Idempotent per user; only possible while the request is open,
    /// and never for the request's own creator.
    pub async fn register_interest(
        &self,
        request_id: Uuid,
        user_id: Uuid,
    ) -> MentoraResult<MentorshipRequest> {
        let request = self.request_repo.get_by_id(request_id).await?;
        if request.status != RequestStatus::Open {
            return Err(MatchError::NotOpen(request.status).into());
        }
        if user_id == request.creator_id {
            return Err(MatchError::OwnRequest.into());
        }
        if request.interested.contains(&user_id) {
            return Ok(request);
        }

        let mut interested = request.interested;
        interested.push(user_id);
        self.request_repo
            .update(
                request_id,
                UpdateRequest {
                    interested: Some(interested),
                    ..Default::default()
                },
            )
            .await
    }

    /// Match an open request with a counterpart.
    ///
    /// The counterpart takes the side the creator was seeking; the
    /// creator takes the other. Sets `match_date` to now, which
    /// anchors every expected-session-date computation from here on.
    pub async fn match_request(
        &self,
        request_id: Uuid,
        counterpart_id: Uuid,
    ) -> MentoraResult<MentorshipRequest> {
        // 1. Only open requests can be matched.
        let request = self.request_repo.get_by_id(request_id).await?;
        if request.status != RequestStatus::Open {
            return Err(MatchError::NotOpen(request.status).into());
        }
        if counterpart_id == request.creator_id {
            return Err(MatchError::OwnRequest.into());
        }

        // 2. Assign sides according to what the request was seeking.
        let (mentor_id, mentee_id) = match request.kind {
            RequestKind::SeekingMentor => (counterpart_id, request.creator_id),
            RequestKind::SeekingMentee => (request.creator_id, counterpart_id),
        };

        let updated = self
            .request_repo
            .update(
                request_id,
                UpdateRequest {
                    status: Some(RequestStatus::Matched),
                    mentor_id: Some(mentor_id),
                    mentee_id: Some(mentee_id),
                    match_date: Some(Some(Utc::now())),
                    ..Default::default()
                },
            )
            .await?;

        info!(
            request_id = %request_id,
            mentor_id = %mentor_id,
            mentee_id = %mentee_id,
            "mentorship request matched"
        );

        // 3. Tell both parties. Chat is fire-and-forget.
        self.notify_matched(&updated, mentor_id).await;
        self.notify_matched(&updated, mentee_id).await;

        Ok(updated)
    }

    /// Cancel an open or matched request with a recorded reason.
    pub async fn cancel_request(
        &self,
        request_id: Uuid,
        actor_id: Uuid,
        reason: String,
    ) -> MentoraResult<MentorshipRequest> {
        let request = self.request_repo.get_by_id(request_id).await?;
        if actor_id != request.creator_id && !request.is_participant(actor_id) {
            return Err(MatchError::NotAuthorized.into());
        }
        match request.status {
            RequestStatus::Cancelled => return Err(MatchError::AlreadyCancelled.into()),
            RequestStatus::Completed => return Err(MatchError::CompletedRequest.into()),
            RequestStatus::Open | RequestStatus::Matched => {}
        }

        // A cancelled request is no longer matched; clearing the
        // match date keeps it non-null only for matched and
        // completed requests.
        let match_date = match request.status {
            RequestStatus::Matched => Some(None),
            _ => None,
        };

        self.request_repo
            .update(
                request_id,
                UpdateRequest {
                    status: Some(RequestStatus::Cancelled),
                    cancel_reason: Some(reason),
                    match_date,
                    ..Default::default()
                },
            )
            .await
    }

    /// Sweep matched requests whose engagement window has elapsed and
    /// mark them completed. Safe to re-run at any cadence.
    pub async fn complete_due_requests(&self, now: DateTime<Utc>) -> MentoraResult<Vec<Uuid>> {
        // Collect the full matched set first; the updates below would
        // otherwise shift the pages under the scan.
        let mut matched = Vec::new();
        let mut offset = 0;
        loop {
            let page = self
                .request_repo
                .list_by_status(RequestStatus::Matched, Pagination { offset, limit: 100 })
                .await?;
            let fetched = page.items.len() as u64;
            matched.extend(page.items);
            offset += fetched;
            if fetched == 0 || offset >= page.total {
                break;
            }
        }

        let mut completed = Vec::new();
        for request in matched {
            let Some(end) = request.engagement_end() else {
                warn!(request_id = %request.id, "matched request without match_date, skipping");
                continue;
            };
            if now >= end {
                self.request_repo
                    .update(
                        request.id,
                        UpdateRequest {
                            status: Some(RequestStatus::Completed),
                            ..Default::default()
                        },
                    )
                    .await?;
                info!(request_id = %request.id, "mentorship request completed");
                completed.push(request.id);
            }
        }
        Ok(completed)
    }

    async fn notify_matched(&self, request: &MentorshipRequest, user_id: Uuid) {
        let user = match self.directory.get_user_by_id(user_id).await {
            Ok(user) => user,
            Err(err) => {
                warn!(
                    request_id = %request.id,
                    user_id = %user_id,
                    error = %err,
                    "directory lookup failed, skipping match notification"
                );
                return;
            }
        };
        let text = format!(
            "Your mentorship request '{}' has been matched.",
            request.title
        );
        if let Err(err) = self.chat.send_message(&user.email, &text).await {
            warn!(
                request_id = %request.id,
                user_id = %user_id,
                error = %err,
                "match notification failed"
            );
        }
    }
}
