//! Session service — logging, mutual approval, and schedule reports.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use tracing::warn;
use uuid::Uuid;

use mentora_core::error::{MentoraError, MentoraResult};
use mentora_core::integrations::{DirectoryService, MailMessage, Mailer, TimeEntry, TimeTracker};
use mentora_core::models::request::{MentorshipRequest, ParticipantRole};
use mentora_core::models::session::{Approval, CreateSession, Session};
use mentora_core::repository::{RequestRepository, SessionRepository};

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::reconcile::{self, ExpectedSession};
use crate::recurrence;

/// Session service.
///
/// Generic over repository and integration implementations so that
/// the scheduling layer has no dependency on the database crate or
/// any concrete external client.
pub struct SessionService<R, S, D, T, M>
where
    R: RequestRepository,
    S: SessionRepository,
    D: DirectoryService,
    T: TimeTracker,
    M: Mailer,
{
    request_repo: R,
    session_repo: S,
    directory: D,
    tracker: T,
    mailer: M,
    config: SessionConfig,
}

impl<R, S, D, T, M> SessionService<R, S, D, T, M>
where
    R: RequestRepository,
    S: SessionRepository,
    D: DirectoryService,
    T: TimeTracker,
    M: Mailer,
{
    pub fn new(
        request_repo: R,
        session_repo: S,
        directory: D,
        tracker: T,
        mailer: M,
        config: SessionConfig,
    ) -> Self {
        Self {
            request_repo,
            session_repo,
            directory,
            tracker,
            mailer,
            config,
        }
    }

    /// Log a session for a request date.
    ///
    /// The actor's own side is approved immediately; the session is
    /// not confirmed until the counterpart approves too. A second
    /// session on the same (request, date) is a conflict.
    pub async fn log_session(
        &self,
        request_id: Uuid,
        actor_id: Uuid,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> MentoraResult<Session> {
        // 1. Resolve the request and the actor's role on it.
        let request = self.request_repo.get_by_id(request_id).await?;
        let role = request
            .participant_role(actor_id)
            .ok_or(SessionError::NotParty)?;

        if start_time >= end_time {
            return Err(SessionError::InvalidTimes.into());
        }

        // 2. Create with the actor's side pre-approved. The unique
        //    (request, date) index turns a duplicate into a conflict.
        let now = Utc::now();
        let (mentee_approval, mentee_logged_at, mentor_approval, mentor_logged_at) = match role {
            ParticipantRole::Mentee => (Approval::Approved, Some(now), Approval::Unset, None),
            ParticipantRole::Mentor => (Approval::Unset, None, Approval::Approved, Some(now)),
        };

        self.session_repo
            .create(CreateSession {
                request_id,
                date,
                start_time,
                end_time,
                mentee_approval,
                mentee_logged_at,
                mentor_approval,
                mentor_logged_at,
            })
            .await
    }

    /// Approve a logged session for the actor's role.
    ///
    /// Idempotent per role: re-approving neither moves the original
    /// timestamp nor touches the other role's flag. The transition
    /// into fully-confirmed happens at most once per session, and the
    /// time-tracking side effect fires exactly on that transition.
    pub async fn approve_session(&self, session_id: Uuid, actor_id: Uuid) -> MentoraResult<Session> {
        // 1. Resolve session, request, and role.
        let session = self.session_repo.get_by_id(session_id).await?;
        let request = self.request_repo.get_by_id(session.request_id).await?;
        let role = request
            .participant_role(actor_id)
            .ok_or(SessionError::NotParty)?;

        // 2. Already approved for this role: nothing to do.
        if session.approval_for(role) == Approval::Approved {
            return Ok(session);
        }

        // 3. Flip this role's flag only.
        let updated = self
            .session_repo
            .set_approval(session_id, role, Approval::Approved, Utc::now())
            .await?;

        // 4. This call flipped a previously non-approved flag, so a
        //    confirmed result means the transition happened here.
        if updated.is_confirmed() {
            self.book_confirmed_hours(&request, &updated).await;
        }

        Ok(updated)
    }

    /// Reject a logged session for the actor's role.
    ///
    /// Only the actor's side moves to rejected; the counterpart's
    /// flag is untouched, so a session can be rejected by one party
    /// and still pending the other.
    pub async fn reject_session(&self, session_id: Uuid, actor_id: Uuid) -> MentoraResult<Session> {
        let session = self.session_repo.get_by_id(session_id).await?;
        let request = self.request_repo.get_by_id(session.request_id).await?;
        let role = request
            .participant_role(actor_id)
            .ok_or(SessionError::NotParty)?;

        self.session_repo
            .set_approval(session_id, role, Approval::Rejected, Utc::now())
            .await
    }

    /// Schedule report up to the next upcoming session.
    pub async fn schedule_report(
        &self,
        request_id: Uuid,
        now: DateTime<Utc>,
    ) -> MentoraResult<Vec<ExpectedSession>> {
        let (dates, sessions, today) = self.schedule_inputs(request_id, now).await?;
        Ok(reconcile::reconcile_next(&dates, &sessions, today))
    }

    /// Full schedule report: every expected date classified.
    pub async fn full_schedule_report(
        &self,
        request_id: Uuid,
        now: DateTime<Utc>,
    ) -> MentoraResult<Vec<ExpectedSession>> {
        let (dates, sessions, today) = self.schedule_inputs(request_id, now).await?;
        Ok(reconcile::reconcile_all(&dates, &sessions, today))
    }

    /// Expected dates, logged sessions, and "today", all in the
    /// request's own timezone.
    async fn schedule_inputs(
        &self,
        request_id: Uuid,
        now: DateTime<Utc>,
    ) -> MentoraResult<(Vec<NaiveDate>, Vec<Session>, NaiveDate)> {
        let request = self.request_repo.get_by_id(request_id).await?;
        let match_date = request
            .match_date
            .ok_or(SessionError::NotMatched(request_id))?;
        let end = request
            .engagement_end()
            .ok_or_else(|| MentoraError::Internal("matched request without engagement end".into()))?;

        let tz = request.pairing.timezone;
        let start_local = match_date.with_timezone(&tz).date_naive();
        let end_local = end.with_timezone(&tz).date_naive();
        let today = now.with_timezone(&tz).date_naive();

        let dates = recurrence::session_dates(start_local, end_local, &request.pairing.days);
        let sessions = self.session_repo.list_by_request(request_id).await?;
        Ok((dates, sessions, today))
    }

    /// Book the confirmed session's hours in the external tracker.
    ///
    /// Best-effort: a failure never rolls the confirmation back. It
    /// falls back to a mail for manual booking instead.
    async fn book_confirmed_hours(&self, request: &MentorshipRequest, session: &Session) {
        if let Err(err) = self.try_book_hours(request, session).await {
            warn!(
                session_id = %session.id,
                request_id = %request.id,
                error = %err,
                "booking session hours failed, sending fallback mail"
            );
            let message = MailMessage {
                template: "session-hours-fallback".into(),
                recipients: self.config.fallback_recipients.clone(),
                payload: serde_json::json!({
                    "request_id": request.id,
                    "session_id": session.id,
                    "title": request.title,
                    "date": session.date,
                    "minutes": (session.end_time - session.start_time).num_minutes(),
                }),
            };
            if let Err(mail_err) = self.mailer.send(message).await {
                warn!(
                    session_id = %session.id,
                    error = %mail_err,
                    "fallback mail failed"
                );
            }
        }
    }

    async fn try_book_hours(
        &self,
        request: &MentorshipRequest,
        session: &Session,
    ) -> MentoraResult<()> {
        let mentor_id = request.mentor_id.ok_or_else(|| {
            MentoraError::Internal("confirmed session on a request without a mentor".into())
        })?;
        let mentor = self.directory.get_user_by_id(mentor_id).await?;
        let account = self.tracker.get_account_by_email(&mentor.email).await?;
        let minutes = (session.end_time - session.start_time).num_minutes();

        self.tracker
            .post_entry(TimeEntry {
                date: session.date,
                account_id: account.id,
                minutes,
                description: format!("Mentorship session: {}", request.title),
                project_id: self.config.time_project_id.clone(),
            })
            .await
    }
}
