//! Notification routing for detector findings.
//!
//! Everything here is best-effort: directory or mail failures are
//! logged and never bubble up to fail a scan.

use tracing::warn;
use uuid::Uuid;

use mentora_core::integrations::{DirectoryService, MailMessage, Mailer};
use mentora_core::models::request::MentorshipRequest;

use crate::inactivity::InactiveEngagement;

/// Outcome of routing the unmatched-request findings.
#[derive(Debug, Clone, Default)]
pub struct UnmatchedRouting {
    /// Requester emails with a known external placement.
    pub placed: Vec<String>,
    /// Requester emails without one.
    pub unplaced: Vec<String>,
}

pub struct Notifier<D, M>
where
    D: DirectoryService,
    M: Mailer,
{
    directory: D,
    mailer: M,
}

impl<D, M> Notifier<D, M>
where
    D: DirectoryService,
    M: Mailer,
{
    pub fn new(directory: D, mailer: M) -> Self {
        Self { directory, mailer }
    }

    /// Mail both parties of an inactive engagement, deduplicated.
    pub async fn notify_inactive(&self, engagement: &InactiveEngagement) {
        let request = &engagement.request;
        let mut recipients = Vec::new();
        for user_id in [request.mentor_id, request.mentee_id].into_iter().flatten() {
            match self.directory.get_user_by_id(user_id).await {
                Ok(user) => {
                    if !recipients.contains(&user.email) {
                        recipients.push(user.email);
                    }
                }
                Err(err) => {
                    warn!(
                        request_id = %request.id,
                        user_id = %user_id,
                        error = %err,
                        "directory lookup failed for inactivity notification"
                    );
                }
            }
        }
        if recipients.is_empty() {
            warn!(request_id = %request.id, "no reachable recipients for inactivity notification");
            return;
        }

        let message = MailMessage {
            template: "session-inactivity".into(),
            recipients,
            payload: serde_json::json!({
                "request_id": request.id,
                "title": request.title,
                "threshold": engagement.threshold,
            }),
        };
        if let Err(err) = self.mailer.send(message).await {
            warn!(request_id = %request.id, error = %err, "inactivity mail failed");
        }
    }

    /// Route stale open requests to their creators, split by external
    /// placement status.
    ///
    /// Creators are deduplicated before any directory call; each
    /// unique creator costs at most one lookup. A failed lookup means
    /// the creator cannot be addressed at all and is skipped.
    pub async fn notify_unmatched(&self, stale: &[MentorshipRequest]) -> UnmatchedRouting {
        let mut creators: Vec<Uuid> = Vec::new();
        for request in stale {
            if !creators.contains(&request.creator_id) {
                creators.push(request.creator_id);
            }
        }

        let mut routing = UnmatchedRouting::default();
        for creator_id in creators {
            let user = match self.directory.get_user_by_id(creator_id).await {
                Ok(user) => user,
                Err(err) => {
                    warn!(
                        creator_id = %creator_id,
                        error = %err,
                        "directory lookup failed for unmatched notification"
                    );
                    continue;
                }
            };
            let placed = user.placement.as_deref().is_some_and(|p| !p.is_empty());
            if placed {
                routing.placed.push(user.email);
            } else {
                routing.unplaced.push(user.email);
            }
        }

        self.send_unmatched("request-unmatched-placed", &routing.placed, stale.len())
            .await;
        self.send_unmatched("request-unmatched", &routing.unplaced, stale.len())
            .await;

        routing
    }

    async fn send_unmatched(&self, template: &str, recipients: &[String], stale_count: usize) {
        if recipients.is_empty() {
            return;
        }
        let message = MailMessage {
            template: template.into(),
            recipients: recipients.to_vec(),
            payload: serde_json::json!({ "stale_requests": stale_count }),
        };
        if let Err(err) = self.mailer.send(message).await {
            warn!(template, error = %err, "unmatched mail failed");
        }
    }
}
