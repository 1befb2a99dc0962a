//! Rating submission and per-user aggregation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use mentora_core::error::MentoraResult;
use mentora_core::models::rating::{CreateRating, Rating};
use mentora_core::models::request::ParticipantRole;
use mentora_core::repository::{RatingRepository, RequestRepository, SessionRepository};

use crate::error::SessionError;

/// Running rating averages for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    pub average_rating: f64,
    pub average_mentor_rating: f64,
    pub average_mentee_rating: f64,
    /// Count of rating rows, not of individual criterion scores.
    pub total_ratings: u64,
}

pub struct RatingService<R, S, G>
where
    R: RequestRepository,
    S: SessionRepository,
    G: RatingRepository,
{
    request_repo: R,
    session_repo: S,
    rating_repo: G,
}

impl<R, S, G> RatingService<R, S, G>
where
    R: RequestRepository,
    S: SessionRepository,
    G: RatingRepository,
{
    pub fn new(request_repo: R, session_repo: S, rating_repo: G) -> Self {
        Self {
            request_repo,
            session_repo,
            rating_repo,
        }
    }

    /// Submit a rating for a session.
    ///
    /// One rating per (session, author): a duplicate submission is a
    /// conflict and leaves the original untouched.
    pub async fn submit_rating(
        &self,
        session_id: Uuid,
        author_id: Uuid,
        scores: BTreeMap<String, u8>,
        scale: u8,
    ) -> MentoraResult<Rating> {
        // 1. The author must be a party to the session's request.
        let session = self.session_repo.get_by_id(session_id).await?;
        let request = self.request_repo.get_by_id(session.request_id).await?;
        request
            .participant_role(author_id)
            .ok_or(SessionError::NotParty)?;

        // 2. Shape checks.
        if scores.is_empty() {
            return Err(SessionError::EmptyScores.into());
        }
        if let Some((criterion, _)) = scores.iter().find(|(_, score)| **score > scale) {
            return Err(SessionError::ScoreOutOfScale {
                criterion: criterion.clone(),
                scale,
            }
            .into());
        }

        self.rating_repo
            .create(CreateRating {
                session_id,
                author_id,
                scores,
                scale,
            })
            .await
    }

    /// Fold all of a user's rating submissions into running averages.
    ///
    /// Individual criterion scores are flattened into one list per
    /// role (the role the user held on the rating's parent request)
    /// and averaged to one decimal place. The overall average is the
    /// simple mean of the two role averages, not a weighted mean over
    /// all scores.
    pub async fn aggregate_for_user(&self, user_id: Uuid) -> MentoraResult<RatingSummary> {
        let ratings = self.rating_repo.list_by_author(user_id).await?;

        let mut mentor_scores: Vec<u8> = Vec::new();
        let mut mentee_scores: Vec<u8> = Vec::new();
        let total_ratings = ratings.len() as u64;

        for rating in ratings {
            let session = self.session_repo.get_by_id(rating.session_id).await?;
            let request = self.request_repo.get_by_id(session.request_id).await?;
            match request.participant_role(user_id) {
                Some(ParticipantRole::Mentor) => {
                    mentor_scores.extend(rating.scores.values().copied());
                }
                Some(ParticipantRole::Mentee) => {
                    mentee_scores.extend(rating.scores.values().copied());
                }
                None => {
                    warn!(
                        rating_id = %rating.id,
                        request_id = %request.id,
                        user_id = %user_id,
                        "rating author no longer holds a role on the request, skipping"
                    );
                }
            }
        }

        let mentor_avg = mean_one_decimal(&mentor_scores);
        let mentee_avg = mean_one_decimal(&mentee_scores);
        let average_rating = match (mentor_avg, mentee_avg) {
            (Some(mentor), Some(mentee)) => (mentor + mentee) / 2.0,
            (Some(avg), None) | (None, Some(avg)) => avg,
            (None, None) => 0.0,
        };

        Ok(RatingSummary {
            average_rating,
            average_mentor_rating: mentor_avg.unwrap_or(0.0),
            average_mentee_rating: mentee_avg.unwrap_or(0.0),
            total_ratings,
        })
    }
}

fn mean_one_decimal(scores: &[u8]) -> Option<f64> {
    if scores.is_empty() {
        return None;
    }
    let sum: u64 = scores.iter().map(|s| u64::from(*s)).sum();
    let mean = sum as f64 / scores.len() as f64;
    Some((mean * 10.0).round() / 10.0)
}
