//! SurrealDB implementation of [`RatingRepository`].
//!
//! One rating per (session, author), enforced by the UNIQUE index
//! `idx_rating_session_author`. A duplicate insert fails; it never
//! overwrites the existing rating.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use surrealdb::{Connection, Surreal};
use uuid::Uuid;

use mentora_core::error::MentoraResult;
use mentora_core::models::rating::{CreateRating, Rating};
use mentora_core::repository::RatingRepository;

use crate::error::DbError;
use crate::repository::is_unique_violation;

#[derive(Debug, Deserialize)]
struct RatingRow {
    session_id: String,
    author_id: String,
    scores: BTreeMap<String, u8>,
    scale: u8,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct RatingRowWithId {
    record_id: String,
    session_id: String,
    author_id: String,
    scores: BTreeMap<String, u8>,
    scale: u8,
    created_at: DateTime<Utc>,
}

impl RatingRow {
    fn into_rating(self, id: Uuid) -> Result<Rating, DbError> {
        let session_id = Uuid::parse_str(&self.session_id)
            .map_err(|e| DbError::Corrupt(format!("invalid session UUID: {e}")))?;
        let author_id = Uuid::parse_str(&self.author_id)
            .map_err(|e| DbError::Corrupt(format!("invalid author UUID: {e}")))?;
        Ok(Rating {
            id,
            session_id,
            author_id,
            scores: self.scores,
            scale: self.scale,
            created_at: self.created_at,
        })
    }
}

impl RatingRowWithId {
    fn try_into_rating(self) -> Result<Rating, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Corrupt(format!("invalid UUID: {e}")))?;
        RatingRow {
            session_id: self.session_id,
            author_id: self.author_id,
            scores: self.scores,
            scale: self.scale,
            created_at: self.created_at,
        }
        .into_rating(id)
    }
}

/// SurrealDB implementation of the rating repository.
#[derive(Clone)]
pub struct SurrealRatingRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealRatingRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> RatingRepository for SurrealRatingRepository<C> {
    async fn create(&self, input: CreateRating) -> MentoraResult<Rating> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::thing('rating', $id) SET \
                 session_id = $session_id, \
                 author_id = $author_id, \
                 scores = $scores, \
                 scale = $scale",
            )
            .bind(("id", id_str.clone()))
            .bind(("session_id", input.session_id.to_string()))
            .bind(("author_id", input.author_id.to_string()))
            .bind(("scores", input.scores))
            .bind(("scale", input.scale))
            .await
            .map_err(DbError::from)?;

        let mut result = match result.check() {
            Ok(r) => r,
            Err(e) if is_unique_violation(&e) => {
                return Err(DbError::AlreadyExists {
                    entity: "rating for this session and author".into(),
                }
                .into());
            }
            Err(e) => return Err(DbError::Surreal(e).into()),
        };

        let rows: Vec<RatingRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "rating".into(),
            id: id_str,
        })?;

        Ok(row.into_rating(id)?)
    }

    async fn get_by_session_and_author(
        &self,
        session_id: Uuid,
        author_id: Uuid,
    ) -> MentoraResult<Rating> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM rating \
                 WHERE session_id = $session_id AND author_id = $author_id",
            )
            .bind(("session_id", session_id.to_string()))
            .bind(("author_id", author_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RatingRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "rating".into(),
            id: format!("session={session_id} author={author_id}"),
        })?;

        Ok(row.try_into_rating()?)
    }

    async fn list_by_author(&self, author_id: Uuid) -> MentoraResult<Vec<Rating>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM rating \
                 WHERE author_id = $author_id \
                 ORDER BY created_at ASC",
            )
            .bind(("author_id", author_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RatingRowWithId> = result.take(0).map_err(DbError::from)?;

        Ok(rows
            .into_iter()
            .map(|row| row.try_into_rating())
            .collect::<Result<Vec<_>, DbError>>()?)
    }
}
