//! SurrealDB implementation of [`SessionRepository`].
//!
//! The one-session-per-(request, date) invariant is the UNIQUE index
//! `idx_session_request_date`: concurrent attempts to log the same
//! date make exactly one CREATE succeed while the others surface the
//! index violation as a conflict.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use surrealdb::{Connection, Surreal};
use uuid::Uuid;

use mentora_core::error::MentoraResult;
use mentora_core::models::request::ParticipantRole;
use mentora_core::models::session::{Approval, CreateSession, Session};
use mentora_core::repository::SessionRepository;

use crate::error::DbError;
use crate::repository::is_unique_violation;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, Deserialize)]
struct SessionRow {
    request_id: String,
    date: String,
    start_time: String,
    end_time: String,
    mentee_approval: String,
    mentee_logged_at: Option<DateTime<Utc>>,
    mentor_approval: String,
    mentor_logged_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, Deserialize)]
struct SessionRowWithId {
    record_id: String,
    request_id: String,
    date: String,
    start_time: String,
    end_time: String,
    mentee_approval: String,
    mentee_logged_at: Option<DateTime<Utc>>,
    mentor_approval: String,
    mentor_logged_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

fn parse_approval(s: &str) -> Result<Approval, DbError> {
    match s {
        "Unset" => Ok(Approval::Unset),
        "Approved" => Ok(Approval::Approved),
        "Rejected" => Ok(Approval::Rejected),
        other => Err(DbError::Corrupt(format!("unknown approval state: {other}"))),
    }
}

fn approval_to_string(a: Approval) -> &'static str {
    match a {
        Approval::Unset => "Unset",
        Approval::Approved => "Approved",
        Approval::Rejected => "Rejected",
    }
}

impl SessionRow {
    fn into_session(self, id: Uuid) -> Result<Session, DbError> {
        let request_id = Uuid::parse_str(&self.request_id)
            .map_err(|e| DbError::Corrupt(format!("invalid request UUID: {e}")))?;
        let date = self
            .date
            .parse::<NaiveDate>()
            .map_err(|e| DbError::Corrupt(format!("invalid session date: {e}")))?;
        let start_time = self
            .start_time
            .parse::<NaiveTime>()
            .map_err(|e| DbError::Corrupt(format!("invalid start_time: {e}")))?;
        let end_time = self
            .end_time
            .parse::<NaiveTime>()
            .map_err(|e| DbError::Corrupt(format!("invalid end_time: {e}")))?;
        Ok(Session {
            id,
            request_id,
            date,
            start_time,
            end_time,
            mentee_approval: parse_approval(&self.mentee_approval)?,
            mentee_logged_at: self.mentee_logged_at,
            mentor_approval: parse_approval(&self.mentor_approval)?,
            mentor_logged_at: self.mentor_logged_at,
            created_at: self.created_at,
        })
    }
}

impl SessionRowWithId {
    fn try_into_session(self) -> Result<Session, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Corrupt(format!("invalid UUID: {e}")))?;
        SessionRow {
            request_id: self.request_id,
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
            mentee_approval: self.mentee_approval,
            mentee_logged_at: self.mentee_logged_at,
            mentor_approval: self.mentor_approval,
            mentor_logged_at: self.mentor_logged_at,
            created_at: self.created_at,
        }
        .into_session(id)
    }
}

/// Row struct for count queries.
#[derive(Debug, Deserialize)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the session repository.
#[derive(Clone)]
pub struct SurrealSessionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealSessionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> SessionRepository for SurrealSessionRepository<C> {
    async fn create(&self, input: CreateSession) -> MentoraResult<Session> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::thing('session', $id) SET \
                 request_id = $request_id, \
                 date = $date, \
                 start_time = $start_time, end_time = $end_time, \
                 mentee_approval = $mentee_approval, \
                 mentee_logged_at = $mentee_logged_at, \
                 mentor_approval = $mentor_approval, \
                 mentor_logged_at = $mentor_logged_at",
            )
            .bind(("id", id_str.clone()))
            .bind(("request_id", input.request_id.to_string()))
            .bind(("date", input.date.to_string()))
            .bind(("start_time", input.start_time.to_string()))
            .bind(("end_time", input.end_time.to_string()))
            .bind((
                "mentee_approval",
                approval_to_string(input.mentee_approval).to_string(),
            ))
            .bind((
                "mentee_logged_at",
                input.mentee_logged_at.map(surrealdb::sql::Datetime::from),
            ))
            .bind((
                "mentor_approval",
                approval_to_string(input.mentor_approval).to_string(),
            ))
            .bind((
                "mentor_logged_at",
                input.mentor_logged_at.map(surrealdb::sql::Datetime::from),
            ))
            .await
            .map_err(DbError::from)?;

        let mut result = match result.check() {
            Ok(r) => r,
            Err(e) if is_unique_violation(&e) => {
                return Err(DbError::AlreadyExists {
                    entity: "session for this request and date".into(),
                }
                .into());
            }
            Err(e) => return Err(DbError::Surreal(e).into()),
        };

        let rows: Vec<SessionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "session".into(),
            id: id_str,
        })?;

        Ok(row.into_session(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> MentoraResult<Session> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::thing('session', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SessionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "session".into(),
            id: id_str,
        })?;

        Ok(row.into_session(id)?)
    }

    async fn list_by_request(&self, request_id: Uuid) -> MentoraResult<Vec<Session>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM session \
                 WHERE request_id = $request_id \
                 ORDER BY date ASC",
            )
            .bind(("request_id", request_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SessionRowWithId> = result.take(0).map_err(DbError::from)?;

        Ok(rows
            .into_iter()
            .map(|row| row.try_into_session())
            .collect::<Result<Vec<_>, DbError>>()?)
    }

    async fn set_approval(
        &self,
        id: Uuid,
        role: ParticipantRole,
        approval: Approval,
        at: DateTime<Utc>,
    ) -> MentoraResult<Session> {
        let id_str = id.to_string();
        let (approval_field, logged_field) = match role {
            ParticipantRole::Mentee => ("mentee_approval", "mentee_logged_at"),
            ParticipantRole::Mentor => ("mentor_approval", "mentor_logged_at"),
        };

        let query = format!(
            "UPDATE type::thing('session', $id) SET \
             {approval_field} = $approval, {logged_field} = $at",
        );

        let result = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("approval", approval_to_string(approval).to_string()))
            .bind(("at", surrealdb::sql::Datetime::from(at)))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<SessionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "session".into(),
            id: id_str,
        })?;

        Ok(row.into_session(id)?)
    }

    async fn exists_after(&self, request_id: Uuid, date: NaiveDate) -> MentoraResult<bool> {
        // Dates are ISO strings, so the string comparison is a date
        // comparison.
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM session \
                 WHERE request_id = $request_id AND date > $date \
                 GROUP ALL",
            )
            .bind(("request_id", request_id.to_string()))
            .bind(("date", date.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0) > 0)
    }
}
