//! SurrealDB implementation of [`RequestRepository`].

use chrono::{DateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use surrealdb::{Connection, Surreal};
use uuid::Uuid;

use mentora_core::error::MentoraResult;
use mentora_core::models::pairing::{Pairing, parse_weekday, weekday_name};
use mentora_core::models::request::{
    CreateRequest, MentorshipRequest, RequestKind, RequestStatus, UpdateRequest,
};
use mentora_core::repository::{PaginatedResult, Pagination, RequestRepository};

use crate::error::DbError;

/// DB-side pairing object; times and timezone stored as strings.
#[derive(Debug, Serialize, Deserialize)]
struct PairingRow {
    start_time: String,
    end_time: String,
    days: Vec<String>,
    timezone: String,
}

impl From<&Pairing> for PairingRow {
    fn from(pairing: &Pairing) -> Self {
        Self {
            start_time: pairing.start_time.to_string(),
            end_time: pairing.end_time.to_string(),
            days: pairing
                .days
                .iter()
                .map(|d| weekday_name(*d).to_string())
                .collect(),
            timezone: pairing.timezone.name().to_string(),
        }
    }
}

impl PairingRow {
    fn try_into_pairing(self) -> Result<Pairing, DbError> {
        let start_time = self
            .start_time
            .parse::<NaiveTime>()
            .map_err(|e| DbError::Corrupt(format!("invalid start_time: {e}")))?;
        let end_time = self
            .end_time
            .parse::<NaiveTime>()
            .map_err(|e| DbError::Corrupt(format!("invalid end_time: {e}")))?;
        let days = self
            .days
            .iter()
            .map(|name| {
                parse_weekday(name)
                    .ok_or_else(|| DbError::Corrupt(format!("unknown weekday: {name}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let timezone = self
            .timezone
            .parse::<Tz>()
            .map_err(|e| DbError::Corrupt(format!("invalid timezone: {e}")))?;
        Ok(Pairing {
            start_time,
            end_time,
            days,
            timezone,
        })
    }
}

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, Deserialize)]
struct RequestRow {
    creator_id: String,
    mentor_id: Option<String>,
    mentee_id: Option<String>,
    title: String,
    description: String,
    kind: String,
    status: String,
    cancel_reason: Option<String>,
    match_date: Option<DateTime<Utc>>,
    duration_months: f64,
    pairing: PairingRow,
    interested: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, Deserialize)]
struct RequestRowWithId {
    record_id: String,
    creator_id: String,
    mentor_id: Option<String>,
    mentee_id: Option<String>,
    title: String,
    description: String,
    kind: String,
    status: String,
    cancel_reason: Option<String>,
    match_date: Option<DateTime<Utc>>,
    duration_months: f64,
    pairing: PairingRow,
    interested: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_status(s: &str) -> Result<RequestStatus, DbError> {
    match s {
        "Open" => Ok(RequestStatus::Open),
        "Matched" => Ok(RequestStatus::Matched),
        "Completed" => Ok(RequestStatus::Completed),
        "Cancelled" => Ok(RequestStatus::Cancelled),
        other => Err(DbError::Corrupt(format!("unknown request status: {other}"))),
    }
}

pub(crate) fn status_to_string(s: RequestStatus) -> &'static str {
    match s {
        RequestStatus::Open => "Open",
        RequestStatus::Matched => "Matched",
        RequestStatus::Completed => "Completed",
        RequestStatus::Cancelled => "Cancelled",
    }
}

fn parse_kind(s: &str) -> Result<RequestKind, DbError> {
    match s {
        "SeekingMentor" => Ok(RequestKind::SeekingMentor),
        "SeekingMentee" => Ok(RequestKind::SeekingMentee),
        other => Err(DbError::Corrupt(format!("unknown request kind: {other}"))),
    }
}

fn kind_to_string(k: RequestKind) -> &'static str {
    match k {
        RequestKind::SeekingMentor => "SeekingMentor",
        RequestKind::SeekingMentee => "SeekingMentee",
    }
}

fn parse_uuid(s: &str, what: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(s).map_err(|e| DbError::Corrupt(format!("invalid {what} UUID: {e}")))
}

fn parse_uuid_opt(s: Option<String>, what: &str) -> Result<Option<Uuid>, DbError> {
    s.map(|v| parse_uuid(&v, what)).transpose()
}

impl RequestRow {
    fn into_request(self, id: Uuid) -> Result<MentorshipRequest, DbError> {
        Ok(MentorshipRequest {
            id,
            creator_id: parse_uuid(&self.creator_id, "creator")?,
            mentor_id: parse_uuid_opt(self.mentor_id, "mentor")?,
            mentee_id: parse_uuid_opt(self.mentee_id, "mentee")?,
            title: self.title,
            description: self.description,
            kind: parse_kind(&self.kind)?,
            status: parse_status(&self.status)?,
            cancel_reason: self.cancel_reason,
            match_date: self.match_date,
            duration_months: self.duration_months,
            pairing: self.pairing.try_into_pairing()?,
            interested: self
                .interested
                .iter()
                .map(|s| parse_uuid(s, "interested user"))
                .collect::<Result<Vec<_>, _>>()?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl RequestRowWithId {
    fn try_into_request(self) -> Result<MentorshipRequest, DbError> {
        let id = parse_uuid(&self.record_id, "request")?;
        RequestRow {
            creator_id: self.creator_id,
            mentor_id: self.mentor_id,
            mentee_id: self.mentee_id,
            title: self.title,
            description: self.description,
            kind: self.kind,
            status: self.status,
            cancel_reason: self.cancel_reason,
            match_date: self.match_date,
            duration_months: self.duration_months,
            pairing: self.pairing,
            interested: self.interested,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_request(id)
    }
}

/// Row struct for count queries.
#[derive(Debug, Deserialize)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the mentorship request repository.
#[derive(Clone)]
pub struct SurrealRequestRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealRequestRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> RequestRepository for SurrealRequestRepository<C> {
    async fn create(&self, input: CreateRequest) -> MentoraResult<MentorshipRequest> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let pairing = PairingRow::from(&input.pairing);

        let result = self
            .db
            .query(
                "CREATE type::thing('request', $id) SET \
                 creator_id = $creator_id, \
                 mentor_id = NONE, mentee_id = NONE, \
                 title = $title, description = $description, \
                 kind = $kind, status = 'Open', \
                 cancel_reason = NONE, match_date = NONE, \
                 duration_months = $duration_months, \
                 pairing = $pairing, \
                 interested = []",
            )
            .bind(("id", id_str.clone()))
            .bind(("creator_id", input.creator_id.to_string()))
            .bind(("title", input.title))
            .bind(("description", input.description))
            .bind(("kind", kind_to_string(input.kind).to_string()))
            .bind(("duration_months", input.duration_months))
            .bind(("pairing", pairing))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<RequestRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "request".into(),
            id: id_str,
        })?;

        Ok(row.into_request(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> MentoraResult<MentorshipRequest> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::thing('request', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RequestRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "request".into(),
            id: id_str,
        })?;

        Ok(row.into_request(id)?)
    }

    async fn update(&self, id: Uuid, input: UpdateRequest) -> MentoraResult<MentorshipRequest> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.title.is_some() {
            sets.push("title = $title");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        if input.status.is_some() {
            sets.push("status = $status");
        }
        if input.mentor_id.is_some() {
            sets.push("mentor_id = $mentor_id");
        }
        if input.mentee_id.is_some() {
            sets.push("mentee_id = $mentee_id");
        }
        if input.match_date.is_some() {
            sets.push("match_date = $match_date");
        }
        if input.cancel_reason.is_some() {
            sets.push("cancel_reason = $cancel_reason");
        }
        if input.interested.is_some() {
            sets.push("interested = $interested");
        }
        if input.pairing.is_some() {
            sets.push("pairing = $pairing");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::thing('request', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(title) = input.title {
            builder = builder.bind(("title", title));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }
        if let Some(status) = input.status {
            builder = builder.bind(("status", status_to_string(status).to_string()));
        }
        if let Some(mentor_id) = input.mentor_id {
            builder = builder.bind(("mentor_id", mentor_id.to_string()));
        }
        if let Some(mentee_id) = input.mentee_id {
            builder = builder.bind(("mentee_id", mentee_id.to_string()));
        }
        if let Some(match_date) = input.match_date {
            // match_date is Option<Option<..>>: Some(Some(v)) = set, Some(None) = clear
            builder = builder.bind(("match_date", match_date.map(surrealdb::sql::Datetime::from)));
        }
        if let Some(cancel_reason) = input.cancel_reason {
            builder = builder.bind(("cancel_reason", cancel_reason));
        }
        if let Some(interested) = input.interested {
            let ids: Vec<String> = interested.iter().map(Uuid::to_string).collect();
            builder = builder.bind(("interested", ids));
        }
        if let Some(ref pairing) = input.pairing {
            builder = builder.bind(("pairing", PairingRow::from(pairing)));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<RequestRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "request".into(),
            id: id_str,
        })?;

        Ok(row.into_request(id)?)
    }

    async fn delete(&self, id: Uuid) -> MentoraResult<()> {
        // Cascade: the request owns its sessions, and the sessions
        // own their ratings.
        let id_str = id.to_string();

        self.db
            .query(
                "DELETE rating WHERE session_id IN \
                 (SELECT VALUE meta::id(id) FROM session WHERE request_id = $id); \
                 DELETE session WHERE request_id = $id; \
                 DELETE type::thing('request', $id)",
            )
            .bind(("id", id_str))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list_by_status(
        &self,
        status: RequestStatus,
        pagination: Pagination,
    ) -> MentoraResult<PaginatedResult<MentorshipRequest>> {
        let status_str = status_to_string(status).to_string();

        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM request \
                 WHERE status = $status GROUP ALL",
            )
            .bind(("status", status_str.clone()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM request \
                 WHERE status = $status \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("status", status_str))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RequestRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_request())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
