//! Integration tests for the request repository using in-memory
//! SurrealDB.

use chrono::{NaiveTime, Utc, Weekday};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

use mentora_core::error::MentoraError;
use mentora_core::models::pairing::Pairing;
use mentora_core::models::request::{CreateRequest, RequestKind, RequestStatus, UpdateRequest};
use mentora_core::models::session::{Approval, CreateSession};
use mentora_core::repository::{Pagination, RatingRepository, RequestRepository, SessionRepository};
use mentora_db::repository::{
    SurrealRatingRepository, SurrealRequestRepository, SurrealSessionRepository,
};

async fn setup() -> Surreal<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    mentora_db::run_migrations(&db).await.unwrap();
    db
}

fn pairing() -> Pairing {
    Pairing {
        start_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
        days: vec![Weekday::Mon, Weekday::Thu],
        timezone: chrono_tz::Europe::Rome,
    }
}

fn create_input(creator_id: Uuid) -> CreateRequest {
    CreateRequest {
        creator_id,
        title: "Learn systems programming".into(),
        description: "Looking for a mentor".into(),
        kind: RequestKind::SeekingMentor,
        duration_months: 3.0,
        pairing: pairing(),
    }
}

#[tokio::test]
async fn create_and_get_request() {
    let db = setup().await;
    let repo = SurrealRequestRepository::new(db);
    let creator_id = Uuid::new_v4();

    let request = repo.create(create_input(creator_id)).await.unwrap();

    assert_eq!(request.creator_id, creator_id);
    assert_eq!(request.status, RequestStatus::Open);
    assert_eq!(request.mentor_id, None);
    assert_eq!(request.mentee_id, None);
    assert_eq!(request.match_date, None);
    assert!(request.interested.is_empty());
    assert_eq!(request.pairing, pairing());

    let fetched = repo.get_by_id(request.id).await.unwrap();
    assert_eq!(fetched.id, request.id);
    assert_eq!(fetched.title, "Learn systems programming");
}

#[tokio::test]
async fn get_missing_request_is_not_found() {
    let db = setup().await;
    let repo = SurrealRequestRepository::new(db);

    let err = repo.get_by_id(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, MentoraError::NotFound { .. }));
}

#[tokio::test]
async fn update_transitions_to_matched() {
    let db = setup().await;
    let repo = SurrealRequestRepository::new(db);
    let creator_id = Uuid::new_v4();
    let mentor_id = Uuid::new_v4();

    let request = repo.create(create_input(creator_id)).await.unwrap();
    let match_date = Utc::now();

    let updated = repo
        .update(
            request.id,
            UpdateRequest {
                status: Some(RequestStatus::Matched),
                mentor_id: Some(mentor_id),
                mentee_id: Some(creator_id),
                match_date: Some(Some(match_date)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.status, RequestStatus::Matched);
    assert_eq!(updated.mentor_id, Some(mentor_id));
    assert_eq!(updated.mentee_id, Some(creator_id));
    let stored = updated.match_date.unwrap();
    assert!((stored - match_date).num_seconds().abs() < 1);
}

#[tokio::test]
async fn update_interested_replaces_list() {
    let db = setup().await;
    let repo = SurrealRequestRepository::new(db);
    let request = repo.create(create_input(Uuid::new_v4())).await.unwrap();

    let user = Uuid::new_v4();
    let updated = repo
        .update(
            request.id,
            UpdateRequest {
                interested: Some(vec![user]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.interested, vec![user]);
}

#[tokio::test]
async fn list_by_status_paginates() {
    let db = setup().await;
    let repo = SurrealRequestRepository::new(db);

    for _ in 0..3 {
        repo.create(create_input(Uuid::new_v4())).await.unwrap();
    }

    let page = repo
        .list_by_status(RequestStatus::Open, Pagination::default())
        .await
        .unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.items.len(), 3);

    let small = repo
        .list_by_status(RequestStatus::Open, Pagination { offset: 2, limit: 2 })
        .await
        .unwrap();
    assert_eq!(small.total, 3);
    assert_eq!(small.items.len(), 1);

    let matched = repo
        .list_by_status(RequestStatus::Matched, Pagination::default())
        .await
        .unwrap();
    assert_eq!(matched.total, 0);
    assert!(matched.items.is_empty());
}

#[tokio::test]
async fn delete_cascades_to_sessions_and_ratings() {
    let db = setup().await;
    let request_repo = SurrealRequestRepository::new(db.clone());
    let session_repo = SurrealSessionRepository::new(db.clone());
    let rating_repo = SurrealRatingRepository::new(db);

    let request = request_repo
        .create(create_input(Uuid::new_v4()))
        .await
        .unwrap();

    let session = session_repo
        .create(CreateSession {
            request_id: request.id,
            date: chrono::NaiveDate::from_ymd_opt(2021, 1, 4).unwrap(),
            start_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
            mentee_approval: Approval::Approved,
            mentee_logged_at: Some(Utc::now()),
            mentor_approval: Approval::Unset,
            mentor_logged_at: None,
        })
        .await
        .unwrap();

    let author = Uuid::new_v4();
    rating_repo
        .create(mentora_core::models::rating::CreateRating {
            session_id: session.id,
            author_id: author,
            scores: [("communication".to_string(), 4u8)].into_iter().collect(),
            scale: 5,
        })
        .await
        .unwrap();

    request_repo.delete(request.id).await.unwrap();

    assert!(matches!(
        request_repo.get_by_id(request.id).await.unwrap_err(),
        MentoraError::NotFound { .. }
    ));
    assert!(matches!(
        session_repo.get_by_id(session.id).await.unwrap_err(),
        MentoraError::NotFound { .. }
    ));
    assert!(matches!(
        rating_repo
            .get_by_session_and_author(session.id, author)
            .await
            .unwrap_err(),
        MentoraError::NotFound { .. }
    ));
}
