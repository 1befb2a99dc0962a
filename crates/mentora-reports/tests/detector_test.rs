//! Integration tests for the inactivity and unmatched-request
//! detectors.

use chrono::{Duration, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

use mentora_core::models::pairing::Pairing;
use mentora_core::models::request::{CreateRequest, RequestKind, RequestStatus, UpdateRequest};
use mentora_core::models::session::{Approval, CreateSession};
use mentora_core::repository::{RequestRepository, SessionRepository};
use mentora_db::repository::{SurrealRequestRepository, SurrealSessionRepository};
use mentora_reports::{InactivityDetector, UnmatchedDetector};

async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    mentora_db::run_migrations(&db).await.unwrap();
    db
}

fn mondays() -> Pairing {
    Pairing {
        start_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
        days: vec![Weekday::Mon],
        timezone: chrono_tz::UTC,
    }
}

async fn open_request(db: &Surreal<Db>) -> Uuid {
    let repo = SurrealRequestRepository::new(db.clone());
    repo.create(CreateRequest {
        creator_id: Uuid::new_v4(),
        title: "Mentorship".into(),
        description: "".into(),
        kind: RequestKind::SeekingMentor,
        duration_months: 6.0,
        pairing: mondays(),
    })
    .await
    .unwrap()
    .id
}

async fn matched_request(db: &Surreal<Db>, matched_on: chrono::DateTime<Utc>) -> Uuid {
    let repo = SurrealRequestRepository::new(db.clone());
    let id = open_request(db).await;
    repo.update(
        id,
        UpdateRequest {
            status: Some(RequestStatus::Matched),
            mentor_id: Some(Uuid::new_v4()),
            mentee_id: Some(Uuid::new_v4()),
            match_date: Some(Some(matched_on)),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    id
}

async fn log_session(db: &Surreal<Db>, request_id: Uuid, on: NaiveDate) {
    let repo = SurrealSessionRepository::new(db.clone());
    repo.create(CreateSession {
        request_id,
        date: on,
        start_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
        mentee_approval: Approval::Approved,
        mentee_logged_at: Some(Utc::now()),
        mentor_approval: Approval::Unset,
        mentor_logged_at: None,
    })
    .await
    .unwrap();
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn detector(db: &Surreal<Db>) -> InactivityDetector<SurrealRequestRepository<Db>, SurrealSessionRepository<Db>> {
    InactivityDetector::new(
        SurrealRequestRepository::new(db.clone()),
        SurrealSessionRepository::new(db.clone()),
    )
}

#[tokio::test]
async fn engagement_without_sessions_is_flagged() {
    let db = setup().await;
    let matched_on = Utc.with_ymd_and_hms(2021, 1, 4, 9, 0, 0).unwrap();
    let request_id = matched_request(&db, matched_on).await;

    let now = Utc.with_ymd_and_hms(2021, 2, 1, 9, 0, 0).unwrap();
    let inactive = detector(&db).find_inactive(now).await.unwrap();

    assert_eq!(inactive.len(), 1);
    assert_eq!(inactive[0].request.id, request_id);
    // Antepenultimate Monday before 2021-02-01.
    assert_eq!(inactive[0].threshold, date(2021, 1, 11));
}

#[tokio::test]
async fn a_session_inside_the_trailing_window_counts_as_activity() {
    let db = setup().await;
    let matched_on = Utc.with_ymd_and_hms(2021, 1, 4, 9, 0, 0).unwrap();
    let request_id = matched_request(&db, matched_on).await;
    log_session(&db, request_id, date(2021, 1, 25)).await;

    let now = Utc.with_ymd_and_hms(2021, 2, 1, 9, 0, 0).unwrap();
    let inactive = detector(&db).find_inactive(now).await.unwrap();

    assert!(inactive.is_empty());
}

#[tokio::test]
async fn a_session_on_the_threshold_does_not_count() {
    let db = setup().await;
    let matched_on = Utc.with_ymd_and_hms(2021, 1, 4, 9, 0, 0).unwrap();
    let request_id = matched_request(&db, matched_on).await;
    // Activity is strictly after the threshold; a session dated
    // exactly on it leaves the request inactive.
    log_session(&db, request_id, date(2021, 1, 11)).await;

    let now = Utc.with_ymd_and_hms(2021, 2, 1, 9, 0, 0).unwrap();
    let inactive = detector(&db).find_inactive(now).await.unwrap();

    assert_eq!(inactive.len(), 1);
}

#[tokio::test]
async fn young_engagements_are_not_candidates() {
    let db = setup().await;
    // Matched after the would-be threshold: too young for three
    // scheduled sessions.
    let matched_on = Utc.with_ymd_and_hms(2021, 1, 26, 9, 0, 0).unwrap();
    matched_request(&db, matched_on).await;

    let now = Utc.with_ymd_and_hms(2021, 2, 1, 9, 0, 0).unwrap();
    let inactive = detector(&db).find_inactive(now).await.unwrap();

    assert!(inactive.is_empty());
}

#[tokio::test]
async fn open_requests_are_ignored_by_the_inactivity_scan() {
    let db = setup().await;
    open_request(&db).await;

    let now = Utc.with_ymd_and_hms(2021, 2, 1, 9, 0, 0).unwrap();
    let inactive = detector(&db).find_inactive(now).await.unwrap();

    assert!(inactive.is_empty());
}

#[tokio::test]
async fn unmatched_scan_filters_by_age() {
    let db = setup().await;
    let stale_id = open_request(&db).await;

    let scanner = UnmatchedDetector::new(SurrealRequestRepository::new(db.clone()));

    // Seen from 30 hours in the future, the request is 30 hours old.
    let now = Utc::now() + Duration::hours(30);
    let stale = scanner.find_unmatched(24, now).await.unwrap();
    assert_eq!(stale.len(), 1);
    assert_eq!(stale[0].id, stale_id);

    // Seen from 10 hours in the future, it is too young.
    let now = Utc::now() + Duration::hours(10);
    let stale = scanner.find_unmatched(24, now).await.unwrap();
    assert!(stale.is_empty());
}

#[tokio::test]
async fn unmatched_scan_ignores_matched_requests() {
    let db = setup().await;
    matched_request(&db, Utc::now()).await;

    let scanner = UnmatchedDetector::new(SurrealRequestRepository::new(db.clone()));
    let now = Utc::now() + Duration::hours(30);
    let stale = scanner.find_unmatched(24, now).await.unwrap();
    assert!(stale.is_empty());
}
