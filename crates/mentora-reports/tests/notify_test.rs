//! Tests for notification routing: recipient resolution,
//! deduplication, and placement splitting.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveTime, Utc, Weekday};
use uuid::Uuid;

use mentora_core::error::{MentoraError, MentoraResult};
use mentora_core::integrations::{DirectoryService, DirectoryUser, MailMessage, Mailer};
use mentora_core::models::pairing::Pairing;
use mentora_core::models::request::{MentorshipRequest, RequestKind, RequestStatus};
use mentora_reports::{InactiveEngagement, Notifier};

/// Directory backed by a fixed map, counting lookups.
#[derive(Clone, Default)]
struct MapDirectory {
    users: HashMap<Uuid, DirectoryUser>,
    lookups: Arc<Mutex<u32>>,
}

impl MapDirectory {
    fn with_user(mut self, id: Uuid, email: &str, placement: Option<&str>) -> Self {
        self.users.insert(
            id,
            DirectoryUser {
                id,
                email: email.into(),
                name: "Test User".into(),
                placement: placement.map(String::from),
            },
        );
        self
    }
}

impl DirectoryService for MapDirectory {
    async fn get_user_by_id(&self, id: Uuid) -> MentoraResult<DirectoryUser> {
        *self.lookups.lock().unwrap() += 1;
        self.users.get(&id).cloned().ok_or(MentoraError::NotFound {
            entity: "user".into(),
            id: id.to_string(),
        })
    }

    async fn get_users_by_email(&self, emails: &[String]) -> MentoraResult<Vec<DirectoryUser>> {
        Ok(self
            .users
            .values()
            .filter(|u| emails.contains(&u.email))
            .cloned()
            .collect())
    }
}

#[derive(Clone, Default)]
struct FakeMailer {
    messages: Arc<Mutex<Vec<MailMessage>>>,
}

impl Mailer for FakeMailer {
    async fn send(&self, message: MailMessage) -> MentoraResult<()> {
        self.messages.lock().unwrap().push(message);
        Ok(())
    }
}

fn request(creator_id: Uuid, mentor_id: Option<Uuid>, mentee_id: Option<Uuid>) -> MentorshipRequest {
    MentorshipRequest {
        id: Uuid::new_v4(),
        creator_id,
        mentor_id,
        mentee_id,
        title: "Mentorship".into(),
        description: "".into(),
        kind: RequestKind::SeekingMentor,
        status: if mentor_id.is_some() {
            RequestStatus::Matched
        } else {
            RequestStatus::Open
        },
        cancel_reason: None,
        match_date: mentor_id.map(|_| Utc::now()),
        duration_months: 3.0,
        pairing: Pairing {
            start_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
            days: vec![Weekday::Mon],
            timezone: chrono_tz::UTC,
        },
        interested: vec![],
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[tokio::test]
async fn inactivity_mail_reaches_both_parties() {
    let mentor = Uuid::new_v4();
    let mentee = Uuid::new_v4();
    let directory = MapDirectory::default()
        .with_user(mentor, "mentor@example.com", None)
        .with_user(mentee, "mentee@example.com", None);
    let mailer = FakeMailer::default();
    let notifier = Notifier::new(directory, mailer.clone());

    let engagement = InactiveEngagement {
        request: request(mentee, Some(mentor), Some(mentee)),
        threshold: NaiveDate::from_ymd_opt(2021, 1, 11).unwrap(),
    };
    notifier.notify_inactive(&engagement).await;

    let messages = mailer.messages.lock().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].template, "session-inactivity");
    assert_eq!(
        messages[0].recipients,
        vec!["mentor@example.com".to_string(), "mentee@example.com".to_string()]
    );
}

#[tokio::test]
async fn inactivity_recipients_are_deduplicated() {
    let mentor = Uuid::new_v4();
    let mentee = Uuid::new_v4();
    // Both parties resolve to the same address.
    let directory = MapDirectory::default()
        .with_user(mentor, "shared@example.com", None)
        .with_user(mentee, "shared@example.com", None);
    let mailer = FakeMailer::default();
    let notifier = Notifier::new(directory, mailer.clone());

    let engagement = InactiveEngagement {
        request: request(mentee, Some(mentor), Some(mentee)),
        threshold: NaiveDate::from_ymd_opt(2021, 1, 11).unwrap(),
    };
    notifier.notify_inactive(&engagement).await;

    let messages = mailer.messages.lock().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].recipients, vec!["shared@example.com".to_string()]);
}

#[tokio::test]
async fn inactivity_mail_is_skipped_when_nobody_resolves() {
    let mentor = Uuid::new_v4();
    let mentee = Uuid::new_v4();
    let mailer = FakeMailer::default();
    let notifier = Notifier::new(MapDirectory::default(), mailer.clone());

    let engagement = InactiveEngagement {
        request: request(mentee, Some(mentor), Some(mentee)),
        threshold: NaiveDate::from_ymd_opt(2021, 1, 11).unwrap(),
    };
    notifier.notify_inactive(&engagement).await;

    assert!(mailer.messages.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unmatched_routing_dedupes_creators_and_splits_by_placement() {
    let placed_creator = Uuid::new_v4();
    let unplaced_creator = Uuid::new_v4();
    let directory = MapDirectory::default()
        .with_user(placed_creator, "placed@example.com", Some("Acme Corp"))
        .with_user(unplaced_creator, "unplaced@example.com", None);
    let lookups = directory.lookups.clone();
    let mailer = FakeMailer::default();
    let notifier = Notifier::new(directory, mailer.clone());

    // Two stale requests by the same creator, one by another.
    let stale = vec![
        request(placed_creator, None, None),
        request(placed_creator, None, None),
        request(unplaced_creator, None, None),
    ];
    let routing = notifier.notify_unmatched(&stale).await;

    assert_eq!(routing.placed, vec!["placed@example.com".to_string()]);
    assert_eq!(routing.unplaced, vec!["unplaced@example.com".to_string()]);
    // Deduplication happened before the directory calls.
    assert_eq!(*lookups.lock().unwrap(), 2);

    let messages = mailer.messages.lock().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].template, "request-unmatched-placed");
    assert_eq!(messages[1].template, "request-unmatched");
    assert_eq!(messages[0].payload["stale_requests"], 3);
}

#[tokio::test]
async fn unknown_creators_are_skipped_not_fatal() {
    let known = Uuid::new_v4();
    let directory = MapDirectory::default().with_user(known, "known@example.com", None);
    let mailer = FakeMailer::default();
    let notifier = Notifier::new(directory, mailer.clone());

    let stale = vec![request(Uuid::new_v4(), None, None), request(known, None, None)];
    let routing = notifier.notify_unmatched(&stale).await;

    assert!(routing.placed.is_empty());
    assert_eq!(routing.unplaced, vec!["known@example.com".to_string()]);
    // Only the unplaced bucket had recipients.
    assert_eq!(mailer.messages.lock().unwrap().len(), 1);
}
