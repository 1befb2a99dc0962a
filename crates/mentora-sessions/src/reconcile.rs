//! Reconciliation of expected dates against logged sessions.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use mentora_core::models::session::{Approval, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleStatus {
    Completed,
    Missed,
    Upcoming,
}

/// One expected session date, annotated at read time. Derived data,
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedSession {
    pub date: NaiveDate,
    pub status: ScheduleStatus,
    pub mentee_logged: bool,
    pub mentor_logged: bool,
}

/// Classify expected dates up to and including the next upcoming one.
///
/// Iteration stops after the first `Upcoming` entry: consumers of
/// this variant surface only the next future session, not the whole
/// remaining schedule.
pub fn reconcile_next(
    expected: &[NaiveDate],
    sessions: &[Session],
    today: NaiveDate,
) -> Vec<ExpectedSession> {
    let by_date = index_by_date(sessions);
    let mut entries = Vec::new();
    for &date in expected {
        let entry = classify(date, &by_date, today);
        let upcoming = entry.status == ScheduleStatus::Upcoming;
        entries.push(entry);
        if upcoming {
            break;
        }
    }
    entries
}

/// Classify every expected date; no early stop. For report-style
/// consumers that need the full completed/missed/upcoming breakdown.
pub fn reconcile_all(
    expected: &[NaiveDate],
    sessions: &[Session],
    today: NaiveDate,
) -> Vec<ExpectedSession> {
    let by_date = index_by_date(sessions);
    expected
        .iter()
        .map(|&date| classify(date, &by_date, today))
        .collect()
}

fn index_by_date(sessions: &[Session]) -> HashMap<NaiveDate, &Session> {
    sessions.iter().map(|s| (s.date, s)).collect()
}

fn classify(
    date: NaiveDate,
    by_date: &HashMap<NaiveDate, &Session>,
    today: NaiveDate,
) -> ExpectedSession {
    match by_date.get(&date) {
        Some(session) => ExpectedSession {
            date,
            status: if session.is_confirmed() {
                ScheduleStatus::Completed
            } else {
                ScheduleStatus::Missed
            },
            mentee_logged: session.mentee_approval == Approval::Approved,
            mentor_logged: session.mentor_approval == Approval::Approved,
        },
        None if date <= today => ExpectedSession {
            date,
            status: ScheduleStatus::Missed,
            mentee_logged: false,
            mentor_logged: false,
        },
        None => ExpectedSession {
            date,
            status: ScheduleStatus::Upcoming,
            mentee_logged: false,
            mentor_logged: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn session(on: NaiveDate, mentee: Approval, mentor: Approval) -> Session {
        Session {
            id: Uuid::new_v4(),
            request_id: Uuid::new_v4(),
            date: on,
            start_time: chrono::NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            end_time: chrono::NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
            mentee_approval: mentee,
            mentee_logged_at: None,
            mentor_approval: mentor,
            mentor_logged_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn confirmed_session_is_completed() {
        let expected = [date(2021, 1, 4)];
        let logged = [session(date(2021, 1, 4), Approval::Approved, Approval::Approved)];
        let result = reconcile_all(&expected, &logged, date(2021, 1, 10));
        assert_eq!(
            result,
            vec![ExpectedSession {
                date: date(2021, 1, 4),
                status: ScheduleStatus::Completed,
                mentee_logged: true,
                mentor_logged: true,
            }]
        );
    }

    #[test]
    fn half_approved_session_is_missed_with_mirrored_flags() {
        let expected = [date(2021, 1, 4)];
        let logged = [session(date(2021, 1, 4), Approval::Approved, Approval::Unset)];
        let result = reconcile_all(&expected, &logged, date(2021, 1, 10));
        assert_eq!(result[0].status, ScheduleStatus::Missed);
        assert!(result[0].mentee_logged);
        assert!(!result[0].mentor_logged);
    }

    #[test]
    fn rejected_flag_does_not_count_as_logged() {
        let expected = [date(2021, 1, 4)];
        let logged = [session(date(2021, 1, 4), Approval::Rejected, Approval::Approved)];
        let result = reconcile_all(&expected, &logged, date(2021, 1, 10));
        assert_eq!(result[0].status, ScheduleStatus::Missed);
        assert!(!result[0].mentee_logged);
        assert!(result[0].mentor_logged);
    }

    #[test]
    fn past_date_without_session_is_missed() {
        let result = reconcile_all(&[date(2021, 1, 4)], &[], date(2021, 1, 10));
        assert_eq!(result[0].status, ScheduleStatus::Missed);
    }

    #[test]
    fn today_without_session_is_missed() {
        let result = reconcile_all(&[date(2021, 1, 4)], &[], date(2021, 1, 4));
        assert_eq!(result[0].status, ScheduleStatus::Missed);
    }

    #[test]
    fn next_variant_stops_at_first_upcoming() {
        let expected = [
            date(2021, 1, 4),
            date(2021, 1, 11),
            date(2021, 1, 18),
            date(2021, 1, 25),
        ];
        let logged = [session(date(2021, 1, 4), Approval::Approved, Approval::Approved)];
        let result = reconcile_next(&expected, &logged, date(2021, 1, 12));

        // Two past dates plus the single next upcoming one.
        assert_eq!(result.len(), 3);
        assert_eq!(result[0].status, ScheduleStatus::Completed);
        assert_eq!(result[1].status, ScheduleStatus::Missed);
        assert_eq!(result[2].date, date(2021, 1, 18));
        assert_eq!(result[2].status, ScheduleStatus::Upcoming);
    }

    #[test]
    fn all_variant_keeps_every_future_date() {
        let expected = [date(2021, 1, 18), date(2021, 1, 25)];
        let result = reconcile_all(&expected, &[], date(2021, 1, 12));
        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|e| e.status == ScheduleStatus::Upcoming));
    }
}
