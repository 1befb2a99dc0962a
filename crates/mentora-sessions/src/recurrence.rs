//! Expected session dates from a recurring weekday pattern.
//!
//! Pure calendar arithmetic; no timezone handling happens here. The
//! caller converts its instants to local dates first.

use chrono::{Datelike, NaiveDate, Weekday};

/// All dates `d` with `start <= d < end` whose weekday is in `days`,
/// ascending.
///
/// An empty `days` set or `start >= end` yields an empty sequence,
/// not an error. Idempotent: identical inputs always produce the
/// identical sequence.
pub fn session_dates(start: NaiveDate, end: NaiveDate, days: &[Weekday]) -> Vec<NaiveDate> {
    if days.is_empty() || start >= end {
        return Vec::new();
    }

    let mut dates = Vec::new();
    let mut current = start;
    while current < end {
        if days.contains(&current.weekday()) {
            dates.push(current);
        }
        match current.succ_opt() {
            Some(next) => current = next,
            None => break,
        }
    }
    dates
}

/// The most recent `count` pattern dates strictly before `before`,
/// newest first.
///
/// Walks backward one day at a time, collecting every date whose
/// weekday is in `days`, cycling through the pattern as often as
/// needed. Returns fewer than `count` dates only if the calendar
/// itself runs out.
pub fn trailing_session_dates(before: NaiveDate, days: &[Weekday], count: usize) -> Vec<NaiveDate> {
    if days.is_empty() || count == 0 {
        return Vec::new();
    }

    let mut dates = Vec::with_capacity(count);
    let mut current = before.pred_opt();
    while let Some(day) = current {
        if days.contains(&day.weekday()) {
            dates.push(day);
            if dates.len() == count {
                break;
            }
        }
        current = day.pred_opt();
    }
    dates
}
