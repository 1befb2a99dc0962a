//! Mentora Reports — read-only batch detectors over the request
//! store and the notification routing they feed.
//!
//! The detectors are idempotent scans, safe to re-run at any
//! cadence; their only side effects are the notifications routed
//! downstream.

pub mod inactivity;
pub mod notify;
pub mod unmatched;

pub use inactivity::{InactiveEngagement, InactivityDetector, inactivity_threshold};
pub use notify::{Notifier, UnmatchedRouting};
pub use unmatched::UnmatchedDetector;
