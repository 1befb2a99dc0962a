//! Session service configuration.

/// Configuration for the session service.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Project the confirmed session hours are booked against in the
    /// external time tracker.
    pub time_project_id: String,
    /// Recipients of the fallback mail sent when booking hours fails.
    pub fallback_recipients: Vec<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            time_project_id: "mentorship".into(),
            fallback_recipients: Vec::new(),
        }
    }
}
