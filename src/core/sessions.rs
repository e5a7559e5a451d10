use chrono::{DateTime, Timelike, Utc};

use crate::config::{default_session_table, Config, SessionWindow};
use crate::models::Session;

/// Maps a UTC timestamp to a session bucket using a single ordered table.
#[derive(Debug, Clone)]
pub struct SessionClassifier {
    windows: Vec<SessionWindow>,
}

impl Default for SessionClassifier {
    fn default() -> Self {
        Self {
            windows: default_session_table(),
        }
    }
}

impl SessionClassifier {
    pub fn new(cfg: &Config) -> Self {
        Self {
            windows: cfg.sessions.clone(),
        }
    }

    pub fn with_windows(windows: Vec<SessionWindow>) -> Self {
        Self { windows }
    }

    pub fn windows(&self) -> &[SessionWindow] {
        &self.windows
    }

    pub fn classify(&self, ts: DateTime<Utc>) -> Session {
        let current_time = ts.hour() * 60 + ts.minute();

        for window in &self.windows {
            let start_min = window.start.0 * 60 + window.start.1;
            let end_min = window.end.0 * 60 + window.end.1;

            let in_session = if start_min < end_min {
                current_time >= start_min && current_time < end_min
            } else {
                // Wraps midnight (e.g. 22:00 - 06:00)
                current_time >= start_min || current_time < end_min
            };

            if in_session {
                return window.session;
            }
        }
        Session::OffHours
    }
}
