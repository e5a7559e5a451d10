use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::models::Session;

pub type SharedConfig = Arc<RwLock<Config>>;

/// A session bucket expressed as UTC (hour, minute) offsets, `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionWindow {
    pub session: Session,
    pub start: (u32, u32),
    pub end: (u32, u32),
}

impl SessionWindow {
    pub const fn new(session: Session, start: (u32, u32), end: (u32, u32)) -> Self {
        Self {
            session,
            start,
            end,
        }
    }
}

/// The canonical UTC session table. Anything not covered is off-hours.
pub fn default_session_table() -> Vec<SessionWindow> {
    vec![
        SessionWindow::new(Session::Asia, (0, 0), (7, 0)),
        SessionWindow::new(Session::London, (7, 0), (13, 0)),
        SessionWindow::new(Session::NewYork, (13, 0), (20, 0)),
    ]
}

#[derive(Debug, Clone)]
pub struct Config {
    // Bridge
    pub bridge_url: String,
    pub bridge_api_key: String,
    pub bridge_timeout_secs: u64,
    pub poll_interval_secs: u64,
    pub history_days: Option<u32>,

    // Evaluation
    pub starting_balance: Option<f64>,
    pub challenge_start: Option<NaiveDate>,
    pub timezone: Tz,
    pub sessions: Vec<SessionWindow>,

    // Logging
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let env = |key: &str, default: &str| -> String {
            std::env::var(key).unwrap_or_else(|_| default.to_string())
        };
        let opt = |key: &str| -> Option<String> {
            std::env::var(key).ok().filter(|v| !v.trim().is_empty())
        };

        Config {
            bridge_url: env("BRIDGE_URL", "http://127.0.0.1:5000")
                .trim_end_matches('/')
                .to_string(),
            bridge_api_key: env("BRIDGE_API_KEY", ""),
            bridge_timeout_secs: env("BRIDGE_TIMEOUT_SECS", "10").parse().unwrap_or(10),
            poll_interval_secs: env("POLL_INTERVAL_SECS", "15")
                .parse::<u64>()
                .unwrap_or(15)
                .max(1),
            history_days: opt("HISTORY_DAYS").and_then(|v| v.parse().ok()),
            starting_balance: opt("STARTING_BALANCE").and_then(|v| v.parse().ok()),
            challenge_start: opt("CHALLENGE_START")
                .and_then(|v| NaiveDate::parse_from_str(&v, "%Y-%m-%d").ok()),
            timezone: env("DASHBOARD_TZ", "UTC").parse().unwrap_or(Tz::UTC),
            sessions: opt("SESSION_TABLE")
                .and_then(|v| parse_session_table(&v))
                .unwrap_or_else(default_session_table),
            log_level: env("LOG_LEVEL", "info"),
        }
    }

    pub fn shared(self) -> SharedConfig {
        Arc::new(RwLock::new(self))
    }
}

/// Parses `asia=00:00-07:00,london=07:00-13:00,...`. Returns `None` if any
/// entry is malformed so a typo never yields a half-applied table.
pub fn parse_session_table(raw: &str) -> Option<Vec<SessionWindow>> {
    let mut windows = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (name, range) = entry.split_once('=')?;
        let session: Session = name.trim().parse().ok()?;
        let (start, end) = range.split_once('-')?;
        windows.push(SessionWindow::new(
            session,
            parse_hhmm(start)?,
            parse_hhmm(end)?,
        ));
    }
    if windows.is_empty() {
        None
    } else {
        Some(windows)
    }
}

fn parse_hhmm(raw: &str) -> Option<(u32, u32)> {
    let (h, m) = raw.trim().split_once(':')?;
    let h: u32 = h.parse().ok()?;
    let m: u32 = m.parse().ok()?;
    // 24:00 is allowed as an end-of-day marker
    if m >= 60 || h > 24 || (h == 24 && m != 0) {
        return None;
    }
    Some((h, m))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_session_override() {
        let table =
            parse_session_table("asia=23:00-06:00, london=06:00-12:00,new_york=12:00-21:00")
                .unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table[0].session, Session::Asia);
        assert_eq!(table[0].start, (23, 0));
        assert_eq!(table[2].end, (21, 0));
    }

    #[test]
    fn rejects_malformed_session_override() {
        assert!(parse_session_table("asia=00:00-07:00,london=7-13").is_none());
        assert!(parse_session_table("mars=00:00-07:00").is_none());
        assert!(parse_session_table("asia=00:61-07:00").is_none());
        assert!(parse_session_table("").is_none());
    }

    #[test]
    fn default_table_is_ordered_and_contiguous() {
        let table = default_session_table();
        for pair in table.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }
}
