use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;

use crate::bridge::RawDeal;
use crate::config::{default_session_table, Config};
use crate::core::sessions::SessionClassifier;
use crate::models::{Direction, Outcome, Trade};

/// A closing deal with only the required fields set.
pub fn raw_deal(ticket: u64, time: i64, kind: i64, profit: f64) -> RawDeal {
    RawDeal {
        ticket,
        time,
        kind,
        profit,
        entry: None,
        symbol: "EURUSD".to_string(),
        volume: 1.0,
        price_open: 0.0,
        price_close: 0.0,
        sl: None,
        tp: None,
        commission: 0.0,
        swap: 0.0,
    }
}

pub fn trade_at(id: u64, timestamp: DateTime<Utc>, profit: f64) -> Trade {
    Trade {
        id,
        timestamp,
        instrument: "EURUSD".to_string(),
        direction: Direction::Long,
        volume: 1.0,
        entry_price: 1.1,
        exit_price: 1.1,
        stop_loss: None,
        profit,
        r_multiple: 0.0,
        session: SessionClassifier::default().classify(timestamp),
        outcome: Outcome::from_profit(profit),
    }
}

/// Trades one hour apart starting 2024-01-15T12:00:00Z.
pub fn trades_from_profits(profits: &[f64]) -> Vec<Trade> {
    let base = DateTime::parse_from_rfc3339("2024-01-15T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc);

    profits
        .iter()
        .enumerate()
        .map(|(i, &p)| trade_at(i as u64 + 1, base + Duration::hours(i as i64), p))
        .collect()
}

/// A Config suitable for testing: local bridge, UTC, canonical sessions.
pub fn default_test_config() -> Config {
    Config {
        bridge_url: "http://127.0.0.1:5000".to_string(),
        bridge_api_key: String::new(),
        bridge_timeout_secs: 2,
        poll_interval_secs: 1,
        history_days: None,
        starting_balance: None,
        challenge_start: None,
        timezone: Tz::UTC,
        sessions: default_session_table(),
        log_level: "debug".to_string(),
    }
}
