use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};

use prop_dashboard::config::{default_session_table, Config};

/// 2024-04-08T00:00:00Z as UNIX seconds.
pub const DAY: i64 = 1_712_534_400;

pub fn at_hour(hour: i64) -> i64 {
    DAY + hour * 3600
}

pub fn evening() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 4, 8, 21, 0, 0).unwrap()
}

pub fn deal(ticket: u64, time: i64, kind: i64, profit: f64) -> Value {
    json!({"ticket": ticket, "time": time, "type": kind, "entry": 1, "symbol": "EURUSD", "profit": profit})
}

pub fn account(name: &str, server: &str, balance: f64, equity: f64) -> Value {
    json!({"login": 1, "name": name, "server": server, "currency": "USD", "balance": balance, "equity": equity})
}

pub fn test_config() -> Config {
    let mut cfg = Config::from_env();
    cfg.bridge_url = "http://127.0.0.1:9".to_string();
    cfg.bridge_api_key = String::new();
    cfg.history_days = None;
    cfg.starting_balance = None;
    cfg.challenge_start = None;
    cfg.timezone = chrono_tz::Tz::UTC;
    cfg.sessions = default_session_table();
    cfg
}
