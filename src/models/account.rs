use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Direction;

/// Point-in-time read of the broker account. Replaced wholesale on each sync.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub login: u64,
    pub name: String,
    pub server: String,
    pub company: String,
    pub balance: f64,
    pub equity: f64,
    pub currency: String,
    /// Firm name detected from `name` and `server`.
    pub firm: String,
}

impl AccountSnapshot {
    /// Unrealized P&L as reported by the broker.
    pub fn floating(&self) -> f64 {
        self.equity - self.balance
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenPosition {
    pub id: u64,
    pub opened_at: DateTime<Utc>,
    pub instrument: String,
    pub direction: Direction,
    pub volume: f64,
    pub entry_price: f64,
    pub current_price: f64,
    #[serde(default)]
    pub stop_loss: Option<f64>,
    pub floating_profit: f64,
}
