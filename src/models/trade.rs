use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Direction, Outcome, Session};

/// A closed trade in canonical form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    pub instrument: String,
    pub direction: Direction,
    pub volume: f64,
    pub entry_price: f64,
    pub exit_price: f64,
    #[serde(default)]
    pub stop_loss: Option<f64>,
    pub profit: f64,
    /// 0 when the trade had no usable stop.
    pub r_multiple: f64,
    pub session: Session,
    pub outcome: Outcome,
}

impl Trade {
    pub fn is_loss(&self) -> bool {
        self.profit < 0.0
    }
}
