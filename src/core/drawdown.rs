//! Drawdown arithmetic over a chronological list of closed trades.
//!
//! Two drawdown figures are produced and kept apart: the historical maximum
//! drawdown of the closed-trade equity curve, and the live drawdown of the
//! current equity reading (floating P&L included) against that curve's peak.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::models::Trade;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DrawdownMetrics {
    pub dd_usd: f64,
    pub dd_pct: f64,
    pub peak_equity: f64,
}

impl DrawdownMetrics {
    fn from_gap(gap: f64, peak: f64) -> Self {
        let dd_usd = gap.max(0.0);
        Self {
            dd_usd,
            dd_pct: pct_of(dd_usd, peak),
            peak_equity: peak,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    pub equity: f64,
    pub peak: f64,
}

/// `part / whole * 100`, 0 for a non-positive whole, never negative.
pub fn pct_of(part: f64, whole: f64) -> f64 {
    if whole <= 0.0 || !whole.is_finite() {
        return 0.0;
    }
    (part / whole * 100.0).max(0.0)
}

/// Peak of the closed-trade curve and the deepest fall below it.
pub fn historical_drawdown(start_balance: f64, trades: &[Trade]) -> DrawdownMetrics {
    let mut equity = start_balance;
    let mut peak = start_balance;
    let mut max_dd = 0.0_f64;

    for trade in trades {
        equity += trade.profit;
        if equity > peak {
            peak = equity;
        }
        max_dd = max_dd.max(peak - equity);
    }

    DrawdownMetrics::from_gap(max_dd, peak)
}

/// Gap between the live equity reading and the closed-trade peak.
pub fn live_drawdown(start_balance: f64, trades: &[Trade], live_equity: f64) -> DrawdownMetrics {
    let peak = historical_drawdown(start_balance, trades).peak_equity;
    DrawdownMetrics::from_gap(peak - live_equity, peak)
}

/// Sum of losses on trades closed on `now`'s calendar day in `tz`.
pub fn today_loss(trades: &[Trade], now: DateTime<Utc>, tz: Tz) -> f64 {
    let today = now.with_timezone(&tz).date_naive();
    trades
        .iter()
        .filter(|t| t.is_loss() && t.timestamp.with_timezone(&tz).date_naive() == today)
        .map(|t| t.profit.abs())
        .sum()
}

pub fn equity_curve(start_balance: f64, trades: &[Trade]) -> Vec<EquityPoint> {
    let mut equity = start_balance;
    let mut peak = start_balance;
    trades
        .iter()
        .map(|t| {
            equity += t.profit;
            peak = peak.max(equity);
            EquityPoint {
                timestamp: t.timestamp,
                equity,
                peak,
            }
        })
        .collect()
}

/// Balance before any of `trades` were closed.
pub fn infer_starting_balance(balance: f64, trades: &[Trade]) -> f64 {
    balance - trades.iter().map(|t| t.profit).sum::<f64>()
}
