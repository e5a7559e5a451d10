use chrono::{DateTime, Utc};
use tracing::debug;

use crate::bridge::{RawDeal, RawPosition};
use crate::core::sessions::SessionClassifier;
use crate::models::{Direction, OpenPosition, Outcome, Trade};

fn from_unix(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

/// A zero stop means "no stop" on MT5.
fn stop_price(sl: Option<f64>) -> Option<f64> {
    sl.filter(|p| *p != 0.0 && p.is_finite())
}

/// Profit as a multiple of the price distance to the stop, or 0 without a
/// usable stop or a known entry price.
pub fn r_multiple(profit: f64, entry: f64, stop_loss: Option<f64>) -> f64 {
    if entry == 0.0 || !entry.is_finite() {
        return 0.0;
    }
    match stop_price(stop_loss) {
        Some(sl) if sl != entry => (profit / (entry - sl)).abs(),
        _ => 0.0,
    }
}

pub fn normalize_deal(deal: &RawDeal, sessions: &SessionClassifier) -> Trade {
    let timestamp = from_unix(deal.time);
    let profit = deal.net_profit();
    Trade {
        id: deal.ticket,
        timestamp,
        instrument: deal.symbol.clone(),
        direction: Direction::from_mt5_type(deal.position_kind()),
        volume: deal.volume,
        entry_price: deal.price_open,
        exit_price: deal.price_close,
        stop_loss: stop_price(deal.sl),
        profit,
        r_multiple: r_multiple(profit, deal.price_open, deal.sl),
        session: sessions.classify(timestamp),
        outcome: Outcome::from_profit(profit),
    }
}

pub fn normalize_position(pos: &RawPosition) -> OpenPosition {
    OpenPosition {
        id: pos.ticket,
        opened_at: from_unix(pos.time),
        instrument: pos.symbol.clone(),
        direction: Direction::from_mt5_type(pos.kind),
        volume: pos.volume,
        entry_price: pos.price_open,
        current_price: pos.price_current,
        stop_loss: stop_price(pos.sl),
        floating_profit: pos.profit + pos.swap,
    }
}

/// Normalize closing deals into a chronological trade list.
pub fn normalize_history(deals: &[RawDeal], sessions: &SessionClassifier) -> Vec<Trade> {
    let mut trades: Vec<Trade> = deals
        .iter()
        .filter(|d| {
            let keep = d.closes_trade();
            if !keep {
                debug!("Skipping non-trade deal {} (type {})", d.ticket, d.kind);
            }
            keep
        })
        .map(|d| normalize_deal(d, sessions))
        .collect();

    trades.sort_by_key(|t| (t.timestamp, t.id));
    trades
}
