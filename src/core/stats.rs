use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{Outcome, Session, Trade};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub trades: usize,
    pub wins: usize,
    pub losses: usize,
    pub win_rate: f64,
    pub total_pnl: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeStats {
    pub total_trades: usize,
    pub wins: usize,
    pub losses: usize,
    pub breakeven: usize,
    pub win_rate: f64,
    pub gross_profit: f64,
    pub gross_loss: f64,
    pub net_profit: f64,
    pub profit_factor: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    /// Mean over trades that carry a non-zero R.
    pub avg_r: f64,
    pub best_trade: f64,
    pub worst_trade: f64,
    pub by_session: BTreeMap<Session, SessionStats>,
}

impl TradeStats {
    pub fn compute(trades: &[Trade]) -> Self {
        let mut stats = TradeStats::default();
        let mut r_sum = 0.0;
        let mut r_count = 0usize;

        for t in trades {
            stats.total_trades += 1;
            match t.outcome {
                Outcome::Win => {
                    stats.wins += 1;
                    stats.gross_profit += t.profit;
                }
                Outcome::Loss => {
                    stats.losses += 1;
                    stats.gross_loss += t.profit.abs();
                }
                Outcome::Breakeven => stats.breakeven += 1,
            }
            if t.r_multiple != 0.0 {
                r_sum += t.r_multiple;
                r_count += 1;
            }

            let s = stats.by_session.entry(t.session).or_default();
            s.trades += 1;
            s.total_pnl += t.profit;
            match t.outcome {
                Outcome::Win => s.wins += 1,
                Outcome::Loss => s.losses += 1,
                Outcome::Breakeven => {}
            }
        }

        if stats.total_trades == 0 {
            return stats;
        }

        stats.win_rate = ratio(stats.wins, stats.total_trades) * 100.0;
        stats.net_profit = stats.gross_profit - stats.gross_loss;
        stats.profit_factor = if stats.gross_loss > 0.0 {
            stats.gross_profit / stats.gross_loss
        } else if stats.gross_profit > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };
        if stats.wins > 0 {
            stats.avg_win = stats.gross_profit / stats.wins as f64;
        }
        if stats.losses > 0 {
            stats.avg_loss = stats.gross_loss / stats.losses as f64;
        }
        if r_count > 0 {
            stats.avg_r = r_sum / r_count as f64;
        }
        stats.best_trade = trades.iter().map(|t| t.profit).fold(f64::MIN, f64::max);
        stats.worst_trade = trades.iter().map(|t| t.profit).fold(f64::MAX, f64::min);

        for s in stats.by_session.values_mut() {
            s.win_rate = ratio(s.wins, s.trades) * 100.0;
        }
        stats
    }
}

fn ratio(n: usize, d: usize) -> f64 {
    if d == 0 {
        0.0
    } else {
        n as f64 / d as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::trades_from_profits;

    #[test]
    fn empty_is_zeroed() {
        let s = TradeStats::compute(&[]);
        assert_eq!(s.total_trades, 0);
        assert_eq!(s.best_trade, 0.0);
        assert!(s.by_session.is_empty());
    }

    #[test]
    fn aggregates() {
        let mut trades = trades_from_profits(&[100.0, -50.0, 0.0, 200.0, -25.0]);
        trades[0].r_multiple = 2.0;
        trades[1].r_multiple = 1.0;
        let s = TradeStats::compute(&trades);
        assert_eq!(s.total_trades, 5);
        assert_eq!((s.wins, s.losses, s.breakeven), (2, 2, 1));
        assert!((s.win_rate - 40.0).abs() < 1e-9);
        assert!((s.gross_profit - 300.0).abs() < 1e-9);
        assert!((s.gross_loss - 75.0).abs() < 1e-9);
        assert!((s.profit_factor - 4.0).abs() < 1e-9);
        assert!((s.avg_win - 150.0).abs() < 1e-9);
        assert!((s.avg_loss - 37.5).abs() < 1e-9);
        assert!((s.avg_r - 1.5).abs() < 1e-9);
        assert_eq!(s.best_trade, 200.0);
        assert_eq!(s.worst_trade, -50.0);
    }

    #[test]
    fn no_losses_gives_infinite_profit_factor() {
        let s = TradeStats::compute(&trades_from_profits(&[10.0, 5.0]));
        assert!(s.profit_factor.is_infinite());
    }

    #[test]
    fn groups_by_session() {
        let trades = trades_from_profits(&[10.0, -5.0, 7.0]);
        let s = TradeStats::compute(&trades);
        let total: usize = s.by_session.values().map(|b| b.trades).sum();
        assert_eq!(total, 3);
    }
}
