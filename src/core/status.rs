use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::core::drawdown::pct_of;
use crate::core::firms::RuleTemplate;
use crate::models::{AccountStatus, Trade};

/// Fraction of a limit at which an account is flagged as at risk.
pub const AT_RISK_RATIO: f64 = 0.8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskSnapshot {
    pub dd_today_pct: f64,
    pub dd_total_pct: f64,
}

pub fn evaluate_status(risk: &RiskSnapshot, template: &RuleTemplate) -> AccountStatus {
    let daily = template.daily_drawdown_pct;
    let total = template.max_drawdown_pct;

    if risk.dd_today_pct >= daily || risk.dd_total_pct >= total {
        AccountStatus::Breached
    } else if risk.dd_today_pct >= AT_RISK_RATIO * daily
        || risk.dd_total_pct >= AT_RISK_RATIO * total
    {
        AccountStatus::AtRisk
    } else {
        AccountStatus::Ok
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeProgress {
    pub profit_usd: f64,
    pub profit_pct: f64,
    pub target_reached: bool,
    pub trading_days: u32,
    pub min_days_met: bool,
    pub days_elapsed: i64,
    /// `None` when the firm has no time limit or the start date is unknown.
    pub days_remaining: Option<i64>,
}

/// Distinct calendar dates in `tz` with at least one closed trade.
pub fn trading_days(trades: &[Trade], tz: Tz) -> u32 {
    trades
        .iter()
        .map(|t| t.timestamp.with_timezone(&tz).date_naive())
        .collect::<BTreeSet<_>>()
        .len() as u32
}

pub fn challenge_progress(
    start_balance: f64,
    balance: f64,
    trades: &[Trade],
    template: &RuleTemplate,
    started_on: Option<NaiveDate>,
    now: DateTime<Utc>,
    tz: Tz,
) -> ChallengeProgress {
    let profit_usd = balance - start_balance;
    let profit_pct = if profit_usd > 0.0 {
        pct_of(profit_usd, start_balance)
    } else if start_balance > 0.0 {
        profit_usd / start_balance * 100.0
    } else {
        0.0
    };

    let days = trading_days(trades, tz);
    let today = now.with_timezone(&tz).date_naive();
    let start = started_on.or_else(|| {
        trades
            .first()
            .map(|t| t.timestamp.with_timezone(&tz).date_naive())
    });
    let days_elapsed = start.map_or(0, |s| (today - s).num_days().max(0));
    let days_remaining = match (template.time_limit_days, start) {
        (Some(limit), Some(_)) => Some((i64::from(limit) - days_elapsed).max(0)),
        _ => None,
    };

    ChallengeProgress {
        profit_usd,
        profit_pct,
        target_reached: profit_pct >= template.profit_target_pct,
        trading_days: days,
        min_days_met: days >= template.min_trading_days,
        days_elapsed,
        days_remaining,
    }
}
