use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::bridge::{RawAccount, RawDeal, RawPosition};
use crate::config::Config;
use crate::core::drawdown::{
    equity_curve, historical_drawdown, infer_starting_balance, live_drawdown, pct_of, today_loss,
    DrawdownMetrics, EquityPoint,
};
use crate::core::firms::{infer_phase, match_firm, RuleTemplate};
use crate::core::normalizer::{normalize_history, normalize_position};
use crate::core::sessions::SessionClassifier;
use crate::core::stats::TradeStats;
use crate::core::status::{challenge_progress, evaluate_status, ChallengeProgress, RiskSnapshot};
use crate::models::{AccountSnapshot, AccountStatus, OpenPosition, Phase, Trade};

/// Everything fetched from the bridge in one sync. A missing account means
/// the account endpoint could not be read.
#[derive(Debug, Clone, Default)]
pub struct EvaluationInput {
    pub account: Option<RawAccount>,
    pub positions: Vec<RawPosition>,
    pub deals: Vec<RawDeal>,
}

#[derive(Debug, Clone)]
pub struct EvaluationContext {
    pub now: DateTime<Utc>,
    pub timezone: Tz,
    pub sessions: SessionClassifier,
    pub starting_balance: Option<f64>,
    pub challenge_start: Option<NaiveDate>,
    /// Skip firm detection and use this template.
    pub firm_override: Option<&'static RuleTemplate>,
}

impl EvaluationContext {
    pub fn from_config(cfg: &Config, now: DateTime<Utc>) -> Self {
        Self {
            now,
            timezone: cfg.timezone,
            sessions: SessionClassifier::new(cfg),
            starting_balance: cfg.starting_balance,
            challenge_start: cfg.challenge_start,
            firm_override: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub evaluated_at: DateTime<Utc>,
    pub account: AccountSnapshot,
    pub account_available: bool,
    pub phase: Phase,
    pub template: RuleTemplate,
    pub starting_balance: f64,
    pub live_equity: f64,
    pub trades: Vec<Trade>,
    pub open_positions: Vec<OpenPosition>,
    pub equity_curve: Vec<EquityPoint>,
    /// Max drawdown of the closed-trade curve.
    pub historical: DrawdownMetrics,
    /// Live equity against the closed-trade peak.
    pub live: DrawdownMetrics,
    pub today_loss_usd: f64,
    pub risk: RiskSnapshot,
    pub status: AccountStatus,
    pub progress: ChallengeProgress,
    pub stats: TradeStats,
}

pub fn evaluate(input: &EvaluationInput, ctx: &EvaluationContext) -> Evaluation {
    let trades = normalize_history(&input.deals, &ctx.sessions);
    let open_positions: Vec<OpenPosition> = input.positions.iter().map(normalize_position).collect();
    let floating: f64 = open_positions.iter().map(|p| p.floating_profit).sum();
    let closed_pnl: f64 = trades.iter().map(|t| t.profit).sum();

    let template = match ctx.firm_override {
        Some(t) => t.clone(),
        None => {
            let (name, server) = input
                .account
                .as_ref()
                .map_or(("", ""), |a| (a.name.as_str(), a.server.as_str()));
            match_firm(name, server).clone()
        }
    };

    let account = input
        .account
        .as_ref()
        .map(|a| AccountSnapshot {
            login: a.login,
            name: a.name.clone(),
            server: a.server.clone(),
            company: a.company.clone(),
            balance: a.balance,
            equity: a.equity.unwrap_or(a.balance + floating),
            currency: a.currency.clone(),
            firm: template.firm_name.to_string(),
        })
        .unwrap_or_else(|| AccountSnapshot {
            firm: template.firm_name.to_string(),
            ..AccountSnapshot::default()
        });

    let starting_balance = ctx.starting_balance.unwrap_or_else(|| {
        if input.account.is_some() {
            infer_starting_balance(account.balance, &trades)
        } else {
            0.0
        }
    });

    // Without an account read, rebuild equity from the closed curve plus floating P&L.
    let live_equity = if input.account.is_some() {
        account.equity
    } else {
        starting_balance + closed_pnl + floating
    };
    let balance = if input.account.is_some() {
        account.balance
    } else {
        starting_balance + closed_pnl
    };

    let historical = historical_drawdown(starting_balance, &trades);
    let live = live_drawdown(starting_balance, &trades, live_equity);
    let today_loss_usd = today_loss(&trades, ctx.now, ctx.timezone);

    let risk = RiskSnapshot {
        dd_today_pct: pct_of(today_loss_usd, starting_balance),
        dd_total_pct: historical.dd_pct.max(live.dd_pct),
    };
    let status = evaluate_status(&risk, &template);

    let progress = challenge_progress(
        starting_balance,
        balance,
        &trades,
        &template,
        ctx.challenge_start,
        ctx.now,
        ctx.timezone,
    );

    Evaluation {
        evaluated_at: ctx.now,
        phase: infer_phase(&account.name),
        account,
        account_available: input.account.is_some(),
        template,
        starting_balance,
        live_equity,
        equity_curve: equity_curve(starting_balance, &trades),
        stats: TradeStats::compute(&trades),
        trades,
        open_positions,
        historical,
        live,
        today_loss_usd,
        risk,
        status,
        progress,
    }
}
