use std::fmt::Write;

use crate::dashboard::Evaluation;

const RULE: &str = "  ───────────────────────────────────";

/// Plain-text account report.
pub fn render(eval: &Evaluation) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_report(&mut out, eval);
    out
}

fn write_report(f: &mut String, eval: &Evaluation) -> std::fmt::Result {
    let a = &eval.account;
    let t = &eval.template;

    writeln!(f, "{}", "=".repeat(70))?;
    writeln!(f, "  ACCOUNT REPORT  ({})", eval.evaluated_at.format("%Y-%m-%d %H:%M UTC"))?;
    writeln!(f, "{}", "=".repeat(70))?;
    if eval.account_available {
        writeln!(f, "  Account:     {} #{} on {}", a.name, a.login, a.server)?;
    } else {
        writeln!(f, "  Account:     unavailable")?;
    }
    writeln!(f, "  Firm:        {} ({})", a.firm, eval.phase)?;
    writeln!(f, "  Status:      {}", eval.status.to_string().to_uppercase())?;
    writeln!(f)?;
    writeln!(f, "  BALANCE")?;
    writeln!(f, "{RULE}")?;
    writeln!(f, "  Starting:    {:.2} {}", eval.starting_balance, a.currency)?;
    writeln!(f, "  Balance:     {:.2}", a.balance)?;
    writeln!(f, "  Equity:      {:.2}", eval.live_equity)?;
    writeln!(
        f,
        "  Profit:      {:+.2} ({:+.2}% of {:.0}% target)",
        eval.progress.profit_usd, eval.progress.profit_pct, t.profit_target_pct
    )?;
    writeln!(f)?;
    writeln!(f, "  DRAWDOWN")?;
    writeln!(f, "{RULE}")?;
    writeln!(
        f,
        "  Today:       {:.2} ({:.2}% / limit {:.1}%)",
        eval.today_loss_usd, eval.risk.dd_today_pct, t.daily_drawdown_pct
    )?;
    writeln!(
        f,
        "  Max (hist):  {:.2} ({:.2}%) from peak {:.2}",
        eval.historical.dd_usd, eval.historical.dd_pct, eval.historical.peak_equity
    )?;
    writeln!(
        f,
        "  Live:        {:.2} ({:.2}%)",
        eval.live.dd_usd, eval.live.dd_pct
    )?;
    writeln!(
        f,
        "  Total:       {:.2}% / limit {:.1}%",
        eval.risk.dd_total_pct, t.max_drawdown_pct
    )?;
    writeln!(f)?;
    writeln!(f, "  RULES")?;
    writeln!(f, "{RULE}")?;
    writeln!(
        f,
        "  Trading days: {} / {}{}",
        eval.progress.trading_days,
        t.min_trading_days,
        if eval.progress.min_days_met { " (met)" } else { "" }
    )?;
    match eval.progress.days_remaining {
        Some(d) => writeln!(f, "  Days left:   {}", d)?,
        None => writeln!(f, "  Days left:   no limit")?,
    }
    writeln!(f)?;
    writeln!(f, "  TRADES")?;
    writeln!(f, "{RULE}")?;
    let s = &eval.stats;
    writeln!(f, "  Total:       {} ({} open)", s.total_trades, eval.open_positions.len())?;
    writeln!(f, "  Win/Loss/BE: {} / {} / {}", s.wins, s.losses, s.breakeven)?;
    writeln!(f, "  Win Rate:    {:.1}%", s.win_rate)?;
    writeln!(f, "  Avg Win:     {:+.2}", s.avg_win)?;
    writeln!(f, "  Avg Loss:    {:.2}", s.avg_loss)?;
    writeln!(f, "  Avg R:       {:.2}", s.avg_r)?;
    writeln!(f, "  Profit Factor: {:.2}", s.profit_factor)?;

    if !s.by_session.is_empty() {
        writeln!(f)?;
        writeln!(f, "  BY SESSION")?;
        writeln!(f, "{RULE}")?;
        for (session, b) in &s.by_session {
            writeln!(
                f,
                "  {:>10}: {} trades | WR {:.0}% | PnL {:+.2}",
                session.to_string(),
                b.trades,
                b.win_rate,
                b.total_pnl
            )?;
        }
    }
    writeln!(f, "{}", "=".repeat(70))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::{evaluate, EvaluationContext, EvaluationInput};
    use crate::test_helpers::{default_test_config, raw_deal};
    use chrono::{TimeZone, Utc};

    #[test]
    fn renders_key_sections() {
        let now = Utc.with_ymd_and_hms(2024, 4, 8, 18, 0, 0).unwrap();
        let ctx = EvaluationContext::from_config(&default_test_config(), now);
        let input = EvaluationInput {
            account: Some(crate::bridge::RawAccount {
                login: 42,
                name: "FTMO Swing 100k".to_string(),
                server: "FTMO-Live3".to_string(),
                company: String::new(),
                currency: "USD".to_string(),
                balance: 100_150.0,
                equity: None,
            }),
            positions: vec![],
            deals: vec![raw_deal(1, now.timestamp() - 7200, 0, 150.0)],
        };
        let text = render(&evaluate(&input, &ctx));
        assert!(text.contains("Firm:        FTMO (challenge)"));
        assert!(text.contains("Status:      OK"));
        assert!(text.contains("BY SESSION"));
        assert!(text.contains("New York"));
    }
}
