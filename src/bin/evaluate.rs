use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use clap::Parser;
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};

use prop_dashboard::bridge::{BrokerBridge, Mt5Bridge, ReplayBridge};
use prop_dashboard::config::Config;
use prop_dashboard::core::firms::template_by_name;
use prop_dashboard::dashboard::{evaluate, EvaluationContext, EvaluationInput};
use prop_dashboard::report;

/// One-shot account evaluation against a live bridge or a saved export.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// JSON export with `account`, `positions` and `history` payloads
    #[arg(short, long, conflicts_with = "bridge_url")]
    file: Option<PathBuf>,

    /// Bridge base URL (defaults to BRIDGE_URL)
    #[arg(short, long)]
    bridge_url: Option<String>,

    /// Force a firm template instead of detecting it (e.g. "FTMO")
    #[arg(long)]
    firm: Option<String>,

    /// Evaluation baseline; inferred from history when omitted
    #[arg(long)]
    starting_balance: Option<f64>,

    /// Only use the last N days of history
    #[arg(long)]
    days: Option<u32>,

    /// Challenge start date (YYYY-MM-DD)
    #[arg(long)]
    start: Option<NaiveDate>,

    /// IANA timezone for "today" and trading days
    #[arg(long)]
    tz: Option<String>,

    /// Evaluate as of this RFC 3339 time (replay only)
    #[arg(long, requires = "file")]
    as_of: Option<DateTime<Utc>>,

    /// Print the evaluation as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut cfg = Config::from_env();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .init();

    if let Some(url) = args.bridge_url {
        cfg.bridge_url = url.trim_end_matches('/').to_string();
    }
    if args.starting_balance.is_some() {
        cfg.starting_balance = args.starting_balance;
    }
    if args.days.is_some() {
        cfg.history_days = args.days;
    }
    if args.start.is_some() {
        cfg.challenge_start = args.start;
    }
    if let Some(name) = &args.tz {
        cfg.timezone = match name.parse::<Tz>() {
            Ok(tz) => tz,
            Err(_) => bail!("unknown timezone '{}'", name),
        };
    }

    let firm_override = match &args.firm {
        Some(name) => match template_by_name(name) {
            Some(t) => Some(t),
            None => bail!("unknown firm '{}'", name),
        },
        None => None,
    };

    let now = args.as_of.unwrap_or_else(Utc::now);
    let mut bridge: Box<dyn BrokerBridge> = match &args.file {
        Some(path) => {
            let mut replay = ReplayBridge::from_file(path)?;
            replay.set_time(now);
            Box::new(replay)
        }
        None => Box::new(Mt5Bridge::new(&cfg)?),
    };

    // A one-shot evaluation needs the account; positions and history may be empty.
    let account = bridge
        .fetch_account()
        .await
        .context("Failed to read account")?;
    let positions = match bridge.fetch_positions().await {
        Ok(d) => d,
        Err(e) => {
            warn!("Positions unavailable: {:#}", e);
            Default::default()
        }
    };
    let history = match bridge.fetch_history(cfg.history_days).await {
        Ok(d) => d,
        Err(e) => {
            warn!("History unavailable: {:#}", e);
            Default::default()
        }
    };
    for err in positions.rejected.iter().chain(history.rejected.iter()) {
        warn!("{}", err);
    }

    let mut ctx = EvaluationContext::from_config(&cfg, now);
    ctx.firm_override = firm_override;

    let input = EvaluationInput {
        account: Some(account),
        positions: positions.records,
        deals: history.records,
    };
    let evaluation = evaluate(&input, &ctx);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&evaluation)?);
    } else {
        print!("{}", report::render(&evaluation));
    }

    Ok(())
}
