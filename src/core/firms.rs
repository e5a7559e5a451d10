use serde::Serialize;

use crate::models::Phase;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleTemplate {
    pub firm_name: &'static str,
    pub profit_target_pct: f64,
    pub daily_drawdown_pct: f64,
    pub max_drawdown_pct: f64,
    pub min_trading_days: u32,
    pub time_limit_days: Option<u32>,
}

pub const FTMO: RuleTemplate = RuleTemplate {
    firm_name: "FTMO",
    profit_target_pct: 10.0,
    daily_drawdown_pct: 5.0,
    max_drawdown_pct: 10.0,
    min_trading_days: 4,
    time_limit_days: None,
};

pub const FUNDED_NEXT: RuleTemplate = RuleTemplate {
    firm_name: "FundedNext",
    profit_target_pct: 10.0,
    daily_drawdown_pct: 5.0,
    max_drawdown_pct: 10.0,
    min_trading_days: 5,
    time_limit_days: None,
};

pub const THE5ERS: RuleTemplate = RuleTemplate {
    firm_name: "The5ers",
    profit_target_pct: 8.0,
    daily_drawdown_pct: 5.0,
    max_drawdown_pct: 10.0,
    min_trading_days: 3,
    time_limit_days: None,
};

pub const MY_FOREX_FUNDS: RuleTemplate = RuleTemplate {
    firm_name: "MyForexFunds",
    profit_target_pct: 8.0,
    daily_drawdown_pct: 5.0,
    max_drawdown_pct: 12.0,
    min_trading_days: 5,
    time_limit_days: Some(30),
};

pub const ALPHA_CAPITAL: RuleTemplate = RuleTemplate {
    firm_name: "Alpha Capital",
    profit_target_pct: 10.0,
    daily_drawdown_pct: 5.0,
    max_drawdown_pct: 10.0,
    min_trading_days: 3,
    time_limit_days: None,
};

/// Fallback for unrecognized firms; tighter than any listed firm.
pub const GENERIC: RuleTemplate = RuleTemplate {
    firm_name: "Generic",
    profit_target_pct: 8.0,
    daily_drawdown_pct: 4.0,
    max_drawdown_pct: 8.0,
    min_trading_days: 4,
    time_limit_days: None,
};

/// Checked in order; the first keyword found wins.
const FIRM_KEYWORDS: &[(&str, &RuleTemplate)] = &[
    ("ftmo", &FTMO),
    ("fundednext", &FUNDED_NEXT),
    ("the5ers", &THE5ERS),
    ("5ers", &THE5ERS),
    ("myforexfunds", &MY_FOREX_FUNDS),
    ("mff", &MY_FOREX_FUNDS),
    ("alpha", &ALPHA_CAPITAL),
];

pub fn match_firm(account_name: &str, server: &str) -> &'static RuleTemplate {
    let haystack = format!("{} {}", account_name, server).to_lowercase();
    FIRM_KEYWORDS
        .iter()
        .find(|(keyword, _)| haystack.contains(keyword))
        .map_or(&GENERIC, |(_, template)| *template)
}

/// Look a template up by its firm name, case-insensitively.
pub fn template_by_name(name: &str) -> Option<&'static RuleTemplate> {
    let wanted = name.trim().to_lowercase();
    FIRM_KEYWORDS
        .iter()
        .map(|(_, t)| *t)
        .chain(std::iter::once(&GENERIC))
        .find(|t| t.firm_name.to_lowercase() == wanted)
}

/// Phase from whole words of the account name, so "Oliver" is not "live".
pub fn infer_phase(account_name: &str) -> Phase {
    let lower = account_name.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    let has = |word: &str| words.iter().any(|w| *w == word);
    let has_pair = |a: &str, b: &str| words.windows(2).any(|p| p[0] == a && p[1] == b);

    if ["funded", "master", "live"].into_iter().any(|k| has(k)) {
        Phase::Funded
    } else if has("verification")
        || has("phase2")
        || has("step2")
        || has_pair("phase", "2")
        || has_pair("step", "2")
    {
        Phase::Verification
    } else {
        Phase::Challenge
    }
}
