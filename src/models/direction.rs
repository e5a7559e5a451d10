use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Direction {
    /// MT5 encodes buy as 0; every other code is treated as a sell.
    pub fn from_mt5_type(code: i64) -> Self {
        if code == 0 {
            Direction::Long
        } else {
            Direction::Short
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Long => "long",
            Direction::Short => "short",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Loss,
    #[serde(rename = "BE")]
    Breakeven,
}

impl Outcome {
    pub fn from_profit(profit: f64) -> Self {
        if profit > 0.0 {
            Outcome::Win
        } else if profit < 0.0 {
            Outcome::Loss
        } else {
            Outcome::Breakeven
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Win => write!(f, "Win"),
            Outcome::Loss => write!(f, "Loss"),
            Outcome::Breakeven => write!(f, "BE"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Session {
    Asia,
    London,
    NewYork,
    OffHours,
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Session::Asia => write!(f, "Asia"),
            Session::London => write!(f, "London"),
            Session::NewYork => write!(f, "New York"),
            Session::OffHours => write!(f, "Off-hours"),
        }
    }
}

impl FromStr for Session {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "asia" | "asian" | "tokyo" => Ok(Session::Asia),
            "london" => Ok(Session::London),
            "new_york" | "newyork" | "ny" => Ok(Session::NewYork),
            "off_hours" | "off" | "off_session" => Ok(Session::OffHours),
            other => Err(format!("unknown session '{other}'")),
        }
    }
}

/// Account health. The derived ordering is the severity ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Ok,
    AtRisk,
    Breached,
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountStatus::Ok => write!(f, "ok"),
            AccountStatus::AtRisk => write!(f, "at_risk"),
            AccountStatus::Breached => write!(f, "breached"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Challenge,
    Verification,
    Funded,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Challenge => write!(f, "challenge"),
            Phase::Verification => write!(f, "verification"),
            Phase::Funded => write!(f, "funded"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mt5_type_codes() {
        assert_eq!(Direction::from_mt5_type(0), Direction::Long);
        assert_eq!(Direction::from_mt5_type(1), Direction::Short);
        assert_eq!(Direction::from_mt5_type(7), Direction::Short);
    }

    #[test]
    fn outcome_from_sign() {
        assert_eq!(Outcome::from_profit(0.01), Outcome::Win);
        assert_eq!(Outcome::from_profit(-3.0), Outcome::Loss);
        assert_eq!(Outcome::from_profit(0.0), Outcome::Breakeven);
    }

    #[test]
    fn status_severity_order() {
        assert!(AccountStatus::Ok < AccountStatus::AtRisk);
        assert!(AccountStatus::AtRisk < AccountStatus::Breached);
    }

    #[test]
    fn session_names_parse() {
        assert_eq!("New York".parse::<Session>().unwrap(), Session::NewYork);
        assert_eq!("off-hours".parse::<Session>().unwrap(), Session::OffHours);
        assert!("mars".parse::<Session>().is_err());
    }

    #[test]
    fn serde_names() {
        assert_eq!(serde_json::to_string(&Outcome::Breakeven).unwrap(), "\"BE\"");
        assert_eq!(
            serde_json::to_string(&AccountStatus::AtRisk).unwrap(),
            "\"at_risk\""
        );
        assert_eq!(serde_json::to_string(&Session::NewYork).unwrap(), "\"new_york\"");
    }
}
