//! Wire schemas for the MT5 bridge payloads.
//!
//! Identity and economic fields are required; a record without them is
//! rejected rather than coerced to zero. Secondary numeric fields default
//! to 0 when missing or null.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::BridgeError;

const DEAL_TYPE_BUY: i64 = 0;
const DEAL_TYPE_SELL: i64 = 1;
const DEAL_ENTRY_IN: i64 = 0;
const DEAL_ENTRY_OUT: i64 = 1;
const DEAL_ENTRY_INOUT: i64 = 2;
const DEAL_ENTRY_OUT_BY: i64 = 3;

fn null_as_zero<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(d)?.unwrap_or_default())
}

fn null_as_empty<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawAccount {
    #[serde(default)]
    pub login: u64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub server: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub company: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub currency: String,
    pub balance: f64,
    /// Some bridges omit equity when nothing is open.
    #[serde(default)]
    pub equity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPosition {
    pub ticket: u64,
    pub time: i64,
    #[serde(rename = "type")]
    pub kind: i64,
    pub profit: f64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub symbol: String,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub volume: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub price_open: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub price_current: f64,
    #[serde(default)]
    pub sl: Option<f64>,
    #[serde(default)]
    pub tp: Option<f64>,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub swap: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDeal {
    pub ticket: u64,
    /// UNIX seconds.
    pub time: i64,
    #[serde(rename = "type")]
    pub kind: i64,
    pub profit: f64,
    /// MT5 deal entry (0 = in, 1 = out, 2 = in/out, 3 = out by).
    #[serde(default)]
    pub entry: Option<i64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub symbol: String,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub volume: f64,
    #[serde(default, alias = "entry_price", deserialize_with = "null_as_zero")]
    pub price_open: f64,
    #[serde(default, alias = "price", alias = "exit_price", deserialize_with = "null_as_zero")]
    pub price_close: f64,
    #[serde(default)]
    pub sl: Option<f64>,
    #[serde(default)]
    pub tp: Option<f64>,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub commission: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub swap: f64,
}

impl RawDeal {
    /// True for buy/sell deals that realize P&L. Balance and credit
    /// operations and opening legs are not trades.
    pub fn closes_trade(&self) -> bool {
        matches!(self.kind, DEAL_TYPE_BUY | DEAL_TYPE_SELL)
            && self.entry.map_or(true, |e| e != DEAL_ENTRY_IN)
    }

    /// Type code of the position whose P&L this deal realizes. Closing legs
    /// trade against the position, so their code is flipped. Without an
    /// `entry` field the deal's own code is taken as-is.
    pub fn position_kind(&self) -> i64 {
        let closing = matches!(
            self.entry,
            Some(DEAL_ENTRY_OUT | DEAL_ENTRY_INOUT | DEAL_ENTRY_OUT_BY)
        );
        match self.kind {
            DEAL_TYPE_BUY if closing => DEAL_TYPE_SELL,
            DEAL_TYPE_SELL if closing => DEAL_TYPE_BUY,
            kind => kind,
        }
    }

    /// Realized P&L as booked to the balance: profit plus commission and swap.
    pub fn net_profit(&self) -> f64 {
        self.profit + self.commission + self.swap
    }
}

/// Records that passed schema validation, plus the ones that did not.
#[derive(Debug, Clone)]
pub struct Decoded<T> {
    pub records: Vec<T>,
    pub rejected: Vec<BridgeError>,
}

impl<T> Default for Decoded<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            rejected: Vec::new(),
        }
    }
}

/// Decode each element independently so one bad record does not discard the batch.
pub fn decode_records<T: DeserializeOwned>(kind: &'static str, values: Vec<Value>) -> Decoded<T> {
    let mut out = Decoded::default();
    for (index, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<T>(value) {
            Ok(record) => out.records.push(record),
            Err(e) => out.rejected.push(BridgeError::UnparsableRecord {
                kind,
                index,
                reason: e.to_string(),
            }),
        }
    }
    out
}

/// Accept a bare array or an object wrapping the array under one of `keys`.
pub fn unwrap_list(value: Value, keys: &[&str]) -> Result<Vec<Value>, String> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Null => Ok(Vec::new()),
        Value::Object(mut map) => {
            for key in keys {
                match map.remove(*key) {
                    Some(Value::Array(items)) => return Ok(items),
                    Some(Value::Null) => return Ok(Vec::new()),
                    Some(other) => return Err(format!("'{key}' is not an array: {other}")),
                    None => continue,
                }
            }
            Err(format!("expected an array or one of {keys:?}"))
        }
        other => Err(format!("expected an array, got {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deal_with_missing_secondary_fields_decodes() {
        let decoded: Decoded<RawDeal> = decode_records(
            "deal",
            vec![json!({"ticket": 7, "time": 1_700_000_000, "type": 0, "profit": 150.0, "commission": null})],
        );
        assert!(decoded.rejected.is_empty());
        let deal = &decoded.records[0];
        assert_eq!(deal.volume, 0.0);
        assert_eq!(deal.commission, 0.0);
        assert_eq!(deal.sl, None);
    }

    #[test]
    fn deal_missing_profit_is_rejected_not_zeroed() {
        let decoded: Decoded<RawDeal> = decode_records(
            "deal",
            vec![
                json!({"ticket": 1, "time": 1_700_000_000, "type": 0, "profit": 10.0}),
                json!({"ticket": 2, "time": 1_700_000_100, "type": 1}),
                json!({"ticket": "x", "time": 1_700_000_200, "type": 1, "profit": 1.0}),
            ],
        );
        assert_eq!(decoded.records.len(), 1);
        assert_eq!(decoded.rejected.len(), 2);
        match &decoded.rejected[0] {
            BridgeError::UnparsableRecord { kind, index, .. } => {
                assert_eq!(*kind, "deal");
                assert_eq!(*index, 1);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn price_alias_maps_to_exit() {
        let deal: RawDeal = serde_json::from_value(
            json!({"ticket": 1, "time": 0, "type": 1, "profit": -5.0, "price": 1.2345}),
        )
        .unwrap();
        assert_eq!(deal.price_close, 1.2345);
    }

    #[test]
    fn non_trade_deals_are_filtered() {
        let base = json!({"ticket": 1, "time": 0, "type": 2, "profit": 100000.0});
        let balance: RawDeal = serde_json::from_value(base).unwrap();
        assert!(!balance.closes_trade());

        let opening: RawDeal = serde_json::from_value(
            json!({"ticket": 2, "time": 0, "type": 0, "profit": 0.0, "entry": 0}),
        )
        .unwrap();
        assert!(!opening.closes_trade());

        let closing: RawDeal = serde_json::from_value(
            json!({"ticket": 3, "time": 0, "type": 1, "profit": 12.0, "entry": 1}),
        )
        .unwrap();
        assert!(closing.closes_trade());
    }

    #[test]
    fn closing_legs_report_the_position_side() {
        let close_long: RawDeal = serde_json::from_value(
            json!({"ticket": 1, "time": 0, "type": 1, "entry": 1, "profit": 150.0}),
        )
        .unwrap();
        assert_eq!(close_long.position_kind(), DEAL_TYPE_BUY);

        let close_short_by: RawDeal = serde_json::from_value(
            json!({"ticket": 2, "time": 0, "type": 0, "entry": 3, "profit": -20.0}),
        )
        .unwrap();
        assert_eq!(close_short_by.position_kind(), DEAL_TYPE_SELL);

        let no_entry: RawDeal = serde_json::from_value(
            json!({"ticket": 3, "time": 0, "type": 1, "profit": 5.0}),
        )
        .unwrap();
        assert_eq!(no_entry.position_kind(), DEAL_TYPE_SELL);
    }

    #[test]
    fn net_profit_includes_costs() {
        let deal: RawDeal = serde_json::from_value(json!({
            "ticket": 1, "time": 0, "type": 1, "entry": 1,
            "profit": -480.0, "commission": -20.0, "swap": null
        }))
        .unwrap();
        assert_eq!(deal.net_profit(), -500.0);
    }

    #[test]
    fn unwraps_wrapped_lists() {
        assert_eq!(unwrap_list(json!([1, 2]), &["deals"]).unwrap().len(), 2);
        assert_eq!(
            unwrap_list(json!({"deals": [1, 2, 3]}), &["positions", "deals"])
                .unwrap()
                .len(),
            3
        );
        assert!(unwrap_list(json!(null), &["deals"]).unwrap().is_empty());
        assert!(unwrap_list(json!({"error": "x"}), &["deals"]).is_err());
        assert!(unwrap_list(json!("nope"), &["deals"]).is_err());
    }
}
