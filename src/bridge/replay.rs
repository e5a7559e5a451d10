use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::bridge::models::{decode_records, unwrap_list};
use crate::bridge::{BrokerBridge, Decoded, RawAccount, RawDeal, RawPosition};
use crate::error::BridgeError;

/// The three bridge payloads captured together, as written by an export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BridgeExport {
    #[serde(default)]
    pub account: Value,
    #[serde(default)]
    pub positions: Value,
    #[serde(default)]
    pub history: Value,
}

/// A bridge that serves pre-loaded payloads. `now` controls the cutoff for
/// the `days` history filter, so exports can be replayed as of any time.
pub struct ReplayBridge {
    export: BridgeExport,
    now: DateTime<Utc>,
}

impl ReplayBridge {
    pub fn new(export: BridgeExport) -> Self {
        Self {
            export,
            now: Utc::now(),
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read export {}", path.display()))?;
        let export: BridgeExport = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse export {}", path.display()))?;
        Ok(Self::new(export))
    }

    pub fn set_time(&mut self, t: DateTime<Utc>) {
        self.now = t;
    }

    pub fn current_time(&self) -> DateTime<Utc> {
        self.now
    }

    fn list(&self, endpoint: &str, value: &Value, keys: &[&str]) -> Result<Vec<Value>> {
        unwrap_list(value.clone(), keys).map_err(|reason| {
            BridgeError::Decode {
                endpoint: endpoint.to_string(),
                reason,
            }
            .into()
        })
    }
}

#[async_trait]
impl BrokerBridge for ReplayBridge {
    async fn fetch_account(&mut self) -> Result<RawAccount> {
        if self.export.account.is_null() {
            return Err(BridgeError::Unreachable {
                endpoint: "replay:/account".to_string(),
                reason: "export has no account payload".to_string(),
            }
            .into());
        }
        serde_json::from_value(self.export.account.clone()).map_err(|e| {
            BridgeError::Decode {
                endpoint: "replay:/account".to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    async fn fetch_positions(&mut self) -> Result<Decoded<RawPosition>> {
        let values = self.list(
            "replay:/positions",
            &self.export.positions,
            &["positions", "data"],
        )?;
        Ok(decode_records("position", values))
    }

    async fn fetch_history(&mut self, days: Option<u32>) -> Result<Decoded<RawDeal>> {
        let values = self.list(
            "replay:/history",
            &self.export.history,
            &["deals", "history", "data"],
        )?;
        let mut decoded: Decoded<RawDeal> = decode_records("deal", values);

        let now = self.now.timestamp();
        decoded.records.retain(|d| d.time <= now);
        if let Some(days) = days {
            let cutoff = now - i64::from(days) * 86_400;
            decoded.records.retain(|d| d.time >= cutoff);
        }
        Ok(decoded)
    }
}
