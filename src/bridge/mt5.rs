use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::bridge::models::{decode_records, unwrap_list};
use crate::bridge::{BrokerBridge, Decoded, RawAccount, RawDeal, RawPosition};
use crate::config::Config;
use crate::error::BridgeError;

const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(100);

/// HTTP client for an MT5 bridge exposing `/account`, `/positions` and `/history`.
pub struct Mt5Bridge {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    last_request: Option<Instant>,
}

impl Mt5Bridge {
    pub fn new(cfg: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.bridge_timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: cfg.bridge_url.trim_end_matches('/').to_string(),
            api_key: Some(cfg.bridge_api_key.clone()).filter(|k| !k.is_empty()),
            last_request: None,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn rate_limit(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < MIN_REQUEST_INTERVAL {
                tokio::time::sleep(MIN_REQUEST_INTERVAL - elapsed).await;
            }
        }
        self.last_request = Some(Instant::now());
    }

    async fn get_json(&mut self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        self.rate_limit().await;

        let endpoint = format!("{}{}", self.base_url, path);
        let mut req = self.client.get(&endpoint).query(query);
        if let Some(key) = &self.api_key {
            req = req.header("X-API-Key", key);
        }

        let resp = req.send().await.map_err(|e| BridgeError::Unreachable {
            endpoint: endpoint.clone(),
            reason: e.to_string(),
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BridgeError::Status {
                endpoint,
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let value = resp.json::<Value>().await.map_err(|e| BridgeError::Decode {
            endpoint: endpoint.clone(),
            reason: e.to_string(),
        })?;
        debug!("GET {} ok", endpoint);
        Ok(value)
    }

    async fn get_list(
        &mut self,
        path: &str,
        query: &[(&str, String)],
        keys: &[&str],
    ) -> Result<Vec<Value>> {
        let value = self.get_json(path, query).await?;
        unwrap_list(value, keys).map_err(|reason| {
            BridgeError::Decode {
                endpoint: format!("{}{}", self.base_url, path),
                reason,
            }
            .into()
        })
    }
}

#[async_trait]
impl BrokerBridge for Mt5Bridge {
    async fn fetch_account(&mut self) -> Result<RawAccount> {
        let value = self.get_json("/account", &[]).await?;
        serde_json::from_value(value).map_err(|e| {
            BridgeError::Decode {
                endpoint: format!("{}/account", self.base_url),
                reason: e.to_string(),
            }
            .into()
        })
    }

    async fn fetch_positions(&mut self) -> Result<Decoded<RawPosition>> {
        let values = self
            .get_list("/positions", &[], &["positions", "data"])
            .await?;
        Ok(decode_records("position", values))
    }

    async fn fetch_history(&mut self, days: Option<u32>) -> Result<Decoded<RawDeal>> {
        let query: Vec<(&str, String)> = days
            .map(|d| vec![("days", d.to_string())])
            .unwrap_or_default();
        let values = self
            .get_list("/history", &query, &["deals", "history", "data"])
            .await?;
        Ok(decode_records("deal", values))
    }
}
