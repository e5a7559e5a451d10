use anyhow::Result;
use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::bridge::{BrokerBridge, Decoded};
use crate::config::SharedConfig;
use crate::dashboard::evaluation::{evaluate, Evaluation, EvaluationContext, EvaluationInput};
use crate::dashboard::store::{DashboardEvent, DashboardStore};
use crate::models::AccountStatus;

/// Polls the bridge and keeps the store current. Syncs run one at a time.
pub struct Dashboard {
    config: SharedConfig,
    bridge: Box<dyn BrokerBridge>,
    store: DashboardStore,
}

impl Dashboard {
    pub async fn new(config: SharedConfig, bridge: Box<dyn BrokerBridge>) -> Self {
        let cfg = config.read().await;

        info!("{}", "=".repeat(60));
        info!("Prop dashboard starting up");
        info!("Bridge: {}", cfg.bridge_url);
        info!("Poll interval: {}s", cfg.poll_interval_secs);
        info!("Timezone: {}", cfg.timezone);
        match cfg.starting_balance {
            Some(b) => info!("Starting balance: {:.2} (configured)", b),
            None => info!("Starting balance: inferred from history"),
        }
        for w in &cfg.sessions {
            info!(
                "  {:<10} {:02}:{:02}-{:02}:{:02} UTC",
                w.session.to_string(),
                w.start.0,
                w.start.1,
                w.end.0,
                w.end.1
            );
        }
        info!("{}", "=".repeat(60));

        drop(cfg);

        Self {
            config,
            bridge,
            store: DashboardStore::new(),
        }
    }

    pub fn store(&self) -> &DashboardStore {
        &self.store
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.store.subscribe()
    }

    pub async fn run(&mut self) -> Result<()> {
        self.run_until(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
    }

    /// Poll until `shutdown` resolves. A sync still waiting on the bridge
    /// is abandoned.
    pub async fn run_until<F>(&mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let interval_secs = self.config.read().await.poll_interval_secs;
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        info!("Dashboard is now running. Press Ctrl+C to stop.");

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutting down");
                    return Ok(());
                }
                _ = ticker.tick() => {
                    tokio::select! {
                        _ = &mut shutdown => {
                            info!("Shutting down, sync in progress abandoned");
                            return Ok(());
                        }
                        _ = self.sync_once() => {}
                    }
                }
            }
        }
    }

    /// Fetch everything, evaluate, publish. Unreachable endpoints degrade to
    /// empty values and are reported through the store.
    pub async fn sync_once(&mut self) -> Arc<Evaluation> {
        let cfg = self.config.read().await.clone();
        let mut failures = Vec::new();

        let account = match self.bridge.fetch_account().await {
            Ok(a) => Some(a),
            Err(e) => {
                warn!("Account fetch failed: {:#}", e);
                failures.push(format!("account: {e:#}"));
                None
            }
        };

        let positions = match self.bridge.fetch_positions().await {
            Ok(d) => accept("positions", d),
            Err(e) => {
                warn!("Positions fetch failed: {:#}", e);
                failures.push(format!("positions: {e:#}"));
                Vec::new()
            }
        };

        let deals = match self.bridge.fetch_history(cfg.history_days).await {
            Ok(d) => accept("history", d),
            Err(e) => {
                warn!("History fetch failed: {:#}", e);
                failures.push(format!("history: {e:#}"));
                Vec::new()
            }
        };

        let ctx = EvaluationContext::from_config(&cfg, Utc::now());
        let input = EvaluationInput {
            account,
            positions,
            deals,
        };
        let evaluation = evaluate(&input, &ctx);

        let previous = self.store.status();
        let evaluation = self.store.apply_sync(evaluation, failures);
        log_summary(&evaluation, previous);
        evaluation
    }
}

fn accept<T>(what: &str, decoded: Decoded<T>) -> Vec<T> {
    for err in &decoded.rejected {
        warn!("Dropping {} record: {}", what, err);
    }
    debug!("{}: {} records", what, decoded.records.len());
    decoded.records
}

fn log_summary(eval: &Evaluation, previous: Option<AccountStatus>) {
    info!(
        "{} [{}] {} | bal {:.2} eq {:.2} | dd today {:.2}% total {:.2}% (hist {:.2}% live {:.2}%) | {} trades, {} open | {}",
        eval.account.firm,
        eval.phase,
        eval.account.name,
        eval.account.balance,
        eval.live_equity,
        eval.risk.dd_today_pct,
        eval.risk.dd_total_pct,
        eval.historical.dd_pct,
        eval.live.dd_pct,
        eval.trades.len(),
        eval.open_positions.len(),
        eval.status
    );

    if let Some(prev) = previous {
        if prev != eval.status {
            match eval.status {
                AccountStatus::Ok => info!("Status recovered: {} -> {}", prev, eval.status),
                _ => warn!("Status changed: {} -> {}", prev, eval.status),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{BridgeExport, RawAccount, RawDeal, RawPosition, ReplayBridge};
    use crate::test_helpers::default_test_config;
    use async_trait::async_trait;
    use serde_json::json;

    /// A bridge that never answers.
    struct StalledBridge;

    #[async_trait]
    impl BrokerBridge for StalledBridge {
        async fn fetch_account(&mut self) -> Result<RawAccount> {
            std::future::pending().await
        }

        async fn fetch_positions(&mut self) -> Result<Decoded<RawPosition>> {
            std::future::pending().await
        }

        async fn fetch_history(&mut self, _days: Option<u32>) -> Result<Decoded<RawDeal>> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn shutdown_interrupts_a_stalled_sync() {
        let cfg = default_test_config().shared();
        let mut dash = Dashboard::new(cfg, Box::new(StalledBridge)).await;

        let stopped = tokio::time::timeout(
            Duration::from_secs(5),
            dash.run_until(tokio::time::sleep(Duration::from_millis(50))),
        )
        .await;
        assert!(matches!(stopped, Ok(Ok(()))));
        assert!(dash.store().latest().is_none());
    }

    #[tokio::test]
    async fn sync_once_with_empty_export_reports_failure() {
        let cfg = default_test_config().shared();
        let bridge = ReplayBridge::new(BridgeExport::default());
        let mut dash = Dashboard::new(cfg, Box::new(bridge)).await;

        let eval = dash.sync_once().await;
        assert!(!eval.account_available);
        assert_eq!(eval.status, AccountStatus::Ok);
        assert_eq!(dash.store().consecutive_failures(), 1);
        assert!(dash.store().last_error().unwrap().starts_with("account:"));
    }

    #[tokio::test]
    async fn sync_once_publishes_evaluation() {
        let cfg = default_test_config().shared();
        let export = BridgeExport {
            account: json!({"login": 9, "name": "FTMO Challenge", "server": "FTMO-Demo", "balance": 100_000.0, "equity": 100_000.0}),
            positions: json!([]),
            history: json!([]),
        };
        let mut dash = Dashboard::new(cfg, Box::new(ReplayBridge::new(export))).await;
        let mut rx = dash.subscribe();

        let eval = dash.sync_once().await;
        assert_eq!(eval.account.firm, "FTMO");
        assert_eq!(dash.store().consecutive_failures(), 0);
        assert!(matches!(rx.try_recv().unwrap(), DashboardEvent::Synced { .. }));
    }
}
