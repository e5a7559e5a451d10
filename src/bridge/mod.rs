pub mod models;
pub mod mt5;
pub mod replay;

pub use models::{Decoded, RawAccount, RawDeal, RawPosition};
pub use mt5::Mt5Bridge;
pub use replay::{BridgeExport, ReplayBridge};

use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait BrokerBridge: Send + Sync {
    async fn fetch_account(&mut self) -> Result<RawAccount>;
    async fn fetch_positions(&mut self) -> Result<Decoded<RawPosition>>;
    async fn fetch_history(&mut self, days: Option<u32>) -> Result<Decoded<RawDeal>>;
}
