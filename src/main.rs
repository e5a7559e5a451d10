use anyhow::Result;
use tracing_subscriber::{fmt, EnvFilter};

use prop_dashboard::bridge::Mt5Bridge;
use prop_dashboard::config::Config;
use prop_dashboard::dashboard::Dashboard;

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .init();

    let bridge = Box::new(Mt5Bridge::new(&cfg)?);
    let shared_config = cfg.shared();

    let mut dashboard = Dashboard::new(shared_config, bridge).await;
    dashboard.run().await?;

    Ok(())
}
