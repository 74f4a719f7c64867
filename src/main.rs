use std::sync::Arc;
use std::time::Duration;

use siscom_alerts::api::HttpAlertSource;
use siscom_alerts::config::AppConfig;
use siscom_alerts::sync::SyncService;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load config
    let config = AppConfig::load()?;

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(&config.log_level)
        .init();

    info!("Starting Siscom Alerts sync service...");
    info!("Polling {} every {} ms", config.api_base_url, config.poll_interval_ms);

    let client = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .build()?;
    let source = Arc::new(HttpAlertSource::new(client, &config.api_base_url));
    let service = Arc::new(SyncService::new(
        source,
        Duration::from_millis(config.poll_interval_ms),
    ));

    service.start();

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    service.stop();

    let store = service.store();
    info!(
        "Final state: {} alerts, last synced at {:?}",
        store.alerts().len(),
        store.last_synced_at()
    );

    Ok(())
}
