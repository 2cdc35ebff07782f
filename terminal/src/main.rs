//! Bridgesync Terminal binary.
//!
//! Entry point for the headless terminal that mirrors the bridge state.

use anyhow::Context;
use bridgesync_sdk::SyncClient;
use bridgesync_terminal::{TerminalConfig, TerminalService};
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,bridgesync_sdk=debug,bridgesync_terminal=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = TerminalConfig::from_env().context("invalid terminal configuration")?;

    tracing::info!("Starting Bridgesync Terminal");
    tracing::info!("Bridge URL: {}", config.url);
    tracing::info!("Subscription: {} {}", config.symbol, config.timeframe);
    tracing::info!("Auto reconnect: {}", config.auto_reconnect);

    let (client, notifications) =
        SyncClient::start(config.to_sync_config()).context("failed to start sync client")?;

    client
        .connect()
        .await
        .with_context(|| format!("failed to connect to bridge at {}", config.url))?;

    let service = TerminalService::new(config, client);
    let stdin = BufReader::new(tokio::io::stdin());

    tokio::select! {
        _ = service.run(stdin, notifications) => {}
        result = tokio::signal::ctrl_c() => {
            result.context("failed to listen for ctrl-c")?;
            service.stop();
        }
    }

    service.client().close();
    tracing::info!("Shutting down terminal");

    Ok(())
}
