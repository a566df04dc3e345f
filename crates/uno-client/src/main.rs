//! UNO table client.

use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod protocol;
mod runtime;
mod service;
mod terminal;

use config::ClientConfig;
use runtime::{Input, Runtime};
use service::HttpGameService;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they don't interleave with the table
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ClientConfig::from_env()?;
    info!(service = %config.service_url, "Starting UNO client...");

    let service = Arc::new(HttpGameService::new(&config)?);
    let (runtime, handle) = Runtime::new(service, &config);

    tokio::spawn(terminal::print_views(handle.clone()));
    let input = tokio::spawn(async move {
        if let Err(e) = terminal::read_commands(handle.clone()).await {
            error!("Failed to read input: {}", e);
            handle.send(Input::Shutdown);
        }
    });

    runtime.run().await?;
    input.abort();
    Ok(())
}
