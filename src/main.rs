//! # Social API
//!
//! Entry point: tracing, configuration, then the HTTP/WebSocket server.

use anyhow::Result;
use tracing::info;

use social_api::config::Settings;
use social_api::startup::Application;

#[tokio::main]
async fn main() -> Result<()> {
    social_api::telemetry::init_tracing();

    info!("Starting Social API...");

    let settings = Settings::load()?;
    info!(
        host = %settings.server.host,
        port = %settings.server.port,
        environment = %settings.environment,
        rate_limit = settings.rate_limit.enabled,
        "Configuration loaded"
    );

    let application = Application::build(settings).await?;

    info!("Server ready to accept connections");
    application.run_until_stopped().await?;

    Ok(())
}
