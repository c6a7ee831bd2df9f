// enrichment-gateway-rs/src/main.rs
// Enrichment Gateway - HTTP entry point for metadata lookup and poster generation
// Port 8090 by default (ENRICHMENT_GATEWAY_SERVICE_PORT / _SERVICE_ADDR)

use std::time::Duration;

use anyhow::Context;
use enrichment_gateway::{router, AppState, DEFAULT_REQUEST_BUDGET};
use enrichment_sdk::config::{default_env_chain, ConfigProviderExt};
use enrichment_sdk::Enrichment;

const SERVICE_NAME: &str = "ENRICHMENT_GATEWAY";
const DEFAULT_PORT: u16 = 8090;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    config_rs::load_dotenv();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = default_env_chain();
    let enrichment =
        Enrichment::from_config(&config).context("Failed to initialize enrichment providers")?;

    let budget = config
        .get_duration_or("request_budget_seconds", DEFAULT_REQUEST_BUDGET)
        .max(Duration::from_secs(1));
    log::info!("Using request budget of {:?}", budget);

    let state = AppState::from_enrichment(&enrichment).with_request_budget(budget);
    let app = router(state);

    let addr = config_rs::get_bind_address(SERVICE_NAME, DEFAULT_PORT);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    log::info!("Enrichment Gateway starting on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
