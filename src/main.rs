//! Payroll engine HTTP server.
//!
//! Reads configuration from `PAYROLL_CONFIG_DIR` (default `./config/default`)
//! and the log filter from `RUST_LOG` (default `info`).

use std::env;

use payroll_engine::api::{AppState, create_router};
use payroll_engine::config::ConfigLoader;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_CONFIG_DIR: &str = "./config/default";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_dir = env::var("PAYROLL_CONFIG_DIR").unwrap_or_else(|_| DEFAULT_CONFIG_DIR.to_string());
    let config = ConfigLoader::load(&config_dir)?;
    let bind_address = config.settings().server.bind_address.clone();

    info!(
        config_dir = %config_dir,
        rules = config.config().rules().len(),
        grades = config.config().grades().len(),
        employees = config.config().employees().len(),
        "Configuration loaded"
    );

    let app = create_router(AppState::new(config)?);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!(address = %bind_address, "Payroll engine listening");
    axum::serve(listener, app).await?;

    Ok(())
}
