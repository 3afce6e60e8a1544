use std::sync::Arc;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use customer_lookup::config::AppConfig;
use customer_lookup::db;
use customer_lookup::http::{self, AppState};
use customer_lookup::metrics::LookupMetrics;
use customer_lookup::CustomerLookupHandler;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Default to INFO, overridable with RUST_LOG
    // Example: RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,customer_lookup=debug")),
        )
        .init();

    tracing::info!("Starting customer lookup service");

    // === 1. Configuration ===
    let config = AppConfig::from_env()?;
    tracing::info!(
        backend = ?config.backend,
        http_port = config.http_port,
        "Configuration loaded"
    );

    // === 2. Metrics ===
    let metrics = Arc::new(LookupMetrics::new()?);

    // === 3. Repository (retry + circuit breaker around the configured backend) ===
    let repository = db::build_repository(&config, metrics.clone()).await?;

    // === 4. Lookup handler + HTTP adapter ===
    let handler = CustomerLookupHandler::new(repository).with_metrics(metrics.clone());
    let state = AppState { handler, metrics };

    http::serve(&config.http_host, config.http_port, state).await?;

    tracing::info!("Customer lookup service stopped");
    Ok(())
}
