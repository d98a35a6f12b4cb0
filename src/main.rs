//! # cashflow-forecast
//!
//! HTTP server for the net cash flow forecasting model.

use cashflow_forecast::{api::create_router, CashflowPredictor, Config};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file (optional - won't fail if missing)
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cashflow_forecast=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    let predictor = match CashflowPredictor::load(&config.artifacts) {
        Ok(predictor) => Arc::new(predictor),
        Err(err) => {
            tracing::error!("Failed to load artifacts: {:#}", err);
            return Err(err);
        }
    };

    let app = create_router(predictor);

    let addr = config.server_address();
    info!(
        "cashflow-forecast v{} listening on {}",
        env!("CARGO_PKG_VERSION"),
        addr
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
