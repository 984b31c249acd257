use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nids_backend_core::{app_config, build_router, initialize_app_state};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    let config = app_config::config();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("nids_backend_core={},tower_http=info", config.rust_log).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        environment = %config.environment,
        "Starting NIDS backend on {}", config.bind_address
    );

    let state = match initialize_app_state(config) {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to load model artifacts: {}", e);
            error!("Set REQUIRE_MODELS=false to start without a model");
            return Err(e.into());
        },
    };

    let health = state.analysis_service.health();
    info!(
        model_loaded = health.model_loaded,
        features_loaded = health.features_loaded,
        "Service status: {}", health.status
    );

    let app = build_router(state);

    let listener = TcpListener::bind(&config.bind_address).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
