//! Heart Predict server entry point

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use heart_predict::{
    create_router,
    features::EcgEncoding,
    model::{Predictor, RandomForest},
    AppState, Config,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env().context("Invalid configuration")?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| config.default_log_filter().into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Heart Predict server starting...");

    // Load the classifier once; every request shares it
    let forest = RandomForest::load(&config.model_path)
        .with_context(|| format!("Failed to load model artifact {}", config.model_path.display()))?;

    if config.ecg_encoding == EcgEncoding::Canonical {
        tracing::warn!("Resting ECG uses canonical encoding; the artifact must be trained on it");
    }

    let predictor = Predictor::new(Arc::new(forest), config.ecg_encoding);

    let state = AppState {
        config: config.clone(),
        predictor,
    };

    let app = create_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
