pub mod api; // HTTP router, middleware, server lifecycle
pub mod catalog;
pub mod config;
pub mod core_state; // Transport-agnostic state
pub mod intake; // Symptom intake workflow
pub mod models;
pub mod remote; // Prediction, speech-to-text, medicine lookup clients
pub mod voice;

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Startup failures. Everything after startup is reported per request.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Core(#[from] core_state::CoreError),
    #[error(transparent)]
    Server(#[from] api::ServerError),
}

/// Runs the service until Ctrl-C.
pub async fn run() -> Result<(), StartupError> {
    // Missing .env is fine; real environment wins.
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let service_config = config::ServiceConfig::from_env()?;
    tracing::info!(
        bind = %service_config.bind,
        predict = %service_config.predict_base_url,
        lookup = %service_config.lookup_base_url,
        speech_key = service_config.speech_api_key.is_some(),
        "Configuration loaded"
    );

    let bind = service_config.bind;
    let core = Arc::new(core_state::CoreState::new(service_config)?);
    let mut server = api::start_api_server(core, bind).await?;

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Cannot listen for shutdown signal: {e}");
    }
    server.shutdown();
    server.wait().await;
    tracing::info!("{} stopped", config::APP_NAME);
    Ok(())
}
