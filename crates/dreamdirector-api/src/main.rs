//! DreamDirector API server entry point.

use std::sync::Arc;

use dreamdirector_api::config::ServerConfig;
use dreamdirector_api::error::AppError;
use dreamdirector_api::state::AppState;
use dreamdirector_api::{build_router, telemetry};
use dreamdirector_core::clock::{Clock, SystemClock};
use dreamdirector_media::MediaLibrary;
use dreamdirector_providers::google_provider_set;
use dreamdirector_story::infrastructure::InMemoryEventRepository;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = ServerConfig::from_env()?;
    let _telemetry = telemetry::init(config.otlp_endpoint.as_deref())?;

    tracing::info!("Starting DreamDirector API server");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let media = MediaLibrary::open(
        &config.media_dir,
        config.media_search_dirs.clone(),
        clock.clone(),
    )?;

    let providers = match &config.providers {
        Some(provider_config) => {
            tracing::info!(?provider_config, "generative providers configured");
            Some(google_provider_set(provider_config)?)
        }
        None => {
            tracing::warn!("GOOGLE_API_KEY is not set; generation endpoints will return 503");
            None
        }
    };

    let app_state = AppState::new(
        clock,
        Arc::new(InMemoryEventRepository::new()),
        Arc::new(media),
        providers,
    );
    let app = build_router(app_state, &config);

    let addr = config.socket_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("DreamDirector API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
