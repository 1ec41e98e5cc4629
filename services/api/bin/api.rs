//! Main Entrypoint for the Phone Responder Webhook
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Building the text-generation client for the configured backend.
//! 3. Constructing the Axum router and applying middleware.
//! 4. Starting the web server and handling graceful shutdown.

use anyhow::Context;
use async_openai::config::OpenAIConfig;
use responder_api::{config::Config, router::create_router, state::AppState};
use responder_core::{handler::CallHandler, llm_client::OpenAICompatibleGenerator};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};

/// Listens for the `Ctrl+C` signal to gracefully shut down the server.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl+C");
        return;
    }
    info!("Received shutdown signal. Shutting down gracefully...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
    info!("Configuration loaded. Initializing application state...");

    // --- 3. Initialize the Generation Backend ---
    let api_key = config
        .credential()
        .context("No credential configured for the generation backend")?;
    let openai_config = OpenAIConfig::new()
        .with_api_key(api_key)
        .with_api_base(config.api_base());
    let generator = OpenAICompatibleGenerator::new(openai_config, config.chat_model.clone())
        .with_system_prompt(config.system_prompt.clone());

    let call_handler = CallHandler::new(Arc::new(generator), config.platform)
        .with_fallback_message(config.fallback_message.clone())
        .with_timeout(config.generation_timeout);

    let app_state = Arc::new(AppState::new(call_handler));

    // --- 4. Create Router and Apply Middleware ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // --- 5. Start Server ---
    info!(
        platform = %config.platform,
        backend = ?config.backend,
        model = %config.chat_model,
        timeout = ?config.generation_timeout,
        bind_address = %config.bind_address,
        "Service configured. Starting server..."
    );
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server has shut down.");
    Ok(())
}
