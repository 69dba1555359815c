use tracing_subscriber::EnvFilter;

use cinebot::{
    api::{create_router, AppState},
    config::Config,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cinebot=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    tracing::info!(
        model = %config.gemini_model,
        timeout_secs = config.request_timeout_secs,
        extraction = ?config.json_extraction,
        session_ttl_secs = config.session_ttl_secs,
        "Configuration loaded"
    );

    // Initialize application state
    let state = AppState::from_config(&config);
    let sweeper = state.sessions.spawn_sweeper(config.session_sweep_interval());

    // Create the router with all routes
    let app = create_router(state);

    // Start the server
    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down");
}
