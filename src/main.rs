mod config;
mod dictionary;
mod game;
mod models;
mod routes;
mod session;
mod utils;
mod websocket;

use std::sync::Arc;

use anyhow::Result;
use axum::{routing::get, Router};
use config::Config;
use dictionary::{FreeDictionaryApi, WordCache, WordValidator};
use game::GameEngine;
use session::{CommandSender, Sequencer, SessionStore};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use websocket::Broadcaster;

/// Application state shared across all handlers
pub struct AppState {
    pub config: Config,
    pub broadcaster: Arc<Broadcaster>,
    /// Inbox of the session sequencer, the only writer of room state
    pub commands: CommandSender,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "grid_race_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting grid race backend server...");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    // Load word cache
    let cache = WordCache::load(&config.dictionary.cache_path).await;
    tracing::info!("Loaded {} cached words", cache.len());

    // Create shared HTTP client for reusing connections
    let http_client = reqwest::Client::builder()
        .timeout(config.dictionary.lookup_timeout())
        .build()?;
    let lookup = FreeDictionaryApi::new(http_client, &config.dictionary.api_url)?;
    tracing::info!("Dictionary API: {}", config.dictionary.api_url);

    let validator = Arc::new(WordValidator::new(
        cache,
        Arc::new(lookup),
        config.dictionary.lookup_timeout(),
    ));
    let flusher =
        dictionary::spawn_cache_flusher(validator.clone(), config.dictionary.flush_interval());

    // Start the session sequencer
    let broadcaster = Arc::new(Broadcaster::new());
    let (commands, inbox) = session::command_channel();
    let sequencer = Sequencer::new(
        SessionStore::new(config.game.clone()),
        GameEngine::new(config.game.words_to_finish),
        broadcaster.clone(),
        validator.clone(),
        inbox,
        &commands,
    );
    tokio::spawn(sequencer.run());

    // Create application state
    let state = Arc::new(AppState {
        config,
        broadcaster,
        commands,
    });

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        // WebSocket endpoint
        .route("/ws", get(websocket::handle_websocket))
        // API routes
        .merge(routes::create_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    // Start server
    let addr = state.config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("WebSocket endpoint: ws://{}/ws", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Keep whatever the dictionary taught us
    flusher.abort();
    validator.persist().await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
