mod config;
mod db;
mod error;
mod game;
mod models;
mod routes;
mod session;
mod views;

use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use config::Config;
use game::secret::SecretGenerator;
use sqlx::PgPool;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Application state shared across all handlers
pub struct AppState {
    pub config: Config,
    pub db: PgPool,
    pub secrets: SecretGenerator,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mastermind_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Mastermind backend server...");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    // Connect to database
    let db = db::create_pool(config.database_url(), config.database.max_connections).await?;
    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations").run(&db).await?;
    tracing::info!("Database migrations completed");

    // Shared HTTP client; the secret source reuses its connections
    let http_client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()?;
    let secrets = SecretGenerator::new(
        http_client,
        config.game.random_source_url.clone(),
        config.game.random_source_timeout_s,
    );

    // Create application state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        secrets,
    });

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router; static assets (stylesheet) fall through to ServeDir
    let app = Router::new()
        .merge(routes::create_routes())
        .fallback_service(ServeDir::new("static"))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);
    tracing::info!("Game: http://{}/", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
