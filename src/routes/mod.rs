pub mod game;
pub mod health;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/", get(game::home))
        .route("/guess", post(game::submit_guess))
        .route("/new", post(game::new_game))
}
