use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::models::ParseCodeError;

/// Per-request failures on the game surface. Every variant is recoverable;
/// none abort the process. External secret-source failures have no variant
/// on purpose: they are absorbed inside the secret generator.
#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    InvalidGuess(#[from] ParseCodeError),

    #[error("no game in progress")]
    NoActiveGame,

    /// A persisted secret failed the code invariant; the row is corrupt.
    #[error("stored secret code is not a valid code: {0}")]
    CorruptSecret(ParseCodeError),

    #[error("session token error: {0}")]
    Session(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for GameError {
    fn into_response(self) -> Response {
        match self {
            // Handlers normally convert these into redirect notices; a plain
            // 400 is the fallback for callers that skipped that mapping.
            GameError::InvalidGuess(_) | GameError::NoActiveGame => {
                (StatusCode::BAD_REQUEST, self.to_string()).into_response()
            }
            GameError::CorruptSecret(e) => {
                tracing::error!("corrupt secret in games row: {e}");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
            GameError::Session(e) => {
                tracing::error!("session token failure: {e}");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
            GameError::Database(e) => {
                tracing::error!("database failure: {e}");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}
