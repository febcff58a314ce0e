use axum::{http::StatusCode, response::IntoResponse, Json};
use thiserror::Error;

/// Everything that can go wrong inside a game session.
///
/// Invalid actions leave the session untouched; routine UI races (a vote
/// arriving after the phase advanced, a stale render submitting twice) are
/// expected to hit these and simply be ignored by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("session not found")]
    SessionNotFound,
    #[error("player not found: {0}")]
    PlayerNotFound(String),
    #[error("action not allowed in the {0} phase")]
    InvalidPhase(String),
    #[error("at least {0} players are required to start")]
    NotEnoughPlayers(usize),
    #[error("player is dead: {0}")]
    PlayerDead(String),
    #[error("player role does not match the claimed action")]
    RoleMismatch,
}

impl GameError {
    fn status(&self) -> StatusCode {
        match self {
            GameError::SessionNotFound | GameError::PlayerNotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for GameError {
    fn into_response(self) -> axum::response::Response {
        (self.status(), Json(self.to_string())).into_response()
    }
}
