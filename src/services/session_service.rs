//! Validated entry points over the shared session map.
//!
//! Each function locks the map, finds the session, and delegates to the
//! `GameState` methods; the lock is the serialization point for all
//! mutation. Invalid actions come back as `Err` with the state untouched.

use crate::error::GameError;
use crate::models::chat::ChatMessage;
use crate::models::game::{GamePhase, GameState};
use crate::models::player::{Gender, Player};
use crate::models::settings::GameSettings;
use crate::state::AppState;

pub async fn create_session(state: &AppState) -> String {
    let session_id = uuid::Uuid::new_v4().to_string();
    state
        .sessions
        .lock()
        .await
        .insert(session_id.clone(), GameState::new());
    log::info!("session {} created", session_id);
    session_id
}

pub async fn get_snapshot(state: &AppState, session_id: &str) -> Result<GameState, GameError> {
    let sessions = state.sessions.lock().await;
    sessions
        .get(session_id)
        .cloned()
        .ok_or(GameError::SessionNotFound)
}

pub async fn join(
    state: &AppState,
    session_id: &str,
    name: String,
    gender: Gender,
) -> Result<Player, GameError> {
    let mut sessions = state.sessions.lock().await;
    let session = sessions
        .get_mut(session_id)
        .ok_or(GameError::SessionNotFound)?;
    session.join(name, gender)
}

pub async fn add_bots(
    state: &AppState,
    session_id: &str,
    count: usize,
) -> Result<Vec<Player>, GameError> {
    let mut sessions = state.sessions.lock().await;
    let session = sessions
        .get_mut(session_id)
        .ok_or(GameError::SessionNotFound)?;
    let mut rng = rand::thread_rng();
    session.add_bots(count, &mut rng)
}

pub async fn update_settings(
    state: &AppState,
    session_id: &str,
    settings: GameSettings,
) -> Result<GameSettings, GameError> {
    let mut sessions = state.sessions.lock().await;
    let session = sessions
        .get_mut(session_id)
        .ok_or(GameError::SessionNotFound)?;
    session.update_settings(settings)?;
    Ok(session.settings)
}

pub async fn start_game(state: &AppState, session_id: &str) -> Result<(), GameError> {
    let mut sessions = state.sessions.lock().await;
    let session = sessions
        .get_mut(session_id)
        .ok_or(GameError::SessionNotFound)?;
    let mut rng = rand::thread_rng();
    session.start(&mut rng)
}

pub async fn cast_vote(
    state: &AppState,
    session_id: &str,
    voter_id: &str,
    target_id: &str,
) -> Result<(), GameError> {
    let mut sessions = state.sessions.lock().await;
    let session = sessions
        .get_mut(session_id)
        .ok_or(GameError::SessionNotFound)?;
    session.cast_vote(voter_id, target_id)
}

pub async fn submit_night_action(
    state: &AppState,
    session_id: &str,
    role: crate::models::role::Role,
    actor_id: &str,
    target_id: &str,
) -> Result<(), GameError> {
    let mut sessions = state.sessions.lock().await;
    let session = sessions
        .get_mut(session_id)
        .ok_or(GameError::SessionNotFound)?;
    session.submit_night_action(role, actor_id, target_id)
}

pub async fn advance_phase(state: &AppState, session_id: &str) -> Result<GamePhase, GameError> {
    let mut sessions = state.sessions.lock().await;
    let session = sessions
        .get_mut(session_id)
        .ok_or(GameError::SessionNotFound)?;
    let from = session.phase;
    let mut rng = rand::thread_rng();
    let to = session.proceed(&mut rng)?;
    log::info!("session {}: phase {} -> {}", session_id, from, to);
    Ok(to)
}

pub async fn post_chat(
    state: &AppState,
    session_id: &str,
    player_id: &str,
    content: String,
) -> Result<ChatMessage, GameError> {
    let mut sessions = state.sessions.lock().await;
    let session = sessions
        .get_mut(session_id)
        .ok_or(GameError::SessionNotFound)?;
    session.post_chat(player_id, content)
}

/// "Play again" from the results screen: a full reinitialization.
pub async fn restart(state: &AppState, session_id: &str) -> Result<(), GameError> {
    let mut sessions = state.sessions.lock().await;
    let session = sessions
        .get_mut(session_id)
        .ok_or(GameError::SessionNotFound)?;
    if session.phase != GamePhase::Results {
        return Err(GameError::InvalidPhase(session.phase.to_string()));
    }
    session.reset();
    Ok(())
}
