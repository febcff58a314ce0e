use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::models::chat::ChatMessage;
use crate::models::game::{GamePhase, GameState};
use crate::models::player::{Gender, Player};
use crate::models::role::Role;
use crate::models::settings::GameSettings;
use crate::services::{bot_service, session_service};
use crate::state::AppState;

#[derive(Debug, Serialize)]
struct SessionCreated {
    session_id: String,
}

#[derive(Debug, Deserialize)]
struct JoinRequest {
    name: String,
    gender: Gender,
}

#[derive(Debug, Deserialize)]
struct BotsRequest {
    count: usize,
}

#[derive(Debug, Deserialize)]
struct VoteRequest {
    voter_id: String,
    target_id: String,
}

#[derive(Debug, Deserialize)]
struct NightActionRequest {
    actor_id: String,
    role: Role,
    target_id: String,
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    player_id: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct PhaseResponse {
    phase: GamePhase,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/", post(create_session_handler))
        .nest(
            "/:session_id",
            Router::new()
                .route("/state", get(get_state_handler))
                .route("/join", post(join_handler))
                .route("/bots", post(add_bots_handler))
                .route("/settings", put(update_settings_handler))
                .route("/start", post(start_handler))
                .route("/vote", post(vote_handler))
                .route("/night-action", post(night_action_handler))
                .route("/phase/next", post(advance_phase_handler))
                .route("/chat", post(chat_handler))
                .route("/restart", post(restart_handler)),
        )
        .with_state(state)
}

async fn create_session_handler(State(state): State<AppState>) -> Json<SessionCreated> {
    let session_id = session_service::create_session(&state).await;
    Json(SessionCreated { session_id })
}

async fn get_state_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<GameState>, GameError> {
    let snapshot = session_service::get_snapshot(&state, &session_id).await?;
    Ok(Json(snapshot))
}

async fn join_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<JoinRequest>,
) -> Result<Json<Player>, GameError> {
    let player = session_service::join(&state, &session_id, req.name, req.gender).await?;
    Ok(Json(player))
}

async fn add_bots_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<BotsRequest>,
) -> Result<Json<Vec<Player>>, GameError> {
    let added = session_service::add_bots(&state, &session_id, req.count).await?;
    Ok(Json(added))
}

async fn update_settings_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(settings): Json<GameSettings>,
) -> Result<Json<GameSettings>, GameError> {
    let applied = session_service::update_settings(&state, &session_id, settings).await?;
    Ok(Json(applied))
}

async fn start_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<PhaseResponse>, GameError> {
    session_service::start_game(&state, &session_id).await?;
    Ok(Json(PhaseResponse {
        phase: GamePhase::RoleAssignment,
    }))
}

async fn vote_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<VoteRequest>,
) -> Result<Json<String>, GameError> {
    session_service::cast_vote(&state, &session_id, &req.voter_id, &req.target_id).await?;
    // A human vote wakes the bots up for their own votes.
    tokio::spawn(bot_service::run_vote_round(state.clone(), session_id));
    Ok(Json("vote recorded".to_string()))
}

async fn night_action_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<NightActionRequest>,
) -> Result<Json<String>, GameError> {
    session_service::submit_night_action(
        &state,
        &session_id,
        req.role,
        &req.actor_id,
        &req.target_id,
    )
    .await?;
    tokio::spawn(bot_service::run_night_round(state.clone(), session_id));
    Ok(Json("night action recorded".to_string()))
}

async fn advance_phase_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<PhaseResponse>, GameError> {
    let phase = session_service::advance_phase(&state, &session_id).await?;
    bot_service::schedule_for_phase(&state, &session_id, phase);
    Ok(Json(PhaseResponse { phase }))
}

async fn chat_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatMessage>, GameError> {
    let message = session_service::post_chat(&state, &session_id, &req.player_id, req.content).await?;
    tokio::spawn(bot_service::run_chat_round(state.clone(), session_id));
    Ok(Json(message))
}

async fn restart_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<PhaseResponse>, GameError> {
    session_service::restart(&state, &session_id).await?;
    Ok(Json(PhaseResponse {
        phase: GamePhase::Lobby,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::ServerConfig;
    use crate::utils::test_setup::setup_test_env;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        setup_test_env();
        AppState::with_config(ServerConfig {
            bot_pacing_ms: 0,
            message_service_url: None,
            ..ServerConfig::default()
        })
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn join_start_and_read_state() {
        let state = test_state();
        let session_id = session_service::create_session(&state).await;

        for name in ["Ann", "Ben", "Cam", "Dot"] {
            let response = routes(state.clone())
                .oneshot(json_request(
                    "POST",
                    &format!("/{}/join", session_id),
                    serde_json::json!({ "name": name, "gender": "female" }),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = routes(state.clone())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/{}/start", session_id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = routes(state.clone())
            .oneshot(
                Request::builder()
                    .uri(format!("/{}/state", session_id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let snapshot: GameState = body_json(response).await;
        assert_eq!(snapshot.phase, GamePhase::RoleAssignment);
        assert_eq!(snapshot.players.len(), 4);
        assert!(snapshot.players[0].is_host);
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let state = test_state();
        let response = routes(state)
            .oneshot(
                Request::builder()
                    .uri("/nope/state")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn voting_outside_voting_phase_is_bad_request() {
        let state = test_state();
        let session_id = session_service::create_session(&state).await;
        let player = session_service::join(&state, &session_id, "Ann".into(), Gender::Female)
            .await
            .unwrap();

        let response = routes(state.clone())
            .oneshot(json_request(
                "POST",
                &format!("/{}/vote", session_id),
                serde_json::json!({ "voter_id": player.id, "target_id": player.id }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn starting_with_too_few_players_is_rejected() {
        let state = test_state();
        let session_id = session_service::create_session(&state).await;
        session_service::join(&state, &session_id, "Ann".into(), Gender::Female)
            .await
            .unwrap();

        let response = routes(state.clone())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/{}/start", session_id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let snapshot = session_service::get_snapshot(&state, &session_id)
            .await
            .unwrap();
        assert_eq!(snapshot.phase, GamePhase::Lobby);
    }

    #[tokio::test]
    async fn bots_fill_the_lobby() {
        let state = test_state();
        let session_id = session_service::create_session(&state).await;
        session_service::join(&state, &session_id, "Ann".into(), Gender::Female)
            .await
            .unwrap();

        let response = routes(state.clone())
            .oneshot(json_request(
                "POST",
                &format!("/{}/bots", session_id),
                serde_json::json!({ "count": 5 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let added: Vec<Player> = body_json(response).await;
        assert_eq!(added.len(), 5);
        assert!(added.iter().all(|p| p.is_bot));
    }
}
