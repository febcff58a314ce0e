//! Drives simulated-player turns.
//!
//! A round snapshots the session, computes decisions outside the lock, then
//! applies each result through the validated entry points. Every application
//! re-checks the (phase, day) stamp taken at the start: when the host
//! force-advances mid-round, the leftover decisions are stale and are
//! discarded instead of leaking into the next phase. The `bots_thinking`
//! flag is a pure status signal for observers and gates nothing.

use std::time::Duration;

use rand::seq::SliceRandom;

use crate::models::game::{GamePhase, GameState};
use crate::models::player::Player;
use crate::models::role::Role;
use crate::state::AppState;

use super::decision;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Stamp {
    phase: GamePhase,
    day: u32,
}

/// Lock, check the phase, mark `bots_thinking`, and return a snapshot plus
/// the stamp that later applications are keyed on.
async fn begin_round(
    state: &AppState,
    session_id: &str,
    phases: &[GamePhase],
) -> Option<(GameState, Stamp)> {
    let mut sessions = state.sessions.lock().await;
    let session = sessions.get_mut(session_id)?;
    if !phases.contains(&session.phase) {
        return None;
    }
    session.bots_thinking = true;
    let stamp = Stamp {
        phase: session.phase,
        day: session.day_count,
    };
    Some((session.clone(), stamp))
}

async fn end_round(state: &AppState, session_id: &str) {
    if let Some(session) = state.sessions.lock().await.get_mut(session_id) {
        session.bots_thinking = false;
    }
}

/// Apply one bot decision under the lock, but only if the session is still
/// where it was when the round started. Returns false once results are
/// stale, which ends the round.
async fn apply_if_current(
    state: &AppState,
    session_id: &str,
    stamp: Stamp,
    apply: impl FnOnce(&mut GameState),
) -> bool {
    let mut sessions = state.sessions.lock().await;
    let session = match sessions.get_mut(session_id) {
        Some(s) => s,
        None => return false,
    };
    if session.phase != stamp.phase || session.day_count != stamp.day {
        return false;
    }
    apply(session);
    true
}

async fn pace(state: &AppState) {
    let ms = state.config.bot_pacing_ms;
    if ms > 0 {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

fn alive_bots(snapshot: &GameState) -> Vec<Player> {
    snapshot
        .players
        .iter()
        .filter(|p| p.is_bot && p.is_alive)
        .cloned()
        .collect()
}

/// One bot speaks about one other player during the day or voting stretch.
pub async fn run_chat_round(state: AppState, session_id: String) {
    let Some((snapshot, stamp)) =
        begin_round(&state, &session_id, &[GamePhase::Day, GamePhase::Voting]).await
    else {
        return;
    };

    let picked = {
        let mut rng = rand::thread_rng();
        let bots = alive_bots(&snapshot);
        bots.choose(&mut rng).cloned().map(|speaker| {
            let target = snapshot
                .players
                .iter()
                .filter(|p| p.is_alive && p.id != speaker.id)
                .cloned()
                .collect::<Vec<_>>()
                .choose(&mut rng)
                .cloned();
            (speaker, target)
        })
    };

    if let Some((speaker, target)) = picked {
        let message = state
            .message_service
            .generate(&speaker, &snapshot, snapshot.day_count, target.as_ref())
            .await;
        apply_if_current(&state, &session_id, stamp, |session| {
            let _ = session.post_chat(&speaker.id, message);
        })
        .await;
    }

    end_round(&state, &session_id).await;
}

/// Every living bot votes, one at a time, paced for realism.
pub async fn run_vote_round(state: AppState, session_id: String) {
    let Some((snapshot, stamp)) = begin_round(&state, &session_id, &[GamePhase::Voting]).await
    else {
        return;
    };

    for bot in alive_bots(&snapshot) {
        pace(&state).await;
        let choice = {
            let mut rng = rand::thread_rng();
            decision::choose_vote_target(&bot, &snapshot, &mut rng)
        };
        let Some(target_id) = choice else { continue };
        let applied = apply_if_current(&state, &session_id, stamp, |session| {
            if let Err(e) = session.cast_vote(&bot.id, &target_id) {
                log::debug!("bot vote rejected: {}", e);
            }
        })
        .await;
        if !applied {
            log::debug!("session {}: vote round abandoned, state moved on", session_id);
            break;
        }
    }

    end_round(&state, &session_id).await;
}

/// Night choices for every acting bot role. The mafia slot is shared, so
/// only the first living mafia bot in join order submits for the faction;
/// detective and doctor bots each submit their own (later ones overwrite,
/// matching the engine's last-write-wins slot).
pub async fn run_night_round(state: AppState, session_id: String) {
    let Some((snapshot, stamp)) = begin_round(&state, &session_id, &[GamePhase::Night]).await
    else {
        return;
    };

    let bots = alive_bots(&snapshot);
    let mut actors: Vec<Player> = Vec::new();
    if let Some(mafia) = bots.iter().find(|p| p.role == Role::Mafia) {
        actors.push(mafia.clone());
    }
    actors.extend(
        bots.iter()
            .filter(|p| p.role == Role::Detective || p.role == Role::Doctor)
            .cloned(),
    );

    for actor in actors {
        pace(&state).await;
        let choice = {
            let mut rng = rand::thread_rng();
            decision::choose_night_target(&actor, &snapshot, &mut rng)
        };
        let Some(target_id) = choice else { continue };
        let applied = apply_if_current(&state, &session_id, stamp, |session| {
            if let Err(e) = session.submit_night_action(actor.role, &actor.id, &target_id) {
                log::debug!("bot night action rejected: {}", e);
            }
        })
        .await;
        if !applied {
            log::debug!(
                "session {}: night round abandoned, state moved on",
                session_id
            );
            break;
        }
    }

    end_round(&state, &session_id).await;
}

/// Kick off whichever bot work a freshly entered phase calls for.
pub fn schedule_for_phase(state: &AppState, session_id: &str, phase: GamePhase) {
    match phase {
        GamePhase::Day => {
            tokio::spawn(run_chat_round(state.clone(), session_id.to_string()));
        }
        GamePhase::Voting => {
            let state = state.clone();
            let session_id = session_id.to_string();
            tokio::spawn(async move {
                run_chat_round(state.clone(), session_id.clone()).await;
                run_vote_round(state, session_id).await;
            });
        }
        GamePhase::Night => {
            tokio::spawn(run_night_round(state.clone(), session_id.to_string()));
        }
        _ => {}
    }
}
