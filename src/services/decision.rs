//! Advisory decision policy for simulated players.
//!
//! Everything here is a heuristic over the public snapshot: keyword scans of
//! the chat log plus uniform-random fallbacks. Nothing in this module mutates
//! state; every choice still goes through the validated session entry points,
//! which remain the sole gatekeepers of legality.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::game::GameState;
use crate::models::player::Player;
use crate::models::role::Role;

/// Words that mark a chat line as an accusation.
const ACCUSATION_KEYWORDS: &[&str] = &[
    "suspicious",
    "mafia",
    "evil",
    "lying",
    "liar",
    "kill",
    "vote",
    "suspect",
    "eliminate",
    "guilty",
    "not innocent",
];

/// Words that suggest the speaker holds (or claims) a special role.
const ROLE_CLAIM_KEYWORDS: &[&str] = &["detective", "doctor", "investigated", "protected"];

fn mentions_any(content: &str, keywords: &[&str]) -> bool {
    let lower = content.to_lowercase();
    keywords.iter().any(|k| lower.contains(k))
}

/// Players who have voiced accusations against someone else.
pub fn find_accusers(state: &GameState) -> Vec<String> {
    let mut accusers = Vec::new();
    for msg in &state.chat_messages {
        if !mentions_any(&msg.content, ACCUSATION_KEYWORDS) {
            continue;
        }
        let lower = msg.content.to_lowercase();
        let accuses_someone = state
            .players
            .iter()
            .any(|p| p.id != msg.player_id && lower.contains(&p.name.to_lowercase()));
        if accuses_someone && !accusers.contains(&msg.player_id) {
            accusers.push(msg.player_id.clone());
        }
    }
    accusers
}

/// Players mentioned in an accusing context more than once; if nobody
/// qualifies, living players who have stayed quiet become the suspects.
pub fn find_suspicious_players(state: &GameState) -> Vec<String> {
    let mut suspicious = Vec::new();
    for player in &state.players {
        let name = player.name.to_lowercase();
        let mentions = state
            .chat_messages
            .iter()
            .filter(|m| {
                m.player_id != player.id
                    && mentions_any(&m.content, ACCUSATION_KEYWORDS)
                    && m.content.to_lowercase().contains(&name)
            })
            .count();
        if mentions > 1 {
            suspicious.push(player.id.clone());
        }
    }

    if suspicious.is_empty() {
        for player in state.alive_players() {
            let has_spoken = state.chat_messages.iter().any(|m| m.player_id == player.id);
            if !has_spoken {
                suspicious.push(player.id.clone());
            }
        }
    }
    suspicious
}

/// Players the mafia would plausibly go after: anyone using role-claim
/// vocabulary, plus the currently suspicious (often innocents under fire).
pub fn find_likely_targets(state: &GameState) -> Vec<String> {
    let mut targets = Vec::new();
    for msg in &state.chat_messages {
        if mentions_any(&msg.content, ROLE_CLAIM_KEYWORDS) && !targets.contains(&msg.player_id) {
            targets.push(msg.player_id.clone());
        }
    }
    for id in find_suspicious_players(state) {
        if !targets.contains(&id) {
            targets.push(id);
        }
    }
    targets
}

fn pick<'a>(candidates: &'a [&'a Player], rng: &mut impl Rng) -> Option<String> {
    candidates.choose(rng).map(|p| p.id.clone())
}

fn restrict<'a>(candidates: &'a [&'a Player], ids: &[String]) -> Vec<&'a Player> {
    candidates
        .iter()
        .copied()
        .filter(|p| ids.contains(&p.id))
        .collect()
}

/// Night-action target for a living simulated player, or None to decline
/// (villagers have no night action; no legal target does the same).
pub fn choose_night_target(
    player: &Player,
    state: &GameState,
    rng: &mut impl Rng,
) -> Option<String> {
    if !player.is_alive {
        return None;
    }
    let others: Vec<&Player> = state.alive_players().filter(|p| p.id != player.id).collect();
    if others.is_empty() {
        return None;
    }

    match player.role {
        Role::Mafia => {
            let non_mafia: Vec<&Player> =
                others.iter().copied().filter(|p| p.role != Role::Mafia).collect();
            if non_mafia.is_empty() {
                return Some(others[0].id.clone());
            }
            // Known special roles first, then whoever is pointing fingers at
            // the mafia, then anyone.
            let special: Vec<&Player> = non_mafia
                .iter()
                .copied()
                .filter(|p| p.role == Role::Detective || p.role == Role::Doctor)
                .collect();
            if !special.is_empty() {
                return pick(&special, rng);
            }
            let accusers = restrict(&non_mafia, &find_accusers(state));
            if !accusers.is_empty() {
                return pick(&accusers, rng);
            }
            pick(&non_mafia, rng)
        }
        Role::Detective => {
            let suspicious = restrict(&others, &find_suspicious_players(state));
            if !suspicious.is_empty() {
                return pick(&suspicious, rng);
            }
            pick(&others, rng)
        }
        Role::Doctor => {
            if rng.gen_bool(0.3) {
                return Some(player.id.clone());
            }
            let likely = restrict(&others, &find_likely_targets(state));
            if !likely.is_empty() {
                return pick(&likely, rng);
            }
            pick(&others, rng)
        }
        Role::Villager => None,
    }
}

/// Vote target for a living simulated player.
pub fn choose_vote_target(player: &Player, state: &GameState, rng: &mut impl Rng) -> Option<String> {
    if !player.is_alive {
        return None;
    }
    let others: Vec<&Player> = state.alive_players().filter(|p| p.id != player.id).collect();
    if others.is_empty() {
        return None;
    }

    if player.role == Role::Mafia {
        let non_mafia: Vec<&Player> =
            others.iter().copied().filter(|p| p.role != Role::Mafia).collect();
        if non_mafia.is_empty() {
            return Some(others[0].id.clone());
        }
        let accusers = restrict(&non_mafia, &find_accusers(state));
        if !accusers.is_empty() {
            return pick(&accusers, rng);
        }
        let special: Vec<&Player> = non_mafia
            .iter()
            .copied()
            .filter(|p| p.role == Role::Detective || p.role == Role::Doctor)
            .collect();
        if !special.is_empty() {
            return pick(&special, rng);
        }
        return pick(&non_mafia, rng);
    }

    // Village-aligned voters chase the chat-flagged suspects.
    let suspicious = restrict(&others, &find_suspicious_players(state));
    if !suspicious.is_empty() {
        return pick(&suspicious, rng);
    }
    pick(&others, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::game::GamePhase;
    use crate::models::player::Gender;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn state_with_roles(roles: &[Role]) -> GameState {
        let mut state = GameState::new();
        for (i, &role) in roles.iter().enumerate() {
            let mut p = Player::new(format!("Player{}", i), Gender::Male, i == 0);
            p.role = role;
            state.players.push(p);
        }
        state.phase = GamePhase::Day;
        state.day_count = 1;
        state
    }

    fn chat(state: &mut GameState, speaker: usize, content: &str) {
        let id = state.players[speaker].id.clone();
        state.post_chat(&id, content.to_string()).unwrap();
    }

    #[test]
    fn mafia_never_votes_for_mafia() {
        let state = state_with_roles(&[Role::Mafia, Role::Mafia, Role::Villager, Role::Villager]);
        let mafia = state.players[0].clone();
        let teammate = state.players[1].id.clone();
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let target = choose_vote_target(&mafia, &state, &mut rng).unwrap();
            assert_ne!(target, teammate);
            assert_ne!(target, mafia.id);
        }
    }

    #[test]
    fn mafia_vote_prefers_accusers() {
        let mut state =
            state_with_roles(&[Role::Mafia, Role::Villager, Role::Villager, Role::Villager]);
        // Player1 accuses Player3 of being mafia; Player1 becomes the accuser.
        let accused = state.players[3].name.clone();
        chat(&mut state, 1, &format!("I think {} is mafia", accused));
        let mafia = state.players[0].clone();
        let accuser = state.players[1].id.clone();
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            assert_eq!(choose_vote_target(&mafia, &state, &mut rng).unwrap(), accuser);
        }
    }

    #[test]
    fn mafia_night_target_prefers_special_roles() {
        let state = state_with_roles(&[Role::Mafia, Role::Detective, Role::Villager, Role::Villager]);
        let mafia = state.players[0].clone();
        let detective = state.players[1].id.clone();
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            assert_eq!(
                choose_night_target(&mafia, &state, &mut rng).unwrap(),
                detective
            );
        }
    }

    #[test]
    fn detective_investigates_suspects_flagged_in_chat() {
        let mut state =
            state_with_roles(&[Role::Detective, Role::Villager, Role::Villager, Role::Mafia]);
        let suspect_name = state.players[3].name.clone();
        chat(&mut state, 1, &format!("{} seems suspicious to me", suspect_name));
        chat(&mut state, 2, &format!("agreed, vote {} out", suspect_name));
        // The other two players have now spoken; player 3 is the flagged one.
        let detective = state.players[0].clone();
        let suspect = state.players[3].id.clone();
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            assert_eq!(
                choose_night_target(&detective, &state, &mut rng).unwrap(),
                suspect
            );
        }
    }

    #[test]
    fn quiet_players_become_suspects_when_chat_flags_no_one() {
        let mut state =
            state_with_roles(&[Role::Villager, Role::Villager, Role::Villager, Role::Mafia]);
        chat(&mut state, 0, "hello everyone");
        chat(&mut state, 1, "good morning");
        chat(&mut state, 2, "nice day for a lynching");
        let quiet = state.players[3].id.clone();
        let suspects = find_suspicious_players(&state);
        assert_eq!(suspects, vec![quiet]);
    }

    #[test]
    fn doctor_sometimes_self_protects() {
        let state = state_with_roles(&[Role::Doctor, Role::Villager, Role::Villager, Role::Mafia]);
        let doctor = state.players[0].clone();
        let mut self_protects = 0;
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            if choose_night_target(&doctor, &state, &mut rng).unwrap() == doctor.id {
                self_protects += 1;
            }
        }
        // gen_bool(0.3) over 200 seeds; wide bounds, no flakiness.
        assert!(self_protects > 20, "self-protected {} times", self_protects);
        assert!(self_protects < 120, "self-protected {} times", self_protects);
    }

    #[test]
    fn villager_never_votes_for_self() {
        let state = state_with_roles(&[Role::Villager, Role::Villager, Role::Mafia, Role::Villager]);
        let villager = state.players[0].clone();
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            assert_ne!(
                choose_vote_target(&villager, &state, &mut rng).unwrap(),
                villager.id
            );
        }
    }

    #[test]
    fn dead_players_decline() {
        let mut state = state_with_roles(&[Role::Mafia, Role::Villager, Role::Villager, Role::Villager]);
        state.players[0].is_alive = false;
        let dead = state.players[0].clone();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(choose_vote_target(&dead, &state, &mut rng).is_none());
        assert!(choose_night_target(&dead, &state, &mut rng).is_none());
    }

    #[test]
    fn villagers_decline_night_actions() {
        let state = state_with_roles(&[Role::Villager, Role::Mafia, Role::Villager, Role::Villager]);
        let villager = state.players[0].clone();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(choose_night_target(&villager, &state, &mut rng).is_none());
    }
}
