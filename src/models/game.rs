use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::GameError;
use crate::utils::rules::{assign_roles, check_game_over};

use super::chat::ChatMessage;
use super::player::{Gender, Player};
use super::role::{Faction, Role};
use super::settings::GameSettings;

/// Name pool for generated bot players.
const BOT_NAMES: &[&str] = &[
    "Alex", "Blake", "Charlie", "Dana", "Ellis", "Frankie", "Gray", "Harper", "Indigo", "Jordan",
    "Kelly", "Lee", "Morgan", "Noah", "Parker", "Quinn", "Riley", "Sam", "Taylor", "Val",
];

pub const MIN_PLAYERS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GamePhase {
    Lobby,
    RoleAssignment,
    Day,
    Voting,
    Night,
    Results,
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GamePhase::Lobby => write!(f, "lobby"),
            GamePhase::RoleAssignment => write!(f, "role-assignment"),
            GamePhase::Day => write!(f, "day"),
            GamePhase::Voting => write!(f, "voting"),
            GamePhase::Night => write!(f, "night"),
            GamePhase::Results => write!(f, "results"),
        }
    }
}

/// One entry in the vote tally. Entries keep their insertion order, which is
/// what makes the tie-break rule ("first target to reach the maximum")
/// deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteEntry {
    pub target_id: String,
    pub voters: Vec<String>,
}

/// Pending night choices, one slot per role. A re-submission overwrites the
/// slot; the last write before the phase advances wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NightActions {
    pub mafia_target: Option<String>,
    pub detective_target: Option<String>,
    pub doctor_target: Option<String>,
}

/// The authoritative session state. One instance per game, owned by the
/// session map and mutated only through the methods below.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub phase: GamePhase,
    /// Join order, stable for the whole session.
    pub players: Vec<Player>,
    pub day_count: u32,
    pub votes: Vec<VoteEntry>,
    pub night_actions: NightActions,
    pub last_eliminated: Option<Player>,
    pub game_over: bool,
    pub winner: Option<Faction>,
    /// Human-readable event log.
    pub messages: Vec<String>,
    pub chat_messages: Vec<ChatMessage>,
    /// Read-only signal that a bot batch is in flight; gates nothing.
    pub bots_thinking: bool,
    pub settings: GameSettings,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    pub fn new() -> Self {
        GameState {
            phase: GamePhase::Lobby,
            players: Vec::new(),
            day_count: 0,
            votes: Vec::new(),
            night_actions: NightActions::default(),
            last_eliminated: None,
            game_over: false,
            winner: None,
            messages: Vec::new(),
            chat_messages: Vec::new(),
            bots_thinking: false,
            settings: GameSettings::default(),
        }
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn alive_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_alive)
    }

    fn require_phase(&self, phase: GamePhase) -> Result<(), GameError> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(GameError::InvalidPhase(self.phase.to_string()))
        }
    }

    fn require_alive(&self, id: &str) -> Result<&Player, GameError> {
        let player = self
            .player(id)
            .ok_or_else(|| GameError::PlayerNotFound(id.to_string()))?;
        if !player.is_alive {
            return Err(GameError::PlayerDead(player.name.clone()));
        }
        Ok(player)
    }

    /// Add a human player to the lobby. The first player to join becomes the
    /// host; quotas are re-derived from the new roster size.
    pub fn join(&mut self, name: String, gender: Gender) -> Result<Player, GameError> {
        self.require_phase(GamePhase::Lobby)?;
        let is_host = self.players.is_empty();
        let player = Player::new(name, gender, is_host);
        self.players.push(player.clone());
        self.rescale_settings();
        Ok(player)
    }

    /// Fill the lobby with named bot players, up to the name pool size.
    pub fn add_bots(&mut self, count: usize, rng: &mut impl Rng) -> Result<Vec<Player>, GameError> {
        self.require_phase(GamePhase::Lobby)?;
        let mut names: Vec<&str> = BOT_NAMES.to_vec();
        names.shuffle(rng);
        let taken: Vec<String> = self.players.iter().map(|p| p.name.clone()).collect();
        names.retain(|n| !taken.iter().any(|t| t == n));

        let mut added = Vec::new();
        for name in names.into_iter().take(count) {
            let gender = if rng.gen_bool(0.5) {
                Gender::Male
            } else {
                Gender::Female
            };
            let bot = Player::new_bot(name.to_string(), gender);
            self.players.push(bot.clone());
            added.push(bot);
        }
        self.settings.bot_count = self.players.iter().filter(|p| p.is_bot).count();
        self.rescale_settings();
        Ok(added)
    }

    fn rescale_settings(&mut self) {
        self.settings = GameSettings {
            bot_count: self.settings.bot_count,
            ..GameSettings::default_for(self.players.len())
        };
    }

    /// Replace the quotas, clamped so they fit the current roster.
    pub fn update_settings(&mut self, settings: GameSettings) -> Result<(), GameError> {
        self.require_phase(GamePhase::Lobby)?;
        self.settings = settings.clamped_for(self.players.len().max(MIN_PLAYERS));
        Ok(())
    }

    /// Lobby -> role-assignment: shuffle roles onto the roster.
    pub fn start(&mut self, rng: &mut impl Rng) -> Result<(), GameError> {
        self.require_phase(GamePhase::Lobby)?;
        if self.players.len() < MIN_PLAYERS {
            return Err(GameError::NotEnoughPlayers(MIN_PLAYERS));
        }
        let settings = self.settings.clamped_for(self.players.len());
        self.settings = settings;
        self.players = assign_roles(&self.players, &settings, rng);
        self.phase = GamePhase::RoleAssignment;
        self.messages
            .push("Game has started! Roles have been assigned.".to_string());
        Ok(())
    }

    /// Re-target the voter: any earlier vote by them is withdrawn first, so a
    /// voter holds at most one active vote.
    pub fn cast_vote(&mut self, voter_id: &str, target_id: &str) -> Result<(), GameError> {
        self.require_phase(GamePhase::Voting)?;
        self.require_alive(voter_id)?;
        self.require_alive(target_id)?;

        for entry in &mut self.votes {
            entry.voters.retain(|v| v != voter_id);
        }
        match self.votes.iter_mut().find(|e| e.target_id == target_id) {
            Some(entry) => entry.voters.push(voter_id.to_string()),
            None => self.votes.push(VoteEntry {
                target_id: target_id.to_string(),
                voters: vec![voter_id.to_string()],
            }),
        }
        Ok(())
    }

    /// Record a night choice. The actor must hold the claimed role; each
    /// role's slot is overwritten on re-submission.
    pub fn submit_night_action(
        &mut self,
        role: Role,
        actor_id: &str,
        target_id: &str,
    ) -> Result<(), GameError> {
        self.require_phase(GamePhase::Night)?;
        let actor = self.require_alive(actor_id)?;
        if actor.role != role {
            return Err(GameError::RoleMismatch);
        }
        self.require_alive(target_id)?;

        let target = Some(target_id.to_string());
        match role {
            Role::Mafia => self.night_actions.mafia_target = target,
            Role::Detective => self.night_actions.detective_target = target,
            Role::Doctor => self.night_actions.doctor_target = target,
            Role::Villager => return Err(GameError::RoleMismatch),
        }
        Ok(())
    }

    /// The detective's result is derived on read, never stored: whether the
    /// currently investigated player is mafia.
    pub fn investigation_result(&self) -> Option<(String, bool)> {
        let target_id = self.night_actions.detective_target.as_deref()?;
        let target = self.player(target_id)?;
        Some((target.name.clone(), target.role == Role::Mafia))
    }

    /// Append a chat line from a living player and mirror it onto the player
    /// card.
    pub fn post_chat(&mut self, player_id: &str, content: String) -> Result<ChatMessage, GameError> {
        let player = self.require_alive(player_id)?;
        let message = ChatMessage::new(player.id.clone(), player.name.clone(), content.clone());
        self.chat_messages.push(message.clone());
        if let Some(p) = self.players.iter_mut().find(|p| p.id == player_id) {
            p.last_message = Some(content);
        }
        Ok(message)
    }

    /// Host-driven phase advance. Exactly one transition per call, per the
    /// fixed cycle; elimination and win evaluation happen on the way out of
    /// voting and night.
    pub fn proceed(&mut self, rng: &mut impl Rng) -> Result<GamePhase, GameError> {
        match self.phase {
            GamePhase::Lobby => {
                self.start(rng)?;
            }
            GamePhase::RoleAssignment => {
                self.day_count = 1;
                self.phase = GamePhase::Day;
                self.messages.push(
                    "Day 1 has started. Discuss among yourselves to find the Mafia!".to_string(),
                );
            }
            GamePhase::Day => {
                self.votes.clear();
                self.phase = GamePhase::Voting;
                self.messages
                    .push("Voting has started. Choose someone to eliminate!".to_string());
            }
            GamePhase::Voting => {
                self.resolve_votes();
            }
            GamePhase::Night => {
                self.resolve_night();
            }
            GamePhase::Results => {
                self.reset();
            }
        }
        Ok(self.phase)
    }

    /// Results -> lobby: full reinitialization, nothing carries over.
    pub fn reset(&mut self) {
        *self = GameState::new();
    }

    /// Strict running maximum over the insertion-ordered tally; the first
    /// target to reach it is eliminated. An empty tally eliminates no one.
    fn leading_vote_target(&self) -> Option<String> {
        let mut max_votes = 0;
        let mut leader = None;
        for entry in &self.votes {
            if entry.voters.len() > max_votes {
                max_votes = entry.voters.len();
                leader = Some(entry.target_id.clone());
            }
        }
        leader
    }

    fn eliminate(&mut self, id: &str) -> Option<Player> {
        let player = self.players.iter_mut().find(|p| p.id == id && p.is_alive)?;
        player.is_alive = false;
        Some(player.clone())
    }

    fn resolve_votes(&mut self) {
        let eliminated = self
            .leading_vote_target()
            .and_then(|id| self.eliminate(&id));

        match &eliminated {
            Some(p) => self
                .messages
                .push(format!("{} was eliminated. They were a {}.", p.name, p.role)),
            None => self.messages.push("No one was eliminated.".to_string()),
        }
        self.last_eliminated = eliminated;

        if self.evaluate_game_over() {
            return;
        }
        self.phase = GamePhase::Night;
        self.night_actions = NightActions::default();
        self.messages
            .push("Night has fallen. Everyone close your eyes...".to_string());
    }

    fn resolve_night(&mut self) {
        let NightActions {
            mafia_target,
            detective_target,
            doctor_target,
        } = self.night_actions.clone();

        // Protection fully negates the kill; nothing else has a state effect.
        let eliminated = match &mafia_target {
            Some(target) if mafia_target != doctor_target => self.eliminate(target),
            _ => None,
        };

        match &eliminated {
            Some(p) => self
                .messages
                .push(format!("{} was killed by the Mafia.", p.name)),
            None => self
                .messages
                .push("No one was killed during the night.".to_string()),
        }
        self.last_eliminated = eliminated;

        if let Some(target_id) = &detective_target {
            if let Some(target) = self.player(target_id) {
                self.messages
                    .push(format!("The detective investigated {}.", target.name));
            }
        }

        self.night_actions = NightActions::default();

        if self.evaluate_game_over() {
            return;
        }
        self.day_count += 1;
        self.phase = GamePhase::Day;
        self.messages.push(format!(
            "Day {} has started. Discuss among yourselves to find the Mafia!",
            self.day_count
        ));
    }

    /// Run the win evaluator and, if the game ended, move to results.
    fn evaluate_game_over(&mut self) -> bool {
        let outcome = check_game_over(&self.players);
        if !outcome.over {
            return false;
        }
        self.game_over = true;
        self.winner = outcome.winner;
        self.phase = GamePhase::Results;
        if let Some(winner) = outcome.winner {
            self.messages.push(format!("Game over! {} won!", winner));
        }
        true
    }
}
