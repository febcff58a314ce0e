//! Chat-line generation for simulated players.
//!
//! The engine never depends on this succeeding: the HTTP backend is optional
//! and any failure (network, timeout, bad payload) falls back to a canned
//! phrasebook line keyed by role, so a bot batch cannot block the session.

use std::time::Duration;

use anyhow::{anyhow, Context};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::models::config::ServerConfig;
use crate::models::game::GameState;
use crate::models::player::Player;
use crate::models::role::Role;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    message: String,
}

/// How bot chat lines are produced.
pub enum MessageService {
    /// POST a prompt to an external text service, fall back on any error.
    Http(HttpMessageService),
    /// Phrasebook only.
    Phrasebook,
}

pub struct HttpMessageService {
    client: reqwest::Client,
    url: String,
}

impl MessageService {
    pub fn from_config(config: &ServerConfig) -> Self {
        match &config.message_service_url {
            Some(url) => MessageService::Http(HttpMessageService {
                client: reqwest::Client::builder()
                    .timeout(Duration::from_secs(config.message_service_timeout_secs))
                    .build()
                    .unwrap_or_default(),
                url: url.clone(),
            }),
            None => MessageService::Phrasebook,
        }
    }

    /// Produce one chat line for `player`, optionally discussing a specific
    /// other player. Infallible by design; see the module docs.
    pub async fn generate(
        &self,
        player: &Player,
        state: &GameState,
        day: u32,
        discuss_target: Option<&Player>,
    ) -> String {
        if let MessageService::Http(http) = self {
            let prompt = build_prompt(player, state, day, discuss_target);
            match http.request(&prompt).await {
                Ok(message) => return message,
                Err(e) => {
                    log::warn!("message service failed, using phrasebook: {:#}", e);
                }
            }
        }
        fallback_message(player, discuss_target, &mut rand::thread_rng())
    }
}

impl HttpMessageService {
    async fn request(&self, prompt: &str) -> anyhow::Result<String> {
        let response = self
            .client
            .post(&self.url)
            .json(&GenerateRequest { prompt })
            .send()
            .await
            .context("request failed")?;
        if !response.status().is_success() {
            return Err(anyhow!("message service returned {}", response.status()));
        }
        let body: GenerateResponse = response.json().await.context("invalid response body")?;
        let message = body.message.trim().to_string();
        if message.is_empty() {
            return Err(anyhow!("message service returned an empty message"));
        }
        Ok(message)
    }
}

/// Role- and phase-aware prompt for the text service.
fn build_prompt(
    player: &Player,
    state: &GameState,
    day: u32,
    discuss_target: Option<&Player>,
) -> String {
    let mut prompt = format!("You are a {} in a Mafia game on day {}. ", player.role, day);

    match player.role {
        Role::Mafia => {
            let teammates: Vec<&str> = state
                .players
                .iter()
                .filter(|p| p.role == Role::Mafia && p.id != player.id && p.is_alive)
                .map(|p| p.name.as_str())
                .collect();
            prompt.push_str("Your goal is to eliminate all villagers until mafia outnumbers them. ");
            if teammates.is_empty() {
                prompt.push_str("You're the only mafia member left. ");
            } else {
                prompt.push_str(&format!(
                    "Your mafia teammates are: {}. ",
                    teammates.join(", ")
                ));
            }
            prompt.push_str(
                "Pretend to be innocent while subtly directing suspicion toward non-mafia players. ",
            );
        }
        Role::Detective => {
            prompt.push_str("Your goal is to help the villagers identify and eliminate the mafia. ");
            prompt.push_str("Use your knowledge strategically without revealing your role too early. ");
        }
        Role::Doctor => {
            prompt.push_str(
                "Your goal is to help the villagers by protecting players from mafia kills. ",
            );
        }
        Role::Villager => {
            prompt.push_str(
                "Your goal is to help identify and eliminate the mafia through careful deduction. ",
            );
        }
    }

    prompt.push_str(&format!(
        "There are {} players alive. ",
        state.alive_players().count()
    ));

    let eliminated: Vec<String> = state
        .players
        .iter()
        .filter(|p| !p.is_alive)
        .map(|p| format!("{} ({})", p.name, p.role))
        .collect();
    if !eliminated.is_empty() {
        prompt.push_str(&format!(
            "The following players have been eliminated: {}. ",
            eliminated.join(", ")
        ));
    }

    let recent: Vec<String> = state
        .chat_messages
        .iter()
        .rev()
        .take(10)
        .map(|m| format!("{}: \"{}\"", m.player_name, m.content))
        .collect();
    if !recent.is_empty() {
        prompt.push_str("\nRecent chat messages:\n");
        for line in recent.iter().rev() {
            prompt.push_str(line);
            prompt.push('\n');
        }
    }

    prompt.push_str(&format!("The current phase is '{}'. ", state.phase));

    match discuss_target {
        Some(target) => {
            prompt.push_str(&format!(
                "Give your opinion on {} in 1-2 sentences, strategically for your team. ",
                target.name
            ));
        }
        None => {
            prompt.push_str(
                "Generate a short, strategic message (1-2 sentences) that reflects your role and the game state. ",
            );
        }
    }
    prompt
}

const GENERIC_LINES: &[&str] = &[
    "Looking at the voting patterns, something doesn't add up.",
    "I've been watching everyone's behavior carefully.",
    "Let's analyze who's been defending whom so far.",
    "The inconsistencies in some people's arguments are telling.",
    "I think we need to consider who's been quiet and who's been vocal.",
];

const MAFIA_LINES: &[&str] = &[
    "Based on their behavior, I'm starting to suspect someone other than me.",
    "I've noticed some inconsistencies in what's being said.",
    "Let's not rush to judgment without evidence.",
    "I think we should focus on the facts we know for certain.",
    "Has anyone noticed the contradictions in some statements?",
];

const DETECTIVE_LINES: &[&str] = &[
    "I've gathered some useful information over the past few nights.",
    "Let's think critically about who's been defensive.",
    "The evidence suggests we should look more closely at certain players.",
    "I've been analyzing everyone's behavior patterns.",
    "I have reasons to believe we're overlooking something important.",
];

const DOCTOR_LINES: &[&str] = &[
    "We need to protect our key players.",
    "I think we can deduce who might be targeted next.",
    "Let's consider who's been contributing valuable insights.",
    "We should be careful about who we eliminate today.",
    "I have my suspicions, but let's hear everyone out first.",
];

const ACCUSE_LINES: &[&str] = &[
    "{name}'s arguments don't seem consistent with their earlier statements.",
    "I've noticed {name} has been deflecting attention from themselves.",
    "{name}'s voting pattern is suspicious - they seem to protect certain players.",
    "Something about {name}'s behavior doesn't feel right to me.",
    "{name} was quick to accuse others but offers little evidence.",
];

const DEFEND_LINES: &[&str] = &[
    "{name}'s arguments have been consistent throughout the game.",
    "I think {name} has made valid points that we should consider.",
    "{name} has been helping us identify suspicious behavior.",
    "I don't see strong evidence against {name} at this point.",
    "{name}'s voting choices make sense to me.",
];

fn line_about(template: &str, name: &str) -> String {
    template.replace("{name}", name)
}

/// Canned line keyed by role; when discussing a specific player, mafia
/// defends fellow mafia and accuses everyone else, others flip a coin.
pub fn fallback_message(
    player: &Player,
    discuss_target: Option<&Player>,
    rng: &mut impl Rng,
) -> String {
    if let Some(target) = discuss_target {
        if player.role == Role::Mafia && target.role == Role::Mafia {
            let template = DEFEND_LINES.choose(rng).unwrap();
            return line_about(template, &target.name);
        }
        if player.role == Role::Mafia {
            let template = ACCUSE_LINES.choose(rng).unwrap();
            return line_about(template, &target.name);
        }
        let pool = if rng.gen_bool(0.5) {
            ACCUSE_LINES
        } else {
            DEFEND_LINES
        };
        return line_about(pool.choose(rng).unwrap(), &target.name);
    }

    let pool = match player.role {
        Role::Mafia => MAFIA_LINES,
        Role::Detective => DETECTIVE_LINES,
        Role::Doctor => DOCTOR_LINES,
        Role::Villager => GENERIC_LINES,
    };
    pool.choose(rng).unwrap().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::player::Gender;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn player_with_role(name: &str, role: Role) -> Player {
        let mut p = Player::new(name.to_string(), Gender::Female, false);
        p.role = role;
        p
    }

    #[test]
    fn mafia_defends_fellow_mafia() {
        let speaker = player_with_role("Ava", Role::Mafia);
        let teammate = player_with_role("Ben", Role::Mafia);
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..20 {
            let line = fallback_message(&speaker, Some(&teammate), &mut rng);
            assert!(line.contains("Ben"));
            assert!(
                DEFEND_LINES.iter().any(|t| line == line_about(t, "Ben")),
                "expected a defend line, got: {}",
                line
            );
        }
    }

    #[test]
    fn mafia_accuses_non_mafia() {
        let speaker = player_with_role("Ava", Role::Mafia);
        let villager = player_with_role("Cal", Role::Villager);
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..20 {
            let line = fallback_message(&speaker, Some(&villager), &mut rng);
            assert!(ACCUSE_LINES.iter().any(|t| line == line_about(t, "Cal")));
        }
    }

    #[test]
    fn undirected_lines_are_role_keyed() {
        let mut rng = StdRng::seed_from_u64(5);
        let detective = player_with_role("Dee", Role::Detective);
        let line = fallback_message(&detective, None, &mut rng);
        assert!(DETECTIVE_LINES.contains(&line.as_str()));
    }

    #[test]
    fn prompt_mentions_role_day_and_phase() {
        let mut state = GameState::new();
        let speaker = player_with_role("Ava", Role::Detective);
        state.players.push(speaker.clone());
        let prompt = build_prompt(&speaker, &state, 2, None);
        assert!(prompt.contains("detective"));
        assert!(prompt.contains("day 2"));
        assert!(prompt.contains("lobby"));
    }
}
