use serde::{Deserialize, Serialize};

/// Role quotas and the number of simulated players in the lobby.
///
/// Quotas are clamped before role assignment ever sees them: the sum of the
/// special roles must stay below the roster size so at least one villager
/// remains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSettings {
    pub mafia_count: usize,
    pub detective_count: usize,
    pub doctor_count: usize,
    pub bot_count: usize,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            mafia_count: 1,
            detective_count: 1,
            doctor_count: 1,
            bot_count: 5,
        }
    }
}

impl GameSettings {
    /// Quotas scaled to the roster size: one mafia up to 5 players, two up
    /// to 7, then one per four players; always one detective and one doctor.
    pub fn default_for(player_count: usize) -> Self {
        let mafia_count = match player_count {
            0..=5 => 1,
            6..=7 => 2,
            n => n / 4,
        };
        Self {
            mafia_count,
            detective_count: 1,
            doctor_count: 1,
            ..Self::default()
        }
    }

    pub fn special_role_total(&self) -> usize {
        self.mafia_count + self.detective_count + self.doctor_count
    }

    /// Shrink quotas until they fit the roster, dropping doctors first, then
    /// detectives, then extra mafia. The last mafia slot is never given up.
    pub fn clamped_for(mut self, player_count: usize) -> Self {
        while self.special_role_total() >= player_count.max(1) {
            if self.doctor_count > 0 {
                self.doctor_count -= 1;
            } else if self.detective_count > 0 {
                self.detective_count -= 1;
            } else if self.mafia_count > 1 {
                self.mafia_count -= 1;
            } else {
                break;
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_scale_with_roster() {
        assert_eq!(GameSettings::default_for(4).mafia_count, 1);
        assert_eq!(GameSettings::default_for(6).mafia_count, 2);
        assert_eq!(GameSettings::default_for(12).mafia_count, 3);
    }

    #[test]
    fn clamping_leaves_a_villager() {
        let settings = GameSettings {
            mafia_count: 3,
            detective_count: 2,
            doctor_count: 2,
            bot_count: 0,
        };
        let clamped = settings.clamped_for(4);
        assert!(clamped.special_role_total() < 4);
        assert!(clamped.mafia_count >= 1);
    }

    #[test]
    fn clamping_drops_doctor_before_detective() {
        let settings = GameSettings {
            mafia_count: 1,
            detective_count: 1,
            doctor_count: 2,
            bot_count: 0,
        };
        let clamped = settings.clamped_for(4);
        assert_eq!(clamped.doctor_count, 1);
        assert_eq!(clamped.detective_count, 1);
    }

    #[test]
    fn fitting_quotas_are_untouched() {
        let settings = GameSettings::default();
        assert_eq!(settings.clamped_for(4), settings);
    }
}
