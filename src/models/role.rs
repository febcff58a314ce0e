use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Villager,
    Mafia,
    Detective,
    Doctor,
}

impl Role {
    pub fn faction(&self) -> Faction {
        match self {
            Role::Mafia => Faction::Mafia,
            _ => Faction::Villagers,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Villager => write!(f, "villager"),
            Role::Mafia => write!(f, "mafia"),
            Role::Detective => write!(f, "detective"),
            Role::Doctor => write!(f, "doctor"),
        }
    }
}

/// Grouping used only for win-condition math.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Faction {
    Villagers,
    Mafia,
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Faction::Villagers => write!(f, "The Villagers"),
            Faction::Mafia => write!(f, "The Mafia"),
        }
    }
}
