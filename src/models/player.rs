use serde::{Deserialize, Serialize};

use super::role::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub gender: Gender,
    pub role: Role,
    pub is_alive: bool,
    pub is_host: bool,
    pub is_bot: bool,
    /// Most recent chat line by this player, mirrored for the UI.
    pub last_message: Option<String>,
}

impl Player {
    pub fn new(name: String, gender: Gender, is_host: bool) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            gender,
            // Placeholder until role assignment runs.
            role: Role::Villager,
            is_alive: true,
            is_host,
            is_bot: false,
            last_message: None,
        }
    }

    pub fn new_bot(name: String, gender: Gender) -> Self {
        Self {
            is_bot: true,
            ..Self::new(name, gender, false)
        }
    }
}
