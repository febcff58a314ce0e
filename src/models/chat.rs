use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub player_id: String,
    pub player_name: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(player_id: String, player_name: String, content: String) -> Self {
        ChatMessage {
            player_id,
            player_name,
            content,
            timestamp: Utc::now(),
        }
    }
}
