use std::{collections::HashMap, sync::Arc};
use tokio::sync::Mutex;

use crate::models::config::ServerConfig;
use crate::models::game::GameState;
use crate::services::message_service::MessageService;

/// Shared application state. Every session is owned by the map and mutated
/// only while the lock is held, so the engine sees strictly one action at a
/// time.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<Mutex<HashMap<String, GameState>>>,
    pub message_service: Arc<MessageService>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_config(ServerConfig::from_env())
    }

    pub fn with_config(config: ServerConfig) -> Self {
        AppState {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            message_service: Arc::new(MessageService::from_config(&config)),
            config: Arc::new(config),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
