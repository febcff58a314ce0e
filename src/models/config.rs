use std::env;

/// Runtime configuration, read from the environment once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: [u8; 4],
    pub port: u16,
    pub allowed_origin: String,
    /// Base URL of the chatter text service; unset means phrasebook only.
    pub message_service_url: Option<String>,
    pub message_service_timeout_secs: u64,
    /// Delay between successive bot actions in a batch. Zero is fine; the
    /// pacing exists only to stagger chat and vote arrival for realism.
    pub bot_pacing_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: [127, 0, 0, 1],
            port: 8080,
            allowed_origin: "http://localhost:3000".to_string(),
            message_service_url: None,
            message_service_timeout_secs: 10,
            bot_pacing_ms: 1000,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let default = Self::default();
        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(default.port);
        let allowed_origin = env::var("ALLOWED_ORIGIN").unwrap_or(default.allowed_origin);
        let message_service_url = env::var("MESSAGE_SERVICE_URL")
            .ok()
            .filter(|v| !v.is_empty());
        let message_service_timeout_secs = env::var("MESSAGE_SERVICE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(default.message_service_timeout_secs);
        let bot_pacing_ms = env::var("BOT_PACING_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(default.bot_pacing_ms);

        Self {
            host: default.host,
            port,
            allowed_origin,
            message_service_url,
            message_service_timeout_secs,
            bot_pacing_ms,
        }
    }
}
