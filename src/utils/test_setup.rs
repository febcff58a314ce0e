use dotenvy::dotenv;
use std::sync::Once;

static INIT: Once = Once::new();

/// Environment defaults for tests: no external text service, no pacing
/// delays.
pub fn setup_test_env() {
    INIT.call_once(|| {
        dotenv().ok();
        if std::env::var("BOT_PACING_MS").is_err() {
            std::env::set_var("BOT_PACING_MS", "0");
        }
        std::env::remove_var("MESSAGE_SERVICE_URL");
    });
}
