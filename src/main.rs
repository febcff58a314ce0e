use axum::http::{self, HeaderValue, Method};
use dotenvy::dotenv;
use env_logger::Builder;
use log::LevelFilter;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use mafia_server::app::create_app;
use mafia_server::models::config::ServerConfig;
use mafia_server::state::AppState;

fn init_logger() {
    let mut builder = Builder::new();
    builder
        .filter_level(LevelFilter::Info)
        .filter_module("tower_http", LevelFilter::Debug)
        .format_timestamp(Some(env_logger::TimestampPrecision::Millis))
        .format_target(true)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_logger();

    let config = ServerConfig::from_env();
    if config.message_service_url.is_none() {
        log::info!("MESSAGE_SERVICE_URL not set; bot chatter uses the phrasebook only");
    }

    let origin = config.allowed_origin.parse::<HeaderValue>()?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([http::header::CONTENT_TYPE]);

    let addr = SocketAddr::from((config.host, config.port));
    let state = AppState::with_config(config);

    let app = create_app(state).layer(cors).layer(
        TraceLayer::new_for_http().make_span_with(|request: &http::Request<_>| {
            tracing::info_span!(
                "HTTP request",
                method = %request.method(),
                uri = %request.uri(),
            )
        }),
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("mafia-server listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
