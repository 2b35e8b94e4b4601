mod classify;
mod config;
mod gemini;
mod history;
mod line;
mod webhook;

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::prelude::*;

use config::Config;
use gemini::GeminiClient;
use history::HistoryStore;
use line::LineClient;
use webhook::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .init();

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    let history = HistoryStore::new(config.db_path.clone());
    if let Err(e) = history.initialize() {
        error!("Failed to initialize history store: {e}");
        std::process::exit(1);
    }

    info!("🚀 Starting linegem...");
    info!("History database: {}", config.db_path.display());

    let state = Arc::new(AppState {
        channel_secret: config.channel_secret,
        history,
        gemini: GeminiClient::new(config.gemini_api_key),
        line: LineClient::new(config.channel_access_token),
    });

    let router = webhook::build_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    info!("Webhook server listening on {addr}");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind webhook server on {addr}: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        error!("Webhook server error: {e}");
    }
}
