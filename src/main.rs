use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use guess_the_bot::catalog::{CfgDirectoryScanner, ItemCatalog};
use guess_the_bot::chat;
use guess_the_bot::config::AppConfig;
use guess_the_bot::error::GameResult;
use guess_the_bot::match_runner::{FileTelemetry, ProcessMatchRunner};
use guess_the_bot::state::AppState;
use guess_the_bot::{server, watcher};

#[tokio::main]
async fn main() -> GameResult<()> {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "guess_the_bot=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Guess The Bot...");

    let config = AppConfig::from_env()?;
    let oauth = config.twitch.resolve_oauth()?;

    let items = ItemCatalog::load(&config.game.items_path)?;

    let match_runner = Arc::new(ProcessMatchRunner::new(
        config.match_runner.command.clone(),
        config.match_runner.config_path.clone(),
    ));
    let state = AppState::new(
        config.game.clone(),
        items,
        Arc::new(CfgDirectoryScanner),
        match_runner,
    );

    let telemetry = Arc::new(FileTelemetry::new(config.match_runner.telemetry_path.clone()));
    watcher::spawn_match_end_watcher(state.clone(), telemetry);

    if let Some(port) = config.overlay_port {
        let server_state = state.clone();
        tokio::spawn(async move {
            if let Err(e) = server::serve(server_state, port).await {
                tracing::error!("Overlay server failed: {}", e);
            }
        });
    }

    chat::run_chat(state, config.twitch.clone(), oauth).await;
    Ok(())
}
