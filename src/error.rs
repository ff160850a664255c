use crate::catalog::CatalogError;
use crate::chat::ChatError;
use crate::config::ConfigError;
use crate::loadout::LoadoutError;
use crate::match_runner::{MatchError, TelemetryError};
use crate::overlay::OverlayError;

pub type GameResult<T> = Result<T, GameError>;

/// Errors that abort startup or a round transition
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Loadout(#[from] LoadoutError),

    #[error(transparent)]
    Match(#[from] MatchError),

    #[error(transparent)]
    Chat(#[from] ChatError),

    #[error(transparent)]
    Overlay(#[from] OverlayError),

    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
