//! Boundary to the external match orchestrator
//!
//! Launching the game, loading bots and polling the live packet are done by an
//! external program. This module describes the match it should run, launches
//! it through the [`MatchRunner`] seam and reads back whether it has ended.

mod process;
mod session;
mod telemetry;

pub use process::ProcessMatchRunner;
pub use session::MatchSession;
pub use telemetry::{FileTelemetry, Telemetry, TelemetryError, TelemetryResult};

use crate::types::{LoadoutConfig, Team};
use async_trait::async_trait;
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub type MatchResult<T> = Result<T, MatchError>;

#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    #[error("No match command configured (set MATCH_COMMAND)")]
    NotConfigured,

    #[error("Failed to launch match process: {0}")]
    Spawn(std::io::Error),

    #[error("Failed to write match config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize match config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Match process exited with {0}")]
    Exited(std::process::ExitStatus),
}

pub const STANDARD_MAPS: &[&str] = &[
    "DFHStadium",
    "Mannfield",
    "ChampionsField",
    "UrbanCentral",
    "BeckwithPark",
    "UtopiaColiseum",
    "Wasteland",
    "NeoTokyo",
    "AquaDome",
    "StarbaseArc",
    "Farmstead",
    "SaltyShores",
    "DFHStadium_Stormy",
    "DFHStadium_Day",
    "Mannfield_Stormy",
    "Mannfield_Night",
    "ChampionsField_Day",
    "BeckwithPark_Stormy",
    "BeckwithPark_Midnight",
    "UrbanCentral_Night",
    "UrbanCentral_Dawn",
    "UtopiaColiseum_Dusk",
    "DFHStadium_Snowy",
    "Mannfield_Snowy",
    "UtopiaColiseum_Snowy",
    "ForbiddenTemple",
    "RivalsArena",
    "Farmstead_Night",
    "SaltyShores_Night",
    "NeonFields",
    "DFHStadium_Circuit",
    "DeadeyeCanyon",
];

pub fn random_map<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    STANDARD_MAPS.choose(rng).copied().unwrap_or("DFHStadium")
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerConfig {
    pub name: String,
    pub team: u8,
    pub config_path: PathBuf,
    pub bot: bool,
    pub rlbot_controlled: bool,
    pub loadout: LoadoutConfig,
}

impl PlayerConfig {
    pub fn bot(name: String, team: Team, config_path: PathBuf, loadout: LoadoutConfig) -> Self {
        Self {
            name,
            team: team.index(),
            config_path,
            bot: true,
            rlbot_controlled: true,
            loadout,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScriptConfig {
    pub config_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchConfig {
    pub game_mode: String,
    pub game_map: String,
    pub enable_state_setting: bool,
    pub early_start_seconds: u32,
    pub players: Vec<PlayerConfig>,
    pub scripts: Vec<ScriptConfig>,
}

impl MatchConfig {
    /// A soccer match on a random standard map
    pub fn soccer<R: Rng + ?Sized>(
        players: Vec<PlayerConfig>,
        scripts: Vec<ScriptConfig>,
        rng: &mut R,
    ) -> Self {
        Self {
            game_mode: "Soccer".to_string(),
            game_map: random_map(rng).to_string(),
            enable_state_setting: true,
            early_start_seconds: 5,
            players,
            scripts,
        }
    }
}

/// Runs one match to completion
#[async_trait]
pub trait MatchRunner: Send + Sync {
    /// Resolves once the match process loop exits
    async fn run(&self, config: MatchConfig) -> MatchResult<()>;

    /// Fails if matches cannot be launched at all
    fn check_ready(&self) -> MatchResult<()> {
        Ok(())
    }
}
