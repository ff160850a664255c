//! Fakes shared by unit tests

use crate::catalog::{BotScanner, CatalogResult, ItemCatalog};
use crate::config::GameConfig;
use crate::match_runner::{MatchConfig, MatchResult, MatchRunner, Telemetry, TelemetryResult};
use crate::state::AppState;
use crate::types::BotDefinition;
use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Scanner returning a fixed list of bot names
pub struct FixedScanner(pub Vec<&'static str>);

impl BotScanner for FixedScanner {
    fn scan(&self, dir: &Path) -> CatalogResult<Vec<BotDefinition>> {
        Ok(self
            .0
            .iter()
            .map(|name| BotDefinition {
                name: name.to_string(),
                config_path: dir.join(format!("{}.cfg", name)),
            })
            .collect())
    }
}

/// Match that never ends on its own
pub struct IdleRunner;

#[async_trait]
impl MatchRunner for IdleRunner {
    async fn run(&self, _config: MatchConfig) -> MatchResult<()> {
        std::future::pending::<()>().await;
        Ok(())
    }
}

/// Reports "ended" once after [`OneShotTelemetry::end_match`]
#[derive(Default)]
pub struct OneShotTelemetry {
    ended: AtomicBool,
}

impl OneShotTelemetry {
    pub fn end_match(&self) {
        self.ended.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Telemetry for OneShotTelemetry {
    async fn is_match_ended(&self) -> TelemetryResult<bool> {
        Ok(self.ended.swap(false, Ordering::SeqCst))
    }
}

pub fn items() -> ItemCatalog {
    ItemCatalog::parse(
        "23,Body\n1,Skin\n360,Wheels\n32,Boost\n35,SupersonicTrail\n270,PaintFinish\n1903,GoalExplosion\n",
    )
    .expect("fixture items parse")
}

/// State writing its overlay under `dir`, no warm-up delay
pub fn test_state(
    dir: &Path,
    bots_per_team: usize,
    bots: Vec<&'static str>,
    runner: Arc<dyn MatchRunner>,
) -> AppState {
    let config = GameConfig {
        bots_per_team,
        overlay_dir: dir.join("overlay"),
        warmup: Duration::ZERO,
        match_poll_interval: Duration::from_millis(10),
        match_join_timeout: Duration::from_millis(10),
        ..GameConfig::default()
    };
    state_with_config(config, bots, runner)
}

pub fn state_with_config(
    config: GameConfig,
    bots: Vec<&'static str>,
    runner: Arc<dyn MatchRunner>,
) -> AppState {
    AppState::new(config, items(), Arc::new(FixedScanner(bots)), runner)
}
