mod ledger;
mod round;

pub use ledger::{ScoreEntry, VoteLedger};
pub use round::{draw_mysteries, GuessReport};

use crate::catalog::{BotCatalog, BotScanner, ItemCatalog};
use crate::config::GameConfig;
use crate::match_runner::{MatchRunner, MatchSession};
use crate::overlay::OverlayPublisher;
use crate::types::*;
use std::sync::Arc;
use tokio::sync::{watch, Mutex, RwLock};

/// Shared game state: the current round, its vote ledger and the running match
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GameConfig>,
    pub items: Arc<ItemCatalog>,
    pub scanner: Arc<dyn BotScanner>,
    pub match_runner: Arc<dyn MatchRunner>,
    pub catalog: Arc<RwLock<BotCatalog>>,
    pub round: Arc<RwLock<Round>>,
    pub ledger: Arc<RwLock<VoteLedger>>,
    pub overlay: Arc<OverlayPublisher>,
    /// Match launched for the latest round
    pub session: Arc<Mutex<Option<MatchSession>>>,
    /// Serializes round transitions
    transition: Arc<Mutex<()>>,
    /// Serializes overlay snapshot-and-write
    publishing: Arc<Mutex<()>>,
    /// Round the match-end watcher should watch; `None` while closed
    armed_round: Arc<watch::Sender<Option<RoundId>>>,
}

impl AppState {
    pub fn new(
        config: GameConfig,
        items: ItemCatalog,
        scanner: Arc<dyn BotScanner>,
        match_runner: Arc<dyn MatchRunner>,
    ) -> Self {
        let (armed_tx, _armed_rx) = watch::channel(None);
        let overlay = OverlayPublisher::new(config.overlay_file());
        let ledger = VoteLedger::new(config.guess_cooldown);

        Self {
            config: Arc::new(config),
            items: Arc::new(items),
            scanner,
            match_runner,
            catalog: Arc::new(RwLock::new(BotCatalog::default())),
            round: Arc::new(RwLock::new(Round::initial())),
            ledger: Arc::new(RwLock::new(ledger)),
            overlay: Arc::new(overlay),
            session: Arc::new(Mutex::new(None)),
            transition: Arc::new(Mutex::new(())),
            publishing: Arc::new(Mutex::new(())),
            armed_round: Arc::new(armed_tx),
        }
    }

    pub async fn current_round(&self) -> Round {
        self.round.read().await.clone()
    }

    /// Subscribe to the id of the round currently open for guesses
    pub fn watch_armed_round(&self) -> watch::Receiver<Option<RoundId>> {
        self.armed_round.subscribe()
    }

    /// Stop the watcher from acting on `round_id` (no-op if another round is armed)
    pub fn disarm(&self, round_id: &str) {
        self.armed_round.send_if_modified(|armed| {
            if armed.as_deref() == Some(round_id) {
                *armed = None;
                true
            } else {
                false
            }
        });
    }
}
