use super::AppState;
use crate::catalog::{BotCatalog, CatalogError, ItemCatalog};
use crate::config::GameConfig;
use crate::error::GameResult;
use crate::loadout::{self, LoadoutError};
use crate::match_runner::{MatchConfig, MatchSession, PlayerConfig, ScriptConfig};
use crate::overlay::OverlayData;
use crate::types::*;
use rand::Rng;
use std::time::Instant;

/// What a guess did, as seen by the chat layer
#[derive(Debug, Clone)]
pub struct GuessReport {
    pub outcome: GuessOutcome,
    pub round_id: RoundId,
    /// The guess completed the round: every mystery bot is now guessed
    pub round_complete: bool,
}

/// Pick `2 * bots_per_team` catalog entries with replacement and dress them up.
///
/// Identifiers follow selection order ("A", "B", ...); the first half plays
/// blue, the rest orange.
pub fn draw_mysteries<R: Rng + ?Sized>(
    catalog: &BotCatalog,
    items: &ItemCatalog,
    config: &GameConfig,
    rng: &mut R,
) -> Result<(Vec<MysteryBot>, Vec<PlayerConfig>), LoadoutError> {
    let count = config.mystery_count();
    if catalog.is_empty() {
        return Ok((Vec::new(), Vec::new()));
    }
    let mut mysteries = Vec::with_capacity(count);
    let mut players = Vec::with_capacity(count);

    for index in 0..count {
        let number = rng.random_range(0..catalog.len());
        let Some(bot) = catalog.get(number) else {
            continue;
        };
        let team = if index < config.bots_per_team {
            Team::Blue
        } else {
            Team::Orange
        };
        let mystery = MysteryBot {
            identifier: ((b'A' + index as u8) as char).to_string(),
            number,
            actual_name: bot.name.clone(),
            team,
        };
        let loadout = loadout::randomize(items, rng)?;
        players.push(PlayerConfig::bot(
            mystery.display_name(),
            team,
            bot.config_path.clone(),
            loadout,
        ));
        mysteries.push(mystery);
    }

    Ok((mysteries, players))
}

impl AppState {
    pub async fn overlay_snapshot(&self, round_end: bool) -> OverlayData {
        let catalog = self.catalog.read().await;
        let round = self.round.read().await;
        let ledger = self.ledger.read().await;
        OverlayData::project(&catalog, &round, &ledger, round_end)
    }

    /// Write the overlay file; failures are logged and otherwise ignored
    pub async fn publish_overlay(&self, round_end: bool) {
        let _publishing = self.publishing.lock().await;
        let data = self.overlay_snapshot(round_end).await;
        self.write_overlay(&data).await;
    }

    /// Publish after a guess, unless `round_id` has closed in the meantime.
    ///
    /// A closed round's reveal must not be overwritten by a late guess update.
    async fn publish_guess(&self, round_id: &str) {
        let _publishing = self.publishing.lock().await;
        let data = {
            let catalog = self.catalog.read().await;
            let round = self.round.read().await;
            if round.id != round_id || !round.is_open() {
                tracing::debug!(round_id, "Round closed, dropping guess publish");
                return;
            }
            let ledger = self.ledger.read().await;
            OverlayData::project(&catalog, &round, &ledger, false)
        };
        self.write_overlay(&data).await;
    }

    async fn write_overlay(&self, data: &OverlayData) {
        if let Err(e) = self.overlay.publish(data).await {
            tracing::warn!("Failed to publish overlay: {}", e);
        }
    }

    /// Record a guess against the current round
    pub async fn submit_guess(&self, guesser: &str, identifier: &str, number: usize) -> GuessReport {
        let report = {
            let round = self.round.read().await;
            let mut ledger = self.ledger.write().await;
            let outcome = ledger.record_guess(&round, guesser, identifier, number, Instant::now());
            let round_complete =
                matches!(outcome, GuessOutcome::Correct { .. }) && ledger.all_guessed(&round);
            GuessReport {
                outcome,
                round_id: round.id.clone(),
                round_complete,
            }
        };

        tracing::info!(
            round_id = %report.round_id,
            guesser,
            identifier,
            number,
            outcome = report.outcome.label(),
            "Guess received"
        );

        if report.outcome.is_terminal() {
            self.publish_guess(&report.round_id).await;
        }
        if report.round_complete {
            self.disarm(&report.round_id);
        }

        report
    }

    /// Close the current round and start a new one
    pub async fn start_round(&self, trigger: RoundTrigger) -> GameResult<Round> {
        let _guard = self.transition.lock().await;
        self.start_round_locked(trigger).await
    }

    /// Start a new round only if `round_id` is still the current one.
    ///
    /// Returns `None` when another transition already replaced that round.
    pub async fn advance_from(
        &self,
        round_id: &str,
        trigger: RoundTrigger,
    ) -> GameResult<Option<Round>> {
        let _guard = self.transition.lock().await;
        if self.round.read().await.id != round_id {
            tracing::debug!(round_id, ?trigger, "Round already replaced, not advancing");
            return Ok(None);
        }
        self.start_round_locked(trigger).await.map(Some)
    }

    /// Run [`AppState::advance_from`] on a background task, logging failures
    pub fn spawn_advance(&self, round_id: RoundId, trigger: RoundTrigger) {
        let state = self.clone();
        tokio::spawn(async move {
            if let Err(e) = state.advance_from(&round_id, trigger).await {
                tracing::error!(?trigger, "Failed to start next round: {}", e);
            }
        });
    }

    /// Forfeit the current round: returns its mystery names and schedules the next round
    pub async fn skip_round(&self) -> Vec<String> {
        let (round_id, names) = {
            let round = self.round.read().await;
            let names = round.mysteries.iter().map(|m| m.actual_name.clone()).collect();
            (round.id.clone(), names)
        };
        tracing::info!(round_id = %round_id, "Round skipped");
        self.spawn_advance(round_id, RoundTrigger::Skip);
        names
    }

    async fn start_round_locked(&self, trigger: RoundTrigger) -> GameResult<Round> {
        let previous_id = {
            let mut round = self.round.write().await;
            round.phase = RoundPhase::Closed;
            round.id.clone()
        };
        self.disarm(&previous_id);
        self.publish_overlay(true).await;

        tracing::info!(?trigger, previous_round = %previous_id, "Starting new round");

        let scanner = self.scanner.clone();
        let bots_dir = self.config.bots_dir.clone();
        let catalog =
            tokio::task::spawn_blocking(move || BotCatalog::load(scanner.as_ref(), &bots_dir))
                .await??;
        if catalog.is_empty() {
            return Err(CatalogError::NoBots(self.config.bots_dir.clone()).into());
        }
        self.match_runner.check_ready()?;

        let (mysteries, match_config) = {
            let mut rng = rand::rng();
            let (mysteries, players) =
                draw_mysteries(&catalog, &self.items, &self.config, &mut rng)?;
            let scripts = self
                .config
                .caster_script
                .iter()
                .map(|path| ScriptConfig {
                    config_path: path.clone(),
                })
                .collect();
            (mysteries, MatchConfig::soccer(players, scripts, &mut rng))
        };

        let round = {
            let mut current = self.round.write().await;
            let number = current.number + 1;
            *current = Round {
                id: ulid::Ulid::new().to_string(),
                number,
                phase: RoundPhase::Closed,
                mysteries,
                started_at: chrono::Utc::now(),
            };
            current.clone()
        };
        *self.catalog.write().await = catalog;
        self.ledger.write().await.reset();

        let names = round
            .mysteries
            .iter()
            .map(|m| m.actual_name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        tracing::info!(
            round_id = %round.id,
            round_no = round.number,
            map = %match_config.game_map,
            bots = %names,
            "Mystery bots selected"
        );

        {
            let mut session = self.session.lock().await;
            if let Some(previous) = session.take() {
                tracing::debug!(round_id = %previous.round_id(), "Stopping previous match");
                previous.shutdown(self.config.match_join_timeout).await;
            }
            *session = Some(MatchSession::launch(
                round.id.clone(),
                self.match_runner.clone(),
                match_config,
            ));
        }

        tokio::time::sleep(self.config.warmup).await;

        let round = {
            let mut current = self.round.write().await;
            current.phase = RoundPhase::Open;
            current.clone()
        };
        self.armed_round.send_replace(Some(round.id.clone()));
        self.publish_overlay(false).await;

        tracing::info!(round_id = %round.id, "Round open for guesses");
        Ok(round)
    }
}
