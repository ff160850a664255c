use crate::match_runner::Telemetry;
use crate::state::AppState;
use crate::types::{RoundId, RoundTrigger};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Spawn the task that starts the next round once the live match reports it ended.
///
/// The task lives for the whole process. It only polls while a round is armed;
/// every round transition re-arms it with the new round id. Telemetry is reset
/// once per armed round so the previous match's final packet is not mistaken
/// for the new match ending.
pub fn spawn_match_end_watcher(state: AppState, telemetry: Arc<dyn Telemetry>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut armed = state.watch_armed_round();
        let interval = state.config.match_poll_interval;
        let mut reset_for: Option<RoundId> = None;

        loop {
            let current = armed.borrow_and_update().clone();
            let Some(round_id) = current else {
                if armed.changed().await.is_err() {
                    break;
                }
                continue;
            };

            if reset_for.as_deref() != Some(round_id.as_str()) {
                if let Err(e) = telemetry.reset().await {
                    tracing::warn!(round_id = %round_id, "Failed to reset telemetry: {}", e);
                }
                reset_for = Some(round_id.clone());
            }

            tokio::time::sleep(interval).await;

            // Re-armed or disarmed while sleeping
            if armed.borrow().as_deref() != Some(round_id.as_str()) {
                continue;
            }

            tracing::debug!(round_id = %round_id, "Checking if match ended");
            match telemetry.is_match_ended().await {
                Ok(true) => {
                    tracing::info!(round_id = %round_id, "Match ended, starting new round");
                    state.disarm(&round_id);
                    if let Err(e) = state
                        .advance_from(&round_id, RoundTrigger::MatchEnded)
                        .await
                    {
                        tracing::error!("Failed to start next round: {}", e);
                    }
                }
                Ok(false) => {}
                Err(e) => tracing::warn!(round_id = %round_id, "Telemetry poll failed: {}", e),
            }
        }

        tracing::info!("Match-end watcher stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::match_runner::FileTelemetry;
    use crate::test_support::{test_state, IdleRunner, OneShotTelemetry};
    use std::time::Duration;

    async fn wait_for_round_change(state: &AppState, from: &str) -> bool {
        for _ in 0..200 {
            let round = state.current_round().await;
            if round.id != from && round.is_open() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        false
    }

    #[tokio::test]
    async fn test_match_end_starts_next_round() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), 1, vec!["Atba"], Arc::new(IdleRunner));
        let telemetry = Arc::new(OneShotTelemetry::default());
        let _watcher = spawn_match_end_watcher(state.clone(), telemetry.clone());

        let first = state.start_round(RoundTrigger::Startup).await.unwrap();
        telemetry.end_match();

        assert!(wait_for_round_change(&state, &first.id).await);
        assert_eq!(state.current_round().await.number, 2);
    }

    #[tokio::test]
    async fn test_disarmed_round_is_not_advanced() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), 1, vec!["Atba"], Arc::new(IdleRunner));
        let telemetry = Arc::new(OneShotTelemetry::default());
        let _watcher = spawn_match_end_watcher(state.clone(), telemetry.clone());

        let first = state.start_round(RoundTrigger::Startup).await.unwrap();
        state.disarm(&first.id);
        telemetry.end_match();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(state.current_round().await.id, first.id);
    }

    #[tokio::test]
    async fn test_previous_match_packet_does_not_end_new_round() {
        let dir = tempfile::tempdir().unwrap();
        let packet = dir.path().join("telemetry.json");
        std::fs::write(&packet, r#"{"isMatchEnded": true}"#).unwrap();

        let state = test_state(dir.path(), 1, vec!["Atba"], Arc::new(IdleRunner));
        let telemetry = Arc::new(FileTelemetry::new(packet.clone()));
        let _watcher = spawn_match_end_watcher(state.clone(), telemetry);

        let round = state.start_round(RoundTrigger::MatchEnded).await.unwrap();

        // Many poll intervals with no new match ending
        tokio::time::sleep(Duration::from_millis(200)).await;
        let current = state.current_round().await;
        assert_eq!(current.id, round.id);
        assert_eq!(current.number, 1);
        assert!(!packet.exists());

        // A real end of the new match still advances
        std::fs::write(&packet, r#"{"isMatchEnded": true}"#).unwrap();
        assert!(wait_for_round_change(&state, &round.id).await);
        assert_eq!(state.current_round().await.number, 2);
    }
}
