use super::{MatchConfig, MatchRunner};
use crate::types::RoundId;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// The match running for one round
#[derive(Debug)]
pub struct MatchSession {
    round_id: RoundId,
    handle: JoinHandle<()>,
}

impl MatchSession {
    /// Run the match on a background task
    pub fn launch(round_id: RoundId, runner: Arc<dyn MatchRunner>, config: MatchConfig) -> Self {
        let task_round_id = round_id.clone();
        let handle = tokio::spawn(async move {
            match runner.run(config).await {
                Ok(()) => tracing::info!(round_id = %task_round_id, "Match finished"),
                Err(e) => tracing::error!(round_id = %task_round_id, "Match failed: {}", e),
            }
        });

        Self { round_id, handle }
    }

    pub fn round_id(&self) -> &str {
        &self.round_id
    }

    /// Wait up to `timeout` for the match to wind down, then abort it.
    /// Returns true if it ended on its own.
    pub async fn shutdown(mut self, timeout: Duration) -> bool {
        if self.handle.is_finished() {
            return true;
        }
        match tokio::time::timeout(timeout, &mut self.handle).await {
            Ok(_) => true,
            Err(_) => {
                tracing::warn!(
                    round_id = %self.round_id,
                    "Previous match still running after {:?}, aborting",
                    timeout
                );
                self.handle.abort();
                false
            }
        }
    }
}
