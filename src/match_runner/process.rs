use super::{MatchConfig, MatchError, MatchResult, MatchRunner};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;

/// Hands the match config to an external executable and waits for it to exit.
///
/// The config is written as JSON to `config_path`, whose path is passed as the
/// only argument. The child is killed if the running future is dropped, so
/// aborting a [`super::MatchSession`] shuts the previous match down.
#[derive(Debug, Clone)]
pub struct ProcessMatchRunner {
    command: Option<String>,
    config_path: PathBuf,
}

impl ProcessMatchRunner {
    pub fn new(command: Option<String>, config_path: PathBuf) -> Self {
        Self {
            command,
            config_path,
        }
    }
}

#[async_trait]
impl MatchRunner for ProcessMatchRunner {
    fn check_ready(&self) -> MatchResult<()> {
        match self.command {
            Some(_) => Ok(()),
            None => Err(MatchError::NotConfigured),
        }
    }

    async fn run(&self, config: MatchConfig) -> MatchResult<()> {
        let command = self.command.as_deref().ok_or(MatchError::NotConfigured)?;

        let json = serde_json::to_vec_pretty(&config)?;
        tokio::fs::write(&self.config_path, json).await?;

        tracing::info!(
            command,
            map = %config.game_map,
            players = config.players.len(),
            "Launching match process"
        );

        let mut child = Command::new(command)
            .arg(&self.config_path)
            .kill_on_drop(true)
            .spawn()
            .map_err(MatchError::Spawn)?;

        let status = child.wait().await?;
        if status.success() {
            tracing::info!("Match process exited");
            Ok(())
        } else {
            Err(MatchError::Exited(status))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn empty_match() -> MatchConfig {
        MatchConfig::soccer(Vec::new(), Vec::new(), &mut StdRng::seed_from_u64(0))
    }

    #[tokio::test]
    async fn test_unconfigured_runner_fails() {
        let runner = ProcessMatchRunner::new(None, PathBuf::from("match.json"));
        assert!(matches!(runner.check_ready(), Err(MatchError::NotConfigured)));
        let result = runner.run(empty_match()).await;
        assert!(matches!(result, Err(MatchError::NotConfigured)));
    }

    #[tokio::test]
    async fn test_missing_executable_fails_to_spawn() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ProcessMatchRunner::new(
            Some("/nonexistent/match-runner".to_string()),
            dir.path().join("match.json"),
        );
        let result = runner.run(empty_match()).await;
        assert!(matches!(result, Err(MatchError::Spawn(_))));
        // Config is written before the launch attempt
        assert!(dir.path().join("match.json").exists());
    }
}
