use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;

pub type TelemetryResult<T> = Result<T, TelemetryError>;

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("Failed to read telemetry: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed telemetry packet: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Poll-style access to the live game state
#[async_trait]
pub trait Telemetry: Send + Sync {
    async fn is_match_ended(&self) -> TelemetryResult<bool>;

    /// Forget whatever the previous match reported
    async fn reset(&self) -> TelemetryResult<()> {
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LivePacket {
    #[serde(default)]
    is_match_ended: bool,
}

/// Reads the live packet the external match runner keeps updated on disk
#[derive(Debug, Clone)]
pub struct FileTelemetry {
    path: PathBuf,
}

impl FileTelemetry {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl Telemetry for FileTelemetry {
    async fn is_match_ended(&self) -> TelemetryResult<bool> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            // No packet yet: the game has not reported anything
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e.into()),
        };
        let packet: LivePacket = serde_json::from_slice(&bytes)?;
        Ok(packet.is_match_ended)
    }

    /// Remove the packet so a finished match is not read as the next one ending
    async fn reset(&self) -> TelemetryResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
