//! JSON snapshot consumed by the broadcast overlay
//!
//! The browser overlay polls `data.json` from the overlay directory, so each
//! publish rewrites the whole file.

use crate::catalog::BotCatalog;
use crate::state::{ScoreEntry, VoteLedger};
use crate::types::{Round, Team};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum OverlayError {
    #[error("Failed to write overlay file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize overlay: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VotableBot {
    pub name: String,
    /// Number to type after the identifier in `!guess`
    pub command: usize,
    /// One entry per mystery bot, in identifier order
    pub vote_status: Vec<Option<bool>>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OverlayMystery {
    pub identifier: String,
    pub team: Team,
    /// Hidden until guessed or until the round ends
    pub actual_name: Option<String>,
    pub guessed: bool,
    pub guessed_by: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OverlayData {
    pub round_end: bool,
    pub votable_bots: Vec<VotableBot>,
    pub mystery_bots: Vec<OverlayMystery>,
    pub scoreboard: Vec<ScoreEntry>,
}

impl OverlayData {
    pub fn project(catalog: &BotCatalog, round: &Round, ledger: &VoteLedger, round_end: bool) -> Self {
        let votable_bots = catalog
            .iter()
            .enumerate()
            .map(|(number, bot)| VotableBot {
                name: bot.name.clone(),
                command: number,
                vote_status: round
                    .mysteries
                    .iter()
                    .map(|mystery| ledger.vote_status(mystery, number))
                    .collect(),
            })
            .collect();

        let mystery_bots = round
            .mysteries
            .iter()
            .map(|mystery| {
                let guessed_by = ledger.guessed_by(mystery).map(str::to_string);
                let guessed = guessed_by.is_some();
                OverlayMystery {
                    identifier: mystery.identifier.clone(),
                    team: mystery.team,
                    actual_name: (guessed || round_end).then(|| mystery.actual_name.clone()),
                    guessed,
                    guessed_by,
                }
            })
            .collect();

        Self {
            round_end,
            votable_bots,
            mystery_bots,
            scoreboard: ledger.scoreboard(),
        }
    }

    /// Pretty JSON with four-space indentation
    pub fn to_json(&self) -> Result<Vec<u8>, OverlayError> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)?;
        Ok(buf)
    }
}

/// Writes overlay snapshots to a fixed file
#[derive(Debug, Clone)]
pub struct OverlayPublisher {
    path: PathBuf,
}

impl OverlayPublisher {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the overlay file. Not atomic: readers may see a partial file.
    pub async fn publish(&self, data: &OverlayData) -> Result<(), OverlayError> {
        let json = data.to_json()?;
        let io_err = |source| OverlayError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }
        tokio::fs::write(&self.path, json).await.map_err(io_err)?;

        tracing::debug!(
            path = %self.path.display(),
            round_end = data.round_end,
            "Overlay published"
        );
        Ok(())
    }
}
