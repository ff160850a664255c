use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Opaque ID types
pub type RoundId = String;
/// Single uppercase letter naming a mystery bot within a round ("A", "B", ...)
pub type MysteryId = String;
pub type GuesserName = String;

/// A bot bundle found in the bots directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotDefinition {
    pub name: String,
    pub config_path: PathBuf,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    Blue,
    Orange,
}

impl Team {
    /// Numeric team index used by the match runner (0 = blue, 1 = orange)
    pub fn index(self) -> u8 {
        match self {
            Team::Blue => 0,
            Team::Orange => 1,
        }
    }
}

/// A secretly selected bot playing in the current match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MysteryBot {
    pub identifier: MysteryId,
    /// Index into the sorted bot catalog; the number viewers have to guess
    pub number: usize,
    pub actual_name: String,
    pub team: Team,
}

impl MysteryBot {
    /// In-game player name, e.g. "Mystery Bot A"
    pub fn display_name(&self) -> String {
        format!("Mystery Bot {}", self.identifier)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundPhase {
    /// Accepting guesses
    Open,
    /// Transition window between matches
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundTrigger {
    Startup,
    Skip,
    MatchEnded,
    AllGuessed,
}

#[derive(Debug, Clone)]
pub struct Round {
    pub id: RoundId,
    pub number: u32,
    pub phase: RoundPhase,
    /// Mystery bots in identifier order
    pub mysteries: Vec<MysteryBot>,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl Round {
    /// The closed, empty round that exists before the first match is launched
    pub fn initial() -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            number: 0,
            phase: RoundPhase::Closed,
            mysteries: Vec::new(),
            started_at: chrono::Utc::now(),
        }
    }

    pub fn mystery(&self, identifier: &str) -> Option<&MysteryBot> {
        self.mysteries.iter().find(|m| m.identifier == identifier)
    }

    pub fn is_open(&self) -> bool {
        self.phase == RoundPhase::Open
    }
}

/// Result of a single `!guess` attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuessOutcome {
    Correct { mystery: MysteryBot },
    Incorrect,
    AlreadyGuessed,
    DuplicateVote,
    RateLimited { remaining: std::time::Duration },
    UnknownIdentifier,
    RoundClosed,
}

impl GuessOutcome {
    /// Whether the guess was recorded in the ledger
    pub fn is_terminal(&self) -> bool {
        matches!(self, GuessOutcome::Correct { .. } | GuessOutcome::Incorrect)
    }

    pub fn label(&self) -> &'static str {
        match self {
            GuessOutcome::Correct { .. } => "correct",
            GuessOutcome::Incorrect => "incorrect",
            GuessOutcome::AlreadyGuessed => "already_guessed",
            GuessOutcome::DuplicateVote => "duplicate_vote",
            GuessOutcome::RateLimited { .. } => "rate_limited",
            GuessOutcome::UnknownIdentifier => "unknown_identifier",
            GuessOutcome::RoundClosed => "round_closed",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaintConfig {
    pub car_paint_id: u32,
    pub decal_paint_id: u32,
    pub boost_paint_id: u32,
    pub wheels_paint_id: u32,
    pub trails_paint_id: u32,
    pub goal_explosion_paint_id: u32,
}

/// Cosmetic configuration of a car
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoadoutConfig {
    pub team_color_id: u32,
    pub custom_color_id: u32,
    pub car_id: u32,
    pub decal_id: u32,
    pub wheels_id: u32,
    pub boost_id: u32,
    pub trails_id: u32,
    pub paint_finish_id: u32,
    pub custom_finish_id: u32,
    pub goal_explosion_id: u32,
    pub paint_config: PaintConfig,
}
