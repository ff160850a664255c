//! Environment-driven configuration
//!
//! Everything is read from environment variables (optionally loaded from a
//! `.env` file by `main`). Unparseable values fall back to their defaults.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Letters available for mystery identifiers
const MAX_MYSTERY_BOTS: usize = 26;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("No Twitch OAuth token: set TWITCH_OAUTH or provide {0}")]
    MissingOAuth(PathBuf),
}

/// Round and ledger tuning
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub bots_per_team: usize,
    /// Per-guesser cooldown after a wrong guess; `None` disables rate limiting
    pub guess_cooldown: Option<Duration>,
    pub bots_dir: PathBuf,
    pub items_path: PathBuf,
    pub overlay_dir: PathBuf,
    /// Delay between launching a match and opening the round for guesses
    pub warmup: Duration,
    /// Interval of the match-end telemetry poll
    pub match_poll_interval: Duration,
    /// Bounded wait for the previous match before it gets aborted
    pub match_join_timeout: Duration,
    /// Script launched alongside every match (the caster bot)
    pub caster_script: Option<PathBuf>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            bots_per_team: 1,
            guess_cooldown: Some(Duration::from_secs(20)),
            bots_dir: PathBuf::from("bots"),
            items_path: PathBuf::from("items.csv"),
            overlay_dir: PathBuf::from("overlay"),
            warmup: Duration::from_secs(10),
            match_poll_interval: Duration::from_secs(10),
            match_join_timeout: Duration::from_secs(3),
            caster_script: Some(PathBuf::from("caster-bot/caster.cfg")),
        }
    }
}

impl GameConfig {
    pub fn overlay_file(&self) -> PathBuf {
        self.overlay_dir.join("data.json")
    }

    pub fn mystery_count(&self) -> usize {
        self.bots_per_team * 2
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bots_per_team == 0 || self.mystery_count() > MAX_MYSTERY_BOTS {
            return Err(ConfigError::Invalid(format!(
                "BOTS_PER_TEAM must be between 1 and {}, got {}",
                MAX_MYSTERY_BOTS / 2,
                self.bots_per_team
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct TwitchConfig {
    pub oauth: Option<String>,
    pub oauth_file: PathBuf,
    pub nick: String,
    pub channel: String,
    pub host: String,
    pub prefix: String,
    /// Pause before reconnecting after the chat connection drops
    pub reconnect_delay: Duration,
}

impl Default for TwitchConfig {
    fn default() -> Self {
        Self {
            oauth: None,
            oauth_file: PathBuf::from("oauth.txt"),
            nick: "GuessTheBot".to_string(),
            channel: "darxeal".to_string(),
            host: "irc.chat.twitch.tv:6667".to_string(),
            prefix: "!".to_string(),
            reconnect_delay: Duration::from_secs(5),
        }
    }
}

impl TwitchConfig {
    /// Token from the environment, else the first line of the oauth file
    pub fn resolve_oauth(&self) -> Result<String, ConfigError> {
        if let Some(token) = &self.oauth {
            return Ok(token.clone());
        }
        std::fs::read_to_string(&self.oauth_file)
            .ok()
            .and_then(|contents| contents.lines().next().map(|l| l.trim().to_string()))
            .filter(|line| !line.is_empty())
            .ok_or_else(|| ConfigError::MissingOAuth(self.oauth_file.clone()))
    }
}

#[derive(Debug, Clone)]
pub struct MatchRunnerConfig {
    /// External executable that runs a match; `None` means matches cannot be launched
    pub command: Option<String>,
    pub config_path: PathBuf,
    pub telemetry_path: PathBuf,
}

impl Default for MatchRunnerConfig {
    fn default() -> Self {
        Self {
            command: None,
            config_path: PathBuf::from("match.json"),
            telemetry_path: PathBuf::from("telemetry.json"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub game: GameConfig,
    pub twitch: TwitchConfig,
    pub match_runner: MatchRunnerConfig,
    /// Port of the overlay HTTP server; `None` disables it
    pub overlay_port: Option<u16>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            twitch: TwitchConfig::default(),
            match_runner: MatchRunnerConfig::default(),
            overlay_port: Some(6574),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let guess_cooldown = match env_parse::<u64>("GUESS_COOLDOWN_SECS") {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => defaults.game.guess_cooldown,
        };

        let caster_script = match std::env::var("CASTER_SCRIPT") {
            Ok(path) => {
                let trimmed = path.trim();
                (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
            }
            Err(_) => defaults.game.caster_script,
        };

        let game = GameConfig {
            bots_per_team: env_parse("BOTS_PER_TEAM").unwrap_or(defaults.game.bots_per_team),
            guess_cooldown,
            bots_dir: env_path("BOTS_DIR").unwrap_or(defaults.game.bots_dir),
            items_path: env_path("ITEMS_PATH").unwrap_or(defaults.game.items_path),
            overlay_dir: env_path("OVERLAY_DIR").unwrap_or(defaults.game.overlay_dir),
            warmup: env_parse("WARMUP_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.game.warmup),
            match_poll_interval: env_parse("MATCH_POLL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.game.match_poll_interval),
            match_join_timeout: env_parse("MATCH_JOIN_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.game.match_join_timeout),
            caster_script,
        };
        game.validate()?;

        let twitch = TwitchConfig {
            oauth: env_string("TWITCH_OAUTH"),
            oauth_file: env_path("TWITCH_OAUTH_FILE").unwrap_or(defaults.twitch.oauth_file),
            nick: env_string("TWITCH_NICK").unwrap_or(defaults.twitch.nick),
            channel: env_string("TWITCH_CHANNEL")
                .map(|c| c.trim_start_matches('#').to_lowercase())
                .unwrap_or(defaults.twitch.channel),
            host: env_string("TWITCH_HOST").unwrap_or(defaults.twitch.host),
            prefix: env_string("COMMAND_PREFIX").unwrap_or(defaults.twitch.prefix),
            reconnect_delay: env_parse("TWITCH_RECONNECT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.twitch.reconnect_delay),
        };

        let match_runner = MatchRunnerConfig {
            command: env_string("MATCH_COMMAND"),
            config_path: env_path("MATCH_CONFIG_PATH").unwrap_or(defaults.match_runner.config_path),
            telemetry_path: env_path("TELEMETRY_PATH")
                .unwrap_or(defaults.match_runner.telemetry_path),
        };

        let overlay_port = match env_parse::<u16>("OVERLAY_PORT") {
            Some(0) => None,
            Some(port) => Some(port),
            None => defaults.overlay_port,
        };

        tracing::info!(
            bots_per_team = game.bots_per_team,
            guess_cooldown_secs = game.guess_cooldown.map(|d| d.as_secs()),
            channel = %twitch.channel,
            match_command = ?match_runner.command,
            overlay_port,
            "Configuration loaded"
        );

        Ok(Self {
            game,
            twitch,
            match_runner,
            overlay_port,
        })
    }
}

/// Trimmed, non-empty environment variable
fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

fn env_path(key: &str) -> Option<PathBuf> {
    env_string(key).map(PathBuf::from)
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let raw = env_string(key)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Ignoring unparseable configuration value");
            None
        }
    }
}
