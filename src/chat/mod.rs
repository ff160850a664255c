//! Twitch chat integration
//!
//! Incoming chat lines are parsed into [`commands::ChatCommand`]s and run
//! against the shared [`crate::state::AppState`] by [`handlers::handle_message`].

pub mod commands;
pub mod handlers;
pub mod twitch;

use crate::config::TwitchConfig;
use crate::state::AppState;
use crate::types::RoundTrigger;
use async_trait::async_trait;

pub use commands::{ChatCommand, UsageError};
pub use handlers::handle_message;
pub use twitch::{TwitchConnection, TwitchSender};

pub type ChatResult<T> = Result<T, ChatError>;

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Chat I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Chat connection closed")]
    ConnectionClosed,

    #[error("Failed to send chat message: {0}")]
    Send(String),
}

/// A line of chat from the joined channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Display name of the sender
    pub author: String,
    /// Moderators and the broadcaster may run privileged commands
    pub is_moderator: bool,
    pub text: String,
}

impl ChatMessage {
    pub fn new(author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            is_moderator: false,
            text: text.into(),
        }
    }

    pub fn from_moderator(author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            is_moderator: true,
            ..Self::new(author, text)
        }
    }
}

/// Somewhere replies can be sent
#[async_trait]
pub trait ChatSink: Send + Sync {
    async fn send(&self, text: &str) -> ChatResult<()>;
}

/// Serve chat for the lifetime of the process.
///
/// Whenever the connection drops (EOF, a server `RECONNECT`, an I/O error) the
/// loop waits `reconnect_delay`, then authenticates and joins again. Game state
/// lives on across reconnects. The first successful connection starts the
/// first round.
pub async fn run_chat(state: AppState, config: TwitchConfig, oauth: String) {
    loop {
        match TwitchConnection::connect(&config, &oauth).await {
            Ok(mut connection) => {
                start_first_round(&state).await;
                let e = serve_connection(&state, &config.prefix, &mut connection).await;
                tracing::warn!("Chat connection lost: {}", e);
            }
            Err(e) => tracing::error!("Failed to connect to Twitch: {}", e),
        }

        tracing::info!(delay = ?config.reconnect_delay, "Reconnecting to Twitch chat");
        tokio::time::sleep(config.reconnect_delay).await;
    }
}

async fn start_first_round(state: &AppState) {
    let round = state.current_round().await;
    if round.number == 0 {
        state.spawn_advance(round.id, RoundTrigger::Startup);
    }
}

/// Handle messages until the connection fails
async fn serve_connection(
    state: &AppState,
    prefix: &str,
    connection: &mut TwitchConnection,
) -> ChatError {
    let sender = connection.sender();
    loop {
        let message = match connection.next_message().await {
            Ok(message) => message,
            Err(e) => return e,
        };

        for reply in handle_message(state, &message, prefix).await {
            if let Err(e) = sender.send(&reply).await {
                tracing::warn!("Failed to send chat reply: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{test_state, IdleRunner};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_reconnects_after_server_reconnect_notice() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            // First session: handshake, then Twitch asks us to reconnect
            let (stream, _) = listener.accept().await.unwrap();
            let (read, mut write) = stream.into_split();
            let mut lines = BufReader::new(read).lines();
            for _ in 0..4 {
                lines.next_line().await.unwrap().unwrap();
            }
            write.write_all(b":tmi.twitch.tv RECONNECT\r\n").await.unwrap();

            // Second session: full handshake again, then a command
            let (stream, _) = listener.accept().await.unwrap();
            let (read, mut write) = stream.into_split();
            let mut lines = BufReader::new(read).lines();
            let mut handshake = Vec::new();
            for _ in 0..4 {
                handshake.push(lines.next_line().await.unwrap().unwrap());
            }
            write
                .write_all(b"@display-name=Sam :sam!sam@sam PRIVMSG #darxeal :!help\r\n")
                .await
                .unwrap();
            let reply = lines.next_line().await.unwrap().unwrap();
            (handshake, reply)
        });

        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), 1, vec!["Atba"], Arc::new(IdleRunner));
        let config = TwitchConfig {
            host: addr.to_string(),
            reconnect_delay: Duration::from_millis(10),
            ..TwitchConfig::default()
        };
        let chat = tokio::spawn(run_chat(state.clone(), config, "abc123".to_string()));

        let (handshake, reply) = server.await.unwrap();
        assert_eq!(handshake[3], "JOIN #darxeal");
        assert_eq!(
            reply,
            "PRIVMSG #darxeal :@Sam Guess with this command: !guess <letter> <number>. For example: !guess B 13"
        );

        // The game kept running across the reconnect and started exactly once
        for _ in 0..100 {
            if state.current_round().await.is_open() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        let round = state.current_round().await;
        assert!(round.is_open());
        assert_eq!(round.number, 1);

        chat.abort();
    }
}
