//! Chat command handlers
//!
//! Each handler returns the lines to post back to the channel. Round
//! transitions are spawned so the chat loop never waits on a match launch.

use super::commands::{self, ChatCommand};
use super::ChatMessage;
use crate::state::AppState;
use crate::types::{GuessOutcome, RoundTrigger};

/// Dispatch one chat line, returning replies in the order they should be sent
pub async fn handle_message(state: &AppState, msg: &ChatMessage, prefix: &str) -> Vec<String> {
    let command = match commands::parse(prefix, &msg.text) {
        None => return Vec::new(),
        Some(Ok(command)) => command,
        Some(Err(e)) => {
            tracing::debug!(author = %msg.author, "Bad command usage: {}", e);
            return vec![help_text(&msg.author)];
        }
    };

    match command {
        ChatCommand::Help => vec![help_text(&msg.author)],
        ChatCommand::Skip => handle_skip(state, msg).await,
        ChatCommand::Guess { identifier, number } => {
            handle_guess(state, &msg.author, &identifier, number).await
        }
    }
}

fn help_text(author: &str) -> String {
    format!(
        "@{} Guess with this command: !guess <letter> <number>. For example: !guess B 13",
        author
    )
}

async fn handle_skip(state: &AppState, msg: &ChatMessage) -> Vec<String> {
    if !msg.is_moderator {
        tracing::warn!(author = %msg.author, "Non-moderator attempted to skip");
        return vec![format!(
            "@{} ⚠️ You don't have permissions for this command.",
            msg.author
        )];
    }

    tracing::info!(author = %msg.author, "Skip requested");
    let names = state.skip_round().await.join(", ");
    vec![format!(
        "@{} ⚠️ Skipping match. Mystery bots were: {}.",
        msg.author, names
    )]
}

async fn handle_guess(
    state: &AppState,
    author: &str,
    identifier: &str,
    number: usize,
) -> Vec<String> {
    let report = state.submit_guess(author, identifier, number).await;

    let reply = match &report.outcome {
        GuessOutcome::Correct { mystery } => format!(
            "@{} ✔️ Correct! {} is {}",
            author,
            mystery.display_name(),
            mystery.actual_name
        ),
        GuessOutcome::Incorrect => format!("@{} ❌ Wrong guess!", author),
        GuessOutcome::AlreadyGuessed => {
            format!("@{} ⚠️ This mystery bot has been guessed already.", author)
        }
        GuessOutcome::DuplicateVote => {
            format!("@{} ⚠️ This vote has already been tried.", author)
        }
        GuessOutcome::RateLimited { remaining } => format!(
            "@{} ⚠️ You cannot guess Mystery Bot {} for another {} seconds.",
            author,
            identifier,
            remaining.as_secs()
        ),
        GuessOutcome::UnknownIdentifier => {
            format!("@{} ⚠️ There is no mystery bot {}.", author, identifier)
        }
        GuessOutcome::RoundClosed => {
            format!("@{} ⚠️ Ignoring guess because round has ended.", author)
        }
    };

    let mut replies = vec![reply];
    if report.round_complete {
        replies.push("✔️ All mystery bots guessed! Starting next match...".to_string());
        state.spawn_advance(report.round_id, RoundTrigger::AllGuessed);
    }
    replies
}
