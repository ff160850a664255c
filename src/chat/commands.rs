/// Commands viewers can type in chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Help,
    Guess { identifier: String, number: usize },
    Skip,
}

/// A known command with bad arguments
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UsageError {
    #[error("missing argument `{0}`")]
    MissingArgument(&'static str),

    #[error("`{0}` is not a bot number")]
    InvalidNumber(String),
}

/// Parse a chat line.
///
/// Returns `None` for anything that is not one of our commands, so ordinary
/// chatter and other bots' commands pass through silently.
pub fn parse(prefix: &str, text: &str) -> Option<Result<ChatCommand, UsageError>> {
    let rest = text.trim().strip_prefix(prefix)?;
    let mut args = rest.split_whitespace();
    let name = args.next()?;

    let command = match name {
        "help" => Ok(ChatCommand::Help),
        "skip" => Ok(ChatCommand::Skip),
        "guess" => parse_guess(args),
        _ => return None,
    };
    Some(command)
}

fn parse_guess<'a>(mut args: impl Iterator<Item = &'a str>) -> Result<ChatCommand, UsageError> {
    let identifier = args
        .next()
        .ok_or(UsageError::MissingArgument("identifier"))?;
    let number = args.next().ok_or(UsageError::MissingArgument("number"))?;
    let number = number
        .parse::<usize>()
        .map_err(|_| UsageError::InvalidNumber(number.to_string()))?;

    Ok(ChatCommand::Guess {
        identifier: identifier.to_uppercase(),
        number,
    })
}
