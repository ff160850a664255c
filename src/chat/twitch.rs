//! Minimal Twitch IRC client
//!
//! Only what the game needs: authenticate, join one channel, answer PINGs,
//! read PRIVMSGs with their IRCv3 tags and post replies.

use super::{ChatError, ChatMessage, ChatResult, ChatSink};
use crate::config::TwitchConfig;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::TcpStream;
use tokio::sync::mpsc;

/// A parsed line from the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IrcEvent {
    Ping(String),
    Privmsg { channel: String, message: ChatMessage },
    Notice(String),
    Reconnect,
    Other,
}

/// Parse one raw IRC line (without the trailing CRLF)
pub fn parse_line(line: &str) -> IrcEvent {
    let mut rest = line.trim_end_matches(['\r', '\n']);

    let mut tags = HashMap::new();
    if let Some(stripped) = rest.strip_prefix('@') {
        let (raw_tags, after) = stripped.split_once(' ').unwrap_or((stripped, ""));
        for tag in raw_tags.split(';') {
            let (key, value) = tag.split_once('=').unwrap_or((tag, ""));
            tags.insert(key, value);
        }
        rest = after;
    }

    let mut nick = "";
    if let Some(stripped) = rest.strip_prefix(':') {
        let (prefix, after) = stripped.split_once(' ').unwrap_or((stripped, ""));
        nick = prefix.split('!').next().unwrap_or(prefix);
        rest = after;
    }

    let (head, trailing) = match rest.split_once(" :") {
        Some((head, trailing)) => (head, Some(trailing)),
        None => (rest, None),
    };
    let mut params = head.split_whitespace();
    let command = params.next().unwrap_or("");

    match command {
        "PING" => IrcEvent::Ping(trailing.unwrap_or("tmi.twitch.tv").to_string()),
        "RECONNECT" => IrcEvent::Reconnect,
        "NOTICE" => IrcEvent::Notice(trailing.unwrap_or("").to_string()),
        "PRIVMSG" => {
            let channel = params.next().unwrap_or("").trim_start_matches('#');
            let author = match tags.get("display-name") {
                Some(name) if !name.is_empty() => name.to_string(),
                _ => nick.to_string(),
            };
            let badges = tags.get("badges").copied().unwrap_or("");
            let is_moderator = tags.get("mod") == Some(&"1")
                || badges
                    .split(',')
                    .any(|b| b.starts_with("broadcaster/") || b.starts_with("moderator/"));

            IrcEvent::Privmsg {
                channel: channel.to_string(),
                message: ChatMessage {
                    author,
                    is_moderator,
                    text: trailing.unwrap_or("").to_string(),
                },
            }
        }
        _ => IrcEvent::Other,
    }
}

/// Posts lines to the joined channel through the connection's writer task
#[derive(Debug, Clone)]
pub struct TwitchSender {
    tx: mpsc::UnboundedSender<String>,
    channel: String,
}

impl TwitchSender {
    fn raw(&self, line: String) -> ChatResult<()> {
        self.tx
            .send(line)
            .map_err(|_| ChatError::Send("writer task stopped".to_string()))
    }
}

#[async_trait]
impl ChatSink for TwitchSender {
    async fn send(&self, text: &str) -> ChatResult<()> {
        // IRC lines end at the first newline
        let text = text.lines().next().unwrap_or("");
        self.raw(format!("PRIVMSG #{} :{}", self.channel, text))
    }
}

/// An authenticated connection joined to one channel
pub struct TwitchConnection {
    reader: BufReader<OwnedReadHalf>,
    sender: TwitchSender,
}

impl TwitchConnection {
    pub async fn connect(config: &TwitchConfig, oauth: &str) -> ChatResult<Self> {
        let stream = TcpStream::connect(&config.host).await?;
        let (read, mut write) = stream.into_split();
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();

        tokio::spawn(async move {
            while let Some(line) = rx.recv().await {
                let framed = format!("{}\r\n", line);
                if let Err(e) = write.write_all(framed.as_bytes()).await {
                    tracing::error!("Failed to write to Twitch: {}", e);
                    break;
                }
            }
            tracing::debug!("Twitch writer stopped");
        });

        let channel = config.channel.trim_start_matches('#').to_lowercase();
        let sender = TwitchSender { tx, channel };

        let token = oauth.trim();
        let token = if token.starts_with("oauth:") {
            token.to_string()
        } else {
            format!("oauth:{}", token)
        };
        sender.raw("CAP REQ :twitch.tv/tags twitch.tv/commands".to_string())?;
        sender.raw(format!("PASS {}", token))?;
        sender.raw(format!("NICK {}", config.nick.to_lowercase()))?;
        sender.raw(format!("JOIN #{}", sender.channel))?;

        tracing::info!(
            host = %config.host,
            nick = %config.nick,
            channel = %sender.channel,
            "Connected to Twitch chat"
        );

        Ok(Self {
            reader: BufReader::new(read),
            sender,
        })
    }

    pub fn sender(&self) -> TwitchSender {
        self.sender.clone()
    }

    /// Wait for the next chat message in the joined channel.
    ///
    /// Server PINGs are answered along the way.
    pub async fn next_message(&mut self) -> ChatResult<ChatMessage> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line).await? == 0 {
                return Err(ChatError::ConnectionClosed);
            }

            match parse_line(&line) {
                IrcEvent::Ping(token) => self.sender.raw(format!("PONG :{}", token))?,
                IrcEvent::Privmsg { channel, message } if channel == self.sender.channel => {
                    return Ok(message)
                }
                IrcEvent::Privmsg { .. } | IrcEvent::Other => {}
                IrcEvent::Notice(text) => tracing::warn!("Twitch notice: {}", text),
                IrcEvent::Reconnect => {
                    tracing::warn!("Twitch requested reconnect");
                    return Err(ChatError::ConnectionClosed);
                }
            }
        }
    }
}
