//! Feed transport seam
//!
//! The chat transport itself (connecting, authenticating, raw event
//! decoding) is an external collaborator. This module defines the
//! normalized event stream the engine consumes, the outbound trait the
//! engine calls back into, and the message-shape helpers a transport
//! uses to classify raw traffic the same way everywhere.

use crate::console::OperatorCommand;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;

/// Outgoing acknowledgment literal for a like action. Recognized later
/// by the transport listener as a self-authored action signal.
pub const LIKE_ECHO: &str = "❤️";

/// Outgoing acknowledgment literal for a dislike action
pub const DISLIKE_ECHO: &str = "👎";

/// Service message the feed emits after a like goes through; treated
/// as an outgoing like event as well
pub const LIKE_SENT_ECHO: &str = "Лайк отправлен, ждем ответа.";

/// Shape of a profile-card message: "name, age, city-or-distance" with
/// an optional " – description" tail. Dot matches newline so multiline
/// descriptions still match.
static CARD_MESSAGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^.*, \d+, (\S+|📍\d+ km|📍\d+ км)( – .*|)$").expect("invalid card regex")
});

/// Does a raw incoming message look like a profile card?
///
/// Intended for transport implementations deciding whether raw traffic
/// becomes a [`FeedEvent::NewCard`]. The in-tree [`LoggingFeed`] is
/// send-only, so nothing in this crate calls it yet.
pub fn is_card_message(text: &str) -> bool {
    CARD_MESSAGE_RE.is_match(text)
}

/// Reference to a message in the feed, used to target reactions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageRef {
    pub chat_id: i64,
    pub message_id: i64,
}

/// Normalized event stream consumed by the app loop.
///
/// The transport dispatches one event at a time; handlers run to
/// completion before the next event, so ring and store mutation are
/// totally ordered relative to the feed.
#[derive(Debug, Clone)]
pub enum FeedEvent {
    /// Incoming profile-card message
    NewCard { text: String, message_ref: MessageRef },
    /// Self-authored message observed on the feed (action echo)
    OutgoingEcho { text: String },
    /// Edit event carrying the current reaction set on a previously
    /// sent message; `None` means all reactions were removed
    EditedReactions {
        text: String,
        reaction: Option<String>,
        message_ref: MessageRef,
    },
    /// Operator console command
    Operator(OperatorCommand),
    /// Operator exit request; the only condition that stops the loop
    Shutdown,
}

/// Outbound feed operations the engine calls back into
#[async_trait]
pub trait FeedClient: Send + Sync {
    /// Send a plain message to the configured chat
    async fn send_message(&self, text: &str) -> crate::error::Result<()>;

    /// Set or clear a reaction on a message; `None` clears
    async fn send_reaction(
        &self,
        message_ref: MessageRef,
        token: Option<&str>,
    ) -> crate::error::Result<()>;
}

/// Transport stand-in that logs outbound traffic instead of sending it.
/// Useful for dry runs and as the default until a real transport is
/// wired in.
#[derive(Debug, Default)]
pub struct LoggingFeed;

#[async_trait]
impl FeedClient for LoggingFeed {
    async fn send_message(&self, text: &str) -> crate::error::Result<()> {
        info!("feed send_message: {}", text);
        Ok(())
    }

    async fn send_reaction(
        &self,
        message_ref: MessageRef,
        token: Option<&str>,
    ) -> crate::error::Result<()> {
        match token {
            Some(token) => info!(
                "feed send_reaction {} on message {}",
                token, message_ref.message_id
            ),
            None => info!("feed clear_reaction on message {}", message_ref.message_id),
        }
        Ok(())
    }
}
