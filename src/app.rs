//! Application event loop
//!
//! Consumes the normalized feed event stream one event at a time:
//! handlers run to completion before the next event is handled, which
//! totally orders classification and history mutation relative to the
//! feed. Operator commands arrive on the same channel, so they
//! serialize with feed events for free; store access stays
//! mutex-guarded regardless.
//!
//! Every handler catches its own failures: no event or command is
//! process-fatal except an explicit operator exit request.

use crate::config::Settings;
use crate::console::OperatorCommand;
use crate::engine::ClassificationEngine;
use crate::error::{CardwatchError, Result};
use crate::feed::{FeedClient, FeedEvent, DISLIKE_ECHO, LIKE_ECHO, LIKE_SENT_ECHO};
use crate::notify::Notifier;
use crate::policy::PolicyDispatcher;
use crate::reactions::ReactionFeedback;
use crate::storage::ClassificationStore;
use crate::types::ActionKind;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Size of the feed event channel
pub const EVENT_QUEUE_DEPTH: usize = 64;

/// Top-level application state: the engine plus its feed-facing
/// collaborators
pub struct App {
    engine: ClassificationEngine,
    dispatcher: PolicyDispatcher,
    reactions: ReactionFeedback,
    feed: Arc<dyn FeedClient>,
}

impl App {
    pub fn new(
        settings: &Settings,
        store: Arc<dyn ClassificationStore>,
        feed: Arc<dyn FeedClient>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let engine = ClassificationEngine::new(
            store,
            settings.history_capacity,
            settings.city.clone(),
        );
        let dispatcher =
            PolicyDispatcher::new(settings.policy.clone(), Arc::clone(&feed), notifier);
        let reactions =
            ReactionFeedback::new(settings.reaction_controls.clone(), Arc::clone(&feed));

        Self {
            engine,
            dispatcher,
            reactions,
            feed,
        }
    }

    /// Create the event channel feeding [`App::run`]
    pub fn channel() -> (mpsc::Sender<FeedEvent>, mpsc::Receiver<FeedEvent>) {
        mpsc::channel(EVENT_QUEUE_DEPTH)
    }

    /// Process events until the channel closes or the operator exits
    pub async fn run(&mut self, mut rx: mpsc::Receiver<FeedEvent>) {
        info!("Cardwatch event loop started");

        while let Some(event) = rx.recv().await {
            match event {
                FeedEvent::Shutdown => {
                    info!("Shutdown requested");
                    break;
                }
                event => {
                    if let Err(e) = self.handle_event(event).await {
                        warn!("Event handler failed: {}", e);
                    }
                }
            }
        }

        info!("Cardwatch event loop stopped");
    }

    async fn handle_event(&mut self, event: FeedEvent) -> Result<()> {
        match event {
            FeedEvent::NewCard { text, message_ref } => {
                let card = self.engine.resolve(&text).await;
                self.dispatcher.dispatch(&card, message_ref).await?;
            }
            FeedEvent::OutgoingEcho { text } => match echo_action(&text) {
                Some(kind) => self.apply_action(kind).await,
                None => debug!("Ignoring outgoing echo"),
            },
            FeedEvent::EditedReactions {
                text,
                reaction,
                message_ref,
            } => {
                self.reactions
                    .handle_edit(&self.engine, &text, reaction.as_deref(), message_ref)
                    .await?;
            }
            FeedEvent::Operator(command) => self.handle_command(command).await?,
            // handled by the run loop before dispatching here
            FeedEvent::Shutdown => {}
        }
        Ok(())
    }

    /// Execute an operator command; failures are reported and the loop
    /// continues
    async fn handle_command(&mut self, command: OperatorCommand) -> Result<()> {
        match command {
            OperatorCommand::MissOffset(offset) => {
                match self.engine.mark_missed(offset).await {
                    Ok(_) => {
                        // missing the card still on screen also swipes it away
                        if offset == 0 {
                            self.apply_action(ActionKind::Dislike).await;
                            self.feed.send_message(DISLIKE_ECHO).await?;
                        }
                    }
                    Err(CardwatchError::OutOfRange { offset, len }) => {
                        info!("Nothing to mark: offset {} beyond {} remembered", offset, len);
                    }
                    Err(e) => return Err(e),
                }
            }
            OperatorCommand::MissText(text) => {
                self.engine.mark_missed_text(&text).await?;
            }
            OperatorCommand::Like => {
                self.apply_action(ActionKind::Like).await;
                self.feed.send_message(LIKE_ECHO).await?;
            }
            OperatorCommand::Dislike => {
                self.apply_action(ActionKind::Dislike).await;
                self.feed.send_message(DISLIKE_ECHO).await?;
            }
            // the console reader maps exit to Shutdown before it gets here
            OperatorCommand::Exit => {}
        }
        Ok(())
    }

    async fn apply_action(&mut self, kind: ActionKind) {
        match self.engine.apply_action(kind).await {
            Ok(()) => {}
            Err(CardwatchError::EmptyHistory) => info!("No cards in history yet"),
            Err(e) => warn!("Action signal failed: {}", e),
        }
    }

    pub fn engine(&self) -> &ClassificationEngine {
        &self.engine
    }
}

/// Map a self-authored feed message back to the action it acknowledged
fn echo_action(text: &str) -> Option<ActionKind> {
    match text {
        LIKE_ECHO | LIKE_SENT_ECHO => Some(ActionKind::Like),
        DISLIKE_ECHO => Some(ActionKind::Dislike),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_echo_action_mapping() {
        assert_eq!(echo_action(LIKE_ECHO), Some(ActionKind::Like));
        assert_eq!(echo_action(LIKE_SENT_ECHO), Some(ActionKind::Like));
        assert_eq!(echo_action(DISLIKE_ECHO), Some(ActionKind::Dislike));
        assert_eq!(echo_action("just chatting"), None);
    }
}
