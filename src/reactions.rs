//! Reaction feedback protocol
//!
//! A reaction placed on a previously sent message is an out-of-band
//! operator correction: the transport surfaces it as an edit event
//! carrying the message text and its current reaction set. Recognized
//! control tokens force a reclassification; everything else (including
//! this protocol's own acknowledgment token) is ignored.
//!
//! The acknowledgment is two-phase: pause, emit the success token,
//! pause, clear it. The edit event that triggered this handler is the
//! transport's own reaction-state propagation, so each half of the
//! visible acknowledgment is bracketed by a fixed delay rather than
//! emitted immediately. The delays are a UI-timing contract, not a
//! retry mechanism. Only the state mutation runs on the serialized
//! event path; the acknowledgment is spawned off it, so other feed
//! events interleave during the pauses (it touches one message's
//! reaction state and nothing else).

use crate::config::ReactionControls;
use crate::engine::ClassificationEngine;
use crate::error::Result;
use crate::feed::{FeedClient, MessageRef};
use crate::types::Classification;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Fixed pause bracketing each half of the acknowledgment
pub const ACK_DELAY: Duration = Duration::from_secs(1);

/// Handles transport-level edit/reaction events that represent
/// operator corrections
pub struct ReactionFeedback {
    controls: ReactionControls,
    feed: Arc<dyn FeedClient>,
}

impl ReactionFeedback {
    pub fn new(controls: ReactionControls, feed: Arc<dyn FeedClient>) -> Self {
        Self { controls, feed }
    }

    /// Process an edit event carrying the current reaction on a
    /// previously sent message. Unrecognized reactions are silence,
    /// not errors.
    pub async fn handle_edit(
        &self,
        engine: &ClassificationEngine,
        text: &str,
        reaction: Option<&str>,
        message_ref: MessageRef,
    ) -> Result<()> {
        if !self.controls.enabled {
            return Ok(());
        }

        let reaction = match reaction {
            Some(token) => token,
            None => return Ok(()),
        };

        let classification = if reaction == self.controls.miss {
            Classification::Missed
        } else if reaction == self.controls.dislike {
            Classification::Disliking
        } else {
            debug!("Ignoring unclassified reaction {}", reaction);
            return Ok(());
        };

        // Side lookup: reclassification does not touch the history ring
        let mut card = engine.resolve_untracked(text).await;
        card.classification = Some(classification);
        engine.persist(&card.identity, classification).await;

        info!(
            "{} via reaction: \"{}\"",
            classification.label(),
            card.text
        );

        self.spawn_acknowledge(message_ref);
        Ok(())
    }

    /// Two-phase acknowledgment: wait, mark success, wait, clear.
    /// Runs as its own task so the delays never stall the event loop.
    fn spawn_acknowledge(&self, message_ref: MessageRef) {
        let feed = Arc::clone(&self.feed);
        let success = self.controls.success.clone();

        tokio::spawn(async move {
            sleep(ACK_DELAY).await;
            if let Err(e) = feed.send_reaction(message_ref, Some(success.as_str())).await {
                warn!("Acknowledgment reaction failed: {}", e);
                return;
            }
            sleep(ACK_DELAY).await;
            if let Err(e) = feed.send_reaction(message_ref, None).await {
                warn!("Acknowledgment clear failed: {}", e);
            }
        });
    }
}
