//! Configuration-driven policy dispatch
//!
//! Maps a card's classification outcome to a configured action and an
//! optional reaction token, then executes the action through the
//! feed-facing collaborators. The mapping is a total function over the
//! four classification cases; the action set is a closed enum, not
//! string comparisons.

use crate::error::Result;
use crate::feed::{FeedClient, MessageRef, DISLIKE_ECHO, LIKE_ECHO};
use crate::notify::Notifier;
use crate::types::{Card, Classification};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Action kinds a policy entry can select
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyAction {
    Like,
    Dislike,
    Alert,
    Pass,
}

/// One configured policy entry: what to do and what to react with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyEntry {
    pub action: PolicyAction,
    /// Reaction token emitted on the originating message after the
    /// action runs; independent of the action, both can fire
    pub reaction: Option<String>,
}

impl Default for PolicyEntry {
    fn default() -> Self {
        Self {
            action: PolicyAction::Pass,
            reaction: None,
        }
    }
}

/// Per-classification policy table, keyed by the four outcome cases
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyTable {
    pub on_new: PolicyEntry,
    pub on_liking: PolicyEntry,
    pub on_disliking: PolicyEntry,
    pub on_missed: PolicyEntry,
}

impl Default for PolicyTable {
    fn default() -> Self {
        Self {
            on_new: PolicyEntry {
                action: PolicyAction::Alert,
                reaction: None,
            },
            on_liking: PolicyEntry::default(),
            on_disliking: PolicyEntry::default(),
            on_missed: PolicyEntry::default(),
        }
    }
}

impl PolicyTable {
    /// Total mapping from classification outcome to policy entry;
    /// absence of a persisted record selects the `on_new` entry
    pub fn entry(&self, classification: Option<Classification>) -> &PolicyEntry {
        match classification {
            None => &self.on_new,
            Some(Classification::Liking) => &self.on_liking,
            Some(Classification::Disliking) => &self.on_disliking,
            Some(Classification::Missed) => &self.on_missed,
        }
    }
}

/// Alert label and glyph for a classification outcome
fn alert_badge(classification: Option<Classification>) -> (&'static str, &'static str) {
    match classification {
        None => ("NEW", "➕"),
        Some(Classification::Liking) => ("LIKING", "❤️"),
        Some(Classification::Disliking) => ("DISLIKING", "👎"),
        Some(Classification::Missed) => ("MISSED", "👁‍🗨"),
    }
}

/// Executes policy decisions against the feed and notifier
pub struct PolicyDispatcher {
    table: PolicyTable,
    feed: Arc<dyn FeedClient>,
    notifier: Arc<dyn Notifier>,
}

impl PolicyDispatcher {
    pub fn new(table: PolicyTable, feed: Arc<dyn FeedClient>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            table,
            feed,
            notifier,
        }
    }

    /// Execute the configured action for `card` and emit the configured
    /// reaction on the originating message. Returns the emitted
    /// reaction token, if any.
    pub async fn dispatch(&self, card: &Card, message_ref: MessageRef) -> Result<Option<String>> {
        let entry = self.table.entry(card.classification);
        let (label, glyph) = alert_badge(card.classification);

        debug!(
            "Dispatching {} card {} via {:?}",
            label, card.identity, entry.action
        );

        match entry.action {
            PolicyAction::Like => {
                self.feed.send_message(LIKE_ECHO).await?;
                info!("Action LIKE");
            }
            PolicyAction::Dislike => {
                self.feed.send_message(DISLIKE_ECHO).await?;
                info!("Action DISLIKE");
            }
            PolicyAction::Alert => {
                self.notifier.alert(label, glyph);
                info!("Action ALERT {}", glyph);
            }
            PolicyAction::Pass => {
                info!("Action PASS");
            }
        }

        if let Some(reaction) = &entry.reaction {
            self.feed
                .send_reaction(message_ref, Some(reaction.as_str()))
                .await?;
            return Ok(Some(reaction.clone()));
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_total() {
        let table = PolicyTable::default();
        for case in [
            None,
            Some(Classification::Liking),
            Some(Classification::Disliking),
            Some(Classification::Missed),
        ] {
            // every case resolves to some entry
            let _ = table.entry(case);
        }
        assert_eq!(table.entry(None).action, PolicyAction::Alert);
        assert_eq!(
            table.entry(Some(Classification::Missed)).action,
            PolicyAction::Pass
        );
    }

    #[test]
    fn test_action_serde_lowercase() {
        let entry: PolicyEntry =
            serde_json::from_str(r#"{"action": "dislike", "reaction": "💔"}"#).unwrap();
        assert_eq!(entry.action, PolicyAction::Dislike);
        assert_eq!(entry.reaction.as_deref(), Some("💔"));

        let entry: PolicyEntry = serde_json::from_str(r#"{"action": "pass"}"#).unwrap();
        assert_eq!(entry.reaction, None);
    }

    #[test]
    fn test_alert_badges() {
        assert_eq!(alert_badge(None), ("NEW", "➕"));
        assert_eq!(
            alert_badge(Some(Classification::Missed)),
            ("MISSED", "👁‍🗨")
        );
    }
}
