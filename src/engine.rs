//! Classification engine
//!
//! Computes a card's identity, resolves its current classification
//! against the dedup store, maintains the lookback history, and applies
//! state transitions from explicit actions, reaction feedback, and miss
//! commands.
//!
//! Storage faults are handled fail-open here: a failed lookup reads as
//! "unclassified" and a failed upsert is logged without unwinding the
//! in-memory transition already applied, so the pipeline never blocks
//! on the durable store.

use crate::error::Result;
use crate::history::HistoryRing;
use crate::storage::ClassificationStore;
use crate::types::{ActionKind, Card, Classification, Identity};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Location-distance annotation as the feed renders it, in both the
/// Latin and Cyrillic unit spellings
static LOCATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r", 📍\d+ (km|км)").expect("invalid location regex"));

/// Single-owner classification engine; all mutation happens on the
/// serialized event-processing path
pub struct ClassificationEngine {
    store: Arc<dyn ClassificationStore>,
    history: HistoryRing,
    city: String,
}

impl ClassificationEngine {
    pub fn new(store: Arc<dyn ClassificationStore>, history_capacity: usize, city: String) -> Self {
        Self {
            store,
            history: HistoryRing::new(history_capacity),
            city,
        }
    }

    /// Collapse location-distance annotations to the canonical city
    /// token. Two inputs differing only in distance produce the same
    /// normalized text, hence the same identity.
    pub fn normalize(&self, raw: &str) -> String {
        LOCATION_RE
            .replace_all(raw, format!(", {}", self.city).as_str())
            .into_owned()
    }

    /// Normalize, compute identity, and look up the persisted
    /// classification without touching the history ring. Used for side
    /// lookups by the reaction protocol.
    pub async fn resolve_untracked(&self, raw: &str) -> Card {
        let text = self.normalize(raw);
        let identity = Identity::of(&text);

        let classification = match self.store.lookup(&identity).await {
            Ok(found) => found,
            Err(e) => {
                warn!("Store lookup failed for {}, treating as new: {}", identity, e);
                None
            }
        };

        Card {
            text,
            identity,
            classification,
        }
    }

    /// Resolve a raw card text and append it to the history ring
    pub async fn resolve(&mut self, raw: &str) -> Card {
        let card = self.resolve_untracked(raw).await;

        info!(
            "Card {}; {}",
            card.text,
            card.classification
                .map(|c| c.label())
                .unwrap_or("New")
        );

        self.history.append(card.clone());
        card
    }

    /// Upsert a classification, logging storage faults instead of
    /// propagating them; the in-memory state the caller already applied
    /// remains the observed truth for the rest of the run
    pub async fn persist(&self, identity: &Identity, classification: Classification) {
        if let Err(e) = self.store.upsert(identity, classification).await {
            warn!("Failed to persist {} for {}: {}", classification, identity, e);
        }
    }

    /// Apply an explicit action signal to the most recent card.
    ///
    /// A decision already made (Liking/Disliking) is not overwritten by
    /// a same-session action signal; this keeps the dispatcher's own
    /// emitted action from being misread as a fresh human decision.
    pub async fn apply_action(&mut self, kind: ActionKind) -> Result<()> {
        info!("Action signal {}", kind);

        let (identity, classification) = {
            let card = match self.history.last_mut() {
                Some(card) => card,
                None => return Err(crate::error::CardwatchError::EmptyHistory),
            };

            match card.classification {
                Some(Classification::Liking) | Some(Classification::Disliking) => {
                    debug!("Card {} already decided, ignoring action", card.identity);
                    return Ok(());
                }
                None | Some(Classification::Missed) => {}
            }

            let classification = match kind {
                ActionKind::Like => Classification::Liking,
                ActionKind::Dislike => Classification::Disliking,
            };
            card.classification = Some(classification);
            (card.identity, classification)
        };

        self.persist(&identity, classification).await;
        Ok(())
    }

    /// Mark the card at `offset_from_end` in history as missed.
    /// Returns the card text for the operator echo; fails with
    /// `OutOfRange` when the offset exceeds the remembered history.
    pub async fn mark_missed(&mut self, offset_from_end: usize) -> Result<String> {
        let card = {
            let seen = self.history.at(offset_from_end)?;
            Card::new(seen.text.clone(), Some(Classification::Missed))
        };

        self.persist(&card.identity, Classification::Missed).await;
        info!("Marked \"{}\" as missed", card.text);
        Ok(card.text)
    }

    /// Mark a card as missed by text alone, for cards no longer (or
    /// never) present in history
    pub async fn mark_missed_text(&mut self, raw: &str) -> Result<String> {
        let text = self.normalize(raw);
        let card = Card::new(text, Some(Classification::Missed));

        self.persist(&card.identity, Classification::Missed).await;
        info!("Marked \"{}\" as missed", card.text);
        Ok(card.text)
    }

    pub fn history(&self) -> &HistoryRing {
        &self.history
    }

    pub fn store(&self) -> &Arc<dyn ClassificationStore> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sqlite::SqliteStore;

    fn engine() -> ClassificationEngine {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        ClassificationEngine::new(store, 10, "Springfield".to_string())
    }

    #[test]
    fn test_normalize_collapses_distance() {
        let engine = engine();
        assert_eq!(
            engine.normalize("Jane, 29, 📍3 km – hi"),
            "Jane, 29, Springfield – hi"
        );
        assert_eq!(
            engine.normalize("Jane, 29, 📍12 км – привет"),
            "Jane, 29, Springfield – привет"
        );
        assert_eq!(engine.normalize("no location here"), "no location here");
    }

    #[test]
    fn test_distance_invariant_identity() {
        let engine = engine();
        let a = Identity::of(&engine.normalize("Jane, 29, 📍3 km – hi"));
        let b = Identity::of(&engine.normalize("Jane, 29, 📍7 km – hi"));
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_resolve_appends_history() {
        let mut engine = engine();
        let card = engine.resolve("Jane, 29, 📍3 km – hi").await;
        assert_eq!(card.text, "Jane, 29, Springfield – hi");
        assert_eq!(card.classification, None);
        assert_eq!(engine.history().len(), 1);
    }

    #[tokio::test]
    async fn test_apply_action_empty_history() {
        let mut engine = engine();
        assert!(matches!(
            engine.apply_action(ActionKind::Like).await,
            Err(crate::error::CardwatchError::EmptyHistory)
        ));
    }

    #[tokio::test]
    async fn test_apply_action_sets_and_persists() {
        let mut engine = engine();
        let card = engine.resolve("Jane, 29, Springfield").await;
        engine.apply_action(ActionKind::Like).await.unwrap();

        assert_eq!(
            engine.history().last().unwrap().classification,
            Some(Classification::Liking)
        );
        assert_eq!(
            engine.store().lookup(&card.identity).await.unwrap(),
            Some(Classification::Liking)
        );
    }

    #[tokio::test]
    async fn test_no_self_feedback() {
        let mut engine = engine();
        let card = engine.resolve("Jane, 29, Springfield").await;
        engine.apply_action(ActionKind::Like).await.unwrap();

        // a second, opposite action signal must not flip the decision
        engine.apply_action(ActionKind::Dislike).await.unwrap();
        assert_eq!(
            engine.store().lookup(&card.identity).await.unwrap(),
            Some(Classification::Liking)
        );
    }

    #[tokio::test]
    async fn test_missed_is_reopenable() {
        let mut engine = engine();
        engine.resolve("Jane, 29, Springfield").await;
        engine.mark_missed(0).await.unwrap();

        // resolve again so the ring's view matches the store
        let card = engine.resolve("Jane, 29, Springfield").await;
        assert_eq!(card.classification, Some(Classification::Missed));

        engine.apply_action(ActionKind::Like).await.unwrap();
        assert_eq!(
            engine.store().lookup(&card.identity).await.unwrap(),
            Some(Classification::Liking)
        );
    }

    #[tokio::test]
    async fn test_mark_missed_out_of_range() {
        let mut engine = engine();
        engine.resolve("Jane, 29, Springfield").await;
        assert!(matches!(
            engine.mark_missed(5).await,
            Err(crate::error::CardwatchError::OutOfRange { offset: 5, len: 1 })
        ));
    }

    #[tokio::test]
    async fn test_mark_missed_text_normalizes() {
        let mut engine = engine();
        let text = engine
            .mark_missed_text("Jane, 29, 📍5 km – hi")
            .await
            .unwrap();
        assert_eq!(text, "Jane, 29, Springfield – hi");

        let id = Identity::of("Jane, 29, Springfield – hi");
        assert_eq!(
            engine.store().lookup(&id).await.unwrap(),
            Some(Classification::Missed)
        );
    }
}
