//! Bounded recent-history window for lookback and correction
//!
//! Fixed-capacity, insertion-ordered buffer of the most recently
//! classified cards. This is a cache for lookback, not the source of
//! truth: the persisted store remains authoritative for
//! identity → classification.
//!
//! Not synchronized: the ring is owned by the engine and mutated only
//! on the serialized event-processing path.

use crate::error::{CardwatchError, Result};
use crate::types::Card;
use std::collections::VecDeque;

/// Default number of cards remembered for lookback
pub const DEFAULT_CAPACITY: usize = 10;

/// Fixed-capacity, insertion-ordered card buffer
#[derive(Debug)]
pub struct HistoryRing {
    cards: VecDeque<Card>,
    capacity: usize,
}

impl HistoryRing {
    /// Create a ring holding at most `capacity` cards
    pub fn new(capacity: usize) -> Self {
        Self {
            cards: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a card, evicting the oldest entry when at capacity
    pub fn append(&mut self, card: Card) {
        if self.cards.len() == self.capacity {
            self.cards.pop_front();
        }
        self.cards.push_back(card);
    }

    /// Look up a card by recency offset; 0 = most recently appended
    pub fn at(&self, offset_from_end: usize) -> Result<&Card> {
        let len = self.cards.len();
        if offset_from_end >= len {
            return Err(CardwatchError::OutOfRange {
                offset: offset_from_end,
                len,
            });
        }
        Ok(&self.cards[len - 1 - offset_from_end])
    }

    /// Most recently appended card, if any
    pub fn last(&self) -> Option<&Card> {
        self.cards.back()
    }

    /// Mutable access to the most recently appended card
    pub fn last_mut(&mut self) -> Option<&mut Card> {
        self.cards.back_mut()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for HistoryRing {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Card;

    fn card(text: &str) -> Card {
        Card::new(text.to_string(), None)
    }

    #[test]
    fn test_append_and_lookback_order() {
        let mut ring = HistoryRing::new(10);
        ring.append(card("A"));
        ring.append(card("B"));
        ring.append(card("C"));

        assert_eq!(ring.at(0).unwrap().text, "C");
        assert_eq!(ring.at(1).unwrap().text, "B");
        assert_eq!(ring.at(2).unwrap().text, "A");
        assert_eq!(ring.last().unwrap().text, "C");
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut ring = HistoryRing::new(10);
        for i in 0..11 {
            ring.append(card(&format!("card {}", i)));
        }

        assert_eq!(ring.len(), 10);
        // card 0 evicted, cards 1..=10 retained in arrival order
        assert_eq!(ring.at(0).unwrap().text, "card 10");
        assert_eq!(ring.at(9).unwrap().text, "card 1");
        assert!(matches!(
            ring.at(10),
            Err(CardwatchError::OutOfRange { offset: 10, len: 10 })
        ));
    }

    #[test]
    fn test_empty_ring() {
        let ring = HistoryRing::new(10);
        assert!(ring.is_empty());
        assert!(ring.last().is_none());
        assert!(matches!(
            ring.at(0),
            Err(CardwatchError::OutOfRange { offset: 0, len: 0 })
        ));
    }

    #[test]
    fn test_last_mut_mutates_in_place() {
        let mut ring = HistoryRing::new(10);
        ring.append(card("A"));
        ring.last_mut().unwrap().classification = Some(crate::types::Classification::Liking);
        assert_eq!(
            ring.last().unwrap().classification,
            Some(crate::types::Classification::Liking)
        );
    }
}
