//! Core data structures for the Cardwatch engine
//!
//! Defines the unit of work (Card), its content-derived identity, the
//! classification state attached to an identity, and the action signals
//! that drive state transitions.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Width of a card identity digest in bytes (SHA-256)
pub const IDENTITY_LEN: usize = 32;

/// Deterministic fixed-width digest of normalized card text.
///
/// Serves as the dedup key: the same normalized text always produces
/// the same identity. Collision probability is treated as negligible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identity([u8; IDENTITY_LEN]);

impl Identity {
    /// Compute the identity of a normalized card text
    pub fn of(normalized_text: &str) -> Self {
        let digest = Sha256::digest(normalized_text.as_bytes());
        Self(digest.into())
    }

    /// Raw digest bytes (the storage key)
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Reconstruct an identity from stored digest bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let arr: [u8; IDENTITY_LEN] = bytes.try_into().ok()?;
        Some(Self(arr))
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Decision state attached to an identity.
///
/// "Unclassified" is the absence of a persisted record and is modeled
/// as `Option<Classification>::None` on a [`Card`]; only these three
/// codes are ever written to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Liking,
    Disliking,
    Missed,
}

impl Classification {
    /// Integer code persisted in the store
    pub fn code(&self) -> i64 {
        match self {
            Classification::Liking => 0,
            Classification::Disliking => 1,
            Classification::Missed => 2,
        }
    }

    /// Decode a persisted integer code
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Classification::Liking),
            1 => Some(Classification::Disliking),
            2 => Some(Classification::Missed),
            _ => None,
        }
    }

    /// Label used for alert notifications and logging
    pub fn label(self) -> &'static str {
        match self {
            Classification::Liking => "LIKING",
            Classification::Disliking => "DISLIKING",
            Classification::Missed => "MISSED",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Explicit operator action signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Like,
    Dislike,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Like => f.write_str("LIKE"),
            ActionKind::Dislike => f.write_str("DISLIKE"),
        }
    }
}

/// One normalized profile message plus its resolved classification.
///
/// Constructed when a feed event is normalized; the classification is
/// resolved by a store lookup at construction and may be mutated later
/// in place (single writer) in response to an action or reaction. Every
/// mutation is followed by a persistence upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    /// Normalized message body (location annotations collapsed to the
    /// configured city token)
    pub text: String,
    /// Content-derived dedup key
    pub identity: Identity,
    /// `None` means unclassified (no persisted record)
    pub classification: Option<Classification>,
}

impl Card {
    /// Build a card from already-normalized text
    pub fn new(text: String, classification: Option<Classification>) -> Self {
        let identity = Identity::of(&text);
        Self {
            text,
            identity,
            classification,
        }
    }
}
