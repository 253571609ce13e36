//! Storage layer for the Cardwatch engine
//!
//! Provides the dedup store abstraction and its SQLite implementation:
//! a durable identity → classification map with point lookup and
//! upsert-by-identity.

pub mod sqlite;

use crate::error::Result;
use crate::types::{Classification, Identity};
use async_trait::async_trait;

/// Dedup store contract: one persisted record per identity, last write
/// wins.
///
/// Implementations return honest `Result`s; the fail-open policy for
/// storage faults (lookup reads as absent, upsert faults do not unwind
/// the in-memory transition) lives in the engine, not here.
#[async_trait]
pub trait ClassificationStore: Send + Sync {
    /// Point lookup by identity; `None` means no record (unclassified)
    async fn lookup(&self, identity: &Identity) -> Result<Option<Classification>>;

    /// Idempotent upsert; overwrites any prior record for the identity.
    /// Duplicate keys are the expected overwrite path, not an error.
    async fn upsert(&self, identity: &Identity, classification: Classification) -> Result<()>;
}
