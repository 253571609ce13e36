//! Cardwatch - classification-and-dispatch engine for profile cards
//!
//! Ingests unstructured chat messages representing profile cards from a
//! live feed, classifies each card by a durable content-derived
//! identity, decides an action according to a configured policy table,
//! and optionally emits a typed reaction back into the feed. Operators
//! can retroactively reclassify recently seen cards through a console
//! command interface or through reaction signals on the feed itself.
//!
//! # Architecture
//!
//! - **Types**: Card, Identity, Classification
//! - **Storage**: durable identity → classification dedup store (SQLite)
//! - **History**: bounded recent-card window for lookback
//! - **Engine**: identity resolution and state transitions
//! - **Policy**: classification → action/reaction dispatch
//! - **Reactions**: out-of-band correction via reaction control tokens

pub mod app;
pub mod config;
pub mod console;
pub mod engine;
pub mod error;
pub mod feed;
pub mod history;
pub mod notify;
pub mod policy;
pub mod reactions;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use app::App;
pub use config::{ReactionControls, Settings};
pub use console::OperatorCommand;
pub use engine::ClassificationEngine;
pub use error::{CardwatchError, Result};
pub use feed::{FeedClient, FeedEvent, LoggingFeed, MessageRef};
pub use history::HistoryRing;
pub use notify::{LogNotifier, Notifier};
pub use policy::{PolicyAction, PolicyDispatcher, PolicyEntry, PolicyTable};
pub use reactions::ReactionFeedback;
pub use storage::{sqlite::SqliteStore, ClassificationStore};
pub use types::{ActionKind, Card, Classification, Identity};
