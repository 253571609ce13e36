//! Configuration for Cardwatch
//!
//! Settings are loaded once at startup from an optional TOML file plus
//! `CARDWATCH_*` environment variables, and are read-only thereafter
//! (no reload).

use crate::error::Result;
use crate::history::DEFAULT_CAPACITY;
use crate::policy::PolicyTable;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default card store location under the platform data directory
fn default_database_path() -> String {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cardwatch")
        .join("cards.db")
        .to_string_lossy()
        .to_string()
}

/// Reserved reaction symbols the feed recognizes as operator correction
/// signals rather than ordinary content
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactionControls {
    /// Master switch for the reaction feedback protocol
    pub enabled: bool,
    /// Reaction token that reclassifies a card as missed
    pub miss: String,
    /// Reaction token that reclassifies a card as disliking
    pub dislike: String,
    /// Acknowledgment token emitted after a successful reclassification
    pub success: String,
}

impl Default for ReactionControls {
    fn default() -> Self {
        Self {
            enabled: false,
            miss: "🙈".to_string(),
            dislike: "👎".to_string(),
            success: "✅".to_string(),
        }
    }
}

/// Process-wide configuration surface
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Canonical city token substituted for location-distance
    /// annotations before identity computation
    pub city: String,
    /// Chat/feed target identifier
    pub chat_id: i64,
    /// Path to the durable card store
    pub database_path: String,
    /// Number of cards remembered for lookback
    pub history_capacity: usize,
    /// Per-classification action/reaction policy
    pub policy: PolicyTable,
    /// Reaction-control tokens and enable flag
    pub reaction_controls: ReactionControls,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            city: "Springfield".to_string(),
            chat_id: 0,
            database_path: default_database_path(),
            history_capacity: DEFAULT_CAPACITY,
            policy: PolicyTable::default(),
            reaction_controls: ReactionControls::default(),
        }
    }
}

impl Settings {
    /// Load settings from an optional TOML file merged with
    /// `CARDWATCH_*` environment variables (e.g.
    /// `CARDWATCH_DATABASE_PATH`). Missing file means defaults.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        match config_path {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                builder = builder.add_source(File::from(path));
            }
            None => {
                debug!("No config file given, checking ./cardwatch.toml");
                builder = builder.add_source(File::with_name("cardwatch").required(false));
            }
        }

        let settings = builder
            .add_source(
                Environment::with_prefix("CARDWATCH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::PolicyAction;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.history_capacity, 10);
        assert_eq!(settings.city, "Springfield");
        assert!(!settings.reaction_controls.enabled);
    }

    #[test]
    fn test_deserialize_partial_toml() {
        let settings: Settings = toml_str(
            r#"
            city = "Shelbyville"
            chat_id = 42

            [policy.on_new]
            action = "alert"
            reaction = "➕"

            [reaction_controls]
            enabled = true
            miss = "🙈"
            "#,
        );

        assert_eq!(settings.city, "Shelbyville");
        assert_eq!(settings.chat_id, 42);
        assert_eq!(settings.policy.on_new.action, PolicyAction::Alert);
        assert_eq!(settings.policy.on_new.reaction.as_deref(), Some("➕"));
        // unnamed fields keep their defaults
        assert_eq!(settings.history_capacity, 10);
        assert!(settings.reaction_controls.enabled);
        assert_eq!(settings.reaction_controls.success, "✅");
    }

    fn toml_str(raw: &str) -> Settings {
        Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }
}
