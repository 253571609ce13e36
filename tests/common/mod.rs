//! Shared test doubles for the feed and notifier collaborators

use async_trait::async_trait;
use cardwatch_core::{FeedClient, MessageRef, Notifier, Result};
use std::sync::Mutex;

/// One recorded outbound feed call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedCall {
    Message(String),
    Reaction {
        message_id: i64,
        token: Option<String>,
    },
}

/// Feed double that records every outbound call
#[derive(Default)]
pub struct RecordingFeed {
    calls: Mutex<Vec<FeedCall>>,
}

impl RecordingFeed {
    pub fn calls(&self) -> Vec<FeedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl FeedClient for RecordingFeed {
    async fn send_message(&self, text: &str) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(FeedCall::Message(text.to_string()));
        Ok(())
    }

    async fn send_reaction(&self, message_ref: MessageRef, token: Option<&str>) -> Result<()> {
        self.calls.lock().unwrap().push(FeedCall::Reaction {
            message_id: message_ref.message_id,
            token: token.map(str::to_string),
        });
        Ok(())
    }
}

/// Notifier double that records every alert
#[derive(Default)]
pub struct RecordingNotifier {
    alerts: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn alerts(&self) -> Vec<(String, String)> {
        self.alerts.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn alert(&self, label: &str, glyph: &str) {
        self.alerts
            .lock()
            .unwrap()
            .push((label.to_string(), glyph.to_string()));
    }
}
