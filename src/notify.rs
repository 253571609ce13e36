//! Desktop notification seam
//!
//! Alert delivery is a one-way fire-and-forget side effect. When no
//! notification backend is available the alert degrades to a log line;
//! a failing backend never propagates to the dispatcher.

use tracing::info;

/// One-way alert sink
pub trait Notifier: Send + Sync {
    /// Show an alert with a category label and glyph. Must not fail
    /// loudly; implementations swallow and log their own errors.
    fn alert(&self, label: &str, glyph: &str);
}

/// Fallback notifier that writes alerts to the log
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn alert(&self, label: &str, glyph: &str) {
        info!("ALERT {} {}", label, glyph);
    }
}
