//! Browser-side collaborators: navigation events, tab redirects and
//! notifications.
//!
//! Implementations live in the host (extension glue, CLI). Each is called
//! fire-and-forget from the core; failures are logged, never propagated into
//! the navigation pipeline.

use serde::{Deserialize, Serialize};

/// Identifier of a browser tab.
pub type TabId = i64;

/// Frame id of a tab's top-level document.
pub const TOP_LEVEL_FRAME: i64 = 0;

/// A navigation about to happen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationEvent {
    pub url: String,
    pub frame_id: i64,
    pub tab_id: TabId,
}

impl NavigationEvent {
    pub fn top_level(url: impl Into<String>, tab_id: TabId) -> Self {
        Self {
            url: url.into(),
            frame_id: TOP_LEVEL_FRAME,
            tab_id,
        }
    }

    pub fn is_top_level(&self) -> bool {
        self.frame_id == TOP_LEVEL_FRAME
    }
}

/// Sends a tab somewhere else.
pub trait Navigator {
    fn redirect(&self, tab_id: TabId, url: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Fire-and-forget user notification.
pub trait Notifier {
    fn notify(&self, title: &str, message: &str);
}

/// Notifier that drops everything, for hosts with notifications disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn notify(&self, _title: &str, _message: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_reads_browser_shape() {
        let event: NavigationEvent =
            serde_json::from_str(r#"{"url":"https://a.com","frameId":3,"tabId":7}"#).unwrap();
        assert!(!event.is_top_level());
        assert_eq!(event.tab_id, 7);
        assert!(NavigationEvent::top_level("https://a.com", 7).is_top_level());
    }
}
