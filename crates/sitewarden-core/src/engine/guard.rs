//! Navigation event handler.

use chrono::NaiveDateTime;

use super::{BlockEngine, Decision};
use crate::browser::{NavigationEvent, Navigator};
use crate::store::{BlockingConfig, KeyValueStore, Snapshot};

/// Intercepts navigations and redirects blocked ones to the interstitial
/// page.
pub struct NavigationGuard<S, N> {
    store: S,
    navigator: N,
    engine: BlockEngine,
    interstitial_url: String,
}

impl<S: KeyValueStore, N: Navigator> NavigationGuard<S, N> {
    pub fn new(store: S, navigator: N, config: &BlockingConfig) -> Self {
        Self {
            store,
            navigator,
            engine: BlockEngine::new(config.match_policy),
            interstitial_url: config.interstitial_url.clone(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    /// Handle one navigation at local time `now`.
    ///
    /// Sub-frame navigations are ignored and return `None`. An unreadable
    /// store counts as empty, so the navigation is allowed.
    pub fn handle(&self, event: &NavigationEvent, now: NaiveDateTime) -> Option<Decision> {
        if !event.is_top_level() {
            return None;
        }

        let snapshot = Snapshot::read(&self.store).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "settings unavailable, treating as empty");
            Snapshot::default()
        });

        let decision = self
            .engine
            .decide(&event.url, &snapshot.blocked_sites, &snapshot.schedules, now);

        if decision.is_block() {
            if let Err(e) = self.navigator.redirect(event.tab_id, &self.interstitial_url) {
                tracing::warn!(tab_id = event.tab_id, error = %e, "redirect to interstitial failed");
            } else {
                tracing::info!(tab_id = event.tab_id, url = %event.url, "navigation blocked");
            }
        }
        Some(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::TabId;
    use crate::error::StoreError;
    use chrono::NaiveDate;
    use serde_json::{json, Map, Value};
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingNavigator {
        redirects: RefCell<Vec<(TabId, String)>>,
    }

    impl Navigator for RecordingNavigator {
        fn redirect(&self, tab_id: TabId, url: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            self.redirects.borrow_mut().push((tab_id, url.to_string()));
            Ok(())
        }
    }

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _keys: &[&str]) -> Result<Map<String, Value>, StoreError> {
            Err(StoreError::Corrupt("offline".into()))
        }

        fn set(&self, _partial: Map<String, Value>) -> Result<(), StoreError> {
            Err(StoreError::Corrupt("offline".into()))
        }
    }

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 14)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn guard_with(value: Value) -> NavigationGuard<crate::store::MemoryStore, RecordingNavigator> {
        let store = crate::store::MemoryStore::from_value(value).unwrap();
        NavigationGuard::new(store, RecordingNavigator::default(), &BlockingConfig::default())
    }

    #[test]
    fn blocked_top_level_navigation_is_redirected() {
        let guard = guard_with(json!({ "blockedSites": [{ "url": "example.com", "schedule": null }] }));
        let decision = guard.handle(&NavigationEvent::top_level("https://example.com/", 4), noon());
        assert!(decision.unwrap().is_block());
        assert_eq!(
            guard.navigator().redirects.borrow().as_slice(),
            &[(4, BlockingConfig::default().interstitial_url)]
        );
    }

    #[test]
    fn sub_frames_are_ignored() {
        let guard = guard_with(json!({ "blockedSites": [{ "url": "example.com", "schedule": null }] }));
        let event = NavigationEvent { url: "https://example.com/".into(), frame_id: 2, tab_id: 4 };
        assert_eq!(guard.handle(&event, noon()), None);
        assert!(guard.navigator().redirects.borrow().is_empty());
    }

    #[test]
    fn allowed_navigation_is_not_redirected() {
        let guard = guard_with(json!({
            "blockedSites": [{ "url": "example.com", "schedule": null }],
            "schedules": [{ "startTime": "20:00", "endTime": "21:00", "days": "all" }]
        }));
        let decision = guard.handle(&NavigationEvent::top_level("https://example.com/", 1), noon());
        assert_eq!(decision, Some(Decision::Allow));
        assert!(guard.navigator().redirects.borrow().is_empty());
    }

    #[test]
    fn unreadable_sibling_record_does_not_unblock_the_rest() {
        let guard = guard_with(json!({
            "blockedSites": [
                { "url": "example.com", "schedule": null },
                { "url": "other.com", "schedule": { "startTime": "9:00", "endTime": "17:00", "days": "all" } }
            ],
            "schedules": [{ "startTime": "10:00", "endTime": "14:00", "days": "mondays" }]
        }));
        let decision = guard.handle(&NavigationEvent::top_level("https://example.com/", 1), noon());
        assert!(decision.unwrap().is_block());
        assert_eq!(guard.navigator().redirects.borrow().len(), 1);
    }

    #[test]
    fn unavailable_store_allows() {
        let guard = NavigationGuard::new(BrokenStore, RecordingNavigator::default(), &BlockingConfig::default());
        let decision = guard.handle(&NavigationEvent::top_level("https://example.com/", 1), noon());
        assert_eq!(decision, Some(Decision::Allow));
    }

    #[test]
    fn store_changes_apply_to_the_next_navigation() {
        let guard = guard_with(json!({}));
        let event = NavigationEvent::top_level("https://example.com/", 1);
        assert_eq!(guard.handle(&event, noon()), Some(Decision::Allow));

        crate::blocklist::Blocklist::new(guard.store()).add_site("example.com").unwrap();
        assert!(guard.handle(&event, noon()).unwrap().is_block());
    }
}
