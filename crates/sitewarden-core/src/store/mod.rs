//! Persisted settings: the key-value store seam and typed snapshot reads.
//!
//! The browser keeps `blockedSites` and `schedules` in an eventually
//! synchronized key-value store. The core only sees it through
//! [`KeyValueStore`] and re-reads both keys before every decision.
//! Host preferences live separately in [`Config`].

mod config;
mod file;
mod memory;

pub use config::{BlockingConfig, Config, LogConfig, NotificationsConfig, WatchConfig};
pub use file::JsonFileStore;
pub use memory::MemoryStore;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

use crate::blocklist::BlockedSite;
use crate::error::{ConfigError, StoreError};
use crate::schedule::{disambiguate_ids, Schedule};

/// Store key holding the blocked-site list.
pub const BLOCKED_SITES_KEY: &str = "blockedSites";
/// Store key holding the global schedule set.
pub const SCHEDULES_KEY: &str = "schedules";

/// Narrow view of the external key-value store.
///
/// `get` returns only the keys that exist. `set` merges `partial` into the
/// stored object; keys not mentioned are left alone.
pub trait KeyValueStore {
    fn get(&self, keys: &[&str]) -> Result<Map<String, Value>, StoreError>;

    fn set(&self, partial: Map<String, Value>) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, keys: &[&str]) -> Result<Map<String, Value>, StoreError> {
        (**self).get(keys)
    }

    fn set(&self, partial: Map<String, Value>) -> Result<(), StoreError> {
        (**self).set(partial)
    }
}

/// Both collections as read together for one decision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub blocked_sites: Vec<BlockedSite>,
    #[serde(default)]
    pub schedules: Vec<Schedule>,
}

impl Snapshot {
    /// Read both keys. Missing keys default to empty lists.
    pub fn read(store: &impl KeyValueStore) -> Result<Self, StoreError> {
        let mut values = store.get(&[BLOCKED_SITES_KEY, SCHEDULES_KEY])?;
        let mut schedules = take_list(&mut values, SCHEDULES_KEY)?;
        disambiguate_ids(&mut schedules);
        Ok(Self {
            blocked_sites: take_list(&mut values, BLOCKED_SITES_KEY)?,
            schedules,
        })
    }

    /// Global schedules followed by every site-level schedule.
    pub fn all_schedules(&self) -> impl Iterator<Item = &Schedule> {
        self.schedules
            .iter()
            .chain(self.blocked_sites.iter().filter_map(|site| site.schedule.as_ref()))
    }
}

pub fn read_blocked_sites(store: &impl KeyValueStore) -> Result<Vec<BlockedSite>, StoreError> {
    let mut values = store.get(&[BLOCKED_SITES_KEY])?;
    take_list(&mut values, BLOCKED_SITES_KEY)
}

pub fn read_schedules(store: &impl KeyValueStore) -> Result<Vec<Schedule>, StoreError> {
    let mut values = store.get(&[SCHEDULES_KEY])?;
    let mut schedules = take_list(&mut values, SCHEDULES_KEY)?;
    disambiguate_ids(&mut schedules);
    Ok(schedules)
}

pub fn write_blocked_sites(store: &impl KeyValueStore, sites: &[BlockedSite]) -> Result<(), StoreError> {
    write_list(store, BLOCKED_SITES_KEY, sites)
}

pub fn write_schedules(store: &impl KeyValueStore, schedules: &[Schedule]) -> Result<(), StoreError> {
    write_list(store, SCHEDULES_KEY, schedules)
}

/// Decode the list under `key` one entry at a time. Entries that do not
/// decode are logged and skipped; the next write of the list drops them.
fn take_list<T: for<'de> Deserialize<'de>>(values: &mut Map<String, Value>, key: &str) -> Result<Vec<T>, StoreError> {
    match values.remove(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| match serde_json::from_value(item) {
                Ok(decoded) => Some(decoded),
                Err(e) => {
                    tracing::warn!(key, index, error = %e, "skipping unreadable stored entry");
                    None
                }
            })
            .collect()),
        Some(other) => Err(StoreError::Corrupt(format!(
            "'{key}' should be a list, found {}",
            json_kind(&other)
        ))),
    }
}

fn write_list<T: Serialize>(store: &impl KeyValueStore, key: &str, items: &[T]) -> Result<(), StoreError> {
    let mut partial = Map::new();
    partial.insert(key.to_string(), serde_json::to_value(items)?);
    store.set(partial)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

/// Returns `~/.config/sitewarden[-dev]/`.
///
/// `SITEWARDEN_HOME` overrides the location outright; otherwise
/// `SITEWARDEN_ENV=dev` selects the development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("SITEWARDEN_HOME") {
        Some(home) if !home.is_empty() => PathBuf::from(home),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("SITEWARDEN_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("sitewarden-dev")
            } else {
                base_dir.join("sitewarden")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|source| ConfigError::DataDir {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_store_reads_as_empty_snapshot() {
        let store = MemoryStore::new();
        assert_eq!(Snapshot::read(&store).unwrap(), Snapshot::default());
    }

    #[test]
    fn snapshot_reads_browser_shaped_records() {
        let store = MemoryStore::from_value(json!({
            "blockedSites": [
                { "url": "example.com", "schedule": null },
                { "url": "news.site", "schedule": { "startTime": "09:00", "endTime": "12:00", "days": "weekdays" } }
            ],
            "schedules": [ { "startTime": "13:00", "endTime": "17:00", "days": "all" } ]
        }))
        .unwrap();

        let snapshot = Snapshot::read(&store).unwrap();
        assert_eq!(snapshot.blocked_sites.len(), 2);
        assert!(snapshot.blocked_sites[0].schedule.is_none());
        assert_eq!(snapshot.schedules.len(), 1);
        assert_eq!(snapshot.all_schedules().count(), 2);
    }

    #[test]
    fn wrong_shape_is_reported_as_corrupt() {
        let store = MemoryStore::from_value(json!({ "schedules": "nope" })).unwrap();
        let err = Snapshot::read(&store).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
    }

    #[test]
    fn unreadable_entries_are_skipped_and_the_rest_kept() {
        let store = MemoryStore::from_value(json!({
            "blockedSites": [
                { "url": "example.com", "schedule": null },
                { "url": "other.com", "schedule": { "startTime": "9:00", "endTime": "17:00", "days": "all" } },
                { "url": "third.com", "schedule": { "startTime": "09:00", "endTime": "17:00", "days": "mondays" } },
                "not a site"
            ],
            "schedules": [
                { "startTime": "25:00", "endTime": "26:00", "days": "all" },
                { "startTime": "13:00", "endTime": "17:00", "days": "all" }
            ]
        }))
        .unwrap();

        let snapshot = Snapshot::read(&store).unwrap();
        let urls: Vec<&str> = snapshot.blocked_sites.iter().map(|s| s.url.as_str()).collect();
        assert_eq!(urls, ["example.com"]);
        assert_eq!(snapshot.schedules.len(), 1);
        assert_eq!(snapshot.schedules[0].id, "1300-1700-all");
    }

    #[test]
    fn legacy_duplicates_get_distinct_ids() {
        let window = json!({ "startTime": "09:00", "endTime": "17:00", "days": "all" });
        let store = MemoryStore::from_value(json!({
            "schedules": [window.clone(), window.clone(), window]
        }))
        .unwrap();

        let ids: Vec<String> = read_schedules(&store).unwrap().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, ["0900-1700-all", "0900-1700-all-2", "0900-1700-all-3"]);
        let snapshot_ids: Vec<String> = Snapshot::read(&store).unwrap().schedules.into_iter().map(|s| s.id).collect();
        assert_eq!(snapshot_ids, ids);
    }

    #[test]
    fn writing_one_key_leaves_the_other() {
        let store = MemoryStore::new();
        let schedule = Schedule::parse("09:00", "10:00", Default::default()).unwrap();
        write_schedules(&store, std::slice::from_ref(&schedule)).unwrap();
        write_blocked_sites(&store, &[BlockedSite::new("example.com")]).unwrap();

        assert_eq!(read_schedules(&store).unwrap(), vec![schedule]);
        assert_eq!(read_blocked_sites(&store).unwrap()[0].url, "example.com");
    }
}
