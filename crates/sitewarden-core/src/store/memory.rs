use serde_json::{Map, Value};
use std::sync::Mutex;

use super::KeyValueStore;
use crate::error::StoreError;

/// In-process store. Used by tests and by hosts that persist elsewhere.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<Map<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store from a JSON object.
    pub fn from_value(value: Value) -> Result<Self, StoreError> {
        match value {
            Value::Object(values) => Ok(Self {
                values: Mutex::new(values),
            }),
            _ => Err(StoreError::Corrupt("store root must be an object".into())),
        }
    }

    /// Copy of everything stored.
    pub fn to_value(&self) -> Value {
        Value::Object(self.lock().clone())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Map<String, Value>> {
        // A poisoned lock only means another thread panicked mid-write of a
        // whole value; the map itself is still consistent.
        self.values.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, keys: &[&str]) -> Result<Map<String, Value>, StoreError> {
        let values = self.lock();
        Ok(keys
            .iter()
            .filter_map(|key| values.get(*key).map(|v| (key.to_string(), v.clone())))
            .collect())
    }

    fn set(&self, partial: Map<String, Value>) -> Result<(), StoreError> {
        self.lock().extend(partial);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn get_returns_only_present_keys() {
        let store = MemoryStore::from_value(json!({ "a": 1, "b": 2 })).unwrap();
        let got = store.get(&["a", "missing"]).unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got["a"], json!(1));
    }

    #[test]
    fn set_merges() {
        let store = MemoryStore::from_value(json!({ "a": 1, "b": 2 })).unwrap();
        let mut partial = Map::new();
        partial.insert("b".into(), json!(3));
        store.set(partial).unwrap();
        assert_eq!(store.to_value(), json!({ "a": 1, "b": 3 }));
    }

    #[test]
    fn non_object_seed_is_rejected() {
        assert!(MemoryStore::from_value(json!([1, 2])).is_err());
    }
}
