//! JSON-file store.
//!
//! The whole store is one JSON object on disk. Writes go to a sibling temp
//! file that is then renamed over the original, so a failed write leaves the
//! previous contents in place.

use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use super::{data_dir, KeyValueStore};
use crate::error::{CoreError, StoreError};

pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Open `store.json` in the data directory.
    pub fn open() -> Result<Self, CoreError> {
        Ok(Self::with_path(data_dir()?.join("store.json")))
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn unavailable(&self, source: std::io::Error) -> StoreError {
        StoreError::Unavailable {
            path: self.path.clone(),
            source,
        }
    }

    fn read_all(&self) -> Result<Map<String, Value>, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(self.unavailable(e)),
        };
        if content.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str(&content)? {
            Value::Object(values) => Ok(values),
            _ => Err(StoreError::Corrupt(format!(
                "{} does not hold a JSON object",
                self.path.display()
            ))),
        }
    }

    fn write_all(&self, values: &Map<String, Value>) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(values)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content).map_err(|e| self.unavailable(e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp);
            self.unavailable(e)
        })
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, keys: &[&str]) -> Result<Map<String, Value>, StoreError> {
        let mut values = self.read_all()?;
        Ok(keys
            .iter()
            .filter_map(|key| values.remove(*key).map(|v| (key.to_string(), v)))
            .collect())
    }

    fn set(&self, partial: Map<String, Value>) -> Result<(), StoreError> {
        let mut values = self.read_all()?;
        values.extend(partial);
        self.write_all(&values)?;
        tracing::debug!(path = %self.path.display(), "store written");
        Ok(())
    }
}
