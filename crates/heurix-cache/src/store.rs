//! Key-value store implementations.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use heurix_protocols::{KeyValueStore, StoreError};

/// In-memory store for testing and for running without durability.
pub struct MemoryStore {
    items: RwLock<HashMap<String, serde_json::Value>>,
}

impl MemoryStore {
    /// Create a new memory store.
    pub fn new() -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, keys: &[&str]) -> Result<HashMap<String, serde_json::Value>, StoreError> {
        let items = self.items.read().await;
        Ok(keys
            .iter()
            .filter_map(|k| items.get(*k).map(|v| (k.to_string(), v.clone())))
            .collect())
    }

    async fn set(&self, items: HashMap<String, serde_json::Value>) -> Result<(), StoreError> {
        self.items.write().await.extend(items);
        Ok(())
    }
}

/// File-backed store.
///
/// All keys live in one JSON object:
/// ```text
/// {data_dir}/
/// └── storage.json
/// ```
/// Writes go to a temporary file first and are renamed into place.
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Create a store under `data_dir`, creating the directory if needed.
    pub async fn new(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir).await?;

        debug!("FileStore initialized at {:?}", data_dir);

        Ok(Self {
            path: data_dir.join("storage.json"),
            write_lock: Mutex::new(()),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<serde_json::Map<String, serde_json::Value>, StoreError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(serde_json::Map::new());
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<serde_json::Value>(&content) {
            Ok(serde_json::Value::Object(map)) => Ok(map),
            Ok(_) => {
                warn!("Storage file {:?} is not a JSON object; starting empty", self.path);
                Ok(serde_json::Map::new())
            }
            Err(e) => {
                warn!("Failed to parse storage file {:?}: {}; starting empty", self.path, e);
                Ok(serde_json::Map::new())
            }
        }
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, keys: &[&str]) -> Result<HashMap<String, serde_json::Value>, StoreError> {
        let mut all = self.read_all().await?;
        Ok(keys
            .iter()
            .filter_map(|k| all.remove(*k).map(|v| (k.to_string(), v)))
            .collect())
    }

    async fn set(&self, items: HashMap<String, serde_json::Value>) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut all = self.read_all().await?;
        let keys: Vec<String> = items.keys().cloned().collect();
        all.extend(items);

        let content = serde_json::to_string_pretty(&serde_json::Value::Object(all))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content).await?;
        fs::rename(&tmp, &self.path).await?;

        debug!("Wrote keys {:?} to {:?}", keys, self.path);
        Ok(())
    }
}
