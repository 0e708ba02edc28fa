//! Durable key-value storage protocol.
//!
//! The caches persist whole snapshots under fixed, versioned keys.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::StoreError;

/// Blob store with get/set semantics.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the values stored under `keys`. Missing keys are absent from the map.
    async fn get(&self, keys: &[&str]) -> Result<HashMap<String, serde_json::Value>, StoreError>;

    /// Write every entry of `items`, replacing previous values.
    async fn set(&self, items: HashMap<String, serde_json::Value>) -> Result<(), StoreError>;
}
