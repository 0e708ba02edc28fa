//! Insights cache.
//!
//! Holds the content half of a result (strengths, issues, summary) per cache
//! key, stamped with the signature and time it was produced. Entries expire
//! after a fixed TTL and are purged lazily on read and on persist. The cache
//! does not compare signatures itself; callers must check
//! [`InsightsCacheEntry::signature`] before trusting a hit.

use std::collections::HashMap;
use std::time::Duration;

use heurix_protocols::Issue;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::persist::DebouncedWriter;

/// Content to cache for a key.
#[derive(Debug, Clone, PartialEq)]
pub struct InsightsPayload {
    pub strengths: Vec<String>,
    pub issues: Vec<Issue>,
    pub summary: String,
    pub signature: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightsCacheEntry {
    pub strengths: Vec<String>,
    pub issues: Vec<Issue>,
    pub summary: String,
    pub signature: String,
    /// Epoch milliseconds at which the entry was stored.
    pub timestamp: i64,
}

impl InsightsCacheEntry {
    /// Coerce a persisted record. Returns `None` for records that cannot be trusted.
    pub fn from_value(value: &Value) -> Option<Self> {
        let signature = value.get("signature")?.as_str()?.to_string();
        if signature.is_empty() {
            return None;
        }
        let timestamp = match value.get("timestamp")? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?,
            Value::String(s) => s.trim().parse::<i64>().ok()?,
            _ => return None,
        };
        let strengths = value
            .get("strengths")?
            .as_array()?
            .iter()
            .filter_map(|s| s.as_str().map(str::to_string))
            .collect();
        let issues = serde_json::from_value(value.get("issues")?.clone()).ok()?;
        let summary = value
            .get("summary")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Some(Self {
            strengths,
            issues,
            summary,
            signature,
            timestamp,
        })
    }

    fn is_expired(&self, now_ms: i64, ttl: Duration) -> bool {
        now_ms.saturating_sub(self.timestamp) > ttl.as_millis() as i64
    }
}

/// Process-wide insights cache.
pub struct InsightsCache {
    entries: Mutex<HashMap<String, InsightsCacheEntry>>,
    ttl: Duration,
    writer: Option<DebouncedWriter>,
}

impl InsightsCache {
    /// In-memory cache with no persistence.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            writer: None,
        }
    }

    /// Cache persisted through `writer`.
    pub fn with_writer(ttl: Duration, writer: DebouncedWriter) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            writer: Some(writer),
        }
    }

    /// Merge records from a persisted snapshot, skipping malformed and expired ones.
    /// Returns the number of records loaded.
    pub fn load(&self, snapshot: &Value) -> usize {
        let Some(records) = snapshot.as_object() else {
            if !snapshot.is_null() {
                warn!("Ignoring insights cache snapshot: not an object");
            }
            return 0;
        };

        let now = now_ms();
        let mut entries = self.entries.lock();
        let mut loaded = 0;
        for (key, record) in records {
            match InsightsCacheEntry::from_value(record) {
                Some(entry) if entry.is_expired(now, self.ttl) => {
                    debug!("Skipping expired insights record for '{}'", key);
                }
                Some(entry) => {
                    entries.entry(key.clone()).or_insert(entry);
                    loaded += 1;
                }
                None => warn!("Discarding malformed insights cache record for '{}'", key),
            }
        }
        loaded
    }

    /// Fresh entry for `key`, if any. Expired entries are removed.
    pub fn get(&self, key: &str) -> Option<InsightsCacheEntry> {
        self.get_at(key, now_ms())
    }

    /// [`get`](Self::get) evaluated at `now_ms`.
    pub fn get_at(&self, key: &str, now_ms: i64) -> Option<InsightsCacheEntry> {
        let expired = {
            let mut entries = self.entries.lock();
            let fresh = entries
                .get(key)
                .map(|entry| (!entry.is_expired(now_ms, self.ttl)).then(|| entry.clone()));
            match fresh {
                Some(Some(entry)) => return Some(entry),
                Some(None) => {
                    entries.remove(key);
                    true
                }
                None => false,
            }
        };

        if expired {
            debug!("Insights cache entry for '{}' expired", key);
            self.persist();
        }
        None
    }

    /// Store `payload` under `key`. Payloads without a signature are rejected.
    pub fn store(&self, key: &str, payload: InsightsPayload) -> Option<InsightsCacheEntry> {
        self.store_at(key, payload, now_ms())
    }

    /// [`store`](Self::store) stamped with `timestamp`.
    pub fn store_at(
        &self,
        key: &str,
        payload: InsightsPayload,
        timestamp: i64,
    ) -> Option<InsightsCacheEntry> {
        if payload.signature.is_empty() {
            debug!("Not caching insights for '{}': no signature", key);
            return None;
        }

        let entry = InsightsCacheEntry {
            strengths: payload.strengths,
            issues: payload.issues,
            summary: payload.summary,
            signature: payload.signature,
            timestamp,
        };
        self.entries.lock().insert(key.to_string(), entry.clone());
        self.persist();
        Some(entry)
    }

    pub fn delete(&self, key: &str) {
        let removed = self.entries.lock().remove(key).is_some();
        if removed {
            self.persist();
        }
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
        self.persist();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Full snapshot in persisted form. Expired entries are purged first.
    pub fn snapshot(&self) -> Value {
        self.snapshot_at(now_ms())
    }

    fn snapshot_at(&self, now_ms: i64) -> Value {
        let mut entries = self.entries.lock();
        let ttl = self.ttl;
        entries.retain(|_, entry| !entry.is_expired(now_ms, ttl));
        serde_json::to_value(&*entries).unwrap_or(Value::Null)
    }

    pub async fn flush(&self) {
        if let Some(writer) = &self.writer {
            writer.flush().await;
        }
    }

    fn persist(&self) {
        if let Some(writer) = &self.writer {
            writer.schedule(self.snapshot());
        }
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
#[path = "insights_tests.rs"]
mod tests;
