//! Score cache.
//!
//! Maps a cache key to the score recorded for it and the content signature the
//! score was computed under. Once a score is recorded for a key and signature,
//! later candidates for the same pair lose to it, so re-analysing an unchanged
//! page never makes the headline number drift.

use std::collections::HashMap;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::persist::DebouncedWriter;

/// A recorded score and the signature it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreCacheEntry {
    pub score: f64,
    #[serde(default)]
    pub signature: String,
}

impl ScoreCacheEntry {
    /// Coerce a persisted record. Returns `None` for records that cannot be trusted.
    pub fn from_value(value: &Value) -> Option<Self> {
        let score = match value.get("score")? {
            Value::Number(n) => n.as_f64()?,
            Value::String(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        if !score.is_finite() {
            return None;
        }
        let signature = match value.get("signature") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(_) => return None,
        };
        Some(Self { score, signature })
    }

    /// Whether this entry may be served to a caller holding `signature`.
    pub fn matches(&self, signature: Option<&str>) -> bool {
        match signature {
            None | Some("") => true,
            Some(current) => self.signature.is_empty() || self.signature == current,
        }
    }
}

/// Process-wide score cache.
pub struct ScoreCache {
    entries: Mutex<HashMap<String, ScoreCacheEntry>>,
    writer: Option<DebouncedWriter>,
}

impl ScoreCache {
    /// In-memory cache with no persistence.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            writer: None,
        }
    }

    /// Cache persisted through `writer`.
    pub fn with_writer(writer: DebouncedWriter) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            writer: Some(writer),
        }
    }

    /// Merge records from a persisted snapshot, skipping malformed ones.
    /// Keys already present in memory are kept. Returns the number of records loaded.
    pub fn load(&self, snapshot: &Value) -> usize {
        let Some(records) = snapshot.as_object() else {
            if !snapshot.is_null() {
                warn!("Ignoring score cache snapshot: not an object");
            }
            return 0;
        };

        let mut entries = self.entries.lock();
        let mut loaded = 0;
        for (key, record) in records {
            match ScoreCacheEntry::from_value(record) {
                Some(entry) => {
                    entries.entry(key.clone()).or_insert(entry);
                    loaded += 1;
                }
                None => warn!("Discarding malformed score cache record for '{}'", key),
            }
        }
        loaded
    }

    pub fn get(&self, key: &str) -> Option<ScoreCacheEntry> {
        self.entries.lock().get(key).cloned()
    }

    /// Return the recorded score for `key` if it is still valid under `signature`,
    /// otherwise record `candidate` and return it.
    ///
    /// An entry recorded under a different signature is deleted first. A
    /// non-finite candidate is never stored and yields `None`.
    pub fn resolve_or_store(&self, key: &str, candidate: f64, signature: Option<&str>) -> Option<f64> {
        let (resolved, changed) = {
            let mut entries = self.entries.lock();

            let stale = match entries.get(key) {
                Some(existing) if existing.matches(signature) => {
                    debug!("Score cache hit for '{}': {}", key, existing.score);
                    return Some(existing.score);
                }
                Some(_) => true,
                None => false,
            };
            if stale {
                debug!("Score cache entry for '{}' is stale; deleting", key);
                entries.remove(key);
            }

            if !candidate.is_finite() {
                (None, stale)
            } else {
                entries.insert(
                    key.to_string(),
                    ScoreCacheEntry {
                        score: candidate,
                        signature: signature.unwrap_or_default().to_string(),
                    },
                );
                (Some(candidate), true)
            }
        };

        if changed {
            self.persist();
        }
        resolved
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

    /// Full snapshot in persisted form.
    pub fn snapshot(&self) -> Value {
        let entries = self.entries.lock();
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

impl Default for ScoreCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "score_tests.rs"]
mod tests;
