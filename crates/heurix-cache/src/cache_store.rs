//! Shared cache bundle injected into the orchestrator.

use std::sync::Arc;

use heurix_config::CacheConfig;
use heurix_protocols::KeyValueStore;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::insights::InsightsCache;
use crate::persist::DebouncedWriter;
use crate::score::ScoreCache;
use crate::store::MemoryStore;

/// Score and insights caches backed by one key-value store.
///
/// Loading happens once, on first use; concurrent callers of
/// [`ensure_loaded`](Self::ensure_loaded) share the same load. If the store
/// cannot be read the caches start empty and keep working in memory.
pub struct CacheStore {
    store: Arc<dyn KeyValueStore>,
    score_key: String,
    insights_key: String,
    scores: ScoreCache,
    insights: InsightsCache,
    loaded: OnceCell<()>,
}

impl CacheStore {
    /// Create caches persisted to `store`. Must be called inside a tokio runtime.
    pub fn new(store: Arc<dyn KeyValueStore>, config: &CacheConfig) -> Self {
        let debounce = config.flush_debounce();
        let score_writer = DebouncedWriter::spawn(store.clone(), &config.score_key, debounce);
        let insights_writer = DebouncedWriter::spawn(store.clone(), &config.insights_key, debounce);

        Self {
            store,
            score_key: config.score_key.clone(),
            insights_key: config.insights_key.clone(),
            scores: ScoreCache::with_writer(score_writer),
            insights: InsightsCache::with_writer(config.insights_ttl(), insights_writer),
            loaded: OnceCell::new(),
        }
    }

    /// Caches backed by a fresh [`MemoryStore`].
    pub fn in_memory(config: &CacheConfig) -> Self {
        Self::new(Arc::new(MemoryStore::new()), config)
    }

    /// Load persisted snapshots if that has not happened yet.
    pub async fn ensure_loaded(&self) {
        self.loaded.get_or_init(|| self.load()).await;
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.initialized()
    }

    async fn load(&self) {
        let keys = [self.score_key.as_str(), self.insights_key.as_str()];
        match self.store.get(&keys).await {
            Ok(snapshots) => {
                let scores = snapshots
                    .get(&self.score_key)
                    .map_or(0, |snapshot| self.scores.load(snapshot));
                let insights = snapshots
                    .get(&self.insights_key)
                    .map_or(0, |snapshot| self.insights.load(snapshot));
                info!("Loaded {} cached scores and {} cached insights", scores, insights);
            }
            Err(e) => warn!("Cache store unavailable, continuing in memory: {}", e),
        }
    }

    pub fn scores(&self) -> &ScoreCache {
        &self.scores
    }

    pub fn insights(&self) -> &InsightsCache {
        &self.insights
    }

    /// Drop every cached score and insight, persisting the empty state.
    pub async fn clear(&self) {
        self.ensure_loaded().await;
        self.scores.clear();
        self.insights.clear();
        self.flush().await;
    }

    /// Write pending snapshots now. Call before shutdown.
    pub async fn flush(&self) {
        self.scores.flush().await;
        self.insights.flush().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use heurix_protocols::StoreError;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingLoads {
        inner: MemoryStore,
        gets: AtomicUsize,
    }

    #[async_trait]
    impl KeyValueStore for CountingLoads {
        async fn get(
            &self,
            keys: &[&str],
        ) -> Result<HashMap<String, serde_json::Value>, StoreError> {
            self.gets.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            self.inner.get(keys).await
        }

        async fn set(&self, items: HashMap<String, serde_json::Value>) -> Result<(), StoreError> {
            self.inner.set(items).await
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        async fn get(&self, _: &[&str]) -> Result<HashMap<String, serde_json::Value>, StoreError> {
            Err(StoreError::Unavailable("disk gone".to_string()))
        }

        async fn set(&self, _: HashMap<String, serde_json::Value>) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("disk gone".to_string()))
        }
    }

    #[tokio::test]
    async fn test_concurrent_loads_coalesce() {
        let store = Arc::new(CountingLoads {
            inner: MemoryStore::new(),
            gets: AtomicUsize::new(0),
        });
        let caches = CacheStore::new(store.clone(), &CacheConfig::default());

        tokio::join!(caches.ensure_loaded(), caches.ensure_loaded(), caches.ensure_loaded());
        caches.ensure_loaded().await;

        assert_eq!(store.gets.load(Ordering::SeqCst), 1);
        assert!(caches.is_loaded());
    }

    #[tokio::test]
    async fn test_loads_persisted_snapshots() {
        let store = Arc::new(MemoryStore::new());
        let now = chrono::Utc::now().timestamp_millis();
        store
            .set(HashMap::from([
                (
                    "scoreCache.v1".to_string(),
                    json!({ "https://a.test": { "score": 70, "signature": "S" } }),
                ),
                (
                    "insightsCache.v1".to_string(),
                    json!({ "https://a.test": {
                        "strengths": ["Fast"], "issues": [], "summary": "ok",
                        "signature": "S", "timestamp": now
                    }}),
                ),
            ]))
            .await
            .unwrap();

        let caches = CacheStore::new(store, &CacheConfig::default());
        caches.ensure_loaded().await;

        assert_eq!(caches.scores().get("https://a.test").unwrap().score, 70.0);
        assert_eq!(caches.insights().get("https://a.test").unwrap().summary, "ok");
    }

    #[tokio::test]
    async fn test_writes_reach_store_after_flush() {
        let store = Arc::new(MemoryStore::new());
        let caches = CacheStore::new(store.clone(), &CacheConfig::default());
        caches.ensure_loaded().await;

        caches.scores().resolve_or_store("https://a.test", 55.0, Some("S"));
        caches.flush().await;

        let persisted = store.get(&["scoreCache.v1"]).await.unwrap();
        assert_eq!(persisted["scoreCache.v1"]["https://a.test"]["score"], json!(55.0));
    }

    #[tokio::test]
    async fn test_broken_store_degrades_to_memory() {
        let caches = CacheStore::new(Arc::new(BrokenStore), &CacheConfig::default());
        caches.ensure_loaded().await;

        assert_eq!(caches.scores().resolve_or_store("k", 61.0, Some("S")), Some(61.0));
        caches.flush().await;
        assert_eq!(caches.scores().get("k").unwrap().score, 61.0);
    }

    #[tokio::test]
    async fn test_clear_empties_both_caches() {
        let caches = CacheStore::in_memory(&CacheConfig::default());
        caches.scores().resolve_or_store("k", 61.0, Some("S"));
        caches.clear().await;
        assert!(caches.scores().is_empty());
        assert!(caches.insights().is_empty());
    }
}
