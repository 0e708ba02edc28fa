//! # Heurix Cache
//!
//! Caches that keep analysis results stable across runs.
//!
//! ## Features
//!
//! - Content signatures that detect page changes
//! - Score cache: a recorded score wins over later candidates for the same signature
//! - Insights cache: TTL-bounded strengths, issues and summary
//! - Debounced, coalesced snapshot persistence to a key-value store

pub mod insights;
pub mod key;
pub mod persist;
pub mod score;
pub mod signature;
pub mod store;

mod cache_store;

pub use cache_store::CacheStore;
pub use insights::{InsightsCache, InsightsCacheEntry, InsightsPayload};
pub use key::cache_key;
pub use persist::DebouncedWriter;
pub use score::{ScoreCache, ScoreCacheEntry};
pub use signature::signature;
pub use store::{FileStore, MemoryStore};
