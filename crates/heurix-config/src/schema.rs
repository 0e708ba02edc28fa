//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Language model endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Chat completions endpoint of an OpenAI-compatible server.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_top_k")]
    pub top_k: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            model: default_model(),
            temperature: default_temperature(),
            top_k: default_top_k(),
            max_tokens: None,
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:11434/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "gemma3:4b".to_string()
}

fn default_temperature() -> f32 {
    0.4
}

fn default_top_k() -> u32 {
    3
}

/// Score and insights cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Directory holding the persisted store.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_score_key")]
    pub score_key: String,

    #[serde(default = "default_insights_key")]
    pub insights_key: String,

    /// Insights older than this are never served.
    #[serde(default = "default_insights_ttl")]
    pub insights_ttl_seconds: u64,

    /// Quiet period before a pending snapshot is written.
    #[serde(default = "default_flush_debounce")]
    pub flush_debounce_ms: u64,
}

impl CacheConfig {
    pub fn insights_ttl(&self) -> Duration {
        Duration::from_secs(self.insights_ttl_seconds)
    }

    pub fn flush_debounce(&self) -> Duration {
        Duration::from_millis(self.flush_debounce_ms)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            score_key: default_score_key(),
            insights_key: default_insights_key(),
            insights_ttl_seconds: default_insights_ttl(),
            flush_debounce_ms: default_flush_debounce(),
        }
    }
}

/// Default data directory (~/.heurix).
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".heurix"))
        .unwrap_or_else(|| PathBuf::from("/tmp/heurix"))
}

fn default_score_key() -> String {
    "scoreCache.v1".to_string()
}

fn default_insights_key() -> String {
    "insightsCache.v1".to_string()
}

fn default_insights_ttl() -> u64 {
    300
}

fn default_flush_debounce() -> u64 {
    200
}

/// Analysis run configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Completed runs kept for report export.
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Text fields of a result are cut to this many characters.
    #[serde(default = "default_max_field_chars")]
    pub max_field_chars: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            history_capacity: default_history_capacity(),
            max_field_chars: default_max_field_chars(),
        }
    }
}

fn default_history_capacity() -> usize {
    3
}

fn default_max_field_chars() -> usize {
    240
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when RUST_LOG is not set.
    #[serde(default = "default_level")]
    pub level: String,

    /// Also write daily-rotated log files under the data directory.
    #[serde(default = "default_file")]
    pub file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            file: default_file(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_file() -> bool {
    true
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
