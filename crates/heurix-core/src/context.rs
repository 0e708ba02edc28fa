//! Canonical page context.
//!
//! The metrics object is trimmed to the keys the analysis uses and
//! re-serialized with sorted keys, so the same page always produces the same
//! text and therefore the same signature.

use heurix_cache::{cache_key, signature};
use heurix_protocols::{AnalysisError, PageContext};
use serde_json::{Map, Value};

/// Metric groups forwarded to the model. Everything else (notably the
/// capture `timestamp`) is dropped before signing.
pub const CONTEXT_KEYS: &[&str] = &[
    "altTexts",
    "ariaLabels",
    "buttons",
    "colors",
    "contrast",
    "forms",
    "headings",
    "images",
    "links",
    "readability",
    "textContent",
    "touchTargets",
];

/// A page context ready for signing and prompting.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalContext {
    pub url: String,
    /// Normalized URL used as the cache key.
    pub cache_key: String,
    /// Canonical JSON of the trimmed metrics.
    pub text: String,
    pub signature: String,
}

impl CanonicalContext {
    pub fn from_page(page: &PageContext) -> Result<Self, AnalysisError> {
        let url = page.url.trim();
        if url.is_empty() {
            return Err(AnalysisError::PageContext("page has no URL".to_string()));
        }

        let text = canonical_json(&page.metrics)?;
        Ok(Self {
            url: url.to_string(),
            cache_key: cache_key(url),
            signature: signature(&text),
            text,
        })
    }
}

/// Project `metrics` onto [`CONTEXT_KEYS`] and serialize with sorted keys.
pub fn canonical_json(metrics: &Value) -> Result<String, AnalysisError> {
    let Value::Object(fields) = metrics else {
        return Err(AnalysisError::PageContext(
            "page metrics must be a JSON object".to_string(),
        ));
    };

    let mut projected = Map::new();
    for key in CONTEXT_KEYS {
        if let Some(value) = fields.get(*key) {
            projected.insert((*key).to_string(), sorted(value));
        }
    }

    serde_json::to_string(&Value::Object(projected))
        .map_err(|e| AnalysisError::PageContext(format!("failed to serialize metrics: {e}")))
}

/// Rebuild objects with keys inserted in sorted order, recursively.
fn sorted(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut out = Map::new();
            for key in keys {
                out.insert(key.clone(), sorted(&map[key]));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(sorted).collect()),
        other => other.clone(),
    }
}
