//! Page context types.

use serde::{Deserialize, Serialize};

/// Metrics scraped from a page, as delivered by the page context provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageContext {
    /// URL of the analysed page.
    pub url: String,

    /// Raw metrics object (headings, buttons, forms, images, ...).
    #[serde(default)]
    pub metrics: serde_json::Value,
}

impl PageContext {
    pub fn new(url: impl Into<String>, metrics: serde_json::Value) -> Self {
        Self {
            url: url.into(),
            metrics,
        }
    }
}
