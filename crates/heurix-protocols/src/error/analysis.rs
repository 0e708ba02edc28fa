//! Analysis run errors. Every variant is surfaced to the user.

use thiserror::Error;

use super::ModelError;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Page context unavailable: {0}")]
    PageContext(String),

    #[error("Model invocation failed: {0}")]
    Model(#[from] ModelError),

    #[error("Could not parse analysis response: {0}")]
    FinalParse(String),
}

impl AnalysisError {
    /// Whether the model session must be torn down after this error.
    pub fn resets_session(&self) -> bool {
        matches!(self, Self::Model(_))
    }
}
