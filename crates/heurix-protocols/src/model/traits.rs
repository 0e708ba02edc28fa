//! Model prompt service trait definitions.

use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

use super::{PromptChunk, SessionParams};
use crate::error::ModelError;

/// Creates model sessions.
#[async_trait]
pub trait ModelPromptService: Send + Sync {
    /// Returns the service ID.
    fn id(&self) -> &str;

    /// Create a new session configured with `params`.
    async fn create_session(
        &self,
        params: &SessionParams,
    ) -> Result<Box<dyn ModelSession>, ModelError>;
}

/// A live model session. Reused across runs until it fails.
#[async_trait]
pub trait ModelSession: Send {
    /// Prompt the model, constraining its output to `schema`.
    async fn prompt_stream(
        &mut self,
        prompt: &str,
        schema: &serde_json::Value,
    ) -> Result<PromptStream, ModelError>;

    /// Release any resources held by the session.
    fn destroy(&mut self) {}
}

/// Stream of prompt chunks.
pub type PromptStream = Pin<Box<dyn Stream<Item = Result<PromptChunk, ModelError>> + Send>>;
