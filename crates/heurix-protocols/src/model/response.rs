//! Prompt parameters and streamed response types.

use serde::{Deserialize, Serialize};

use crate::types::AnalysisResult;

/// Parameters used when creating a session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionParams {
    /// System instructions sent ahead of every prompt.
    pub system_prompt: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl SessionParams {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Final form of a model answer, decided once by the adapter.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelResponse {
    /// Raw text still to be parsed as JSON.
    Text(String),

    /// The adapter already produced a structured result.
    Structured(AnalysisResult),
}

/// A chunk in a streaming prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptChunk {
    /// Text appended to the response.
    Delta(String),

    /// The aggregate answer. Optional: a stream may simply end.
    Done(ModelResponse),
}

impl PromptChunk {
    pub fn delta(text: impl Into<String>) -> Self {
        Self::Delta(text.into())
    }
}
