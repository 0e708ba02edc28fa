//! OpenAI-compatible streaming provider.

use std::collections::VecDeque;
use std::pin::Pin;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use tracing::{debug, warn};

use heurix_config::ModelConfig;
use heurix_protocols::{
    ModelError, ModelPromptService, ModelResponse, ModelSession, PromptChunk, PromptStream,
    SessionParams,
};

use crate::api::{ApiMessage, ApiRequest, ResponseFormat, StreamChunk};
use crate::sse::{SseDecoder, SseEvent};

const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Creates sessions against a chat completions endpoint.
pub struct OpenAIProvider {
    api_key: Option<String>,
    api_url: String,
    model: String,
    client: reqwest::Client,
}

impl OpenAIProvider {
    pub fn new(model: impl Into<String>) -> Self {
        Self::with_url(model, DEFAULT_API_URL)
    }

    /// Create provider with custom API URL (for OpenAI-compatible APIs).
    pub fn with_url(model: impl Into<String>, api_url: impl Into<String>) -> Self {
        Self {
            api_key: None,
            api_url: api_url.into(),
            model: model.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &ModelConfig) -> Self {
        let provider = Self::with_url(&config.model, &config.base_url);
        match &config.api_key {
            Some(key) if !key.is_empty() => provider.with_api_key(key),
            _ => provider,
        }
    }

    /// Set API key for authentication.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ModelPromptService for OpenAIProvider {
    fn id(&self) -> &str {
        "openai"
    }

    async fn create_session(
        &self,
        params: &SessionParams,
    ) -> Result<Box<dyn ModelSession>, ModelError> {
        if self.model.trim().is_empty() {
            return Err(ModelError::SessionCreation("no model configured".to_string()));
        }
        debug!("Opening session for model '{}' at {}", self.model, self.api_url);
        Ok(Box::new(OpenAISession {
            api_key: self.api_key.clone(),
            api_url: self.api_url.clone(),
            model: self.model.clone(),
            client: self.client.clone(),
            params: params.clone(),
            destroyed: false,
        }))
    }
}

/// A session is stateless on the wire: every prompt carries the system prompt.
pub struct OpenAISession {
    api_key: Option<String>,
    api_url: String,
    model: String,
    client: reqwest::Client,
    params: SessionParams,
    destroyed: bool,
}

impl OpenAISession {
    fn build_request(&self, prompt: &str, schema: &serde_json::Value) -> ApiRequest {
        let response_format = schema
            .is_object()
            .then(|| ResponseFormat::json_schema(schema.clone()));
        ApiRequest {
            model: self.model.clone(),
            messages: vec![
                ApiMessage::system(&self.params.system_prompt),
                ApiMessage::user(prompt),
            ],
            max_tokens: self.params.max_tokens,
            temperature: self.params.temperature,
            top_k: self.params.top_k,
            stream: Some(true),
            response_format,
        }
    }

    async fn send_request(&self, api_request: &ApiRequest) -> Result<reqwest::Response, ModelError> {
        let mut request = self
            .client
            .post(&self.api_url)
            .header("Content-Type", "application/json")
            .json(api_request);
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let response = request
            .send()
            .await
            .map_err(|e| ModelError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(ModelError::ApiError { status, message: text });
        }

        Ok(response)
    }
}

#[async_trait]
impl ModelSession for OpenAISession {
    async fn prompt_stream(
        &mut self,
        prompt: &str,
        schema: &serde_json::Value,
    ) -> Result<PromptStream, ModelError> {
        if self.destroyed {
            return Err(ModelError::Unavailable("session destroyed".to_string()));
        }
        let api_request = self.build_request(prompt, schema);
        let response = self.send_request(&api_request).await?;

        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()));
        Ok(Box::pin(chunk_stream(Box::pin(body))))
    }

    fn destroy(&mut self) {
        self.destroyed = true;
    }
}

type ByteStream = Pin<Box<dyn Stream<Item = reqwest::Result<Vec<u8>>> + Send>>;

struct StreamState {
    body: ByteStream,
    decoder: SseDecoder,
    pending: VecDeque<PromptChunk>,
    aggregate: String,
    finished: bool,
}

impl StreamState {
    fn handle(&mut self, events: Vec<SseEvent>) {
        for event in events {
            if self.finished {
                return;
            }
            match event {
                SseEvent::Done => self.finish(),
                SseEvent::Data(data) => match serde_json::from_str::<StreamChunk>(&data) {
                    Ok(chunk) => {
                        if let Some(content) = chunk.content() {
                            self.aggregate.push_str(content);
                            self.pending.push_back(PromptChunk::delta(content));
                        }
                        if let Some(reason) = chunk.finish_reason() {
                            debug!("Model finished: {}", reason);
                            self.finish();
                        }
                    }
                    Err(e) => warn!("Skipping malformed stream event: {}", e),
                },
            }
        }
    }

    fn finish(&mut self) {
        let text = std::mem::take(&mut self.aggregate);
        self.pending.push_back(PromptChunk::Done(ModelResponse::Text(text)));
        self.finished = true;
    }
}

/// Turn a raw SSE body into prompt chunks, ending with `Done` when the server
/// sends `[DONE]` or a choice reports a finish reason.
fn chunk_stream(body: ByteStream) -> impl Stream<Item = Result<PromptChunk, ModelError>> + Send {
    let state = StreamState {
        body,
        decoder: SseDecoder::new(),
        pending: VecDeque::new(),
        aggregate: String::new(),
        finished: false,
    };

    futures::stream::unfold(state, |mut state| async move {
        loop {
            if let Some(chunk) = state.pending.pop_front() {
                return Some((Ok(chunk), state));
            }
            if state.finished {
                return None;
            }
            match state.body.next().await {
                Some(Ok(bytes)) => {
                    let events = state.decoder.push(&bytes);
                    state.handle(events);
                }
                Some(Err(e)) => {
                    state.finished = true;
                    return Some((Err(ModelError::StreamError(e.to_string())), state));
                }
                None => {
                    let events = state.decoder.finish();
                    state.handle(events);
                    state.finished = true;
                }
            }
        }
    })
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
