//! OpenAI-compatible model provider for Heurix.
//!
//! Talks to any server exposing the chat completions API, including local
//! runtimes such as Ollama or llama.cpp, and streams the answer as
//! [`PromptChunk`](heurix_protocols::PromptChunk)s.

mod api;
mod provider;
mod sse;

pub use provider::{OpenAIProvider, OpenAISession};
