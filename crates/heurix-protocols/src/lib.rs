//! # Heurix Protocols
//!
//! Core protocol definitions for Heurix.
//! Contains domain types and the interfaces of external collaborators - no implementations.
//!
//! ## Core Traits
//!
//! - [`ModelPromptService`] - Creates model sessions that stream analysis text
//! - [`KeyValueStore`] - Durable blob storage behind the caches
//! - [`PageContextProvider`] - Supplies scraped page metrics
//! - [`RenderSink`] - Receives partial and final results for display

pub mod error;
pub mod model;
pub mod page;
pub mod render;
pub mod store;
pub mod types;

// Re-export core traits
pub use model::{
    ModelPromptService, ModelResponse, ModelSession, PromptChunk, PromptStream, SessionParams,
};
pub use page::PageContextProvider;
pub use render::RenderSink;
pub use store::KeyValueStore;
pub use error::{AnalysisError, ModelError, StoreError};
pub use types::*;
