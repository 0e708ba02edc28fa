//! # Heurix Stream
//!
//! Turns a model response that is still being written into renderable fields.
//!
//! - [`partial`] - tolerant parser for truncated JSON
//! - [`StreamingJsonExtractor`] - buffer plus per-field snapshot extraction
//! - [`StreamReconciler`] - renders only the fields that changed

pub mod extractor;
pub mod partial;
pub mod reconciler;

pub use extractor::{extract_snapshot, StreamingJsonExtractor};
pub use partial::{parse_partial, Malformed, PartialValue};
pub use reconciler::{Changes, StreamReconciler};
