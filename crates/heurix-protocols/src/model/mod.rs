//! Language model protocol definitions.
//!
//! A prompt service hands out sessions; a session streams the model's answer
//! to an analysis prompt as text deltas.

mod response;
mod traits;

pub use response::*;
pub use traits::*;
