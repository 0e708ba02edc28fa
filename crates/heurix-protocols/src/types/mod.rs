//! Domain types shared across Heurix crates.

mod analysis;
mod context;

pub use analysis::*;
pub use context::*;
