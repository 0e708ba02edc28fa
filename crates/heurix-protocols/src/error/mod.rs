//! Error types for the Heurix protocol layer.

mod analysis;
mod model;
mod store;

pub use analysis::*;
pub use model::*;
pub use store::*;
