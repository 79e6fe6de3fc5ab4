//! Tax calculation: jurisdiction rate tables and the per-line engine.

mod engine;
mod rates;

pub use engine::*;
pub use rates::*;
