//! Document lifecycle: named state transitions and the engine facade.

mod engine;
mod transitions;

pub use engine::*;
pub use transitions::*;
