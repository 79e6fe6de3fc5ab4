//! XML payload generation for the tax authority interface.
//!
//! Requires the `xml` feature.

mod builder;
mod document;
mod escape;
mod validate;

pub use builder::*;
pub use document::*;
pub use escape::*;
pub use validate::*;
