//! Core fiscal types: identifiers, access keys, tax situation codes,
//! the document aggregate and its builders.
//!
//! These are the zero-dependency foundation of the engine; the tax engine,
//! lifecycle and serializers all build on the value objects defined here.

mod access_key;
mod builder;
mod cst;
mod error;
mod ids;
mod numbering;
mod types;

pub use access_key::*;
pub use builder::*;
pub use cst::*;
pub use error::*;
pub use ids::*;
pub use numbering::*;
pub use types::*;
