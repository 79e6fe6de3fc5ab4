//! Periodic fixed-width report generation for the tax authority.
//!
//! Requires the `sped` feature.

mod layout;
mod report;

pub use layout::*;
pub use report::*;
