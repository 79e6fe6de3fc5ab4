//! # nota
//!
//! Brazilian fiscal document engine covering the full document lifecycle:
//! access keys, CST/CSOSN tax situation codes, ICMS calculation, state
//! transitions, XML payloads, and SPED-style periodic reports.
//!
//! All monetary values use [`rust_decimal::Decimal`] — never floating point.
//! Rounding is always half-up (commercial rounding), as mandated by the
//! tax authority.
//!
//! ## Quick Start
//!
//! ```rust
//! use nota::core::*;
//! use nota::tax::{RateRule, RateTable, TaxpayerRegime};
//! use nota::lifecycle;
//! use rust_decimal_macros::dec;
//!
//! let issuer = Party::new("ACME Ltda", TaxId::parse(TaxIdKind::Cnpj, "11.222.333/0001-81").unwrap())
//!     .region("SP");
//! let recipient = Party::new("Cliente SA", TaxId::parse(TaxIdKind::Cpf, "111.444.777-35").unwrap())
//!     .region("SP");
//!
//! let draft = DraftBuilder::new(issuer, recipient)
//!     .add_line(
//!         LineItemBuilder::new("1", "Consultoria", dec!(10), dec!(100))
//!             .situation(TaxSituationCode::parse("000").unwrap())
//!             .category("services")
//!             .build(),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let mut rates = RateTable::new();
//! rates.add(RateRule::new("SP", "SP", "services", TaxpayerRegime::Normal, dec!(18)));
//!
//! let issuance = lifecycle::KeyIssuance::new(35, 55, 1, 2024, 6);
//! let submitted = lifecycle::submit(draft, &rates, &issuance, 12345678, 1).unwrap();
//! let calc = submitted.status.calculation().unwrap();
//! assert_eq!(calc.totals.tax_total, dec!(180.00));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Identifiers, tax situation codes, document model, tax engine, lifecycle |
//! | `xml` | XML payload generation with escaping and pre-serialization validation |
//! | `sped` | Fixed-width periodic report generation with replacement-chain hashing |
//! | `extract` | Typed field extraction from raw document text |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "core")]
pub mod tax;

#[cfg(feature = "core")]
pub mod lifecycle;

#[cfg(feature = "xml")]
pub mod xml;

#[cfg(feature = "sped")]
pub mod sped;

#[cfg(feature = "extract")]
pub mod extract;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
