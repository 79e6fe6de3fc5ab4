//! Taxpayer identifiers and the modulo-11 check-digit core.
//!
//! All fiscal identifiers in this crate (CNPJ, CPF, state registrations,
//! access keys) share one weighted-sum algorithm: descending weights are
//! assigned right-to-left starting at 2, wrapping back to 2 after the
//! kind's maximum weight, and each check digit is `11 - (sum mod 11)`,
//! with results of 10 or 11 mapped to 0.

use serde::{Deserialize, Serialize};

use super::error::NotaError;

/// Compute a single modulo-11 check digit over a digit slice.
///
/// Weights run right-to-left: 2, 3, ..., `max_weight`, then wrap to 2.
pub fn compute_check_digit(digits: &[u8], max_weight: u32) -> u8 {
    let mut weight = 2u32;
    let mut sum = 0u32;
    for &d in digits.iter().rev() {
        sum += d as u32 * weight;
        weight += 1;
        if weight > max_weight {
            weight = 2;
        }
    }
    let dv = 11 - (sum % 11);
    if dv >= 10 { 0 } else { dv as u8 }
}

/// Parse a string into digits, ignoring common formatting punctuation
/// (`.`, `/`, `-` and spaces). Any other character is an error.
pub(crate) fn digit_string(s: &str) -> Result<Vec<u8>, NotaError> {
    let mut digits = Vec::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '0'..='9' => digits.push(c as u8 - b'0'),
            '.' | '/' | '-' | ' ' => {}
            other => {
                return Err(NotaError::Validation(format!(
                    "unexpected character '{other}' in identifier '{s}'"
                )));
            }
        }
    }
    Ok(digits)
}

pub(crate) fn all_identical(digits: &[u8]) -> bool {
    digits.windows(2).all(|w| w[0] == w[1])
}

/// Kind of taxpayer identifier, determining length and check-digit scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaxIdKind {
    /// Company registration number — 14 digits, two check digits,
    /// weights cycling 2–9.
    Cnpj,
    /// Individual registration number — 11 digits, two check digits,
    /// weights 2–11.
    Cpf,
    /// State registration number — 8 digits, one check digit,
    /// weights 2–9.
    StateRegistration,
}

impl TaxIdKind {
    /// Total digit count including check digits.
    pub fn len(&self) -> usize {
        match self {
            Self::Cnpj => 14,
            Self::Cpf => 11,
            Self::StateRegistration => 8,
        }
    }

    /// Number of trailing check digits.
    pub fn check_digits(&self) -> usize {
        match self {
            Self::Cnpj | Self::Cpf => 2,
            Self::StateRegistration => 1,
        }
    }

    fn max_weight(&self) -> u32 {
        match self {
            Self::Cnpj | Self::StateRegistration => 9,
            Self::Cpf => 11,
        }
    }

    pub(crate) fn name(&self) -> &'static str {
        match self {
            Self::Cnpj => "CNPJ",
            Self::Cpf => "CPF",
            Self::StateRegistration => "state registration",
        }
    }
}

/// An immutable, validated taxpayer identifier.
///
/// Constructed only through [`TaxId::parse`]; the wrapped digit string is
/// guaranteed to have the exact length for its kind, correct check digits,
/// and not to be an all-identical-digit pattern (those pass the modulo-11
/// arithmetic but are invalid in this domain).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaxId {
    kind: TaxIdKind,
    digits: String,
}

impl TaxId {
    /// Validating factory. Accepts formatted input ("11.222.333/0001-81")
    /// or a bare digit string.
    pub fn parse(kind: TaxIdKind, s: &str) -> Result<Self, NotaError> {
        let digits = digit_string(s)?;

        if digits.len() != kind.len() {
            return Err(NotaError::InvalidLength {
                kind: kind.name(),
                expected: kind.len(),
                actual: digits.len(),
            });
        }

        if all_identical(&digits) {
            return Err(NotaError::InvalidCheckDigit {
                kind: kind.name(),
                value: render(&digits),
            });
        }

        let body_len = kind.len() - kind.check_digits();
        for i in 0..kind.check_digits() {
            let expected = compute_check_digit(&digits[..body_len + i], kind.max_weight());
            if digits[body_len + i] != expected {
                return Err(NotaError::InvalidCheckDigit {
                    kind: kind.name(),
                    value: render(&digits),
                });
            }
        }

        Ok(Self {
            kind,
            digits: render(&digits),
        })
    }

    /// Check whether a string is a valid identifier of the given kind.
    pub fn is_valid(kind: TaxIdKind, s: &str) -> bool {
        Self::parse(kind, s).is_ok()
    }

    /// The identifier kind.
    pub fn kind(&self) -> TaxIdKind {
        self.kind
    }

    /// The canonical (unformatted) digit string.
    pub fn as_str(&self) -> &str {
        &self.digits
    }
}

impl std::fmt::Display for TaxId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.digits)
    }
}

fn render(digits: &[u8]) -> String {
    digits.iter().map(|d| (d + b'0') as char).collect()
}
