//! The 44-digit document access key.
//!
//! Layout (positions, left to right):
//!
//! | Field | Digits |
//! |---|---|
//! | region code | 2 |
//! | year + month (AAMM) | 4 |
//! | issuer CNPJ | 14 |
//! | document model | 2 |
//! | series | 3 |
//! | document number | 9 |
//! | emission type | 1 |
//! | numeric salt | 8 |
//! | check digit | 1 |
//!
//! The check digit is modulo-11 over the 43 preceding digits with weights
//! cycling 2–9, so any single-digit corruption is detectable.

use serde::{Deserialize, Serialize};

use super::error::NotaError;
use super::ids::{TaxId, TaxIdKind, compute_check_digit};

/// The component fields of an access key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessKeyParts {
    /// Jurisdiction (state) code, 2 digits.
    pub region_code: u8,
    /// Full issue year (rendered as its last two digits).
    pub year: u16,
    /// Issue month, 1–12.
    pub month: u8,
    /// Issuer company identifier.
    pub issuer: TaxId,
    /// Document model code, 2 digits.
    pub model: u8,
    /// Document series, up to 3 digits.
    pub series: u16,
    /// Sequential document number, 1–999 999 999.
    pub number: u32,
    /// Emission type, 1 digit.
    pub emission_type: u8,
    /// Numeric salt, up to 8 digits.
    pub salt: u32,
}

/// A validated 44-digit document access key.
///
/// Constructed either by [`AccessKey::generate`] (from component fields,
/// computing the check digit) or [`AccessKey::parse`] (from a 44-digit
/// string, verifying it). Both paths share the same check-digit algorithm,
/// so `parse(generate(parts))` always round-trips.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessKey(String);

impl AccessKey {
    pub const LEN: usize = 44;

    /// Generate a key from component fields, computing the check digit.
    pub fn generate(parts: &AccessKeyParts) -> Result<Self, NotaError> {
        if parts.issuer.kind() != TaxIdKind::Cnpj {
            return Err(NotaError::Validation(
                "access key issuer must be a CNPJ".into(),
            ));
        }
        if parts.region_code == 0 || parts.region_code > 99 {
            return Err(NotaError::Validation(format!(
                "region code {} out of range 1–99",
                parts.region_code
            )));
        }
        if parts.month == 0 || parts.month > 12 {
            return Err(NotaError::Validation(format!(
                "month {} out of range 1–12",
                parts.month
            )));
        }
        if parts.model == 0 || parts.model > 99 {
            return Err(NotaError::Validation(format!(
                "document model {} out of range 1–99",
                parts.model
            )));
        }
        if parts.series > 999 {
            return Err(NotaError::Validation(format!(
                "series {} exceeds 3 digits",
                parts.series
            )));
        }
        if parts.number == 0 || parts.number > 999_999_999 {
            return Err(NotaError::Validation(format!(
                "document number {} out of range 1–999999999",
                parts.number
            )));
        }
        if parts.emission_type == 0 || parts.emission_type > 9 {
            return Err(NotaError::Validation(format!(
                "emission type {} out of range 1–9",
                parts.emission_type
            )));
        }
        if parts.salt > 99_999_999 {
            return Err(NotaError::Validation(format!(
                "salt {} exceeds 8 digits",
                parts.salt
            )));
        }

        let body = format!(
            "{:02}{:02}{:02}{}{:02}{:03}{:09}{}{:08}",
            parts.region_code,
            parts.year % 100,
            parts.month,
            parts.issuer.as_str(),
            parts.model,
            parts.series,
            parts.number,
            parts.emission_type,
            parts.salt,
        );
        debug_assert_eq!(body.len(), Self::LEN - 1);

        let digits: Vec<u8> = body.bytes().map(|b| b - b'0').collect();
        let dv = compute_check_digit(&digits, 9);

        Ok(Self(format!("{body}{dv}")))
    }

    /// Parse and validate a 44-digit key, decomposing it into fields.
    ///
    /// Note the parsed `year` carries only two digits of the original;
    /// it is re-expanded into the 2000s.
    pub fn parse(s: &str) -> Result<(Self, AccessKeyParts), NotaError> {
        if s.len() != Self::LEN || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(NotaError::InvalidLength {
                kind: "access key",
                expected: Self::LEN,
                actual: s.chars().filter(|c| c.is_ascii_digit()).count(),
            });
        }

        let digits: Vec<u8> = s.bytes().map(|b| b - b'0').collect();
        let expected = compute_check_digit(&digits[..Self::LEN - 1], 9);
        if digits[Self::LEN - 1] != expected {
            return Err(NotaError::InvalidCheckDigit {
                kind: "access key",
                value: s.to_string(),
            });
        }

        let num = |range: std::ops::Range<usize>| -> u32 {
            s[range].parse().unwrap_or(0)
        };

        let issuer = TaxId::parse(TaxIdKind::Cnpj, &s[6..20])?;

        let parts = AccessKeyParts {
            region_code: num(0..2) as u8,
            year: 2000 + num(2..4) as u16,
            month: num(4..6) as u8,
            issuer,
            model: num(20..22) as u8,
            series: num(22..25) as u16,
            number: num(25..34),
            emission_type: num(34..35) as u8,
            salt: num(35..43),
        };

        if parts.month == 0 || parts.month > 12 {
            return Err(NotaError::Validation(format!(
                "access key month {} out of range 1–12",
                parts.month
            )));
        }

        Ok((Self(s.to_string()), parts))
    }

    /// The 44-digit canonical representation (storage and transmission).
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Display-only variant: digit blocks of 4 separated by single spaces.
    /// Never used for storage or transmission.
    pub fn formatted(&self) -> String {
        let mut out = String::with_capacity(Self::LEN + 10);
        for (i, c) in self.0.chars().enumerate() {
            if i > 0 && i % 4 == 0 {
                out.push(' ');
            }
            out.push(c);
        }
        out
    }
}

impl std::fmt::Display for AccessKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts() -> AccessKeyParts {
        AccessKeyParts {
            region_code: 35,
            year: 2024,
            month: 6,
            issuer: TaxId::parse(TaxIdKind::Cnpj, "11222333000181").unwrap(),
            model: 55,
            series: 1,
            number: 123,
            emission_type: 1,
            salt: 87654321,
        }
    }

    #[test]
    fn generate_then_parse_round_trips() {
        let key = AccessKey::generate(&parts()).unwrap();
        assert_eq!(key.as_str().len(), 44);
        let (reparsed, fields) = AccessKey::parse(key.as_str()).unwrap();
        assert_eq!(reparsed, key);
        assert_eq!(fields, parts());
    }

    #[test]
    fn single_digit_corruption_detected() {
        let key = AccessKey::generate(&parts()).unwrap();
        for pos in 0..AccessKey::LEN {
            let mut bytes = key.as_str().as_bytes().to_vec();
            bytes[pos] = if bytes[pos] == b'9' {
                b'0'
            } else {
                bytes[pos] + 1
            };
            let corrupted = String::from_utf8(bytes).unwrap();
            assert!(
                AccessKey::parse(&corrupted).is_err(),
                "corruption at position {pos} went undetected"
            );
        }
    }

    #[test]
    fn rejects_wrong_length() {
        let err = AccessKey::parse("123").unwrap_err();
        assert!(matches!(err, NotaError::InvalidLength { .. }));
    }

    #[test]
    fn rejects_invalid_month() {
        let mut p = parts();
        p.month = 13;
        assert!(AccessKey::generate(&p).is_err());
    }

    #[test]
    fn formatted_groups_of_four() {
        let key = AccessKey::generate(&parts()).unwrap();
        let formatted = key.formatted();
        assert_eq!(formatted.split(' ').count(), 11);
        assert!(formatted.split(' ').all(|g| g.len() == 4));
        assert_eq!(formatted.replace(' ', ""), key.as_str());
    }
}
