//! Tax situation codes (CST and CSOSN).
//!
//! A 3-character CST is an origin digit followed by a 2-digit treatment;
//! a 4-character CSOSN is an origin digit followed by a 3-digit treatment
//! used by taxpayers under the simplified regime. Both decompose into a
//! closed (origin, treatment) pair — unknown combinations are rejected at
//! construction, never at use.

use serde::{Deserialize, Serialize};

use super::error::NotaError;

/// Merchandise origin — the first digit of a CST/CSOSN code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Origin {
    /// 0 — Domestic.
    Domestic,
    /// 1 — Imported, direct import.
    ImportedDirect,
    /// 2 — Imported, acquired on the domestic market.
    ImportedDomesticMarket,
    /// 3 — Domestic, imported content above 40%.
    DomesticImportShareOver40,
    /// 4 — Domestic, produced under basic production processes.
    DomesticBasicProcess,
    /// 5 — Domestic, imported content of 40% or below.
    DomesticImportShareUnder40,
    /// 6 — Imported, no domestic equivalent.
    ImportedNoEquivalent,
    /// 7 — Imported with no domestic equivalent, acquired domestically.
    ImportedNoEquivalentDomesticMarket,
    /// 8 — Domestic, imported content above 70%.
    DomesticImportShareOver70,
}

impl Origin {
    /// The code digit.
    pub fn digit(&self) -> char {
        match self {
            Self::Domestic => '0',
            Self::ImportedDirect => '1',
            Self::ImportedDomesticMarket => '2',
            Self::DomesticImportShareOver40 => '3',
            Self::DomesticBasicProcess => '4',
            Self::DomesticImportShareUnder40 => '5',
            Self::ImportedNoEquivalent => '6',
            Self::ImportedNoEquivalentDomesticMarket => '7',
            Self::DomesticImportShareOver70 => '8',
        }
    }

    /// Parse from the code digit.
    pub fn from_digit(c: char) -> Option<Self> {
        match c {
            '0' => Some(Self::Domestic),
            '1' => Some(Self::ImportedDirect),
            '2' => Some(Self::ImportedDomesticMarket),
            '3' => Some(Self::DomesticImportShareOver40),
            '4' => Some(Self::DomesticBasicProcess),
            '5' => Some(Self::DomesticImportShareUnder40),
            '6' => Some(Self::ImportedNoEquivalent),
            '7' => Some(Self::ImportedNoEquivalentDomesticMarket),
            '8' => Some(Self::DomesticImportShareOver70),
            _ => None,
        }
    }

    /// Whether the merchandise is of foreign provenance.
    pub fn is_imported(&self) -> bool {
        matches!(
            self,
            Self::ImportedDirect
                | Self::ImportedDomesticMarket
                | Self::ImportedNoEquivalent
                | Self::ImportedNoEquivalentDomesticMarket
        )
    }
}

/// Taxation treatment — the trailing digits of a CST (2) or CSOSN (3) code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Treatment {
    /// 00 — Fully taxed.
    FullyTaxed,
    /// 10 — Taxed, with withholding on subsequent operations.
    TaxedWithWithholding,
    /// 20 — Taxed on a reduced base.
    ReducedBase,
    /// 30 — Exempt, with withholding on subsequent operations.
    ExemptWithWithholding,
    /// 40 — Exempt.
    Exempt,
    /// 41 — Not taxed.
    NotTaxed,
    /// 50 — Suspended.
    Suspended,
    /// 51 — Deferred.
    Deferred,
    /// 60 — Tax previously charged via withholding.
    WithholdingAlreadyCharged,
    /// 70 — Reduced base, with withholding.
    ReducedBaseWithWithholding,
    /// 90 — Other taxed operations.
    Other,
    /// 101 — Simplified regime, taxed with credit entitlement.
    SimplesWithCredit,
    /// 102 — Simplified regime, taxed without credit entitlement.
    SimplesWithoutCredit,
    /// 103 — Simplified regime, exempt within the revenue band.
    SimplesExempt,
    /// 201 — Simplified regime, taxed with credit and withholding.
    SimplesWithCreditWithholding,
    /// 202 — Simplified regime, taxed with withholding.
    SimplesWithholding,
    /// 203 — Simplified regime, exempt with withholding.
    SimplesExemptWithholding,
    /// 300 — Simplified regime, immune.
    SimplesImmune,
    /// 400 — Simplified regime, not taxed.
    SimplesNotTaxed,
    /// 500 — Simplified regime, withholding previously charged.
    SimplesWithholdingCharged,
    /// 900 — Simplified regime, other.
    SimplesOther,
}

impl Treatment {
    /// The treatment digits ("00".."90" for CST, "101".."900" for CSOSN).
    pub fn code(&self) -> &'static str {
        match self {
            Self::FullyTaxed => "00",
            Self::TaxedWithWithholding => "10",
            Self::ReducedBase => "20",
            Self::ExemptWithWithholding => "30",
            Self::Exempt => "40",
            Self::NotTaxed => "41",
            Self::Suspended => "50",
            Self::Deferred => "51",
            Self::WithholdingAlreadyCharged => "60",
            Self::ReducedBaseWithWithholding => "70",
            Self::Other => "90",
            Self::SimplesWithCredit => "101",
            Self::SimplesWithoutCredit => "102",
            Self::SimplesExempt => "103",
            Self::SimplesWithCreditWithholding => "201",
            Self::SimplesWithholding => "202",
            Self::SimplesExemptWithholding => "203",
            Self::SimplesImmune => "300",
            Self::SimplesNotTaxed => "400",
            Self::SimplesWithholdingCharged => "500",
            Self::SimplesOther => "900",
        }
    }

    /// Parse from the treatment digits.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "00" => Some(Self::FullyTaxed),
            "10" => Some(Self::TaxedWithWithholding),
            "20" => Some(Self::ReducedBase),
            "30" => Some(Self::ExemptWithWithholding),
            "40" => Some(Self::Exempt),
            "41" => Some(Self::NotTaxed),
            "50" => Some(Self::Suspended),
            "51" => Some(Self::Deferred),
            "60" => Some(Self::WithholdingAlreadyCharged),
            "70" => Some(Self::ReducedBaseWithWithholding),
            "90" => Some(Self::Other),
            "101" => Some(Self::SimplesWithCredit),
            "102" => Some(Self::SimplesWithoutCredit),
            "103" => Some(Self::SimplesExempt),
            "201" => Some(Self::SimplesWithCreditWithholding),
            "202" => Some(Self::SimplesWithholding),
            "203" => Some(Self::SimplesExemptWithholding),
            "300" => Some(Self::SimplesImmune),
            "400" => Some(Self::SimplesNotTaxed),
            "500" => Some(Self::SimplesWithholdingCharged),
            "900" => Some(Self::SimplesOther),
            _ => None,
        }
    }
}

/// A validated tax situation code with its derived predicates.
///
/// The predicates are computed once at construction from static lookup
/// tables — never recomputed per use. Equality is value-based: two codes
/// with the same string compare equal (the derived fields are a pure
/// function of the string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaxSituationCode {
    code: String,
    origin: Origin,
    treatment: Treatment,
    is_taxed: bool,
    is_exempt: bool,
    has_withholding: bool,
    has_reduction: bool,
    is_deferred: bool,
}

impl TaxSituationCode {
    /// Validating factory. Accepts a 3-character CST or 4-character CSOSN.
    pub fn parse(code: &str) -> Result<Self, NotaError> {
        if !code.is_ascii() || (code.len() != 3 && code.len() != 4) {
            return Err(NotaError::Validation(format!(
                "tax situation code '{code}' must be 3 (CST) or 4 (CSOSN) characters"
            )));
        }

        let mut chars = code.chars();
        let origin_char = chars.next().unwrap_or(' ');
        let origin = Origin::from_digit(origin_char).ok_or_else(|| {
            NotaError::Validation(format!(
                "unknown origin digit '{origin_char}' in tax situation code '{code}'"
            ))
        })?;

        let treatment_code = &code[1..];
        let treatment = Treatment::from_code(treatment_code).ok_or_else(|| {
            NotaError::Validation(format!(
                "unknown treatment '{treatment_code}' in tax situation code '{code}'"
            ))
        })?;

        use Treatment::*;
        let is_taxed = matches!(
            treatment,
            FullyTaxed
                | TaxedWithWithholding
                | ReducedBase
                | ReducedBaseWithWithholding
                | Other
                | SimplesWithCredit
                | SimplesWithoutCredit
                | SimplesWithCreditWithholding
                | SimplesWithholding
                | SimplesOther
        );
        let is_exempt = matches!(
            treatment,
            ExemptWithWithholding
                | Exempt
                | NotTaxed
                | Suspended
                | SimplesExempt
                | SimplesExemptWithholding
                | SimplesImmune
                | SimplesNotTaxed
        );
        let has_withholding = matches!(
            treatment,
            TaxedWithWithholding
                | ExemptWithWithholding
                | WithholdingAlreadyCharged
                | ReducedBaseWithWithholding
                | SimplesWithCreditWithholding
                | SimplesWithholding
                | SimplesExemptWithholding
                | SimplesWithholdingCharged
        );
        let has_reduction = matches!(treatment, ReducedBase | ReducedBaseWithWithholding);
        let is_deferred = matches!(treatment, Deferred);

        Ok(Self {
            code: code.to_string(),
            origin,
            treatment,
            is_taxed,
            is_exempt,
            has_withholding,
            has_reduction,
            is_deferred,
        })
    }

    /// The raw code string.
    pub fn as_str(&self) -> &str {
        &self.code
    }

    /// Merchandise origin.
    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Taxation treatment.
    pub fn treatment(&self) -> Treatment {
        self.treatment
    }

    /// Whether the primary tax applies to this line.
    pub fn is_taxed(&self) -> bool {
        self.is_taxed
    }

    /// Whether the line is exempt, immune, suspended or untaxed.
    pub fn is_exempt(&self) -> bool {
        self.is_exempt
    }

    /// Whether a secondary withholding regime applies.
    pub fn has_withholding(&self) -> bool {
        self.has_withholding
    }

    /// Whether the taxable base is reduced.
    pub fn has_reduction(&self) -> bool {
        self.has_reduction
    }

    /// Whether the tax liability is deferred to a later operation.
    pub fn is_deferred(&self) -> bool {
        self.is_deferred
    }

    /// True for 4-character codes used by the simplified regime.
    pub fn is_simplified_regime(&self) -> bool {
        self.code.len() == 4
    }
}

impl std::fmt::Display for TaxSituationCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fully_taxed_cst() {
        let code = TaxSituationCode::parse("000").unwrap();
        assert_eq!(code.origin(), Origin::Domestic);
        assert_eq!(code.treatment(), Treatment::FullyTaxed);
        assert!(code.is_taxed());
        assert!(!code.is_exempt());
        assert!(!code.has_withholding());
        assert!(!code.has_reduction());
        assert!(!code.is_deferred());
    }

    #[test]
    fn reduced_base_with_withholding() {
        let code = TaxSituationCode::parse("170").unwrap();
        assert_eq!(code.origin(), Origin::ImportedDirect);
        assert!(code.is_taxed());
        assert!(code.has_reduction());
        assert!(code.has_withholding());
    }

    #[test]
    fn exempt_cst() {
        let code = TaxSituationCode::parse("040").unwrap();
        assert!(code.is_exempt());
        assert!(!code.is_taxed());
    }

    #[test]
    fn deferred_cst() {
        let code = TaxSituationCode::parse("051").unwrap();
        assert!(code.is_deferred());
        assert!(!code.is_taxed());
        assert!(!code.is_exempt());
    }

    #[test]
    fn simplified_regime_code() {
        let code = TaxSituationCode::parse("0102").unwrap();
        assert!(code.is_simplified_regime());
        assert!(code.is_taxed());
        assert!(!code.has_withholding());

        let st = TaxSituationCode::parse("0201").unwrap();
        assert!(st.has_withholding());
    }

    #[test]
    fn unknown_combinations_rejected_at_construction() {
        assert!(TaxSituationCode::parse("033").is_err()); // unknown treatment 33
        assert!(TaxSituationCode::parse("0105").is_err()); // unknown treatment 105
        assert!(TaxSituationCode::parse("090").is_ok()); // origin 0, other taxed
    }

    #[test]
    fn unknown_origin_rejected() {
        assert!(TaxSituationCode::parse("900").is_err());
        assert!(TaxSituationCode::parse("A00").is_err());
    }

    #[test]
    fn wrong_length_rejected() {
        assert!(TaxSituationCode::parse("00").is_err());
        assert!(TaxSituationCode::parse("00000").is_err());
    }

    #[test]
    fn equality_is_value_based() {
        let a = TaxSituationCode::parse("020").unwrap();
        let b = TaxSituationCode::parse("020").unwrap();
        assert_eq!(a, b);
    }
}
