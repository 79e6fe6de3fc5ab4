use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Taxpayer regime, part of the rate lookup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaxpayerRegime {
    /// Standard regime (full CST codes).
    Normal,
    /// Simplified regime (CSOSN codes).
    Simplified,
}

impl TaxpayerRegime {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Simplified => "simplified",
        }
    }
}

/// A single jurisdiction rate rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateRule {
    /// Origin jurisdiction (state code).
    pub origin: String,
    /// Destination jurisdiction (state code).
    pub destination: String,
    /// Item category this rule applies to.
    pub category: String,
    /// Taxpayer regime this rule applies to.
    pub regime: TaxpayerRegime,
    /// Primary tax rate, percent.
    pub rate: Decimal,
    /// Base reduction, percent. Applied only when the line's tax
    /// situation code indicates a reduced base.
    pub base_reduction: Decimal,
    /// Secondary levy (surcharge fund) rate, percent. Applied only when
    /// the line's code indicates withholding, independently of the
    /// primary tax.
    pub surcharge_rate: Decimal,
}

impl RateRule {
    pub fn new(
        origin: impl Into<String>,
        destination: impl Into<String>,
        category: impl Into<String>,
        regime: TaxpayerRegime,
        rate: Decimal,
    ) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            category: category.into(),
            regime,
            rate,
            base_reduction: Decimal::ZERO,
            surcharge_rate: Decimal::ZERO,
        }
    }

    /// Set the base reduction percentage.
    pub fn with_base_reduction(mut self, percent: Decimal) -> Self {
        self.base_reduction = percent;
        self
    }

    /// Set the secondary levy rate.
    pub fn with_surcharge(mut self, percent: Decimal) -> Self {
        self.surcharge_rate = percent;
        self
    }
}

type RuleKey = (String, String, String, TaxpayerRegime);

/// The jurisdiction rate table, keyed by (origin, destination, category,
/// regime).
///
/// Always passed explicitly to the calculation engine — never a
/// process-wide singleton — so tests can inject fixture rule sets without
/// global mutation. Jurisdiction coverage is data, not logic: callers load
/// whatever rules their operation requires.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RateTable {
    rules: HashMap<RuleKey, RateRule>,
}

impl RateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a rule, replacing any existing rule for the same key.
    pub fn add(&mut self, rule: RateRule) {
        let key = (
            rule.origin.clone(),
            rule.destination.clone(),
            rule.category.clone(),
            rule.regime,
        );
        self.rules.insert(key, rule);
    }

    /// Look up the rule for a jurisdiction/category/regime combination.
    pub fn lookup(
        &self,
        origin: &str,
        destination: &str,
        category: &str,
        regime: TaxpayerRegime,
    ) -> Option<&RateRule> {
        self.rules.get(&(
            origin.to_string(),
            destination.to_string(),
            category.to_string(),
            regime,
        ))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
