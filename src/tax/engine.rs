//! The rules-driven tax calculation engine.
//!
//! Consumes a document's line items plus the injected rate table and
//! produces per-line and aggregate amounts. Aggregates are the exact sum
//! of line-level amounts — never recomputed from a document-level net, so
//! rounding drift cannot accumulate.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::rates::{RateTable, TaxpayerRegime};
use crate::core::{LineItem, NotaError, TaxSituationCode};

/// Round to 2 decimal places, half-up (commercial rounding).
///
/// The authority mandates half-up, never banker's rounding. Away-from-zero
/// is symmetric, so reversal lines round to the exact negation of their
/// originals.
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Per-line tax breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineTaxBreakdown {
    /// Line identifier this breakdown belongs to.
    pub line_id: String,
    /// The line's tax situation code.
    pub situation: TaxSituationCode,
    /// Taxable base after any reduction.
    pub base_amount: Decimal,
    /// Primary rate applied, percent (zero when the line is not taxed).
    pub rate: Decimal,
    /// Primary tax amount.
    pub tax_amount: Decimal,
    /// Base reduction percentage applied, when the code indicated one.
    pub base_reduction: Option<Decimal>,
    /// Secondary levy rate applied, when the code indicated withholding.
    pub surcharge_rate: Option<Decimal>,
    /// Secondary levy amount, computed independently on the unreduced net.
    pub surcharge_amount: Decimal,
    /// Whether the liability is deferred to a later operation.
    pub deferred: bool,
}

/// Document-level totals — exact sums of the line amounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentTotals {
    /// Sum of line net amounts.
    pub net_total: Decimal,
    /// Sum of taxable bases.
    pub base_total: Decimal,
    /// Sum of primary tax amounts.
    pub tax_total: Decimal,
    /// Sum of secondary levy amounts.
    pub surcharge_total: Decimal,
    /// Total levied = tax_total + surcharge_total.
    pub levy_total: Decimal,
}

/// The calculation result frozen onto a document at submission.
///
/// Derived, not persisted independently — recomputed whenever draft line
/// items change, then frozen once the document is submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxCalculationResult {
    pub lines: Vec<LineTaxBreakdown>,
    pub totals: DocumentTotals,
}

/// Calculate per-line and aggregate tax amounts.
///
/// Fails with [`NotaError::NoApplicableRule`] when a taxed line has no
/// matching rule — the engine never silently defaults to zero tax. Each
/// line emits a debug-level audit event (rule matched, rate applied,
/// resulting amounts); the event stream is a fire-and-forget side channel,
/// not part of the return value's contract.
pub fn calculate(
    lines: &[LineItem],
    regime: TaxpayerRegime,
    rates: &RateTable,
) -> Result<TaxCalculationResult, NotaError> {
    let mut breakdowns = Vec::with_capacity(lines.len());
    let mut net_total = Decimal::ZERO;
    let mut base_total = Decimal::ZERO;
    let mut tax_total = Decimal::ZERO;
    let mut surcharge_total = Decimal::ZERO;

    for line in lines {
        let breakdown = calculate_line(line, regime, rates)?;
        net_total += line.net_amount;
        base_total += breakdown.base_amount;
        tax_total += breakdown.tax_amount;
        surcharge_total += breakdown.surcharge_amount;
        breakdowns.push(breakdown);
    }

    Ok(TaxCalculationResult {
        lines: breakdowns,
        totals: DocumentTotals {
            net_total,
            base_total,
            tax_total,
            surcharge_total,
            levy_total: tax_total + surcharge_total,
        },
    })
}

fn calculate_line(
    line: &LineItem,
    regime: TaxpayerRegime,
    rates: &RateTable,
) -> Result<LineTaxBreakdown, NotaError> {
    let code = &line.situation;

    // Exempt, untaxed and deferred lines levy nothing and need no rule.
    // Deferral shifts the liability to a later operation; the breakdown
    // records it so downstream consumers can surface it.
    if !code.is_taxed() && !code.has_withholding() {
        debug!(
            line = %line.id,
            situation = %code,
            deferred = code.is_deferred(),
            "line not taxed, no rule lookup"
        );
        return Ok(LineTaxBreakdown {
            line_id: line.id.clone(),
            situation: code.clone(),
            base_amount: line.net_amount,
            rate: Decimal::ZERO,
            tax_amount: Decimal::ZERO,
            base_reduction: None,
            surcharge_rate: None,
            surcharge_amount: Decimal::ZERO,
            deferred: code.is_deferred(),
        });
    }

    let rule = rates
        .lookup(&line.origin, &line.destination, &line.category, regime)
        .ok_or_else(|| NotaError::NoApplicableRule {
            origin: line.origin.clone(),
            destination: line.destination.clone(),
            category: line.category.clone(),
            regime: regime.name(),
        })?;

    // Base reduction first; the secondary levy below is always computed
    // on the unreduced net, never compounded into the primary base.
    let (base_amount, base_reduction) = if code.is_taxed() && code.has_reduction() {
        let factor = (dec!(100) - rule.base_reduction) / dec!(100);
        (round_half_up(line.net_amount * factor), Some(rule.base_reduction))
    } else {
        (line.net_amount, None)
    };

    let (rate, tax_amount) = if code.is_taxed() {
        (rule.rate, round_half_up(base_amount * rule.rate / dec!(100)))
    } else {
        (Decimal::ZERO, Decimal::ZERO)
    };

    let (surcharge_rate, surcharge_amount) =
        if code.has_withholding() && !rule.surcharge_rate.is_zero() {
            (
                Some(rule.surcharge_rate),
                round_half_up(line.net_amount * rule.surcharge_rate / dec!(100)),
            )
        } else {
            (None, Decimal::ZERO)
        };

    debug!(
        line = %line.id,
        situation = %code,
        origin = %line.origin,
        destination = %line.destination,
        category = %line.category,
        rate = %rate,
        base = %base_amount,
        tax = %tax_amount,
        surcharge = %surcharge_amount,
        "tax rule applied"
    );

    Ok(LineTaxBreakdown {
        line_id: line.id.clone(),
        situation: code.clone(),
        base_amount,
        rate,
        tax_amount,
        base_reduction,
        surcharge_rate,
        surcharge_amount,
        deferred: false,
    })
}
