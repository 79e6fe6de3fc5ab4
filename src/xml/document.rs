//! Full document payload serialization.
//!
//! Groups are emitted bottom-up with [`super::builder`]: per-line product
//! and tax groups, then party groups, totals, and the protocol group when
//! the authority has spoken.

use crate::core::{Document, DocumentStatus, LineItem, NotaError, Party};
use crate::tax::{LineTaxBreakdown, TaxCalculationResult};

use super::builder::{build_group, format_decimal, wrap_group_with_attrs};
use super::validate::validate_for_xml;

/// Serialize a submitted or authorized document to its XML payload.
///
/// Runs [`validate_for_xml`] first and refuses to emit anything for
/// invalid input — the operation fails whole rather than producing a
/// partially-computed payload.
pub fn document_xml(document: &Document) -> Result<String, NotaError> {
    let errors = validate_for_xml(document);
    if !errors.is_empty() {
        return Err(NotaError::Validation(format!(
            "document is not serializable ({} error(s); first: {})",
            errors.len(),
            errors[0]
        )));
    }

    let key = document
        .status
        .key()
        .ok_or_else(|| NotaError::Xml("document has no access key".into()))?;
    let calculation = document
        .status
        .calculation()
        .ok_or_else(|| NotaError::Xml("document has no frozen calculation".into()))?;

    let mut children = String::new();

    children.push_str(&build_group(
        "identification",
        &[
            ("key", key.as_str()),
            ("issuedAt", &document.issued_at.to_rfc3339()),
        ],
    ));

    children.push_str(&party_group("issuer", &document.issuer));
    children.push_str(&party_group("recipient", &document.recipient));

    if let Some(reversal) = &document.reversal {
        children.push_str(&build_group(
            "reversalOf",
            &[
                ("key", reversal.of.as_str()),
                ("reason", &reversal.reason),
            ],
        ));
    }

    for (line, breakdown) in document.lines.iter().zip(&calculation.lines) {
        children.push_str(&line_group(line, breakdown));
    }

    children.push_str(&totals_group(calculation));

    match &document.status {
        DocumentStatus::Authorized { protocol, .. } => {
            children.push_str(&build_group(
                "protocol",
                &[
                    ("number", &protocol.number),
                    ("date", &protocol.date.to_rfc3339()),
                ],
            ));
        }
        DocumentStatus::Cancelled {
            protocol,
            cancellation,
            ..
        } => {
            children.push_str(&build_group(
                "protocol",
                &[
                    ("number", &protocol.number),
                    ("date", &protocol.date.to_rfc3339()),
                ],
            ));
            children.push_str(&build_group(
                "cancellation",
                &[
                    ("reason", &cancellation.reason),
                    ("protocolNumber", &cancellation.protocol_number),
                    ("date", &cancellation.cancelled_at.to_rfc3339()),
                ],
            ));
        }
        _ => {}
    }

    Ok(wrap_group_with_attrs(
        "fiscalDocument",
        &[("version", "1.0")],
        &children,
    ))
}

fn party_group(tag: &str, party: &Party) -> String {
    build_group(
        tag,
        &[
            ("name", &party.name),
            ("taxId", party.tax_id.as_str()),
            (
                "stateRegistration",
                party
                    .state_registration
                    .as_ref()
                    .map(|id| id.as_str())
                    .unwrap_or(""),
            ),
            ("region", &party.region),
            (
                "municipality",
                party.municipality.as_deref().unwrap_or(""),
            ),
        ],
    )
}

fn line_group(line: &LineItem, breakdown: &LineTaxBreakdown) -> String {
    let product = build_group(
        "product",
        &[
            ("description", &line.description),
            ("quantity", &format_decimal(line.quantity)),
            ("unitPrice", &format_decimal(line.unit_price)),
            ("netAmount", &format_decimal(line.net_amount)),
        ],
    );
    let tax = build_group(
        "tax",
        &[
            ("situation", line.situation.as_str()),
            ("base", &format_decimal(breakdown.base_amount)),
            ("rate", &format_decimal(breakdown.rate)),
            ("amount", &format_decimal(breakdown.tax_amount)),
            (
                "surcharge",
                &if breakdown.surcharge_amount.is_zero() {
                    String::new()
                } else {
                    format_decimal(breakdown.surcharge_amount)
                },
            ),
        ],
    );
    wrap_group_with_attrs("line", &[("number", &line.id)], &format!("{product}{tax}"))
}

fn totals_group(calculation: &TaxCalculationResult) -> String {
    let t = &calculation.totals;
    build_group(
        "totals",
        &[
            ("net", &format_decimal(t.net_total)),
            ("base", &format_decimal(t.base_total)),
            ("tax", &format_decimal(t.tax_total)),
            ("surcharge", &format_decimal(t.surcharge_total)),
            ("levy", &format_decimal(t.levy_total)),
        ],
    )
}
