//! Named lifecycle transitions.
//!
//! Transitions are one-directional: `DRAFT → SUBMITTED → AUTHORIZED →
//! CANCELLED`, with the alternate `SUBMITTED → REJECTED` branch. Each
//! operation consumes a guard-checked document and returns a **new**
//! snapshot — documents are never mutated in place, so a failed transition
//! leaves the original untouched. The only way "back" is [`reverse`],
//! which creates a new document referencing the original.

use chrono::{DateTime, Datelike, Utc};
use tracing::info;

use crate::core::{
    AccessKey, AccessKeyParts, Cancellation, Document, DocumentStatus, DraftBuilder, NotaError,
    Protocol, TaxIdKind,
};
use crate::tax::{RateTable, TaxpayerRegime, calculate};

/// Fixed key-generation parameters for an issuing context.
#[derive(Debug, Clone)]
pub struct KeyIssuance {
    /// Jurisdiction (state) code for the key.
    pub region_code: u8,
    /// Document model code.
    pub model: u8,
    /// Document series.
    pub series: u16,
    /// Issue year.
    pub year: u16,
    /// Issue month.
    pub month: u8,
    /// Emission type digit. Defaults to 1 (normal emission).
    pub emission_type: u8,
}

impl KeyIssuance {
    pub fn new(region_code: u8, model: u8, series: u16, year: u16, month: u8) -> Self {
        Self {
            region_code,
            model,
            series,
            year,
            month,
            emission_type: 1,
        }
    }

    pub fn emission_type(mut self, t: u8) -> Self {
        self.emission_type = t;
        self
    }
}

/// Determine the taxpayer regime from the line situation codes.
///
/// CST (3-character) and CSOSN (4-character) codes must not be mixed
/// within one document.
pub fn document_regime(document: &Document) -> Result<TaxpayerRegime, NotaError> {
    let mut simplified = 0usize;
    for line in &document.lines {
        if line.situation.is_simplified_regime() {
            simplified += 1;
        }
    }
    if simplified == 0 {
        Ok(TaxpayerRegime::Normal)
    } else if simplified == document.lines.len() {
        Ok(TaxpayerRegime::Simplified)
    } else {
        Err(NotaError::Validation(
            "document mixes CST and CSOSN situation codes".into(),
        ))
    }
}

/// Submit a draft: run the tax engine, freeze its result, assign the
/// access key, and move to SUBMITTED.
///
/// Allowed only from DRAFT and requires at least one line item. Calling
/// it on an already-submitted document fails with `InvalidTransition`
/// rather than re-submitting.
pub fn submit(
    document: Document,
    rates: &RateTable,
    issuance: &KeyIssuance,
    number: u32,
    salt: u32,
) -> Result<Document, NotaError> {
    if !matches!(document.status, DocumentStatus::Draft) {
        return Err(NotaError::InvalidTransition {
            from: document.status.name(),
            attempted: "submit",
        });
    }
    if document.lines.is_empty() {
        return Err(NotaError::Validation(
            "cannot submit a document without line items".into(),
        ));
    }
    if document.issuer.tax_id.kind() != TaxIdKind::Cnpj {
        return Err(NotaError::Validation(
            "only company issuers (CNPJ) can submit fiscal documents".into(),
        ));
    }

    let regime = document_regime(&document)?;
    let calculation = calculate(&document.lines, regime, rates)?;

    let key = AccessKey::generate(&AccessKeyParts {
        region_code: issuance.region_code,
        year: issuance.year,
        month: issuance.month,
        issuer: document.issuer.tax_id.clone(),
        model: issuance.model,
        series: issuance.series,
        number,
        emission_type: issuance.emission_type,
        salt,
    })?;

    info!(document = %document.id, key = %key, "document submitted");

    Ok(Document {
        status: DocumentStatus::Submitted { key, calculation },
        ..document
    })
}

/// Record the authority protocol and move SUBMITTED → AUTHORIZED.
///
/// `protocol_date` defaults to the current time when the authority did
/// not supply one.
pub fn authorize(
    document: Document,
    protocol_number: impl Into<String>,
    protocol_date: Option<DateTime<Utc>>,
) -> Result<Document, NotaError> {
    match &document.status {
        DocumentStatus::Submitted { key, calculation } => {
            let (key, calculation) = (key.clone(), calculation.clone());
            let protocol = Protocol {
                number: protocol_number.into(),
                date: protocol_date.unwrap_or_else(Utc::now),
            };
            info!(document = %document.id, protocol = %protocol.number, "document authorized");
            Ok(Document {
                status: DocumentStatus::Authorized {
                    key,
                    calculation,
                    protocol,
                },
                ..document
            })
        }
        status => Err(NotaError::InvalidTransition {
            from: status.name(),
            attempted: "authorize",
        }),
    }
}

/// Record an authority refusal and move SUBMITTED → REJECTED (terminal).
pub fn reject(document: Document, reason: impl Into<String>) -> Result<Document, NotaError> {
    match &document.status {
        DocumentStatus::Submitted { .. } => {
            let reason = reason.into();
            info!(document = %document.id, %reason, "document rejected");
            Ok(Document {
                status: DocumentStatus::Rejected { reason },
                ..document
            })
        }
        status => Err(NotaError::InvalidTransition {
            from: status.name(),
            attempted: "reject",
        }),
    }
}

/// Soft-invalidate an authorized document: AUTHORIZED → CANCELLED
/// (terminal). Requires a non-empty reason.
pub fn cancel(
    document: Document,
    reason: impl Into<String>,
    protocol_number: impl Into<String>,
) -> Result<Document, NotaError> {
    let reason = reason.into();
    if reason.trim().is_empty() {
        return Err(NotaError::Validation(
            "cancellation requires a non-empty reason".into(),
        ));
    }
    match &document.status {
        DocumentStatus::Authorized {
            key,
            calculation,
            protocol,
        } => {
            let (key, calculation, protocol) =
                (key.clone(), calculation.clone(), protocol.clone());
            info!(document = %document.id, %reason, "document cancelled");
            Ok(Document {
                status: DocumentStatus::Cancelled {
                    key,
                    calculation,
                    protocol,
                    cancellation: Cancellation {
                        reason,
                        protocol_number: protocol_number.into(),
                        cancelled_at: Utc::now(),
                    },
                },
                ..document
            })
        }
        status => Err(NotaError::InvalidTransition {
            from: status.name(),
            attempted: "cancel",
        }),
    }
}

/// Build the reversal of an authorized document.
///
/// Does not mutate the original: returns a **new** draft whose line items
/// are the negation (equal magnitude, opposite economic direction) of the
/// original's, back-referencing the original's access key. The reversal
/// is then routed through [`submit`]/[`authorize`] as a normal document.
pub fn reverse(original: &Document, reason: impl Into<String>) -> Result<Document, NotaError> {
    let key = match &original.status {
        DocumentStatus::Authorized { key, .. } => key.clone(),
        status => {
            return Err(NotaError::InvalidTransition {
                from: status.name(),
                attempted: "reverse",
            });
        }
    };

    let reason = reason.into();
    if reason.trim().is_empty() {
        return Err(NotaError::Validation(
            "reversal requires a non-empty reason".into(),
        ));
    }

    let negated = original.lines.iter().map(|l| l.negated()).collect();

    let draft = DraftBuilder::new(original.issuer.clone(), original.recipient.clone())
        .lines(negated)
        .reversal_of(key, reason)
        .build()?;

    info!(
        original = %original.id,
        reversal = %draft.id,
        "reversal draft created"
    );
    Ok(draft)
}

/// Derive issuance year/month from a document's issue timestamp.
pub fn issuance_for(document: &Document, region_code: u8, model: u8, series: u16) -> KeyIssuance {
    KeyIssuance::new(
        region_code,
        model,
        series,
        document.issued_at.year() as u16,
        document.issued_at.month() as u8,
    )
}
