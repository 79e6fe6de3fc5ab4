//! Periodic report file generation.
//!
//! Each record type is a pure transform from a typed input to a single
//! pipe-delimited text line. The file is the ordered concatenation of
//! opening record, body records, and a closing record carrying the body
//! count. The content hash and record count are computed once at
//! generation and embedded in the result.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::core::{AccessKey, Document, DocumentStatus, NotaError};

use super::layout::ReportLayout;

/// Purpose of a report file submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportMode {
    /// First submission for the period.
    Original,
    /// Corrects individual records of a previously submitted file.
    Corrective,
    /// Replaces a previously submitted file in full.
    Replacement,
}

impl ReportMode {
    /// Purpose code embedded in the opening record.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Original => "0",
            Self::Corrective => "1",
            Self::Replacement => "2",
        }
    }

    /// Whether this mode must reference the hash of the prior file.
    pub fn requires_reference(&self) -> bool {
        !matches!(self, Self::Original)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::Corrective => "corrective",
            Self::Replacement => "replacement",
        }
    }
}

/// The reporting period, rendered as AAAAMM in the opening record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub year: u16,
    pub month: u8,
}

impl Period {
    pub fn new(year: u16, month: u8) -> Result<Self, NotaError> {
        if !(1..=12).contains(&month) {
            return Err(NotaError::Validation(format!(
                "period month must be 1-12, got {month}"
            )));
        }
        Ok(Self { year, month })
    }

    fn key(&self) -> String {
        format!("{:04}{:02}", self.year, self.month)
    }
}

/// One body record of the report (intermediate representation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    /// Access key of the reported document.
    pub key: AccessKey,
    /// Fiscal date of the document.
    pub date: NaiveDate,
    /// Net total of the document.
    pub net_total: Decimal,
    /// Primary tax total of the document.
    pub tax_total: Decimal,
}

impl ReportEntry {
    /// Build an entry from an authorized document.
    ///
    /// Only authorized documents qualify for the report; drafts carry no
    /// key and rejected or cancelled documents are not reportable.
    pub fn from_document(document: &Document) -> Result<Self, NotaError> {
        match &document.status {
            DocumentStatus::Authorized {
                key, calculation, ..
            } => Ok(Self {
                key: key.clone(),
                date: document.issued_at.date_naive(),
                net_total: calculation.totals.net_total,
                tax_total: calculation.totals.tax_total,
            }),
            status => Err(NotaError::InvalidTransition {
                from: status.name(),
                attempted: "report",
            }),
        }
    }
}

/// A generated report file. Hash and record count are frozen at
/// generation time and never recomputed downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportFile {
    /// The full file content, newline-separated records.
    pub content: String,
    /// Lowercase hex SHA-256 of `content`, for replacement-chain
    /// integrity.
    pub hash: String,
    /// Total record count including opening and closing records.
    pub record_count: usize,
}

/// Generate a periodic report file.
///
/// `issuer_tax_id` is the canonical CNPJ digit string of the reporting
/// party. Entries are written in caller order. Corrective and
/// replacement modes require `prior_hash`; omitting it fails with
/// [`NotaError::MissingReference`] rather than defaulting to an original
/// submission.
pub fn generate_report(
    layout: &ReportLayout,
    mode: ReportMode,
    period: Period,
    issuer_tax_id: &str,
    entries: &[ReportEntry],
    prior_hash: Option<&str>,
) -> Result<ReportFile, NotaError> {
    let reference = match (mode.requires_reference(), prior_hash) {
        (true, None) => {
            return Err(NotaError::MissingReference { mode: mode.name() });
        }
        (true, Some(h)) if h.trim().is_empty() => {
            return Err(NotaError::MissingReference { mode: mode.name() });
        }
        (_, h) => h.unwrap_or(""),
    };

    let mut content = String::new();

    content.push_str(&opening_record(layout, mode, period, issuer_tax_id, reference));
    content.push('\n');

    for entry in entries {
        content.push_str(&body_record(layout, entry));
        content.push('\n');
    }

    content.push_str(&closing_record(layout, entries.len()));
    content.push('\n');

    let hash = format!("{:x}", Sha256::digest(content.as_bytes()));
    let record_count = entries.len() + 2;

    tracing::info!(
        mode = mode.name(),
        period = %period.key(),
        records = record_count,
        hash = %hash,
        "generated periodic report"
    );

    Ok(ReportFile {
        content,
        hash,
        record_count,
    })
}

fn opening_record(
    layout: &ReportLayout,
    mode: ReportMode,
    period: Period,
    issuer_tax_id: &str,
    reference: &str,
) -> String {
    format!(
        "|{}|{}|{}|{}|{}|{}|",
        layout.opening_code,
        layout.version,
        mode.code(),
        period.key(),
        issuer_tax_id,
        reference,
    )
}

fn body_record(layout: &ReportLayout, entry: &ReportEntry) -> String {
    format!(
        "|{}|{}|{}|{}|{}|",
        layout.body_code,
        entry.key.as_str(),
        entry.date.format("%Y%m%d"),
        format_amount(entry.net_total),
        format_amount(entry.tax_total),
    )
}

fn closing_record(layout: &ReportLayout, body_count: usize) -> String {
    format!(
        "|{}|{:0width$}|",
        layout.closing_code,
        body_count,
        width = layout.count_width,
    )
}

/// Format a Decimal for the report: comma decimal separator, always 2
/// decimal places.
fn format_amount(d: Decimal) -> String {
    format!("{:.2}", d.round_dp(2)).replace('.', ",")
}
