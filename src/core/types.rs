use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::access_key::AccessKey;
use super::cst::TaxSituationCode;
use super::ids::TaxId;
use crate::tax::TaxCalculationResult;

/// A party to a fiscal document (issuer, recipient or carrier).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Party {
    /// Legal name.
    pub name: String,
    /// Taxpayer identifier (CNPJ or CPF).
    pub tax_id: TaxId,
    /// State registration number, when the party has one.
    pub state_registration: Option<TaxId>,
    /// Jurisdiction (state) code, e.g. "SP". Used for rate lookup.
    pub region: String,
    /// Municipality name, informational.
    pub municipality: Option<String>,
}

impl Party {
    pub fn new(name: impl Into<String>, tax_id: TaxId) -> Self {
        Self {
            name: name.into(),
            tax_id,
            state_registration: None,
            region: String::new(),
            municipality: None,
        }
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn state_registration(mut self, id: TaxId) -> Self {
        self.state_registration = Some(id);
        self
    }

    pub fn municipality(mut self, name: impl Into<String>) -> Self {
        self.municipality = Some(name.into());
        self
    }
}

/// A document line item. Owned exclusively by its parent [`Document`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Line identifier, unique within the document.
    pub id: String,
    /// Item description.
    pub description: String,
    /// Quantity.
    pub quantity: Decimal,
    /// Unit price.
    pub unit_price: Decimal,
    /// Net amount = quantity × unit price, computed at construction.
    pub net_amount: Decimal,
    /// Assigned tax situation code.
    pub situation: TaxSituationCode,
    /// Item category for rate lookup (e.g. "goods", "services").
    pub category: String,
    /// Origin jurisdiction. Defaults to the issuer's region.
    pub origin: String,
    /// Destination jurisdiction. Defaults to the recipient's region.
    pub destination: String,
}

impl LineItem {
    /// A line with equal magnitude and opposite economic direction,
    /// used when reversing an authorized document.
    pub(crate) fn negated(&self) -> Self {
        Self {
            quantity: -self.quantity,
            net_amount: -self.net_amount,
            ..self.clone()
        }
    }
}

/// Authority-issued authorization protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Protocol {
    /// Protocol number assigned by the authority.
    pub number: String,
    /// Authority timestamp for the authorization.
    pub date: DateTime<Utc>,
}

/// Back-reference carried by a reversal document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reversal {
    /// Access key of the reversed (original) document.
    pub of: AccessKey,
    /// Why the original is being economically negated.
    pub reason: String,
}

/// Cancellation record for a previously authorized document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cancellation {
    /// Non-empty justification.
    pub reason: String,
    /// Authority protocol for the cancellation event.
    pub protocol_number: String,
    /// When the cancellation was recorded.
    pub cancelled_at: DateTime<Utc>,
}

/// Document status as a tagged union — each state carries only the fields
/// that are valid in that state. Transitions are one-directional; see
/// [`crate::lifecycle`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DocumentStatus {
    /// Editable; no key assigned yet.
    Draft,
    /// Submitted to the authority; key assigned, calculation frozen.
    Submitted {
        key: AccessKey,
        calculation: TaxCalculationResult,
    },
    /// Accepted by the authority.
    Authorized {
        key: AccessKey,
        calculation: TaxCalculationResult,
        protocol: Protocol,
    },
    /// Refused by the authority. Terminal.
    Rejected { reason: String },
    /// Soft-invalidated after authorization. Terminal.
    Cancelled {
        key: AccessKey,
        calculation: TaxCalculationResult,
        protocol: Protocol,
        cancellation: Cancellation,
    },
}

impl DocumentStatus {
    /// Status name for error messages and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Submitted { .. } => "submitted",
            Self::Authorized { .. } => "authorized",
            Self::Rejected { .. } => "rejected",
            Self::Cancelled { .. } => "cancelled",
        }
    }

    /// The access key, present from submission on (rejected documents
    /// retain none — the authority never accepted the submission).
    pub fn key(&self) -> Option<&AccessKey> {
        match self {
            Self::Submitted { key, .. }
            | Self::Authorized { key, .. }
            | Self::Cancelled { key, .. } => Some(key),
            Self::Draft | Self::Rejected { .. } => None,
        }
    }

    /// The frozen tax calculation, present from submission on.
    pub fn calculation(&self) -> Option<&TaxCalculationResult> {
        match self {
            Self::Submitted { calculation, .. }
            | Self::Authorized { calculation, .. }
            | Self::Cancelled { calculation, .. } => Some(calculation),
            Self::Draft | Self::Rejected { .. } => None,
        }
    }

    /// The authority protocol, present once authorized.
    pub fn protocol(&self) -> Option<&Protocol> {
        match self {
            Self::Authorized { protocol, .. } | Self::Cancelled { protocol, .. } => Some(protocol),
            _ => None,
        }
    }

    /// Whether no further transitions are permitted.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected { .. } | Self::Cancelled { .. })
    }
}

/// The fiscal document aggregate root.
///
/// Created in [`DocumentStatus::Draft`] by [`super::DraftBuilder`] and
/// mutated only through the named transition operations in
/// [`crate::lifecycle`], each of which returns a new snapshot. Documents
/// are retained indefinitely for audit — there is no deletion, only soft
/// invalidation via cancellation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Internal identity (the access key exists only from submission on).
    pub id: Uuid,
    pub issuer: Party,
    pub recipient: Party,
    /// Issue timestamp.
    pub issued_at: DateTime<Utc>,
    /// Ordered line items.
    pub lines: Vec<LineItem>,
    /// Back-reference to the original document when this document is a
    /// reversal.
    pub reversal: Option<Reversal>,
    pub status: DocumentStatus,
}

impl Document {
    /// Replace the line items of a draft, returning a new snapshot.
    ///
    /// Only permitted in [`DocumentStatus::Draft`]; once submitted the
    /// calculation is frozen and lines can no longer change.
    pub fn with_lines(&self, lines: Vec<LineItem>) -> Result<Self, super::NotaError> {
        if !matches!(self.status, DocumentStatus::Draft) {
            return Err(super::NotaError::InvalidTransition {
                from: self.status.name(),
                attempted: "replace lines of",
            });
        }
        Ok(Self {
            lines,
            ..self.clone()
        })
    }
}
