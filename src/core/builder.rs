use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::access_key::AccessKey;
use super::cst::TaxSituationCode;
use super::error::NotaError;
use super::types::*;

/// Builder for document line items.
///
/// ```
/// use nota::core::*;
/// use rust_decimal_macros::dec;
///
/// let line = LineItemBuilder::new("1", "Parafuso M8", dec!(100), dec!(0.35))
///     .situation(TaxSituationCode::parse("000").unwrap())
///     .category("goods")
///     .build();
/// assert_eq!(line.net_amount, dec!(35.00));
/// ```
pub struct LineItemBuilder {
    id: String,
    description: String,
    quantity: Decimal,
    unit_price: Decimal,
    situation: Option<TaxSituationCode>,
    category: String,
    origin: String,
    destination: String,
}

impl LineItemBuilder {
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        quantity: Decimal,
        unit_price: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            quantity,
            unit_price,
            situation: None,
            category: "general".into(),
            origin: String::new(),
            destination: String::new(),
        }
    }

    /// Assign the tax situation code. Defaults to "000" (domestic, fully
    /// taxed) when not set.
    pub fn situation(mut self, code: TaxSituationCode) -> Self {
        self.situation = Some(code);
        self
    }

    /// Item category used for rate lookup.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Override the origin jurisdiction (defaults to the issuer's region).
    pub fn origin(mut self, region: impl Into<String>) -> Self {
        self.origin = region.into();
        self
    }

    /// Override the destination jurisdiction (defaults to the recipient's
    /// region).
    pub fn destination(mut self, region: impl Into<String>) -> Self {
        self.destination = region.into();
        self
    }

    pub fn build(self) -> LineItem {
        let situation = self
            .situation
            .unwrap_or_else(|| TaxSituationCode::parse("000").expect("static code"));
        LineItem {
            id: self.id,
            description: self.description,
            quantity: self.quantity,
            unit_price: self.unit_price,
            net_amount: self.quantity * self.unit_price,
            situation,
            category: self.category,
            origin: self.origin,
            destination: self.destination,
        }
    }
}

/// Builder for draft documents.
///
/// Validates structural invariants at build time and fills each line's
/// jurisdiction pair from the party regions where not set explicitly.
pub struct DraftBuilder {
    issuer: Party,
    recipient: Party,
    issued_at: Option<DateTime<Utc>>,
    lines: Vec<LineItem>,
    reversal: Option<Reversal>,
}

impl DraftBuilder {
    pub fn new(issuer: Party, recipient: Party) -> Self {
        Self {
            issuer,
            recipient,
            issued_at: None,
            lines: Vec::new(),
            reversal: None,
        }
    }

    /// Issue timestamp. Defaults to now.
    pub fn issued_at(mut self, at: DateTime<Utc>) -> Self {
        self.issued_at = Some(at);
        self
    }

    pub fn add_line(mut self, line: LineItem) -> Self {
        self.lines.push(line);
        self
    }

    pub fn lines(mut self, lines: Vec<LineItem>) -> Self {
        self.lines = lines;
        self
    }

    /// Mark this draft as the reversal of a previously authorized document.
    pub fn reversal_of(mut self, key: AccessKey, reason: impl Into<String>) -> Self {
        self.reversal = Some(Reversal {
            of: key,
            reason: reason.into(),
        });
        self
    }

    /// Build the draft, validating structural invariants.
    pub fn build(self) -> Result<Document, NotaError> {
        if self.issuer.name.trim().is_empty() {
            return Err(NotaError::Validation("issuer name must not be empty".into()));
        }
        if self.recipient.name.trim().is_empty() {
            return Err(NotaError::Validation(
                "recipient name must not be empty".into(),
            ));
        }
        if self.issuer.region.trim().is_empty() {
            return Err(NotaError::Validation(
                "issuer region is required for rate lookup".into(),
            ));
        }
        // Input limits to prevent abuse
        if self.lines.len() > 10_000 {
            return Err(NotaError::Validation(
                "document cannot have more than 10,000 line items".into(),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for line in &self.lines {
            if line.id.trim().is_empty() {
                return Err(NotaError::Validation(
                    "line identifier must not be empty".into(),
                ));
            }
            if !seen.insert(line.id.clone()) {
                return Err(NotaError::Validation(format!(
                    "duplicate line identifier '{}'",
                    line.id
                )));
            }
        }

        let issuer_region = self.issuer.region.clone();
        let recipient_region = self.recipient.region.clone();
        let lines = self
            .lines
            .into_iter()
            .map(|mut line| {
                if line.origin.is_empty() {
                    line.origin = issuer_region.clone();
                }
                if line.destination.is_empty() {
                    line.destination = recipient_region.clone();
                }
                line
            })
            .collect();

        Ok(Document {
            id: Uuid::new_v4(),
            issuer: self.issuer,
            recipient: self.recipient,
            issued_at: self.issued_at.unwrap_or_else(Utc::now),
            lines,
            reversal: self.reversal,
            status: DocumentStatus::Draft,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ids::{TaxId, TaxIdKind};
    use rust_decimal_macros::dec;

    fn issuer() -> Party {
        Party::new(
            "ACME Ltda",
            TaxId::parse(TaxIdKind::Cnpj, "11222333000181").unwrap(),
        )
        .region("SP")
    }

    fn recipient() -> Party {
        Party::new(
            "Cliente SA",
            TaxId::parse(TaxIdKind::Cpf, "11144477735").unwrap(),
        )
        .region("RJ")
    }

    #[test]
    fn draft_fills_jurisdictions_from_parties() {
        let doc = DraftBuilder::new(issuer(), recipient())
            .add_line(LineItemBuilder::new("1", "Item", dec!(1), dec!(10)).build())
            .build()
            .unwrap();
        assert_eq!(doc.lines[0].origin, "SP");
        assert_eq!(doc.lines[0].destination, "RJ");
        assert!(matches!(doc.status, DocumentStatus::Draft));
    }

    #[test]
    fn explicit_line_jurisdiction_wins() {
        let doc = DraftBuilder::new(issuer(), recipient())
            .add_line(
                LineItemBuilder::new("1", "Item", dec!(1), dec!(10))
                    .origin("MG")
                    .build(),
            )
            .build()
            .unwrap();
        assert_eq!(doc.lines[0].origin, "MG");
    }

    #[test]
    fn duplicate_line_ids_rejected() {
        let result = DraftBuilder::new(issuer(), recipient())
            .add_line(LineItemBuilder::new("1", "A", dec!(1), dec!(10)).build())
            .add_line(LineItemBuilder::new("1", "B", dec!(2), dec!(20)).build())
            .build();
        assert!(matches!(result, Err(NotaError::Validation(_))));
    }

    #[test]
    fn missing_issuer_region_rejected() {
        let bare = Party::new(
            "ACME Ltda",
            TaxId::parse(TaxIdKind::Cnpj, "11222333000181").unwrap(),
        );
        assert!(DraftBuilder::new(bare, recipient()).build().is_err());
    }

    #[test]
    fn line_net_amount_computed() {
        let line = LineItemBuilder::new("1", "Item", dec!(3), dec!(2.50)).build();
        assert_eq!(line.net_amount, dec!(7.50));
    }
}
