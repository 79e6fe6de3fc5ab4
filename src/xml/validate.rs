use crate::core::{Document, DocumentStatus, ValidationError};

/// Validate that a document is serializable as an authority payload.
///
/// A separate pure function from the builders: malformed input produces a
/// structured error list, never malformed XML. Returns all errors found,
/// not just the first.
pub fn validate_for_xml(document: &Document) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    match &document.status {
        DocumentStatus::Draft => {
            errors.push(ValidationError::with_rule(
                "status",
                "draft documents have no access key and cannot be serialized",
                "XG-01",
            ));
        }
        DocumentStatus::Rejected { .. } => {
            errors.push(ValidationError::with_rule(
                "status",
                "rejected documents cannot be serialized",
                "XG-01",
            ));
        }
        _ => {}
    }

    if document.lines.is_empty() {
        errors.push(ValidationError::with_rule(
            "lines",
            "document must have at least one line item",
            "XG-02",
        ));
    }

    if let Some(calculation) = document.status.calculation() {
        if calculation.lines.len() != document.lines.len() {
            errors.push(ValidationError::with_rule(
                "calculation",
                format!(
                    "calculation covers {} lines but the document has {}",
                    calculation.lines.len(),
                    document.lines.len()
                ),
                "XG-03",
            ));
        }
    }

    if document.issuer.name.trim().is_empty() {
        errors.push(ValidationError::with_rule(
            "issuer.name",
            "issuer name must not be empty",
            "XG-04",
        ));
    }
    if document.recipient.name.trim().is_empty() {
        errors.push(ValidationError::with_rule(
            "recipient.name",
            "recipient name must not be empty",
            "XG-04",
        ));
    }

    for (i, line) in document.lines.iter().enumerate() {
        if line.description.trim().is_empty() {
            errors.push(ValidationError::with_rule(
                format!("lines[{i}].description"),
                "line description must not be empty",
                "XG-05",
            ));
        }
        if line.net_amount != line.quantity * line.unit_price {
            errors.push(ValidationError::with_rule(
                format!("lines[{i}].net_amount"),
                format!(
                    "net amount {} does not equal quantity {} × unit price {}",
                    line.net_amount, line.quantity, line.unit_price
                ),
                "XG-06",
            ));
        }
    }

    errors
}
