use thiserror::Error;

/// Errors that can occur while validating, calculating, transitioning or
/// serializing fiscal documents.
///
/// The taxonomy is closed: every failure path in the engine maps to exactly
/// one of these variants, and none of them is ever auto-corrected or
/// silently defaulted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum NotaError {
    /// Input has the wrong shape or length — the caller fixes the request.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Identifier has the wrong digit count for its kind.
    #[error("invalid length for {kind}: expected {expected} digits, got {actual}")]
    InvalidLength {
        kind: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Identifier integrity failure — the value must be re-obtained,
    /// never corrected in place.
    #[error("check digit mismatch in {kind} '{value}'")]
    InvalidCheckDigit { kind: &'static str, value: String },

    /// The tax engine found no rule for a jurisdiction/category combination.
    /// Surfaces to an operator; never defaults to zero tax.
    #[error(
        "no applicable tax rule for origin {origin}, destination {destination}, \
         category '{category}', regime {regime}"
    )]
    NoApplicableRule {
        origin: String,
        destination: String,
        category: String,
        regime: &'static str,
    },

    /// A lifecycle guard was violated — indicates a caller ordering bug.
    #[error("cannot {attempted} a document in state {from}")]
    InvalidTransition {
        from: &'static str,
        attempted: &'static str,
    },

    /// Stale document version — the caller should reload and retry.
    #[error("stale document version: expected {expected}, stored {stored}")]
    ConcurrencyConflict { expected: u64, stored: u64 },

    /// Corrective/replacement report requested without the required
    /// prior-file reference hash.
    #[error("{mode} report requires the hash of the previously generated file")]
    MissingReference { mode: &'static str },

    /// Document not found in the persistence collaborator.
    #[error("document {0} not found")]
    NotFound(uuid::Uuid),

    /// XML generation error.
    #[error("XML error: {0}")]
    Xml(String),
}

/// A single validation error with field path and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dot-separated path to the invalid field (e.g. "lines[0].situation").
    pub field: String,
    /// Human-readable error description.
    pub message: String,
    /// Internal rule ID if applicable (e.g. "FD-03").
    pub rule: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(rule) = &self.rule {
            write!(f, "[{}] {}: {}", rule, self.field, self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

impl ValidationError {
    /// Create a validation error without a rule ID.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: None,
        }
    }

    /// Create a validation error with a rule ID.
    pub fn with_rule(
        field: impl Into<String>,
        message: impl Into<String>,
        rule: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: Some(rule.into()),
        }
    }
}
