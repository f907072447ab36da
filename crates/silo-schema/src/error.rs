use thiserror::Error;

use crate::schema::Violation;

/// Errors from schema compilation and document validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    /// The schema document itself is malformed and cannot be compiled.
    #[error("invalid schema document: {reason}")]
    InvalidSchema { reason: String },

    /// The document does not satisfy the schema.
    ///
    /// Carries every failed constraint so the caller can report or fix all
    /// of them at once.
    #[error("document failed schema validation with {} violation(s)", violations.len())]
    Validation { violations: Vec<Violation> },
}

impl SchemaError {
    /// The violation list, if this is a validation failure.
    pub fn violations(&self) -> Option<&[Violation]> {
        match self {
            Self::Validation { violations } => Some(violations),
            Self::InvalidSchema { .. } => None,
        }
    }
}
