//! Validation error types

use std::fmt;

/// A rule that a single form field failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValidationError {
    /// Key of the field that failed validation.
    pub field: String,
    /// Human-readable message, taken from the failed rule.
    pub message: String,
    /// Name of the rule that failed (`required`, `email`, ...).
    pub rule: &'static str,
}

impl FieldValidationError {
    /// Creates a new field validation error.
    pub fn new(field: impl Into<String>, rule: &'static str, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule,
        }
    }
}

impl fmt::Display for FieldValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.field, self.message, self.rule)
    }
}
