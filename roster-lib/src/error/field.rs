//! Errors raised by typed record accessors

/// Error returned by the typed getters on [`Record`](crate::model::Record).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldError {
    /// The record has no value under this key.
    #[error("record has no field '{field}'")]
    Missing { field: String },

    /// The value exists but holds another type.
    #[error("field '{field}' holds {actual}, expected {expected}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },
}

impl FieldError {
    pub fn missing(field: impl Into<String>) -> Self {
        Self::Missing {
            field: field.into(),
        }
    }

    pub fn type_mismatch(field: impl Into<String>, expected: &'static str, actual: &'static str) -> Self {
        Self::TypeMismatch {
            field: field.into(),
            expected,
            actual,
        }
    }

    /// Returns the key of the offending field.
    pub fn field(&self) -> &str {
        match self {
            Self::Missing { field } | Self::TypeMismatch { field, .. } => field,
        }
    }
}
