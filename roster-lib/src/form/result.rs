use crate::error::FieldValidationError;

/// Result of validating a form's values.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ValidationResult {
    /// All fields passed validation.
    #[default]
    Valid,
    /// One or more fields failed validation.
    Invalid(Vec<FieldValidationError>),
}

impl ValidationResult {
    /// Check if all fields passed validation.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Check if any field failed validation.
    pub fn is_invalid(&self) -> bool {
        !self.is_valid()
    }

    /// Get all validation errors, at most one per field.
    pub fn errors(&self) -> &[FieldValidationError] {
        match self {
            Self::Valid => &[],
            Self::Invalid(errors) => errors,
        }
    }

    /// Get the first validation error (if any).
    pub fn first_error(&self) -> Option<&FieldValidationError> {
        self.errors().first()
    }

    /// Get the key of the first invalid field, in form order.
    pub fn first_invalid_field(&self) -> Option<&str> {
        self.first_error().map(|e| e.field.as_str())
    }

    /// Get the error for a specific field.
    pub fn error_for(&self, field: &str) -> Option<&FieldValidationError> {
        self.errors().iter().find(|e| e.field == field)
    }
}
