//! Form validator

use super::FieldDescriptor;
use super::result::ValidationResult;
use crate::error::FieldValidationError;
use crate::model::Record;
use crate::model::Value;

/// Validates a record's values against a set of field descriptors.
///
/// Fields are checked in form order and report only their first failing
/// rule. Button fields are skipped.
pub struct Validator<'a> {
    fields: &'a [FieldDescriptor],
}

impl<'a> Validator<'a> {
    pub fn new(fields: &'a [FieldDescriptor]) -> Self {
        Self { fields }
    }

    /// Runs every rule of every input field.
    pub fn validate(&self, values: &Record) -> ValidationResult {
        let mut errors = Vec::new();

        for field in self.fields.iter().filter(|f| f.is_input()) {
            let value = values.get(&field.key).unwrap_or(&Value::Null);
            if let Some(failed) = field.rules.iter().find(|rule| !rule.check(value)) {
                errors.push(FieldValidationError::new(
                    field.key.clone(),
                    failed.name(),
                    failed.message(),
                ));
            }
        }

        if errors.is_empty() {
            ValidationResult::Valid
        } else {
            ValidationResult::Invalid(errors)
        }
    }
}
