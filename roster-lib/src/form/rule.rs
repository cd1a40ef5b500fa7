//! Validation rules

use regex::Regex;

use crate::model::Value;

/// A single validation rule with the message shown when it fails.
///
/// Every rule except [`Rule::Required`] accepts a blank value; combine with
/// `required` to demand one.
#[derive(Debug, Clone)]
pub enum Rule {
    /// The value must be present and not blank.
    Required { message: String },
    /// At least `min` characters.
    MinLength { min: usize, message: String },
    /// At most `max` characters.
    MaxLength { max: usize, message: String },
    /// The display string must match the pattern.
    Pattern { regex: Regex, message: String },
    /// The display string must be a valid email address.
    Email { message: String },
    /// An arbitrary predicate.
    Custom {
        name: &'static str,
        check: fn(&Value) -> bool,
        message: String,
    },
}

impl Rule {
    pub fn required(message: impl Into<String>) -> Self {
        Self::Required {
            message: message.into(),
        }
    }

    pub fn min_length(min: usize, message: impl Into<String>) -> Self {
        Self::MinLength {
            min,
            message: message.into(),
        }
    }

    pub fn max_length(max: usize, message: impl Into<String>) -> Self {
        Self::MaxLength {
            max,
            message: message.into(),
        }
    }

    /// Compiles `pattern`; fails on an invalid regex.
    pub fn pattern(pattern: &str, message: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self::Pattern {
            regex: Regex::new(pattern)?,
            message: message.into(),
        })
    }

    pub fn email(message: impl Into<String>) -> Self {
        Self::Email {
            message: message.into(),
        }
    }

    pub fn custom(name: &'static str, check: fn(&Value) -> bool, message: impl Into<String>) -> Self {
        Self::Custom {
            name,
            check,
            message: message.into(),
        }
    }

    /// Short name of the rule, used in error reports.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Required { .. } => "required",
            Self::MinLength { .. } => "min_length",
            Self::MaxLength { .. } => "max_length",
            Self::Pattern { .. } => "pattern",
            Self::Email { .. } => "email",
            Self::Custom { name, .. } => *name,
        }
    }

    /// The message shown when the rule fails.
    pub fn message(&self) -> &str {
        match self {
            Self::Required { message }
            | Self::MinLength { message, .. }
            | Self::MaxLength { message, .. }
            | Self::Pattern { message, .. }
            | Self::Email { message }
            | Self::Custom { message, .. } => message.as_str(),
        }
    }

    /// Checks a value; a missing field is passed as `Value::Null`.
    pub fn check(&self, value: &Value) -> bool {
        if let Self::Required { .. } = self {
            return !value.is_blank();
        }
        if let Self::Custom { check, .. } = self {
            return check(value);
        }
        if value.is_blank() {
            return true;
        }

        let text = value.display();
        match self {
            Self::MinLength { min, .. } => text.chars().count() >= *min,
            Self::MaxLength { max, .. } => text.chars().count() <= *max,
            Self::Pattern { regex, .. } => regex.is_match(&text),
            Self::Email { .. } => email_address::EmailAddress::is_valid(&text),
            Self::Required { .. } | Self::Custom { .. } => true,
        }
    }
}
