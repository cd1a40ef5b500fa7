//! Field descriptors

use super::Rule;

/// How a field is presented by the form collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Single-line text input.
    Text,
    /// Multi-line text input.
    Textarea,
    /// Avatar picker; the upload itself is the surface's concern.
    AvatarPhoto {
        button_text: String,
        remove_text: String,
    },
    /// A button that emits a modal outcome named after the field key.
    SubmitButton,
}

/// A declarative description of one form field.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Record key edited by this field, or the outcome key for buttons.
    pub key: String,
    /// Label shown next to the input or on the button.
    pub label: String,
    /// Rendering hint.
    pub kind: FieldKind,
    /// Rules checked, in order, before a submit may fire.
    pub rules: Vec<Rule>,
}

impl FieldDescriptor {
    /// Creates a field of the given kind with no rules.
    pub fn new(key: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            kind,
            rules: Vec::new(),
        }
    }

    /// Creates a single-line text field.
    pub fn text(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, label, FieldKind::Text)
    }

    /// Creates a multi-line text field.
    pub fn textarea(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, label, FieldKind::Textarea)
    }

    /// Creates an avatar photo field.
    pub fn avatar(
        key: impl Into<String>,
        label: impl Into<String>,
        button_text: impl Into<String>,
        remove_text: impl Into<String>,
    ) -> Self {
        Self::new(
            key,
            label,
            FieldKind::AvatarPhoto {
                button_text: button_text.into(),
                remove_text: remove_text.into(),
            },
        )
    }

    /// Creates a button emitting the outcome `key`.
    pub fn button(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, label, FieldKind::SubmitButton)
    }

    /// Adds a validation rule.
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Returns `true` for fields that hold a record value.
    pub fn is_input(&self) -> bool {
        !matches!(self.kind, FieldKind::SubmitButton)
    }

    /// Returns `true` if any rule requires a value.
    pub fn is_required(&self) -> bool {
        self.rules.iter().any(|r| matches!(r, Rule::Required { .. }))
    }
}
