//! Dynamic record

use std::borrow::Cow;
use std::collections::HashMap;

use super::RecordId;
use super::Value;
use crate::error::FieldError;

/// One entity shown as a table row.
///
/// Records hold their fields as a `HashMap<String, Value>`. The `id` is kept
/// apart from the fields: it is absent until the backend has persisted the
/// record, and it is what identifies the row in the list.
///
/// # Example
///
/// ```
/// use roster_lib::model::Record;
///
/// let record = Record::new()
///     .set("firstname", "Ana")
///     .set("email", "ana@example.com");
///
/// assert!(record.is_new());
/// assert_eq!(record.get_string("firstname").unwrap(), Some("Ana"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub(crate) id: Option<RecordId>,
    pub(crate) fields: HashMap<String, Value>,
}

impl Record {
    /// Creates a new, unsaved record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a record with the given id.
    pub fn with_id(id: impl Into<RecordId>) -> Self {
        Self {
            id: Some(id.into()),
            fields: HashMap::new(),
        }
    }

    // =========================================================================
    // Identity
    // =========================================================================

    /// Returns the record id, if persisted.
    pub fn id(&self) -> Option<&RecordId> {
        self.id.as_ref()
    }

    /// Returns `true` if the backend has not assigned an id yet.
    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// Sets the record id.
    pub fn set_id(&mut self, id: impl Into<RecordId>) {
        self.id = Some(id.into());
    }

    /// Returns `true` if both records carry the same defined id.
    pub fn same_identity(&self, other: &Record) -> bool {
        matches!((&self.id, &other.id), (Some(a), Some(b)) if a == b)
    }

    // =========================================================================
    // Raw field access
    // =========================================================================

    /// Returns a reference to the field value, if it exists.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns `true` if the record contains the given field.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Returns a reference to all fields.
    pub fn fields(&self) -> &HashMap<String, Value> {
        &self.fields
    }

    /// Returns the display string of a field; missing fields render empty.
    pub fn display(&self, field: &str) -> Cow<'_, str> {
        match self.fields.get(field) {
            Some(value) => value.display(),
            None => Cow::Borrowed(""),
        }
    }

    // =========================================================================
    // Setters
    // =========================================================================

    /// Sets a field value (builder pattern).
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Inserts a field value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Removes a field and returns its value.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    /// Copies every field of `other` over this record's fields.
    ///
    /// The id is left alone; form values never change identity.
    pub fn merge(&mut self, other: &Record) {
        for (key, value) in &other.fields {
            self.fields.insert(key.clone(), value.clone());
        }
    }

    // =========================================================================
    // Typed getters
    //
    // Return Err if field is missing or wrong type.
    // Return Ok(None) only if the field exists and is Value::Null.
    // =========================================================================

    /// Gets a string field value.
    pub fn get_string(&self, field: &str) -> Result<Option<&str>, FieldError> {
        match self.fields.get(field) {
            None => Err(FieldError::missing(field)),
            Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(FieldError::type_mismatch(field, "string", other.type_name())),
        }
    }

    /// Gets a boolean field value.
    pub fn get_bool(&self, field: &str) -> Result<Option<bool>, FieldError> {
        match self.fields.get(field) {
            None => Err(FieldError::missing(field)),
            Some(Value::Null) => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(FieldError::type_mismatch(field, "bool", other.type_name())),
        }
    }

    /// Gets an integer field value.
    pub fn get_int(&self, field: &str) -> Result<Option<i64>, FieldError> {
        match self.fields.get(field) {
            None => Err(FieldError::missing(field)),
            Some(Value::Null) => Ok(None),
            Some(Value::Int(n)) => Ok(Some(*n)),
            Some(other) => Err(FieldError::type_mismatch(field, "int", other.type_name())),
        }
    }

    /// Gets a float field value. Integers widen.
    pub fn get_float(&self, field: &str) -> Result<Option<f64>, FieldError> {
        match self.fields.get(field) {
            None => Err(FieldError::missing(field)),
            Some(Value::Null) => Ok(None),
            Some(Value::Float(n)) => Ok(Some(*n)),
            Some(Value::Int(n)) => Ok(Some(*n as f64)),
            Some(other) => Err(FieldError::type_mismatch(field, "float", other.type_name())),
        }
    }
}
