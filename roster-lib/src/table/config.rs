//! Table configuration

use std::time::Duration;

use super::Column;
use super::RowAction;
use super::RowActionKind;
use crate::form::FieldDescriptor;
use crate::form::Rule;
use crate::model::Record;

/// Configuration of a table and of the forms it opens.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use roster_lib::table::{Column, TableConfig};
/// use roster_lib::form::{FieldDescriptor, Rule};
///
/// let config = TableConfig::new("products-table", "product")
///     .with_columns(vec![Column::text("name", "Name")])
///     .with_form_fields(vec![
///         FieldDescriptor::text("name", "Name").rule(Rule::required("Name is required")),
///     ])
///     .with_summary_fields(&["name"])
///     .with_settle_delay(Duration::ZERO);
/// ```
#[derive(Debug, Clone)]
pub struct TableConfig {
    /// Identifier of the table, used in logs.
    pub id: String,

    /// Singular name of the entity, used in modal titles.
    pub entity: String,

    /// Columns in display order.
    pub columns: Vec<Column>,

    /// Input fields of the edit form, in display order.
    pub form_fields: Vec<FieldDescriptor>,

    /// Fields describing a record in the delete confirmation.
    pub summary_fields: Vec<String>,

    /// Pause after a modal resolves before its handle is released, so the
    /// surface can finish its closing transition.
    ///
    /// Default: 2 seconds
    pub settle_delay: Duration,

    /// Whether edit forms persist through the gateway on submit.
    ///
    /// Default: true
    pub auto_save: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            id: "table".to_string(),
            entity: "record".to_string(),
            columns: Vec::new(),
            form_fields: Vec::new(),
            summary_fields: Vec::new(),
            settle_delay: Duration::from_secs(2),
            auto_save: true,
        }
    }
}

impl TableConfig {
    /// Creates a config with default values.
    pub fn new(id: impl Into<String>, entity: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            entity: entity.into(),
            ..Self::default()
        }
    }

    /// The clients table: name and email columns with an edit/delete menu,
    /// and a form with required name and email.
    pub fn clients() -> Self {
        Self::new("clients-table", "client")
            .with_columns(vec![
                Column::text("firstname", "First name"),
                Column::text("lastname", "Last name"),
                Column::text("email", "Email"),
                Column::actions(
                    "more",
                    vec![
                        RowAction::new(RowActionKind::Edit, "edit", "Edit"),
                        RowAction::new(RowActionKind::Delete, "delete", "Delete"),
                    ],
                ),
            ])
            .with_form_fields(vec![
                FieldDescriptor::text("firstname", "First name").rule(Rule::required("First name is required")),
                FieldDescriptor::text("lastname", "Last name").rule(Rule::required("Last name is required")),
                FieldDescriptor::text("email", "Email")
                    .rule(Rule::required("Email is required"))
                    .rule(Rule::email("Please enter a valid email")),
                FieldDescriptor::text("address", "Address"),
                FieldDescriptor::avatar("photo", "Photo", "Upload photo", "Remove photo"),
                FieldDescriptor::textarea("caption", "Additional information"),
            ])
            .with_summary_fields(&["firstname", "lastname"])
    }

    /// Sets the columns.
    pub fn with_columns(mut self, columns: Vec<Column>) -> Self {
        self.columns = columns;
        self
    }

    /// Sets the edit form's input fields.
    pub fn with_form_fields(mut self, fields: Vec<FieldDescriptor>) -> Self {
        self.form_fields = fields;
        self
    }

    /// Sets the fields describing a record in the delete confirmation.
    pub fn with_summary_fields(mut self, fields: &[&str]) -> Self {
        self.summary_fields = fields.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Sets the settle delay.
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Sets whether edit forms persist on submit.
    pub fn with_auto_save(mut self, auto_save: bool) -> Self {
        self.auto_save = auto_save;
        self
    }

    /// Describes a record with its summary fields, e.g. `Ana Lopez`.
    ///
    /// Falls back to the id when no summary field has a value.
    pub fn summarize(&self, record: &Record) -> String {
        let summary = self
            .summary_fields
            .iter()
            .map(|key| record.display(key))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        match (summary.is_empty(), record.id()) {
            (true, Some(id)) => format!("#{id}"),
            _ => summary,
        }
    }
}
