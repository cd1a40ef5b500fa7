//! User actions emitted by the rendering surface.

use super::RowActionKind;
use super::SortOrder;
use crate::model::Record;

/// An action the rendering surface sends to the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum TableAction {
    /// A click on a column header: flips that column's direction.
    ClickOrder { column: String },
    /// Sorts by a column in an explicit direction.
    Sort { column: String, order: SortOrder },
    /// Opens the edit form; `None` opens it for a new record.
    Edit { item: Option<Record> },
    /// Asks for confirmation, then deletes the record.
    Delete { item: Record },
}

impl TableAction {
    pub fn click_order(column: impl Into<String>) -> Self {
        Self::ClickOrder { column: column.into() }
    }

    pub fn sort(column: impl Into<String>, order: SortOrder) -> Self {
        Self::Sort {
            column: column.into(),
            order,
        }
    }

    pub fn create() -> Self {
        Self::Edit { item: None }
    }

    pub fn edit(item: Record) -> Self {
        Self::Edit { item: Some(item) }
    }

    pub fn delete(item: Record) -> Self {
        Self::Delete { item }
    }

    /// Maps an entry of a row's action menu to the action it triggers.
    pub fn from_row(kind: RowActionKind, item: Record) -> Self {
        match kind {
            RowActionKind::Edit => Self::edit(item),
            RowActionKind::Delete => Self::delete(item),
        }
    }
}
