//! Column model

use crate::error::TableError;

/// Sort direction of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Ascending order (A-Z).
    Asc,
    /// Descending order (Z-A).
    Desc,
    /// Not sorted.
    #[default]
    None,
}

impl SortOrder {
    /// Direction after a header click: unsorted and descending columns go
    /// ascending, ascending columns go descending.
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc | SortOrder::None => SortOrder::Asc,
        }
    }

    /// Header marker for this direction.
    pub fn arrow(self) -> &'static str {
        match self {
            SortOrder::Asc => " ^",
            SortOrder::Desc => " v",
            SortOrder::None => "",
        }
    }

    /// Parses `asc`/`desc`/`none`, case-insensitively.
    pub fn parse(input: &str) -> Option<Self> {
        match input.to_ascii_lowercase().as_str() {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            "none" => Some(SortOrder::None),
            _ => None,
        }
    }
}

/// An entry in a row's action menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowActionKind {
    Edit,
    Delete,
}

/// A labelled row action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowAction {
    pub kind: RowActionKind,
    pub icon: String,
    pub title: String,
}

impl RowAction {
    pub fn new(kind: RowActionKind, icon: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            kind,
            icon: icon.into(),
            title: title.into(),
        }
    }
}

/// What a column renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnKind {
    /// The record's value at the column key, as a string.
    Text,
    /// A per-row menu of actions. Never sortable.
    Actions(Vec<RowAction>),
}

/// One displayable field of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub key: String,
    pub label: String,
    pub sortable: bool,
    pub order: SortOrder,
    pub kind: ColumnKind,
}

impl Column {
    /// A sortable text column.
    pub fn text(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            sortable: true,
            order: SortOrder::None,
            kind: ColumnKind::Text,
        }
    }

    /// An action menu column with no label.
    pub fn actions(key: impl Into<String>, actions: Vec<RowAction>) -> Self {
        Self {
            key: key.into(),
            label: String::new(),
            sortable: false,
            order: SortOrder::None,
            kind: ColumnKind::Actions(actions),
        }
    }

    /// Marks the column as not sortable.
    pub fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    /// Label with the sort marker appended.
    pub fn header(&self) -> String {
        format!("{}{}", self.label, self.order.arrow())
    }
}

/// The ordered columns of a table.
///
/// At most one column holds a direction other than [`SortOrder::None`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSet {
    columns: Vec<Column>,
}

impl ColumnSet {
    /// Builds a column set; any preset directions are cleared.
    pub fn new(columns: Vec<Column>) -> Self {
        let mut set = Self { columns };
        set.reset();
        set
    }

    pub fn iter(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.key == key)
    }

    /// The sorted column and its direction, if any.
    pub fn active(&self) -> Option<(&Column, SortOrder)> {
        self.columns
            .iter()
            .find(|c| c.order != SortOrder::None)
            .map(|c| (c, c.order))
    }

    /// The row actions offered by the first action column.
    pub fn row_actions(&self) -> &[RowAction] {
        self.columns
            .iter()
            .find_map(|c| match &c.kind {
                ColumnKind::Actions(actions) => Some(actions.as_slice()),
                ColumnKind::Text => None,
            })
            .unwrap_or(&[])
    }

    /// Sets `key` to `order` and every other column to `None`.
    pub fn activate(&mut self, key: &str, order: SortOrder) -> Result<(), TableError> {
        self.check_sortable(key)?;
        for column in &mut self.columns {
            column.order = if column.key == key { order } else { SortOrder::None };
        }
        Ok(())
    }

    /// Applies a header click on `key` and returns the new direction.
    pub fn toggle(&mut self, key: &str) -> Result<SortOrder, TableError> {
        let next = self.check_sortable(key)?.order.toggled();
        self.activate(key, next)?;
        Ok(next)
    }

    /// Clears every sort direction.
    pub fn reset(&mut self) {
        for column in &mut self.columns {
            column.order = SortOrder::None;
        }
    }

    fn check_sortable(&self, key: &str) -> Result<&Column, TableError> {
        let column = self
            .get(key)
            .ok_or_else(|| TableError::UnknownColumn(key.to_string()))?;
        if !column.sortable {
            return Err(TableError::NotSortable(key.to_string()));
        }
        Ok(column)
    }
}
