//! List results

use serde::Deserialize;
use serde::Serialize;

use super::Record;

/// One page of records as reported by a gateway's `list` call.
///
/// `total` is the size of the whole remote collection and may exceed
/// `data.len()` when the backend paginates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListPage {
    #[serde(default)]
    pub data: Vec<Record>,
    #[serde(default)]
    pub total: Option<usize>,
}

impl ListPage {
    /// Creates a page with an explicit total.
    pub fn new(data: Vec<Record>, total: usize) -> Self {
        Self {
            data,
            total: Some(total),
        }
    }

    /// Returns the reported total, never less than the number of records held.
    ///
    /// Backends that omit the total are treated as unpaginated.
    pub fn total(&self) -> usize {
        self.total.unwrap_or(self.data.len()).max(self.data.len())
    }
}
