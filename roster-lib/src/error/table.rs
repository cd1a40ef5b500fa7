//! Table and modal error types

use super::GatewayError;
use crate::form::ValidationResult;
use crate::model::RecordId;

/// Errors surfaced by the table controller and the modal orchestrator.
///
/// None of these is fatal: the controller stays usable after any of them.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// The initial (or a user-requested) list fetch failed.
    #[error("failed to load records: {0}")]
    Load(#[source] GatewayError),

    /// A create, update or delete was rejected; the list is unchanged.
    #[error("failed to save changes: {0}")]
    Mutation(#[source] GatewayError),

    /// Submit was blocked before any gateway call.
    #[error("{} field(s) failed validation", .0.errors().len())]
    Validation(ValidationResult),

    /// Another modal is still open.
    #[error("another modal is already open")]
    ModalBusy,

    /// A gateway call for this record is still running.
    #[error("record {0} has an operation in flight")]
    RecordBusy(RecordId),

    /// No column with this key.
    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    /// The column exists but cannot be sorted.
    #[error("column '{0}' is not sortable")]
    NotSortable(String),

    /// The operation needs a persisted record.
    #[error("record has no id")]
    MissingId,
}

impl TableError {
    /// Returns the gateway error behind a load or mutation failure.
    pub fn gateway(&self) -> Option<&GatewayError> {
        match self {
            Self::Load(e) | Self::Mutation(e) => Some(e),
            _ => None,
        }
    }
}
