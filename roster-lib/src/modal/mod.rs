//! CRUD modals.
//!
//! A modal is described by a [`ModalRequest`], shown by a [`ModalSurface`],
//! and driven to completion by the [`ModalOrchestrator`], which turns the
//! user's terminal action into at most one gateway call and reports the
//! change the list must undergo as a [`ModalResult`].

mod flight;
mod handle;
mod orchestrator;
mod outcome;
mod scripted;
mod surface;

pub use flight::*;
pub use handle::*;
pub use orchestrator::*;
pub use outcome::*;
pub use scripted::*;
pub use surface::*;

use crate::form::FieldDescriptor;
use crate::model::Record;

/// What submitting the modal does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalKind {
    /// Create the item if it has no id, update it otherwise.
    Edit,
    /// Delete the item.
    ConfirmDelete,
}

/// Declarative description of a CRUD dialog.
#[derive(Debug, Clone)]
pub struct ModalRequest {
    pub title: String,
    /// The record being edited or deleted; empty for a create.
    pub item: Record,
    /// Inputs and buttons, in display order.
    pub fields: Vec<FieldDescriptor>,
    /// Persist through the gateway on submit.
    pub auto_save: bool,
    pub kind: ModalKind,
}

impl ModalRequest {
    /// An edit form for `item`.
    pub fn edit(title: impl Into<String>, item: Record, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            title: title.into(),
            item,
            fields,
            auto_save: true,
            kind: ModalKind::Edit,
        }
    }

    /// A delete confirmation for `item`.
    pub fn confirm_delete(title: impl Into<String>, item: Record, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            title: title.into(),
            item,
            fields,
            auto_save: true,
            kind: ModalKind::ConfirmDelete,
        }
    }

    /// Sets whether submit persists through the gateway.
    pub fn auto_save(mut self, auto_save: bool) -> Self {
        self.auto_save = auto_save;
        self
    }
}
