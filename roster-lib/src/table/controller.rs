//! Table controller

use std::sync::Arc;

use tokio::sync::watch;

use super::ColumnSet;
use super::ListState;
use super::ListStore;
use super::ListView;
use super::SortOrder;
use super::TableAction;
use super::TableConfig;
use super::TableStatus;
use crate::error::TableError;
use crate::form::FieldDescriptor;
use crate::gateway::RecordGateway;
use crate::modal::ModalOrchestrator;
use crate::modal::ModalRequest;
use crate::modal::ModalResult;
use crate::modal::ModalSurface;
use crate::model::Record;

/// What a handled [`TableAction`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    /// The list was reordered.
    Sorted { column: String, order: SortOrder },
    /// A modal resolved. `failure` is the last error shown in it, if any.
    Modal {
        result: ModalResult,
        failure: Option<String>,
    },
}

/// Owns a table's list and columns and applies user actions to them.
///
/// The list is published through a [`ListView`]; only the controller
/// mutates it, and only with results the backend confirmed.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use roster_lib::gateway::InMemoryGateway;
/// use roster_lib::modal::ScriptedSurface;
/// use roster_lib::table::{TableAction, TableConfig, TableController};
///
/// # async fn run() -> Result<(), roster_lib::error::TableError> {
/// let controller = TableController::new(
///     TableConfig::clients(),
///     Arc::new(InMemoryGateway::new(Vec::new())),
///     Arc::new(ScriptedSurface::new()),
/// );
/// controller.initialize().await?;
/// controller.handle_action(TableAction::click_order("firstname")).await?;
/// # Ok(())
/// # }
/// ```
pub struct TableController {
    config: TableConfig,
    gateway: Arc<dyn RecordGateway>,
    columns: watch::Sender<ColumnSet>,
    store: ListStore,
    status: watch::Sender<TableStatus>,
    orchestrator: ModalOrchestrator,
}

impl TableController {
    pub fn new(config: TableConfig, gateway: Arc<dyn RecordGateway>, surface: Arc<dyn ModalSurface>) -> Self {
        let columns = ColumnSet::new(config.columns.clone());
        Self {
            orchestrator: ModalOrchestrator::new(Arc::clone(&gateway), surface),
            config,
            gateway,
            columns: watch::Sender::new(columns),
            store: ListStore::new(),
            status: watch::Sender::new(TableStatus::Loading),
        }
    }

    /// Fetches the list from the gateway.
    ///
    /// On failure the list is emptied and the status set to
    /// [`TableStatus::Failed`]; nothing is retried.
    pub async fn initialize(&self) -> Result<(), TableError> {
        self.status.send_replace(TableStatus::Loading);

        match self.gateway.list().await {
            Ok(page) => {
                let total = page.total();
                self.store.replace_all(page.data, total);
                // keep the user's sort across reloads
                if let Some((key, order)) = self.active_sort() {
                    self.store.sort(&key, order);
                }
                let state = self.store.snapshot();
                log::debug!("{}: loaded {} of {} records", self.config.id, state.len(), state.total());
                self.status.send_replace(TableStatus::Ready);
                Ok(())
            }
            Err(e) => {
                let err = TableError::Load(e);
                log::warn!("{}: {err}", self.config.id);
                self.store.clear();
                self.status.send_replace(TableStatus::Failed(err.to_string()));
                Err(err)
            }
        }
    }

    /// Fetches the list again.
    pub async fn reload(&self) -> Result<(), TableError> {
        self.initialize().await
    }

    /// Applies one user action.
    pub async fn handle_action(&self, action: TableAction) -> Result<ActionOutcome, TableError> {
        match action {
            TableAction::ClickOrder { column } => {
                let mut toggled = Ok(SortOrder::None);
                self.columns.send_if_modified(|set| {
                    toggled = set.toggle(&column);
                    toggled.is_ok()
                });
                let order = toggled?;
                self.store.sort(&column, order);
                log::debug!("{}: sorted by {column} {order:?}", self.config.id);
                Ok(ActionOutcome::Sorted { column, order })
            }
            TableAction::Sort { column, order } => self.sort(column, order),
            TableAction::Edit { item } => {
                let request = self.edit_request(item.unwrap_or_default());
                self.run_modal(request).await
            }
            TableAction::Delete { item } => {
                let request = self.delete_request(item);
                self.run_modal(request).await
            }
        }
    }

    /// Sorts by `column` in an explicit direction.
    pub fn sort(&self, column: String, order: SortOrder) -> Result<ActionOutcome, TableError> {
        let mut activated = Ok(());
        self.columns.send_if_modified(|set| {
            activated = set.activate(&column, order);
            activated.is_ok()
        });
        activated?;
        self.store.sort(&column, order);
        log::debug!("{}: sorted by {column} {order:?}", self.config.id);
        Ok(ActionOutcome::Sorted { column, order })
    }

    /// Builds the add/edit form for `item`.
    pub fn edit_request(&self, item: Record) -> ModalRequest {
        let title = if item.is_new() {
            format!("Add {}", self.config.entity)
        } else {
            format!("Edit {}", self.config.entity)
        };

        let mut fields = self.config.form_fields.clone();
        fields.push(FieldDescriptor::button("submit", title.clone()));
        fields.push(FieldDescriptor::button("close", "Close"));

        ModalRequest::edit(title, item, fields).auto_save(self.config.auto_save)
    }

    /// Builds the delete confirmation for `item`.
    pub fn delete_request(&self, item: Record) -> ModalRequest {
        let title = format!(
            "Are you sure you want to delete the {} {}?",
            self.config.entity,
            self.config.summarize(&item)
        );
        let fields = vec![
            FieldDescriptor::button("submit", "Delete"),
            FieldDescriptor::button("cancel", "Cancel"),
        ];

        ModalRequest::confirm_delete(title, item, fields)
    }

    /// Returns a read-only view of the list.
    pub fn subscribe(&self) -> ListView {
        self.store.subscribe()
    }

    /// Returns a receiver for the load status.
    pub fn status(&self) -> watch::Receiver<TableStatus> {
        self.status.subscribe()
    }

    /// Returns the current columns.
    pub fn columns(&self) -> ColumnSet {
        self.columns.borrow().clone()
    }

    /// Returns the current list.
    pub fn state(&self) -> Arc<ListState> {
        self.store.snapshot()
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Waits for gateway calls of dismissed modals to finish.
    pub async fn flush(&self) {
        self.orchestrator.flush().await;
    }

    async fn run_modal(&self, request: ModalRequest) -> Result<ActionOutcome, TableError> {
        let completion = self.orchestrator.open(request).await?;
        self.apply(&completion.result);

        if completion.result.is_mutation() && !self.config.settle_delay.is_zero() {
            tokio::time::sleep(self.config.settle_delay).await;
        }

        Ok(ActionOutcome::Modal {
            failure: completion.handle.failure(),
            result: completion.result,
        })
    }

    fn apply(&self, result: &ModalResult) {
        match result {
            ModalResult::Created(record) => self.store.insert_head(record.clone()),
            ModalResult::Updated(record) => {
                if !self.store.replace(record.clone()) {
                    log::debug!("{}: updated record is not on the loaded page", self.config.id);
                }
            }
            ModalResult::Deleted(id) => {
                if !self.store.remove(id) {
                    log::debug!("{}: deleted record {id} is not on the loaded page", self.config.id);
                }
            }
            ModalResult::Submitted(_) | ModalResult::Dismissed => {}
        }
    }

    fn active_sort(&self) -> Option<(String, SortOrder)> {
        self.columns.borrow().active().map(|(c, order)| (c.key.clone(), order))
    }
}
