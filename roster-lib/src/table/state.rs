//! The displayed collection and its owner.

use std::collections::HashSet;
use std::sync::Arc;

use futures::Stream;
use tokio::sync::watch;

use super::SortOrder;
use super::sort;
use crate::model::Record;
use crate::model::RecordId;

/// The ordered records currently shown, plus the size of the whole
/// remote collection.
///
/// `total` never drops below `items.len()`; it exceeds it when the backend
/// paginates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListState {
    items: Vec<Record>,
    total: usize,
}

impl ListState {
    /// Builds a state for display; `total` is raised to the item count.
    pub fn new(items: Vec<Record>, total: usize) -> Self {
        let total = total.max(items.len());
        Self { items, total }
    }

    pub fn items(&self) -> &[Record] {
        &self.items
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the record with the given id.
    pub fn get(&self, id: &RecordId) -> Option<&Record> {
        self.items.iter().find(|r| r.id() == Some(id))
    }

    /// Returns the row index of the record with the given id.
    pub fn position(&self, id: &RecordId) -> Option<usize> {
        self.items.iter().position(|r| r.id() == Some(id))
    }
}

/// Load status of the table, published next to the list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TableStatus {
    /// Nothing fetched yet, or a fetch is running.
    #[default]
    Loading,
    /// The list reflects the last successful fetch.
    Ready,
    /// The last fetch failed; the list is empty.
    Failed(String),
}

/// Single owner of the [`ListState`].
///
/// Every mutation publishes the new state to all [`ListView`]s. Readers hold
/// `Arc` snapshots, so a mutation clones the items only while an older
/// snapshot is still referenced.
#[derive(Debug)]
pub struct ListStore {
    tx: watch::Sender<Arc<ListState>>,
}

impl ListStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            tx: watch::Sender::new(Arc::new(ListState::default())),
        }
    }

    /// Returns the current state.
    pub fn snapshot(&self) -> Arc<ListState> {
        Arc::clone(&self.tx.borrow())
    }

    /// Returns a read-only view that observes every published state.
    pub fn subscribe(&self) -> ListView {
        ListView {
            rx: self.tx.subscribe(),
        }
    }

    /// Replaces the whole list, dropping records with an id seen earlier.
    pub(crate) fn replace_all(&self, items: Vec<Record>, total: usize) {
        let mut seen = HashSet::new();
        let items: Vec<Record> = items
            .into_iter()
            .filter(|r| match r.id() {
                Some(id) => seen.insert(id.clone()),
                None => true,
            })
            .collect();
        self.tx.send_replace(Arc::new(ListState::new(items, total)));
    }

    /// Empties the list.
    pub(crate) fn clear(&self) {
        self.tx.send_replace(Arc::new(ListState::default()));
    }

    /// Puts a record at the head of the list.
    ///
    /// An existing row with the same id is removed first, so the record is
    /// present exactly once; `total` only grows for a new identity.
    pub(crate) fn insert_head(&self, record: Record) {
        self.tx.send_modify(|state| {
            let state = Arc::make_mut(state);
            let existing = record.id().and_then(|id| state.position(id));
            match existing {
                Some(index) => {
                    state.items.remove(index);
                }
                None => state.total += 1,
            }
            state.items.insert(0, record);
            state.total = state.total.max(state.items.len());
        });
    }

    /// Replaces the row with the same id in place.
    ///
    /// Returns `false` (and publishes nothing) when no row matches.
    pub(crate) fn replace(&self, record: Record) -> bool {
        let Some(id) = record.id().cloned() else {
            return false;
        };
        self.tx.send_if_modified(|state| match state.position(&id) {
            Some(index) => {
                Arc::make_mut(state).items[index] = record;
                true
            }
            None => false,
        })
    }

    /// Removes the row with the given id and decrements `total`.
    ///
    /// The backend confirmed the delete, so `total` shrinks even when the
    /// row was not on the loaded page.
    pub(crate) fn remove(&self, id: &RecordId) -> bool {
        let mut removed = false;
        self.tx.send_modify(|state| {
            let state = Arc::make_mut(state);
            if let Some(index) = state.position(id) {
                state.items.remove(index);
                removed = true;
            }
            state.total = state.total.saturating_sub(1).max(state.items.len());
        });
        removed
    }

    /// Reorders the rows by `key`.
    pub(crate) fn sort(&self, key: &str, order: SortOrder) {
        self.tx.send_modify(|state| {
            sort::sort_in_place(&mut Arc::make_mut(state).items, key, order);
        });
    }
}

impl Default for ListStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only handle on the published [`ListState`].
#[derive(Debug, Clone)]
pub struct ListView {
    rx: watch::Receiver<Arc<ListState>>,
}

impl ListView {
    /// Returns the latest published state and marks it seen.
    pub fn current(&mut self) -> Arc<ListState> {
        Arc::clone(&self.rx.borrow_and_update())
    }

    /// Waits for a state newer than the last one seen.
    ///
    /// Returns `None` once the owning controller is gone.
    pub async fn changed(&mut self) -> Option<Arc<ListState>> {
        self.rx.changed().await.ok()?;
        Some(self.current())
    }

    /// Yields the current state, then every newly published one.
    ///
    /// Intermediate states may be skipped if the consumer falls behind; the
    /// latest one is always delivered.
    pub fn into_stream(mut self) -> impl Stream<Item = Arc<ListState>> {
        async_stream::stream! {
            yield self.current();
            while let Some(state) = self.changed().await {
                yield state;
            }
        }
    }
}
