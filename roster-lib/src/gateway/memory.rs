//! In-process gateway backed by a vector.

use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::watch;

use super::RecordGateway;
use crate::error::GatewayError;
use crate::model::ListPage;
use crate::model::Record;
use crate::model::RecordId;

/// The four gateway calls, used to count calls and to inject failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Create,
    Update,
    Delete,
}

/// A collection held in memory.
///
/// Assigns increasing numeric ids on create. Failures can be injected per
/// operation, and every call can be held at a gate with [`pause`](Self::pause)
/// to observe the table while a call is in flight.
///
/// # Example
///
/// ```
/// use roster_lib::gateway::{InMemoryGateway, Operation};
/// use roster_lib::model::Record;
///
/// let gateway = InMemoryGateway::new(vec![Record::with_id(1).set("firstname", "Ana")]);
/// gateway.fail_next(Operation::Create, "backend down");
/// assert_eq!(gateway.len(), 1);
/// ```
#[derive(Debug)]
pub struct InMemoryGateway {
    records: Mutex<Vec<Record>>,
    next_id: AtomicI64,
    page_size: Option<usize>,
    failures: DashMap<Operation, String>,
    calls: DashMap<Operation, usize>,
    gate: watch::Sender<bool>,
}

impl InMemoryGateway {
    /// Creates a gateway holding `records` in list order.
    pub fn new(records: Vec<Record>) -> Self {
        let max_id = records
            .iter()
            .filter_map(|r| match r.id() {
                Some(RecordId::Number(n)) => Some(*n),
                _ => None,
            })
            .max()
            .unwrap_or(0);

        Self {
            records: Mutex::new(records),
            next_id: AtomicI64::new(max_id + 1),
            page_size: None,
            failures: DashMap::new(),
            calls: DashMap::new(),
            gate: watch::Sender::new(false),
        }
    }

    /// Limits `list` to the first `size` records; `total` still counts all.
    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = Some(size);
        self
    }

    /// Makes the next call of `op` fail with [`GatewayError::Unavailable`].
    pub fn fail_next(&self, op: Operation, message: impl Into<String>) {
        self.failures.insert(op, message.into());
    }

    /// Holds every call until [`resume`](Self::resume) is called.
    pub fn pause(&self) {
        self.gate.send_replace(true);
    }

    /// Releases held calls.
    pub fn resume(&self) {
        self.gate.send_replace(false);
    }

    /// Number of calls made for `op`, including failed ones.
    pub fn calls(&self, op: Operation) -> usize {
        self.calls.get(&op).map(|c| *c).unwrap_or(0)
    }

    /// Returns a copy of the stored records.
    pub fn records(&self) -> Vec<Record> {
        self.lock().clone()
    }

    /// Returns the number of stored records.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Record>> {
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Counts the call, waits at the gate and applies an injected failure.
    async fn enter(&self, op: Operation) -> Result<(), GatewayError> {
        *self.calls.entry(op).or_insert(0) += 1;

        let mut gate = self.gate.subscribe();
        // The sender lives in self, so the channel cannot close here
        let _ = gate.wait_for(|paused| !*paused).await;

        match self.failures.remove(&op) {
            Some((_, message)) => Err(GatewayError::Unavailable(message)),
            None => Ok(()),
        }
    }
}

impl Default for InMemoryGateway {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl RecordGateway for InMemoryGateway {
    async fn list(&self) -> Result<ListPage, GatewayError> {
        self.enter(Operation::List).await?;

        let records = self.lock();
        let shown = self.page_size.unwrap_or(records.len()).min(records.len());
        Ok(ListPage::new(records[..shown].to_vec(), records.len()))
    }

    async fn create(&self, record: &Record) -> Result<Record, GatewayError> {
        self.enter(Operation::Create).await?;

        let mut created = record.clone();
        created.set_id(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.lock().insert(0, created.clone());
        Ok(created)
    }

    async fn update(&self, record: &Record) -> Result<Record, GatewayError> {
        self.enter(Operation::Update).await?;

        let id = record
            .id()
            .ok_or_else(|| GatewayError::Rejected("record has no id".to_string()))?;
        let mut records = self.lock();
        let stored = records
            .iter_mut()
            .find(|r| r.id() == Some(id))
            .ok_or_else(|| GatewayError::NotFound(id.clone()))?;
        *stored = record.clone();
        Ok(stored.clone())
    }

    async fn delete(&self, id: &RecordId) -> Result<(), GatewayError> {
        self.enter(Operation::Delete).await?;

        let mut records = self.lock();
        let before = records.len();
        records.retain(|r| r.id() != Some(id));
        if records.len() == before {
            return Err(GatewayError::NotFound(id.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> InMemoryGateway {
        InMemoryGateway::new(vec![
            Record::with_id(1).set("firstname", "Ana"),
            Record::with_id(2).set("firstname", "Bo"),
        ])
    }

    #[tokio::test]
    async fn test_create_assigns_next_id() {
        let gateway = seeded();
        let created = gateway.create(&Record::new().set("firstname", "Cy")).await.unwrap();

        assert_eq!(created.id(), Some(&RecordId::Number(3)));
        assert_eq!(gateway.len(), 3);
    }

    #[tokio::test]
    async fn test_page_size_keeps_total() {
        let gateway = seeded().with_page_size(1);
        let page = gateway.list().await.unwrap();

        assert_eq!(page.data.len(), 1);
        assert_eq!(page.total(), 2);
    }

    #[tokio::test]
    async fn test_injected_failure_is_one_shot() {
        let gateway = seeded();
        gateway.fail_next(Operation::Delete, "nope");

        let id = RecordId::Number(1);
        assert!(matches!(gateway.delete(&id).await, Err(GatewayError::Unavailable(_))));
        assert!(gateway.delete(&id).await.is_ok());
        assert_eq!(gateway.calls(Operation::Delete), 2);
    }

    #[tokio::test]
    async fn test_update_unknown_record() {
        let gateway = seeded();
        let err = gateway.update(&Record::with_id(9)).await.unwrap_err();
        assert!(matches!(err, GatewayError::NotFound(RecordId::Number(9))));
    }
}
