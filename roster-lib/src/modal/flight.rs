//! Per-record registry of running gateway calls.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use uuid::Uuid;

use crate::error::TableError;
use crate::model::RecordId;

/// Records that have a modal open or a gateway call running, keyed by id and
/// mapped to the modal that owns them.
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    map: Arc<DashMap<RecordId, Uuid>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `id` for the modal `owner`.
    ///
    /// The claim lasts until the returned guard and all its clones are
    /// dropped, which may be after the modal itself is closed.
    pub fn try_acquire(&self, id: &RecordId, owner: Uuid) -> Result<FlightGuard, TableError> {
        match self.map.entry(id.clone()) {
            Entry::Occupied(_) => Err(TableError::RecordBusy(id.clone())),
            Entry::Vacant(entry) => {
                entry.insert(owner);
                Ok(FlightGuard {
                    map: Arc::clone(&self.map),
                    id: id.clone(),
                    owner,
                })
            }
        }
    }

    pub fn is_busy(&self, id: &RecordId) -> bool {
        self.map.contains_key(id)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Releases a record claim on drop.
#[derive(Debug)]
pub struct FlightGuard {
    map: Arc<DashMap<RecordId, Uuid>>,
    id: RecordId,
    owner: Uuid,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.map.remove_if(&self.id, |_, owner| *owner == self.owner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_is_exclusive_until_dropped() {
        let flights = InFlight::new();
        let id = RecordId::Number(7);

        let guard = flights.try_acquire(&id, Uuid::new_v4()).unwrap();
        assert!(flights.is_busy(&id));
        assert!(matches!(
            flights.try_acquire(&id, Uuid::new_v4()),
            Err(TableError::RecordBusy(RecordId::Number(7)))
        ));

        // other records are unaffected
        assert!(flights.try_acquire(&RecordId::Number(8), Uuid::new_v4()).is_ok());

        drop(guard);
        assert!(!flights.is_busy(&id));
        assert!(flights.is_empty());
    }

    #[test]
    fn test_shared_guard_holds_claim() {
        let flights = InFlight::new();
        let id = RecordId::from("abc");

        let guard = Arc::new(flights.try_acquire(&id, Uuid::new_v4()).unwrap());
        let task_copy = Arc::clone(&guard);
        drop(guard);
        assert!(flights.is_busy(&id));

        drop(task_copy);
        assert!(!flights.is_busy(&id));
    }
}
