//! Handle on an open modal.

use std::sync::Arc;
use std::sync::Mutex;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::form::ValidationResult;

/// Lifecycle phase of a modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalPhase {
    /// Waiting for the user.
    Open,
    /// A gateway call is running; the surface shows a loading state.
    Busy,
    /// Closed; no further outcomes are read.
    Closed,
}

#[derive(Debug, Clone, Copy)]
struct HandleState {
    phase: ModalPhase,
    /// Outcomes fully handled by the orchestrator so far.
    processed: u64,
}

/// Opaque reference to one open modal, shared between the orchestrator and
/// the surface presenting it.
///
/// The orchestrator drives the phase; the surface reads it to render the
/// busy state, validation errors and the last failure.
#[derive(Debug, Clone)]
pub struct ModalHandle {
    inner: Arc<HandleInner>,
}

#[derive(Debug)]
struct HandleInner {
    id: Uuid,
    state: watch::Sender<HandleState>,
    errors: Mutex<ValidationResult>,
    failure: Mutex<Option<String>>,
    token: CancellationToken,
}

impl ModalHandle {
    pub(crate) fn new() -> Self {
        Self {
            inner: Arc::new(HandleInner {
                id: Uuid::new_v4(),
                state: watch::Sender::new(HandleState {
                    phase: ModalPhase::Open,
                    processed: 0,
                }),
                errors: Mutex::new(ValidationResult::Valid),
                failure: Mutex::new(None),
                token: CancellationToken::new(),
            }),
        }
    }

    /// Unique id of this modal instance.
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn phase(&self) -> ModalPhase {
        self.inner.state.borrow().phase
    }

    pub fn is_busy(&self) -> bool {
        self.phase() == ModalPhase::Busy
    }

    pub fn is_closed(&self) -> bool {
        self.phase() == ModalPhase::Closed
    }

    /// Enters the busy state.
    pub fn show_loading(&self) {
        self.inner.state.send_if_modified(|s| {
            if s.phase == ModalPhase::Open {
                s.phase = ModalPhase::Busy;
                true
            } else {
                false
            }
        });
    }

    /// Leaves the busy state.
    pub fn hide_loading(&self) {
        self.inner.state.send_if_modified(|s| {
            if s.phase == ModalPhase::Busy {
                s.phase = ModalPhase::Open;
                true
            } else {
                false
            }
        });
    }

    /// Closes the modal and cancels any call still running for it.
    pub fn close(&self) {
        self.inner.token.cancel();
        self.inner.state.send_modify(|s| s.phase = ModalPhase::Closed);
    }

    /// Validation errors from the last submit.
    pub fn errors(&self) -> ValidationResult {
        self.inner.errors.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub(crate) fn set_errors(&self, errors: ValidationResult) {
        *self.inner.errors.lock().unwrap_or_else(|e| e.into_inner()) = errors;
    }

    /// The last failure surfaced to the user, if any.
    pub fn failure(&self) -> Option<String> {
        self.inner.failure.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub(crate) fn set_failure(&self, message: Option<String>) {
        *self.inner.failure.lock().unwrap_or_else(|e| e.into_inner()) = message;
    }

    pub(crate) fn token(&self) -> CancellationToken {
        self.inner.token.clone()
    }

    /// Number of outcomes the orchestrator has finished handling.
    pub fn processed(&self) -> u64 {
        self.inner.state.borrow().processed
    }

    pub(crate) fn mark_processed(&self) {
        self.inner.state.send_modify(|s| s.processed += 1);
    }

    /// Waits until the modal is idle: `count` outcomes have been handled and
    /// no gateway call is running.
    ///
    /// Returns `false` if the modal closed first.
    pub async fn wait_idle(&self, count: u64) -> bool {
        let mut rx = self.inner.state.subscribe();
        let result = rx
            .wait_for(|s| (s.processed >= count && s.phase == ModalPhase::Open) || s.phase == ModalPhase::Closed)
            .await;
        result.map(|s| s.phase != ModalPhase::Closed).unwrap_or(false)
    }

    /// Waits until a gateway call starts or `count` outcomes have been
    /// handled.
    ///
    /// Returns `false` if the modal closed first.
    pub async fn wait_busy_or_processed(&self, count: u64) -> bool {
        let mut rx = self.inner.state.subscribe();
        let result = rx
            .wait_for(|s| s.phase != ModalPhase::Open || s.processed >= count)
            .await;
        result.map(|s| s.phase != ModalPhase::Closed).unwrap_or(false)
    }
}

impl PartialEq for ModalHandle {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for ModalHandle {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_transitions() {
        let handle = ModalHandle::new();
        assert_eq!(handle.phase(), ModalPhase::Open);

        handle.show_loading();
        assert!(handle.is_busy());
        handle.hide_loading();
        assert_eq!(handle.phase(), ModalPhase::Open);

        handle.close();
        assert!(handle.is_closed());
        assert!(handle.token().is_cancelled());

        // Closed is terminal
        handle.show_loading();
        assert!(handle.is_closed());
    }

    #[tokio::test]
    async fn test_wait_idle() {
        let handle = ModalHandle::new();
        handle.mark_processed();
        assert!(handle.wait_idle(1).await);

        handle.close();
        assert!(!handle.wait_idle(5).await);
    }
}
