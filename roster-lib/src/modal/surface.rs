//! The collaborator that renders modals.

use super::ModalHandle;
use super::ModalRequest;
use super::OutcomeReceiver;

/// Presents modals to the user and reports what they do.
///
/// The surface renders `request`, keeps its inputs and buttons in sync with
/// `handle` (busy state, validation errors, last failure), and sends a
/// [`ModalOutcome`](super::ModalOutcome) for every button press. The stream
/// should stay open until the handle is closed; dropping the sender early
/// counts as a close, unless a gateway call is running, which then finishes
/// and resolves the modal.
pub trait ModalSurface: Send + Sync {
    fn present(&self, request: &ModalRequest, handle: ModalHandle) -> OutcomeReceiver;
}
