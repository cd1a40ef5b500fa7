//! Terminal user actions on a modal.

use tokio::sync::mpsc;

use super::ModalHandle;
use crate::model::Record;

/// Which button or gesture ended the interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKey {
    Submit,
    Cancel,
    /// Dismissed without choosing (close button, escape, backdrop).
    Close,
}

impl OutcomeKey {
    /// Maps a button field key (`submit`, `cancel`, `close`) to an outcome.
    pub fn from_button(key: &str) -> Option<Self> {
        match key {
            "submit" => Some(Self::Submit),
            "cancel" => Some(Self::Cancel),
            "close" => Some(Self::Close),
            _ => None,
        }
    }
}

/// A user action reported by the surface.
#[derive(Debug, Clone)]
pub struct ModalOutcome {
    pub key: OutcomeKey,
    /// The form's current values; only meaningful for a submit.
    pub values: Option<Record>,
    pub handle: ModalHandle,
}

impl ModalOutcome {
    pub fn submit(handle: ModalHandle, values: Record) -> Self {
        Self {
            key: OutcomeKey::Submit,
            values: Some(values),
            handle,
        }
    }

    pub fn cancel(handle: ModalHandle) -> Self {
        Self {
            key: OutcomeKey::Cancel,
            values: None,
            handle,
        }
    }

    pub fn close(handle: ModalHandle) -> Self {
        Self {
            key: OutcomeKey::Close,
            values: None,
            handle,
        }
    }
}

/// Sending half of a modal's outcome stream, held by the surface.
pub type OutcomeSender = mpsc::UnboundedSender<ModalOutcome>;

/// Receiving half of a modal's outcome stream, read by the orchestrator.
pub type OutcomeReceiver = mpsc::UnboundedReceiver<ModalOutcome>;

/// Creates an outcome stream.
pub fn outcome_channel() -> (OutcomeSender, OutcomeReceiver) {
    mpsc::unbounded_channel()
}
