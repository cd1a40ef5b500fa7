//! A modal surface that replays prepared user actions.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::MutexGuard;

use super::ModalHandle;
use super::ModalOutcome;
use super::ModalRequest;
use super::ModalSurface;
use super::OutcomeKey;
use super::OutcomeReceiver;
use super::outcome_channel;
use crate::model::Record;

/// One scripted user action.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Press submit with these form values.
    Submit(Record),
    /// Press cancel.
    Cancel,
    /// Dismiss the modal.
    Close,
    /// Press `Cancel` or `Close` as soon as the previous submit is running,
    /// without waiting for its result.
    Interrupt(OutcomeKey),
}

impl Step {
    fn outcome(&self, handle: &ModalHandle) -> ModalOutcome {
        match self {
            Step::Submit(values) => ModalOutcome::submit(handle.clone(), values.clone()),
            Step::Cancel | Step::Interrupt(OutcomeKey::Cancel) => ModalOutcome::cancel(handle.clone()),
            Step::Close | Step::Interrupt(_) => ModalOutcome::close(handle.clone()),
        }
    }
}

/// Replays one queued script per presented modal.
///
/// Each step waits until the modal is idle again, so a failed submit is
/// reported on the handle before the next step runs. When a script runs out
/// while the modal is still open the outcome stream is dropped, which the
/// orchestrator treats as a close. A modal presented with no script queued is
/// closed the same way.
///
/// # Example
///
/// ```
/// use roster_lib::modal::{ScriptedSurface, Step};
/// use roster_lib::model::Record;
///
/// let surface = ScriptedSurface::new();
/// surface.push_script(vec![
///     Step::Submit(Record::new().set("firstname", "")),
///     Step::Submit(Record::new().set("firstname", "Cy")),
/// ]);
/// ```
#[derive(Debug, Default)]
pub struct ScriptedSurface {
    scripts: Mutex<VecDeque<Vec<Step>>>,
    presented: Mutex<Vec<(ModalRequest, ModalHandle)>>,
}

impl ScriptedSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the steps for the next presented modal.
    pub fn push_script(&self, steps: Vec<Step>) {
        lock(&self.scripts).push_back(steps);
    }

    /// Drops every queued script.
    pub fn clear(&self) {
        lock(&self.scripts).clear();
    }

    /// Requests presented so far, oldest first.
    pub fn presented(&self) -> Vec<ModalRequest> {
        lock(&self.presented).iter().map(|(r, _)| r.clone()).collect()
    }

    /// Handle of the most recently presented modal.
    pub fn last_handle(&self) -> Option<ModalHandle> {
        lock(&self.presented).last().map(|(_, h)| h.clone())
    }
}

impl ModalSurface for ScriptedSurface {
    fn present(&self, request: &ModalRequest, handle: ModalHandle) -> OutcomeReceiver {
        let (tx, rx) = outcome_channel();
        lock(&self.presented).push((request.clone(), handle.clone()));

        let Some(steps) = lock(&self.scripts).pop_front() else {
            log::debug!("no script for modal '{}', closing", request.title);
            return rx;
        };

        tokio::spawn(async move {
            let mut sent = 0;
            for step in steps {
                if sent > 0 {
                    let open = match step {
                        Step::Interrupt(_) => handle.wait_busy_or_processed(sent).await,
                        _ => handle.wait_idle(sent).await,
                    };
                    if !open {
                        return;
                    }
                }
                if tx.send(step.outcome(&handle)).is_err() {
                    return;
                }
                sent += 1;
            }

            // keep the stream open until the last step has been handled
            if sent > 0 {
                handle.wait_idle(sent).await;
            }
        });

        rx
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
