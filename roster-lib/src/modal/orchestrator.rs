//! Drives a modal from presentation to a single result.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::FlightGuard;
use super::InFlight;
use super::ModalHandle;
use super::ModalKind;
use super::ModalRequest;
use super::ModalSurface;
use super::OutcomeKey;
use super::OutcomeReceiver;
use crate::error::GatewayError;
use crate::error::TableError;
use crate::form::Validator;
use crate::gateway::RecordGateway;
use crate::model::Record;
use crate::model::RecordId;

/// The change a resolved modal asks the list to undergo.
#[derive(Debug, Clone, PartialEq)]
pub enum ModalResult {
    /// The backend created this record; it carries the assigned id.
    Created(Record),
    /// The backend stored this version of an existing record.
    Updated(Record),
    /// The backend removed the record with this id.
    Deleted(RecordId),
    /// Validated values of a form that does not persist on its own.
    Submitted(Record),
    /// Cancelled or closed without a change.
    Dismissed,
}

impl ModalResult {
    /// Returns `true` if the backend changed the collection.
    pub fn is_mutation(&self) -> bool {
        matches!(self, Self::Created(_) | Self::Updated(_) | Self::Deleted(_))
    }
}

/// A resolved modal and the handle it was shown with.
#[derive(Debug)]
pub struct ModalCompletion {
    pub result: ModalResult,
    pub handle: ModalHandle,
}

type CallTask = JoinHandle<Option<Result<ModalResult, GatewayError>>>;

enum Call {
    Create(Record),
    Update(Record),
    Delete(RecordId),
}

impl Call {
    async fn run(self, gateway: &dyn RecordGateway) -> Result<ModalResult, GatewayError> {
        match self {
            Call::Create(record) => gateway.create(&record).await.map(ModalResult::Created),
            Call::Update(record) => gateway.update(&record).await.map(ModalResult::Updated),
            Call::Delete(id) => {
                gateway.delete(&id).await?;
                Ok(ModalResult::Deleted(id))
            }
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Call::Create(_) => "create",
            Call::Update(_) => "update",
            Call::Delete(_) => "delete",
        }
    }
}

enum Waited {
    Finished(Result<ModalResult, GatewayError>),
    Dismissed,
}

/// Presents modals and turns their outcomes into gateway calls.
///
/// Only one modal may be open at a time, and a record stays claimed while a
/// modal or a gateway call for it is alive. Calls run on spawned tasks; when
/// the user dismisses a modal mid-call the task is detached and its result
/// discarded once it arrives.
pub struct ModalOrchestrator {
    gateway: Arc<dyn RecordGateway>,
    surface: Arc<dyn ModalSurface>,
    in_flight: InFlight,
    active: AtomicBool,
    detached: Mutex<Vec<CallTask>>,
}

impl ModalOrchestrator {
    pub fn new(gateway: Arc<dyn RecordGateway>, surface: Arc<dyn ModalSurface>) -> Self {
        Self {
            gateway,
            surface,
            in_flight: InFlight::new(),
            active: AtomicBool::new(false),
            detached: Mutex::new(Vec::new()),
        }
    }

    /// Presents `request` and waits until it resolves.
    ///
    /// Validation and gateway failures keep the modal open and are reported
    /// on its handle; the returned result is always the final one.
    pub async fn open(&self, request: ModalRequest) -> Result<ModalCompletion, TableError> {
        let _slot = Slot::claim(&self.active)?;

        if request.kind == ModalKind::ConfirmDelete && request.item.is_new() {
            return Err(TableError::MissingId);
        }

        let handle = ModalHandle::new();
        let flight = match request.item.id() {
            Some(id) => Some(Arc::new(self.in_flight.try_acquire(id, handle.id())?)),
            None => None,
        };

        log::debug!("modal {} opened: {}", handle.id(), request.title);
        let mut outcomes = self.surface.present(&request, handle.clone());
        let result = self.drive(&request, &handle, &mut outcomes, flight).await;
        handle.close();

        let result = result?;
        log::debug!("modal {} resolved: {:?}", handle.id(), result);
        Ok(ModalCompletion { result, handle })
    }

    /// Waits for every detached gateway call to finish.
    pub async fn flush(&self) {
        let tasks = std::mem::take(&mut *self.detached.lock().unwrap_or_else(|e| e.into_inner()));
        for task in tasks {
            let _ = task.await;
        }
    }

    async fn drive(
        &self,
        request: &ModalRequest,
        handle: &ModalHandle,
        outcomes: &mut OutcomeReceiver,
        flight: Option<Arc<FlightGuard>>,
    ) -> Result<ModalResult, TableError> {
        let validator = Validator::new(&request.fields);

        loop {
            let Some(outcome) = outcomes.recv().await else {
                log::debug!("modal {}: outcome stream ended", handle.id());
                return Ok(ModalResult::Dismissed);
            };
            if outcome.key != OutcomeKey::Submit {
                return Ok(ModalResult::Dismissed);
            }

            let mut record = request.item.clone();
            if let Some(values) = &outcome.values {
                record.merge(values);
            }

            let errors = validator.validate(&record);
            handle.set_errors(errors.clone());
            if errors.is_invalid() {
                log::debug!("modal {}: {}", handle.id(), TableError::Validation(errors));
                handle.mark_processed();
                continue;
            }

            let call = match (request.kind, record.id().cloned()) {
                (ModalKind::Edit, _) if !request.auto_save => return Ok(ModalResult::Submitted(record)),
                (ModalKind::Edit, None) => Call::Create(record),
                (ModalKind::Edit, Some(_)) => Call::Update(record),
                (ModalKind::ConfirmDelete, Some(id)) => Call::Delete(id),
                (ModalKind::ConfirmDelete, None) => return Err(TableError::MissingId),
            };

            handle.set_failure(None);
            handle.show_loading();
            let name = call.name();
            let task = self.spawn(call, handle, flight.clone());

            match self.wait(task, handle, outcomes).await {
                Waited::Finished(Ok(result)) => return Ok(result),
                Waited::Finished(Err(e)) => {
                    let err = TableError::Mutation(e);
                    log::warn!("modal {}: {name} failed: {err}", handle.id());
                    handle.set_failure(Some(err.to_string()));
                    handle.hide_loading();
                    handle.mark_processed();
                }
                Waited::Dismissed => return Ok(ModalResult::Dismissed),
            }
        }
    }

    fn spawn(&self, call: Call, handle: &ModalHandle, flight: Option<Arc<FlightGuard>>) -> CallTask {
        let gateway = Arc::clone(&self.gateway);
        let token: CancellationToken = handle.token();
        let modal = handle.id();

        tokio::spawn(async move {
            let _flight = flight;
            let name = call.name();
            let result = call.run(gateway.as_ref()).await;
            if token.is_cancelled() {
                log::debug!("modal {modal}: discarding late {name} result ({})", describe(&result));
                return None;
            }
            Some(result)
        })
    }

    /// Waits for `task` while watching for a dismissal.
    ///
    /// Only an explicit cancel or close dismisses; a stream that ends after
    /// the submit leaves the call to finish.
    async fn wait(&self, mut task: CallTask, handle: &ModalHandle, outcomes: &mut OutcomeReceiver) -> Waited {
        let mut listening = true;
        loop {
            tokio::select! {
                joined = &mut task => {
                    return match joined {
                        Ok(Some(result)) => Waited::Finished(result),
                        Ok(None) => Waited::Dismissed,
                        Err(e) => Waited::Finished(Err(GatewayError::Unavailable(format!("gateway task failed: {e}")))),
                    };
                }
                outcome = outcomes.recv(), if listening => match outcome.map(|o| o.key) {
                    Some(OutcomeKey::Submit) => {
                        log::debug!("modal {}: submit ignored while busy", handle.id());
                    }
                    Some(_) => break,
                    None => listening = false,
                }
            }
        }

        log::debug!("modal {}: dismissed while busy", handle.id());
        handle.close();
        self.detach(task);
        Waited::Dismissed
    }

    fn detach(&self, task: CallTask) {
        let mut detached = self.detached.lock().unwrap_or_else(|e| e.into_inner());
        detached.retain(|t| !t.is_finished());
        detached.push(task);
    }
}

fn describe(result: &Result<ModalResult, GatewayError>) -> String {
    match result {
        Ok(result) => format!("{result:?}"),
        Err(e) => e.to_string(),
    }
}

/// Marks the single modal slot as taken until dropped.
struct Slot<'a>(&'a AtomicBool);

impl<'a> Slot<'a> {
    fn claim(active: &'a AtomicBool) -> Result<Self, TableError> {
        active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| TableError::ModalBusy)?;
        Ok(Self(active))
    }
}

impl Drop for Slot<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
