//! End-to-end behavior of the table controller against the in-memory
//! gateway and a scripted modal surface.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use roster_lib::error::GatewayError;
use roster_lib::error::TableError;
use roster_lib::gateway::InMemoryGateway;
use roster_lib::gateway::Operation;
use roster_lib::modal::ModalHandle;
use roster_lib::modal::ModalOutcome;
use roster_lib::modal::ModalRequest;
use roster_lib::modal::ModalResult;
use roster_lib::modal::ModalSurface;
use roster_lib::modal::OutcomeKey;
use roster_lib::modal::OutcomeReceiver;
use roster_lib::modal::ScriptedSurface;
use roster_lib::modal::Step;
use roster_lib::modal::outcome_channel;
use roster_lib::model::Record;
use roster_lib::model::RecordId;
use roster_lib::table::ActionOutcome;
use roster_lib::table::SortOrder;
use roster_lib::table::TableAction;
use roster_lib::table::TableConfig;
use roster_lib::table::TableController;
use roster_lib::table::TableStatus;

fn ana() -> Record {
    Record::with_id(1)
        .set("firstname", "Ana")
        .set("lastname", "Lopez")
        .set("email", "ana@x.com")
}

fn bo() -> Record {
    Record::with_id(2)
        .set("firstname", "Bo")
        .set("lastname", "Berg")
        .set("email", "bo@x.com")
}

fn cy() -> Record {
    Record::new()
        .set("firstname", "Cy")
        .set("lastname", "Z")
        .set("email", "c@x.com")
}

struct Fixture {
    gateway: Arc<InMemoryGateway>,
    surface: Arc<ScriptedSurface>,
    controller: TableController,
}

fn fixture(gateway: InMemoryGateway) -> Fixture {
    let gateway = Arc::new(gateway);
    let surface = Arc::new(ScriptedSurface::new());
    let config = TableConfig::clients().with_settle_delay(Duration::ZERO);
    let controller = TableController::new(config, gateway.clone(), surface.clone());
    Fixture {
        gateway,
        surface,
        controller,
    }
}

async fn loaded() -> Fixture {
    let f = fixture(InMemoryGateway::new(vec![ana(), bo()]));
    f.controller.initialize().await.unwrap();
    f
}

/// Sends every submit as soon as the modal is shown, then hangs up.
struct BurstSurface {
    submits: Vec<Record>,
}

impl ModalSurface for BurstSurface {
    fn present(&self, _request: &ModalRequest, handle: ModalHandle) -> OutcomeReceiver {
        let (tx, rx) = outcome_channel();
        for values in &self.submits {
            let _ = tx.send(ModalOutcome::submit(handle.clone(), values.clone()));
        }
        rx
    }
}

fn burst(submits: Vec<Record>) -> (Arc<InMemoryGateway>, TableController) {
    let gateway = Arc::new(InMemoryGateway::new(vec![ana(), bo()]));
    let surface = Arc::new(BurstSurface { submits });
    let config = TableConfig::clients().with_settle_delay(Duration::ZERO);
    let controller = TableController::new(config, gateway.clone(), surface);
    (gateway, controller)
}

fn ids(controller: &TableController) -> Vec<RecordId> {
    controller
        .state()
        .items()
        .iter()
        .map(|r| r.id().cloned().unwrap())
        .collect()
}

fn names(controller: &TableController) -> Vec<String> {
    controller
        .state()
        .items()
        .iter()
        .map(|r| r.display("firstname").into_owned())
        .collect()
}

// =============================================================================
// Loading
// =============================================================================

#[tokio::test]
async fn test_initialize_loads_records_and_total() {
    let f = fixture(InMemoryGateway::new(vec![ana(), bo(), cy()]).with_page_size(2));
    assert_eq!(*f.controller.status().borrow(), TableStatus::Loading);

    f.controller.initialize().await.unwrap();

    let state = f.controller.state();
    assert_eq!(state.len(), 2);
    assert_eq!(state.total(), 3);
    assert_eq!(*f.controller.status().borrow(), TableStatus::Ready);
}

#[tokio::test]
async fn test_load_failure_empties_list_and_sets_status() {
    let f = loaded().await;
    f.gateway.fail_next(Operation::List, "backend down");

    let err = f.controller.reload().await.unwrap_err();
    assert!(matches!(err, TableError::Load(GatewayError::Unavailable(_))));

    let state = f.controller.state();
    assert!(state.is_empty());
    assert_eq!(state.total(), 0);
    assert!(matches!(*f.controller.status().borrow(), TableStatus::Failed(_)));

    // user-initiated retry
    f.controller.reload().await.unwrap();
    assert_eq!(f.controller.state().len(), 2);
    assert_eq!(*f.controller.status().borrow(), TableStatus::Ready);
}

#[tokio::test]
async fn test_reload_keeps_active_sort() {
    let f = loaded().await;
    f.controller
        .handle_action(TableAction::sort("firstname", SortOrder::Desc))
        .await
        .unwrap();

    f.controller.reload().await.unwrap();
    assert_eq!(names(&f.controller), ["Bo", "Ana"]);
}

// =============================================================================
// Sorting
// =============================================================================

#[tokio::test]
async fn test_header_clicks_sort_ana_bo() {
    let f = loaded().await;

    let outcome = f
        .controller
        .handle_action(TableAction::click_order("firstname"))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        ActionOutcome::Sorted {
            column: "firstname".to_string(),
            order: SortOrder::Asc
        }
    );
    assert_eq!(names(&f.controller), ["Ana", "Bo"]);

    f.controller
        .handle_action(TableAction::click_order("firstname"))
        .await
        .unwrap();
    assert_eq!(names(&f.controller), ["Bo", "Ana"]);
    assert_eq!(f.controller.columns().get("firstname").unwrap().order, SortOrder::Desc);
    assert_eq!(f.controller.state().total(), 2);
}

#[tokio::test]
async fn test_sorting_unknown_or_action_column_fails() {
    let f = loaded().await;

    let err = f
        .controller
        .handle_action(TableAction::click_order("more"))
        .await
        .unwrap_err();
    assert!(matches!(err, TableError::NotSortable(_)));

    let err = f
        .controller
        .handle_action(TableAction::sort("age", SortOrder::Asc))
        .await
        .unwrap_err();
    assert!(matches!(err, TableError::UnknownColumn(_)));

    // still usable
    assert!(f.controller.columns().active().is_none());
    f.controller
        .handle_action(TableAction::click_order("lastname"))
        .await
        .unwrap();
}

// =============================================================================
// Create, update, delete
// =============================================================================

#[tokio::test]
async fn test_create_inserts_server_record_at_head() {
    let f = loaded().await;
    f.surface.push_script(vec![Step::Submit(cy())]);

    let outcome = f.controller.handle_action(TableAction::create()).await.unwrap();

    let ActionOutcome::Modal {
        result: ModalResult::Created(created),
        failure: None,
    } = outcome
    else {
        panic!("unexpected outcome");
    };
    assert_eq!(created.id(), Some(&RecordId::Number(3)));
    assert_eq!(ids(&f.controller), [3, 1, 2].map(RecordId::Number));
    assert_eq!(f.controller.state().total(), 3);

    let request = &f.surface.presented()[0];
    assert_eq!(request.title, "Add client");
    assert!(request.fields.iter().any(|field| field.key == "submit" && field.label == "Add client"));
    assert!(request.fields.iter().any(|field| field.key == "close"));
}

#[tokio::test]
async fn test_update_replaces_in_place() {
    let f = loaded().await;
    f.surface
        .push_script(vec![Step::Submit(Record::new().set("firstname", "Anabel"))]);

    let outcome = f.controller.handle_action(TableAction::edit(ana())).await.unwrap();
    assert!(matches!(
        outcome,
        ActionOutcome::Modal {
            result: ModalResult::Updated(_),
            ..
        }
    ));

    let state = f.controller.state();
    assert_eq!(state.len(), 2);
    assert_eq!(ids(&f.controller), [1, 2].map(RecordId::Number));
    assert_eq!(state.items()[0].display("firstname"), "Anabel");
    // untouched fields survive the merge
    assert_eq!(state.items()[0].display("email"), "ana@x.com");
    assert_eq!(f.surface.presented()[0].title, "Edit client");
}

#[tokio::test]
async fn test_delete_removes_record_and_decrements_total() {
    let f = loaded().await;
    f.surface.push_script(vec![Step::Submit(Record::new())]);

    let outcome = f.controller.handle_action(TableAction::delete(bo())).await.unwrap();
    assert!(matches!(
        outcome,
        ActionOutcome::Modal {
            result: ModalResult::Deleted(RecordId::Number(2)),
            ..
        }
    ));

    let state = f.controller.state();
    assert_eq!(names(&f.controller), ["Ana"]);
    assert_eq!(state.total(), 1);
    assert_eq!(
        f.surface.presented()[0].title,
        "Are you sure you want to delete the client Bo Berg?"
    );
}

#[tokio::test]
async fn test_delete_without_id_is_refused() {
    let f = loaded().await;

    let err = f
        .controller
        .handle_action(TableAction::delete(cy()))
        .await
        .unwrap_err();
    assert!(matches!(err, TableError::MissingId));
    assert!(f.surface.presented().is_empty());
}

#[tokio::test]
async fn test_cancel_and_close_never_mutate() {
    let f = loaded().await;
    let before = f.controller.state();

    f.surface.push_script(vec![Step::Cancel]);
    f.surface.push_script(vec![Step::Close]);
    f.surface.push_script(vec![]);

    for action in [
        TableAction::delete(ana()),
        TableAction::edit(bo()),
        TableAction::create(),
    ] {
        let outcome = f.controller.handle_action(action).await.unwrap();
        assert!(matches!(
            outcome,
            ActionOutcome::Modal {
                result: ModalResult::Dismissed,
                ..
            }
        ));
    }

    assert_eq!(f.controller.state(), before);
    assert_eq!(f.gateway.calls(Operation::Create), 0);
    assert_eq!(f.gateway.calls(Operation::Update), 0);
    assert_eq!(f.gateway.calls(Operation::Delete), 0);
}

// =============================================================================
// Validation and failures
// =============================================================================

#[tokio::test]
async fn test_validation_blocks_submit() {
    let f = loaded().await;
    f.surface.push_script(vec![
        Step::Submit(Record::new().set("firstname", "Cy").set("email", "not-an-email")),
        Step::Submit(cy()),
    ]);

    let outcome = f.controller.handle_action(TableAction::create()).await.unwrap();
    assert!(matches!(
        outcome,
        ActionOutcome::Modal {
            result: ModalResult::Created(_),
            ..
        }
    ));

    // only the valid submit reached the gateway
    assert_eq!(f.gateway.calls(Operation::Create), 1);
    assert_eq!(f.controller.state().len(), 3);
}

#[tokio::test]
async fn test_invalid_submit_then_close_reports_errors() {
    let f = loaded().await;
    f.surface
        .push_script(vec![Step::Submit(Record::new().set("email", "nope"))]);

    let outcome = f.controller.handle_action(TableAction::create()).await.unwrap();
    assert!(matches!(
        outcome,
        ActionOutcome::Modal {
            result: ModalResult::Dismissed,
            ..
        }
    ));

    let errors = f.surface.last_handle().unwrap().errors();
    assert_eq!(errors.first_invalid_field(), Some("firstname"));
    assert_eq!(errors.error_for("email").unwrap().rule, "email");
    assert_eq!(f.gateway.calls(Operation::Create), 0);
    assert_eq!(f.controller.state().len(), 2);
}

#[tokio::test]
async fn test_failed_mutation_keeps_modal_open_and_retry_succeeds() {
    let f = loaded().await;
    f.gateway.fail_next(Operation::Create, "backend down");
    f.surface
        .push_script(vec![Step::Submit(cy()), Step::Submit(cy())]);

    let outcome = f.controller.handle_action(TableAction::create()).await.unwrap();

    let ActionOutcome::Modal { result, failure } = outcome else {
        panic!("expected a modal outcome");
    };
    assert!(matches!(result, ModalResult::Created(_)));
    // the failure was cleared by the successful retry
    assert!(failure.is_none());
    assert_eq!(f.gateway.calls(Operation::Create), 2);
    assert_eq!(names(&f.controller), ["Cy", "Ana", "Bo"]);
}

#[tokio::test]
async fn test_failed_mutation_then_close_leaves_list_untouched() {
    let f = loaded().await;
    let before = f.controller.state();
    f.gateway.fail_next(Operation::Delete, "backend down");
    f.surface.push_script(vec![Step::Submit(Record::new()), Step::Close]);

    let outcome = f.controller.handle_action(TableAction::delete(ana())).await.unwrap();

    let ActionOutcome::Modal { result, failure } = outcome else {
        panic!("expected a modal outcome");
    };
    assert_eq!(result, ModalResult::Dismissed);
    assert!(failure.unwrap().contains("backend down"));
    assert_eq!(f.controller.state(), before);
}

#[tokio::test]
async fn test_failed_update_leaves_row_then_retry_replaces_it() {
    let f = loaded().await;
    let before = f.controller.state();
    f.gateway.fail_next(Operation::Update, "backend down");
    f.surface.push_script(vec![
        Step::Submit(Record::new().set("firstname", "Anabel")),
        Step::Close,
    ]);

    let outcome = f.controller.handle_action(TableAction::edit(ana())).await.unwrap();
    let ActionOutcome::Modal { result, failure } = outcome else {
        panic!("expected a modal outcome");
    };
    assert_eq!(result, ModalResult::Dismissed);
    assert!(failure.unwrap().contains("backend down"));
    assert_eq!(f.controller.state(), before);
    assert_eq!(f.gateway.records()[0].display("firstname"), "Ana");

    f.surface
        .push_script(vec![Step::Submit(Record::new().set("firstname", "Anabel"))]);
    let outcome = f.controller.handle_action(TableAction::edit(ana())).await.unwrap();
    assert!(matches!(
        outcome,
        ActionOutcome::Modal {
            result: ModalResult::Updated(_),
            failure: None,
        }
    ));

    let state = f.controller.state();
    assert_eq!(ids(&f.controller), [1, 2].map(RecordId::Number));
    assert_eq!(state.total(), 2);
    assert_eq!(state.items()[0].display("firstname"), "Anabel");
    assert_eq!(state.items()[0].display("email"), "ana@x.com");
    assert_eq!(f.gateway.calls(Operation::Update), 2);
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test]
async fn test_late_response_after_dismiss_is_discarded() {
    let f = loaded().await;
    let before = f.controller.state();

    f.gateway.pause();
    f.surface.push_script(vec![
        Step::Submit(Record::new().set("firstname", "Anabel")),
        Step::Interrupt(OutcomeKey::Close),
    ]);

    let outcome = f.controller.handle_action(TableAction::edit(ana())).await.unwrap();
    assert!(matches!(
        outcome,
        ActionOutcome::Modal {
            result: ModalResult::Dismissed,
            ..
        }
    ));

    // the stale call still holds the record
    let err = f
        .controller
        .handle_action(TableAction::delete(ana()))
        .await
        .unwrap_err();
    assert!(matches!(err, TableError::RecordBusy(RecordId::Number(1))));

    f.gateway.resume();
    f.controller.flush().await;

    // the backend applied it, the list did not
    assert_eq!(f.gateway.records()[0].display("firstname"), "Anabel");
    assert_eq!(f.controller.state(), before);

    // released once the call finished
    f.surface.push_script(vec![Step::Cancel]);
    f.controller.handle_action(TableAction::delete(ana())).await.unwrap();
}

#[tokio::test]
async fn test_second_modal_is_refused_while_one_is_open() {
    let f = loaded().await;
    f.gateway.pause();
    f.surface.push_script(vec![Step::Submit(cy())]);

    let resume = async {
        tokio::task::yield_now().await;
        f.gateway.resume();
    };

    let (first, second, ()) = tokio::join!(
        f.controller.handle_action(TableAction::create()),
        f.controller.handle_action(TableAction::edit(bo())),
        resume,
    );

    assert!(matches!(
        first.unwrap(),
        ActionOutcome::Modal {
            result: ModalResult::Created(_),
            ..
        }
    ));
    assert!(matches!(second.unwrap_err(), TableError::ModalBusy));
    assert_eq!(f.surface.presented().len(), 1);
}

#[tokio::test]
async fn test_stream_end_during_create_keeps_the_result() {
    let (gateway, controller) = burst(vec![cy()]);
    controller.initialize().await.unwrap();
    gateway.pause();

    // the stream has ended long before the backend answers
    let resume = async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        gateway.resume();
    };
    let (outcome, ()) = tokio::join!(controller.handle_action(TableAction::create()), resume);

    let ActionOutcome::Modal {
        result: ModalResult::Created(created),
        ..
    } = outcome.unwrap()
    else {
        panic!("expected the create to be applied");
    };
    assert_eq!(created.id(), Some(&RecordId::Number(3)));
    assert_eq!(names(&controller), ["Cy", "Ana", "Bo"]);
    assert_eq!(controller.state().total(), 3);
    assert_eq!(gateway.len(), 3);
}

#[tokio::test]
async fn test_submit_while_busy_is_ignored() {
    let (gateway, controller) = burst(vec![cy(), cy()]);
    controller.initialize().await.unwrap();
    gateway.pause();

    // the stream has ended long before the backend answers
    let resume = async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        gateway.resume();
    };
    let (outcome, ()) = tokio::join!(controller.handle_action(TableAction::create()), resume);

    assert!(matches!(
        outcome.unwrap(),
        ActionOutcome::Modal {
            result: ModalResult::Created(_),
            ..
        }
    ));
    assert_eq!(gateway.calls(Operation::Create), 1);
    assert_eq!(names(&controller).iter().filter(|n| *n == "Cy").count(), 1);
    assert_eq!(gateway.len(), 3);
}

#[tokio::test]
async fn test_auto_save_off_returns_values_without_gateway_call() {
    let gateway = Arc::new(InMemoryGateway::new(vec![ana()]));
    let surface = Arc::new(ScriptedSurface::new());
    let config = TableConfig::clients()
        .with_settle_delay(Duration::ZERO)
        .with_auto_save(false);
    let controller = TableController::new(config, gateway.clone(), surface.clone());
    controller.initialize().await.unwrap();

    surface.push_script(vec![Step::Submit(Record::new().set("lastname", "Ruiz"))]);
    let outcome = controller.handle_action(TableAction::edit(ana())).await.unwrap();

    let ActionOutcome::Modal {
        result: ModalResult::Submitted(record),
        ..
    } = outcome
    else {
        panic!("unexpected outcome");
    };
    assert_eq!(record.id(), Some(&RecordId::Number(1)));
    assert_eq!(record.display("lastname"), "Ruiz");
    assert_eq!(gateway.calls(Operation::Update), 0);
    assert_eq!(controller.state().items()[0].display("lastname"), "Lopez");
}

// =============================================================================
// Observation
// =============================================================================

#[tokio::test]
async fn test_view_stream_sees_every_mutation() {
    let f = loaded().await;
    let mut stream = Box::pin(f.controller.subscribe().into_stream());

    let first = stream.next().await.unwrap();
    assert_eq!(first.len(), 2);

    f.surface.push_script(vec![Step::Submit(cy())]);
    f.controller.handle_action(TableAction::create()).await.unwrap();

    let next = stream.next().await.unwrap();
    assert_eq!(next.len(), 3);
    assert_eq!(next.total(), 3);
}

#[tokio::test]
async fn test_settle_delay_runs_after_mutation() {
    let gateway = Arc::new(InMemoryGateway::new(vec![ana(), bo()]));
    let surface = Arc::new(ScriptedSurface::new());
    let config = TableConfig::clients().with_settle_delay(Duration::from_millis(50));
    let controller = TableController::new(config, gateway, surface.clone());
    controller.initialize().await.unwrap();

    let mut view = controller.subscribe();
    view.current();
    surface.push_script(vec![Step::Submit(Record::new())]);

    let delete = controller.handle_action(TableAction::delete(bo()));
    let observe = async {
        // published before the settle delay ends
        let state = view.changed().await.unwrap();
        assert_eq!(state.len(), 1);
    };
    let (outcome, ()) = tokio::join!(delete, observe);
    outcome.unwrap();
}
