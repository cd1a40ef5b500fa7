mod args;
mod command;
mod paths;
mod render;

use std::fs;
use std::fs::File;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use roster_lib::RecordGateway;
use roster_lib::TableController;
use roster_lib::error::GatewayError;
use roster_lib::error::TableError;
use roster_lib::gateway::HttpGateway;
use roster_lib::gateway::InMemoryGateway;
use roster_lib::modal::ModalResult;
use roster_lib::modal::ScriptedSurface;
use roster_lib::modal::Step;
use roster_lib::model::Record;
use roster_lib::model::RecordId;
use roster_lib::table::ActionOutcome;
use roster_lib::table::RowActionKind;
use roster_lib::table::TableAction;
use roster_lib::table::TableConfig;
use simplelog::Config;
use simplelog::LevelFilter;
use simplelog::WriteLogger;
use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;

use crate::args::Args;
use crate::command::Command;
use crate::command::CommandError;
use crate::command::HELP;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Table(#[from] TableError),

    #[error("{0}")]
    Gateway(#[from] GatewayError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("record {0} is not on this page")]
    NotOnPage(RecordId),

    #[error("this table offers no {0:?} action")]
    NotOffered(RowActionKind),

    #[error("no backend URL; pass --url, set ROSTER_URL or use --memory")]
    MissingUrl,
}

impl CliError {
    /// Whether running the same command again could succeed.
    fn is_retryable(&self) -> bool {
        match self {
            Self::Table(e) => e.gateway().is_some_and(GatewayError::is_retryable),
            Self::Gateway(e) => e.is_retryable(),
            _ => false,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let args = Args::parse();
    init_logging(args.level());

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Logs to `latest.log` in the cache directory; logging is skipped when no
/// cache directory is available.
fn init_logging(level: LevelFilter) {
    let Some(dir) = paths::cache_dir() else { return };
    if fs::create_dir_all(&dir).is_err() {
        return;
    }

    let path = paths::rotate_logs(&dir);
    match File::create(&path) {
        Ok(file) => {
            let _ = WriteLogger::init(level, Config::default(), file);
        }
        Err(e) => eprintln!("warning: cannot write {}: {e}", path.display()),
    }
}

async fn run(args: Args) -> Result<(), CliError> {
    let gateway = gateway(&args)?;
    let surface = Arc::new(ScriptedSurface::new());
    // nothing animates closing in a terminal
    let config = TableConfig::clients().with_settle_delay(Duration::ZERO);
    let controller = TableController::new(config, gateway, surface.clone());

    if let Err(e) = controller.initialize().await {
        if e.gateway().is_some_and(GatewayError::is_retryable) {
            println!("{e} (type 'reload' to retry)");
        } else {
            println!("{e}");
        }
    }

    let mut view = controller.subscribe();
    println!("{}", render::render(&controller.columns(), &view.current()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            Some(state) = view.changed() => {
                println!("{}", render::render(&controller.columns(), &state));
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match Command::parse(&line) {
                    Ok(Command::Quit) => break,
                    Ok(command) => {
                        match execute(&controller, &surface, command).await {
                            Ok(()) => {}
                            Err(e) if e.is_retryable() => println!("error: {e} (try again)"),
                            Err(e) => println!("error: {e}"),
                        }
                    }
                    Err(CommandError::Empty) => {}
                    Err(e) => println!("{e}"),
                }
            }
        }
    }

    controller.flush().await;
    Ok(())
}

fn gateway(args: &Args) -> Result<Arc<dyn RecordGateway>, CliError> {
    if args.memory {
        log::info!("using in-memory collection");
        return Ok(Arc::new(InMemoryGateway::new(seed())));
    }

    let url = args.url.clone().ok_or(CliError::MissingUrl)?;
    log::info!("using {url} ({})", args.collection);
    let gateway = HttpGateway::builder()
        .url(url)
        .collection(&args.collection)
        .timeout(Duration::from_secs(args.timeout))
        .connect_timeout(Duration::from_secs(10))
        .build()?;
    Ok(Arc::new(gateway))
}

async fn execute(controller: &TableController, surface: &ScriptedSurface, command: Command) -> Result<(), CliError> {
    // a script left over from a refused modal must not leak into the next one
    surface.clear();

    match command {
        Command::List => {
            let state = controller.state();
            println!("{}", render::render(&controller.columns(), &state));
        }
        Command::Sort { column, order } => {
            let action = match order {
                Some(order) => TableAction::sort(column, order),
                None => TableAction::click_order(column),
            };
            controller.handle_action(action).await?;
        }
        Command::Add(values) => {
            surface.push_script(vec![Step::Submit(values)]);
            let outcome = controller.handle_action(TableAction::create()).await?;
            report(surface, outcome);
        }
        Command::Edit { id, values } => {
            let action = row_action(controller, RowActionKind::Edit, &id)?;
            surface.push_script(vec![Step::Submit(values)]);
            let outcome = controller.handle_action(action).await?;
            report(surface, outcome);
        }
        Command::Delete(id) => {
            let action = row_action(controller, RowActionKind::Delete, &id)?;
            surface.push_script(vec![Step::Submit(Record::new())]);
            let outcome = controller.handle_action(action).await?;
            report(surface, outcome);
        }
        Command::Reload => controller.reload().await?,
        Command::Help => println!("{HELP}"),
        Command::Quit => {}
    }
    Ok(())
}

/// Resolves a row-menu entry for the record with `id` on the current page.
fn row_action(controller: &TableController, kind: RowActionKind, id: &RecordId) -> Result<TableAction, CliError> {
    if !controller.columns().row_actions().iter().any(|a| a.kind == kind) {
        return Err(CliError::NotOffered(kind));
    }
    let item = find(controller, id)?;
    Ok(TableAction::from_row(kind, item))
}

fn find(controller: &TableController, id: &RecordId) -> Result<Record, CliError> {
    controller
        .state()
        .get(id)
        .cloned()
        .ok_or_else(|| CliError::NotOnPage(id.clone()))
}

fn report(surface: &ScriptedSurface, outcome: ActionOutcome) {
    let ActionOutcome::Modal { result, failure } = outcome else {
        return;
    };

    match result {
        ModalResult::Created(record) => match record.id() {
            Some(id) => println!("created {id}"),
            None => println!("created"),
        },
        ModalResult::Updated(record) => match record.id() {
            Some(id) => println!("updated {id}"),
            None => println!("updated"),
        },
        ModalResult::Deleted(id) => println!("deleted {id}"),
        ModalResult::Submitted(_) => {}
        ModalResult::Dismissed => {
            if let Some(failure) = failure {
                println!("not saved: {failure}");
            }
            if let Some(handle) = surface.last_handle() {
                for error in handle.errors().errors() {
                    println!("  {}: {}", error.field, error.message);
                }
            }
        }
    }
}

fn seed() -> Vec<Record> {
    [
        ("Ana", "Lopez", "ana@example.com"),
        ("Bo", "Berg", "bo@example.com"),
        ("Émile", "Durand", "emile@example.com"),
        ("zoë", "Adams", "zoe@example.com"),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, (first, last, email))| {
        Record::with_id(i as i64 + 1)
            .set("firstname", first)
            .set("lastname", last)
            .set("email", email)
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use roster_lib::table::ColumnKind;

    use super::*;

    async fn controller(config: TableConfig) -> TableController {
        let gateway = Arc::new(InMemoryGateway::new(seed()));
        let controller = TableController::new(config, gateway, Arc::new(ScriptedSurface::new()));
        controller.initialize().await.unwrap();
        controller
    }

    #[tokio::test]
    async fn test_row_action_from_menu() {
        let controller = controller(TableConfig::clients()).await;
        let id = RecordId::Number(2);

        let action = row_action(&controller, RowActionKind::Delete, &id).unwrap();
        assert!(matches!(action, TableAction::Delete { item } if item.id() == Some(&id)));

        let action = row_action(&controller, RowActionKind::Edit, &id).unwrap();
        assert!(matches!(action, TableAction::Edit { item: Some(item) } if item.id() == Some(&id)));

        let missing = row_action(&controller, RowActionKind::Edit, &RecordId::Number(99));
        assert!(matches!(missing, Err(CliError::NotOnPage(_))));
    }

    #[tokio::test]
    async fn test_row_action_not_offered() {
        let mut config = TableConfig::clients();
        config.columns.retain(|c| !matches!(c.kind, ColumnKind::Actions(_)));
        let controller = controller(config).await;

        let result = row_action(&controller, RowActionKind::Delete, &RecordId::Number(1));
        assert!(matches!(result, Err(CliError::NotOffered(RowActionKind::Delete))));
    }

    #[test]
    fn test_retryable_errors() {
        assert!(CliError::Table(TableError::Load(GatewayError::http(503, "busy"))).is_retryable());
        assert!(!CliError::Table(TableError::Mutation(GatewayError::Rejected("no".to_string()))).is_retryable());
        assert!(!CliError::Table(TableError::ModalBusy).is_retryable());
        assert!(!CliError::MissingUrl.is_retryable());
    }
}
