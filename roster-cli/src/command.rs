//! Parsing of interactive commands.

use roster_lib::model::Record;
use roster_lib::model::RecordId;
use roster_lib::model::Value;
use roster_lib::table::SortOrder;

pub const HELP: &str = "\
commands:
  list                      print the table
  sort <column> [asc|desc]  sort by a column; without a direction, toggles it
  add key=value...          create a record
  edit <id> key=value...    change fields of a record on this page
  delete <id>               delete a record on this page
  reload                    fetch the list again
  help                      show this help
  quit                      exit

values containing spaces can be quoted: lastname=\"de la Cruz\"";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    List,
    Sort {
        column: String,
        order: Option<SortOrder>,
    },
    Add(Record),
    Edit {
        id: RecordId,
        values: Record,
    },
    Delete(RecordId),
    Reload,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command '{0}', try 'help'")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("expected key=value, got '{0}'")]
    Assignment(String),

    #[error("unterminated quote")]
    Quote,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let words = split(line)?;
        let Some((name, rest)) = words.split_first() else {
            return Err(CommandError::Empty);
        };

        match (name.as_str(), rest) {
            ("list" | "ls", []) => Ok(Command::List),
            ("sort", [column]) => Ok(Command::Sort {
                column: column.clone(),
                order: None,
            }),
            ("sort", [column, order]) => match SortOrder::parse(order) {
                Some(order) => Ok(Command::Sort {
                    column: column.clone(),
                    order: Some(order),
                }),
                None => Err(CommandError::Usage("sort <column> [asc|desc]")),
            },
            ("sort", _) => Err(CommandError::Usage("sort <column> [asc|desc]")),
            ("add", []) => Err(CommandError::Usage("add key=value...")),
            ("add", pairs) => Ok(Command::Add(values(pairs)?)),
            ("edit", [id, pairs @ ..]) if !pairs.is_empty() => Ok(Command::Edit {
                id: RecordId::parse(id),
                values: values(pairs)?,
            }),
            ("edit", _) => Err(CommandError::Usage("edit <id> key=value...")),
            ("delete" | "rm", [id]) => Ok(Command::Delete(RecordId::parse(id))),
            ("delete" | "rm", _) => Err(CommandError::Usage("delete <id>")),
            ("reload", []) => Ok(Command::Reload),
            ("help" | "?", _) => Ok(Command::Help),
            ("quit" | "exit" | "q", _) => Ok(Command::Quit),
            (other, _) => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

fn values(pairs: &[String]) -> Result<Record, CommandError> {
    pairs.iter().try_fold(Record::new(), |record, pair| {
        let (key, value) = pair
            .split_once('=')
            .filter(|(key, _)| !key.is_empty())
            .ok_or_else(|| CommandError::Assignment(pair.clone()))?;
        Ok(record.set(key, Value::parse_input(value)))
    })
}

/// Splits on whitespace, keeping double-quoted runs together.
fn split(line: &str) -> Result<Vec<String>, CommandError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut started = false;

    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                started = true;
            }
            c if c.is_whitespace() && !quoted => {
                if started {
                    words.push(std::mem::take(&mut current));
                    started = false;
                }
            }
            c => {
                current.push(c);
                started = true;
            }
        }
    }

    if quoted {
        return Err(CommandError::Quote);
    }
    if started {
        words.push(current);
    }
    Ok(words)
}
