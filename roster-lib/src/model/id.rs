//! Record identifiers

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// The identity of a persisted record.
///
/// Backends hand out either integer or string keys; both are accepted and
/// compared by exact value. Serialized untagged, so `3` and `"a-3"` are both
/// valid `id` values on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    /// Numeric key.
    Number(i64),
    /// String key.
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{n}"),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(v: i64) -> Self {
        RecordId::Number(v)
    }
}

impl From<i32> for RecordId {
    fn from(v: i32) -> Self {
        RecordId::Number(v as i64)
    }
}

impl From<&str> for RecordId {
    fn from(v: &str) -> Self {
        RecordId::Text(v.to_string())
    }
}

impl From<String> for RecordId {
    fn from(v: String) -> Self {
        RecordId::Text(v)
    }
}

impl RecordId {
    /// Parses user input, preferring the numeric form.
    pub fn parse(input: &str) -> Self {
        match input.trim().parse::<i64>() {
            Ok(n) => RecordId::Number(n),
            Err(_) => RecordId::Text(input.trim().to_string()),
        }
    }
}
