//! Custom serialization for Record.
//!
//! A record travels as a flat JSON object. The `id` key carries the record's
//! identity and every other key is a field:
//!
//! ```json
//! { "id": 3, "firstname": "Cy", "lastname": "Z", "email": "c@x.com" }
//! ```
//!
//! Unsaved records are written without an `id` key. On read, `"id": null` is
//! the same as a missing id.

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde::de::MapAccess;
use serde::de::Visitor;
use serde::ser::SerializeMap;

use super::Record;
use super::RecordId;
use super::Value;

const ID_KEY: &str = "id";

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let len = self.fields.len() + usize::from(self.id.is_some());
        let mut map = serializer.serialize_map(Some(len))?;

        if let Some(id) = &self.id {
            map.serialize_entry(ID_KEY, id)?;
        }

        for (key, value) in &self.fields {
            // A field literally named "id" would shadow the identity
            if key == ID_KEY {
                continue;
            }
            map.serialize_entry(key, value)?;
        }

        map.end()
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(RecordVisitor)
    }
}

struct RecordVisitor;

impl<'de> Visitor<'de> for RecordVisitor {
    type Value = Record;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map representing a record")
    }

    fn visit_map<M>(self, mut map: M) -> Result<Record, M::Error>
    where
        M: MapAccess<'de>,
    {
        let mut id: Option<RecordId> = None;
        let mut fields: HashMap<String, Value> = HashMap::new();

        while let Some(key) = map.next_key::<String>()? {
            if key == ID_KEY {
                id = map.next_value::<Option<RecordId>>()?;
            } else {
                let raw: serde_json::Value = map.next_value()?;
                fields.insert(key, Value::from(raw));
            }
        }

        Ok(Record { id, fields })
    }
}
