//! The persisted unit: `{ "type": <name>, <field>: <value>, ... }`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CodecError, json_kind};

/// A frozen node. Nested nodes are nested records; the structure is a tree,
/// never a graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct FrozenRecord {
    type_name: String,
    fields: Map<String, Value>,
}

impl FrozenRecord {
    pub const TYPE_KEY: &'static str = "type";

    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Map::new(),
        }
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn insert(&mut self, field: &str, value: Value) {
        debug_assert_ne!(field, Self::TYPE_KEY, "`type` is reserved for the tag");
        self.fields.insert(field.to_string(), value);
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    /// Field names in sorted order, excluding the `type` tag.
    #[must_use]
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        let mut map = self.fields;
        map.insert(Self::TYPE_KEY.to_string(), Value::String(self.type_name));
        Value::Object(map)
    }

    pub fn from_value(value: Value) -> Result<Self, CodecError> {
        let Value::Object(mut fields) = value else {
            return Err(CodecError::InvalidRecord(format!(
                "expected an object, found {}",
                json_kind(&value)
            )));
        };
        match fields.remove(Self::TYPE_KEY) {
            Some(Value::String(type_name)) => Ok(Self { type_name, fields }),
            Some(other) => Err(CodecError::InvalidRecord(format!(
                "`type` must be a string, found {}",
                json_kind(&other)
            ))),
            None => Err(CodecError::InvalidRecord("missing `type` tag".to_string())),
        }
    }
}

impl From<FrozenRecord> for Value {
    fn from(record: FrozenRecord) -> Self {
        record.into_value()
    }
}

impl TryFrom<Value> for FrozenRecord {
    type Error = CodecError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}
