//! The persistence collaborator.
//!
//! A [`Serializer`] stores opaque JSON values under string keys. It knows
//! nothing about frozen records; [`GraphCache`](crate::GraphCache) assigns the
//! keys and batches the writes.

use std::collections::HashMap;

use anyhow::{Context, Result};
use serde_json::Value;

/// A value as handed back by [`Serializer::read`].
#[derive(Debug, Clone, PartialEq)]
pub enum StoredValue {
    /// Already parsed by the backend.
    Parsed(Value),
    /// Raw JSON text the caller must parse.
    Text(String),
}

impl StoredValue {
    pub fn into_value(self) -> Result<Value> {
        match self {
            StoredValue::Parsed(value) => Ok(value),
            StoredValue::Text(text) => {
                serde_json::from_str(&text).context("stored value is not valid JSON")
            }
        }
    }
}

/// One entry of a write batch. `value: None` deletes the key.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteOp {
    pub key: String,
    pub value: Option<Value>,
}

impl WriteOp {
    #[must_use]
    pub fn put(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value: Some(value),
        }
    }

    #[must_use]
    pub fn delete(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
        }
    }
}

pub trait Serializer {
    /// Every stored key/value pair.
    fn read(&self) -> Result<HashMap<String, StoredValue>>;

    /// Apply a batch of puts and deletes.
    fn write(&mut self, ops: Vec<WriteOp>) -> Result<()>;
}

/// Keeps everything in memory. Useful for tests and for embedding the cache
/// in a long-lived process.
#[derive(Debug, Default)]
pub struct MemorySerializer {
    entries: HashMap<String, StoredValue>,
}

impl MemorySerializer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store raw text under `key`, as a backend that defers parsing would.
    pub fn insert_text(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.entries.insert(key.into(), StoredValue::Text(text.into()));
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&StoredValue> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serializer for MemorySerializer {
    fn read(&self) -> Result<HashMap<String, StoredValue>> {
        Ok(self.entries.clone())
    }

    fn write(&mut self, ops: Vec<WriteOp>) -> Result<()> {
        for op in ops {
            match op.value {
                Some(value) => {
                    self.entries.insert(op.key, StoredValue::Parsed(value));
                }
                None => {
                    self.entries.remove(&op.key);
                }
            }
        }
        Ok(())
    }
}
