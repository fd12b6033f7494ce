//! A [`Serializer`] backed by one JSON document on disk.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use tracing::debug;

use crate::atomic_write::{AtomicWriteOptions, atomic_write, recover_bak_file};
use crate::serializer::{Serializer, StoredValue, WriteOp};

/// File name used inside a cache directory.
pub const CACHE_FILE_NAME: &str = "graph.json";

/// Stores every key as a member of a single JSON object.
///
/// Each write reads the current document, applies the batch, and atomically
/// replaces the file, so a crash leaves either the old or the new document.
#[derive(Debug, Clone)]
pub struct JsonFileSerializer {
    path: PathBuf,
    options: AtomicWriteOptions,
}

impl JsonFileSerializer {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            options: AtomicWriteOptions::default(),
        }
    }

    /// The serializer for [`CACHE_FILE_NAME`] inside `dir`.
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(CACHE_FILE_NAME))
    }

    #[must_use]
    pub fn with_options(mut self, options: AtomicWriteOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_document(&self) -> Result<Map<String, Value>> {
        recover_bak_file(&self.path);
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No cache file yet");
                return Ok(Map::new());
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read cache file: {}", self.path.display())
                });
            }
        };
        serde_json::from_str(&text)
            .with_context(|| format!("Cache file is not a JSON object: {}", self.path.display()))
    }
}

impl Serializer for JsonFileSerializer {
    fn read(&self) -> Result<HashMap<String, StoredValue>> {
        Ok(self
            .load_document()?
            .into_iter()
            .map(|(key, value)| (key, StoredValue::Parsed(value)))
            .collect())
    }

    fn write(&mut self, ops: Vec<WriteOp>) -> Result<()> {
        let mut document = self.load_document()?;
        for op in ops {
            match op.value {
                Some(value) => {
                    document.insert(op.key, value);
                }
                None => {
                    document.remove(&op.key);
                }
            }
        }

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let bytes = serde_json::to_vec(&Value::Object(document))
            .context("Failed to encode cache document")?;
        atomic_write(&self.path, &bytes, self.options)
            .with_context(|| format!("Failed to write cache file: {}", self.path.display()))
    }
}
