//! Per-module freeze and thaw sessions over a [`Serializer`].
//!
//! Each module is stored under its identifier as
//! `{ "schema": "v4", "dependencies": [...], "blocks": [...] }` and frozen or
//! thawed in a session of its own. A module that fails to thaw invalidates the
//! whole load: callers get a cache miss and rebuild, never a partial graph.

use std::collections::HashSet;

use anyhow::{Context, Result};
use hoard_codec::{DEFAULT_MAX_DEPTH, FrozenRecord, SchemaRegistry, SchemaVersion};
use hoard_types::{ModuleRef, NodeRef};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::CacheConfig;
use crate::serializer::{Serializer, WriteOp};

/// The cached part of one module: its top-level dependencies and blocks.
#[derive(Debug, Clone)]
pub struct ModuleSnapshot {
    pub module: ModuleRef,
    pub dependencies: Vec<NodeRef>,
    pub blocks: Vec<NodeRef>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredModule {
    schema: SchemaVersion,
    #[serde(default)]
    dependencies: Vec<FrozenRecord>,
    #[serde(default)]
    blocks: Vec<FrozenRecord>,
}

#[derive(Debug)]
pub struct GraphCache<S> {
    serializer: S,
    registry: SchemaRegistry,
    max_depth: usize,
}

impl<S: Serializer> GraphCache<S> {
    #[must_use]
    pub fn new(serializer: S, version: SchemaVersion) -> Self {
        Self {
            serializer,
            registry: SchemaRegistry::builtin(version),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    #[must_use]
    pub fn from_config(serializer: S, config: &CacheConfig) -> Self {
        Self::new(serializer, config.schema).with_max_depth(config.max_depth)
    }

    /// Use a registry built from a custom type provider.
    #[must_use]
    pub fn with_registry(mut self, registry: SchemaRegistry) -> Self {
        self.registry = registry;
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    #[must_use]
    pub fn serializer(&self) -> &S {
        &self.serializer
    }

    pub fn into_serializer(self) -> S {
        self.serializer
    }

    /// Freeze `snapshots` and replace the stored graph with them. Keys of
    /// modules that are no longer present are deleted.
    pub fn store(&mut self, snapshots: &[ModuleSnapshot]) -> Result<()> {
        let existing = self.serializer.read().context("Failed to read cache")?;
        let mut ops = Vec::with_capacity(snapshots.len());
        let mut kept = HashSet::with_capacity(snapshots.len());

        for snapshot in snapshots {
            let key = snapshot.module.identifier().to_string();
            let stored = self
                .freeze_module(snapshot)
                .with_context(|| format!("Failed to freeze module {key}"))?;
            let value = serde_json::to_value(&stored)
                .with_context(|| format!("Failed to encode module {key}"))?;
            kept.insert(key.clone());
            ops.push(WriteOp::put(key, value));
        }

        let stale: Vec<String> = existing
            .into_keys()
            .filter(|key| !kept.contains(key))
            .collect();
        let deleted = stale.len();
        ops.extend(stale.into_iter().map(WriteOp::delete));

        self.serializer.write(ops).context("Failed to write cache")?;
        info!(
            modules = snapshots.len(),
            deleted,
            schema = %self.registry.version(),
            "Stored module graph"
        );
        Ok(())
    }

    /// Thaw the stored graph for `modules`.
    ///
    /// Returns `None` when any module is missing from the cache or fails to
    /// thaw.
    #[must_use]
    pub fn load(&self, modules: &[ModuleRef]) -> Option<Vec<ModuleSnapshot>> {
        match self.try_load(modules) {
            Ok(Some(snapshots)) => {
                info!(modules = snapshots.len(), "Loaded module graph from cache");
                Some(snapshots)
            }
            Ok(None) => None,
            Err(e) => {
                warn!("Discarding cached module graph: {e:#}");
                None
            }
        }
    }

    fn try_load(&self, modules: &[ModuleRef]) -> Result<Option<Vec<ModuleSnapshot>>> {
        let mut stored = self.serializer.read().context("Failed to read cache")?;
        let mut snapshots = Vec::with_capacity(modules.len());
        for module in modules {
            let key = module.identifier();
            let Some(value) = stored.remove(key) else {
                debug!(module = key, "Module not cached");
                return Ok(None);
            };
            let value = value.into_value()?;
            let entry: StoredModule = serde_json::from_value(value)
                .with_context(|| format!("Malformed cache entry for module {key}"))?;
            if entry.schema != self.registry.version() {
                debug!(
                    module = key,
                    written = %entry.schema,
                    reading = %self.registry.version(),
                    "Reading records written under another schema version"
                );
            }
            let snapshot = self
                .thaw_module(module, &entry)
                .with_context(|| format!("Failed to thaw module {key}"))?;
            snapshots.push(snapshot);
        }
        Ok(Some(snapshots))
    }

    fn freeze_module(&self, snapshot: &ModuleSnapshot) -> Result<StoredModule, hoard_codec::Error> {
        let mut session = self
            .registry
            .freeze_session(Some(ModuleRef::clone(&snapshot.module)))
            .with_max_depth(self.max_depth);
        Ok(StoredModule {
            schema: self.registry.version(),
            dependencies: session.freeze_all(&snapshot.dependencies)?,
            blocks: session.freeze_all(&snapshot.blocks)?,
        })
    }

    fn thaw_module(
        &self,
        module: &ModuleRef,
        entry: &StoredModule,
    ) -> Result<ModuleSnapshot, hoard_codec::Error> {
        let mut session = self
            .registry
            .thaw_session(Some(ModuleRef::clone(module)))
            .with_max_depth(self.max_depth);
        Ok(ModuleSnapshot {
            module: ModuleRef::clone(module),
            dependencies: session.thaw_all(&entry.dependencies)?,
            blocks: session.thaw_all(&entry.blocks)?,
        })
    }
}
