//! The thaw engine.

use std::rc::Rc;

use hoard_types::{LiveValue, ModuleRef, NodeRef};
use serde_json::Value;
use tracing::debug;

use crate::codecs::IDENTITY;
use crate::context::TraversalContext;
use crate::error::{CodecError, ConstructionError, Error};
use crate::extensions::thaw_extensions;
use crate::provider::Args;
use crate::record::FrozenRecord;
use crate::registry::{DEFAULT_MAX_DEPTH, SchemaDefinition, SchemaRegistry};
use crate::schema::{FieldSpec, Stage};

/// One thaw traversal. Owns the session's [`TraversalContext`], so identity
/// (shared local modules, deduplicated imports, export accumulators) is
/// preserved across every record thawed through the same session and never
/// beyond it.
#[derive(Debug)]
pub struct ThawSession<'r> {
    registry: &'r SchemaRegistry,
    context: TraversalContext,
    depth: usize,
    max_depth: usize,
}

impl<'r> ThawSession<'r> {
    pub(crate) fn new(registry: &'r SchemaRegistry, owner: Option<ModuleRef>) -> Self {
        Self {
            registry,
            context: TraversalContext::new(owner),
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn registry(&self) -> &'r SchemaRegistry {
        self.registry
    }

    #[must_use]
    pub fn context(&self) -> &TraversalContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut TraversalContext {
        &mut self.context
    }

    #[must_use]
    pub fn into_context(self) -> TraversalContext {
        self.context
    }

    /// Rebuild a live node from `record`.
    ///
    /// Returns `Ok(None)` when the tag has no schema in the active version.
    pub fn thaw(&mut self, record: &FrozenRecord) -> Result<Option<NodeRef>, Error> {
        let registry = self.registry;
        let Some(schema) = registry.resolve(record.type_name()) else {
            debug!(
                type_name = record.type_name(),
                version = %registry.version(),
                "no schema for record; skipped"
            );
            return Ok(None);
        };
        if self.depth >= self.max_depth {
            return Err(CodecError::DepthExceeded(self.max_depth).into());
        }
        self.depth += 1;
        let result = self.build(schema, record);
        self.depth -= 1;
        result.map(Some)
    }

    /// Thaw a nested record held as raw JSON.
    pub fn thaw_value(&mut self, value: &Value) -> Result<Option<NodeRef>, Error> {
        let record = FrozenRecord::from_value(value.clone())?;
        self.thaw(&record)
    }

    /// Thaw a list of sibling records, dropping those without a schema.
    pub fn thaw_all(&mut self, records: &[FrozenRecord]) -> Result<Vec<NodeRef>, Error> {
        let mut nodes = Vec::with_capacity(records.len());
        for record in records {
            if let Some(node) = self.thaw(record)? {
                nodes.push(node);
            }
        }
        Ok(nodes)
    }

    fn build(
        &mut self,
        schema: &SchemaDefinition,
        record: &FrozenRecord,
    ) -> Result<NodeRef, Error> {
        let mut args = Args::new(schema.type_name());
        let mut attached = Vec::new();
        for spec in schema.fields() {
            match spec.stage {
                Stage::Build => {
                    let value = self.thaw_field(spec, record)?;
                    args.push(spec.name, value);
                }
                Stage::Attach => attached.push(spec),
            }
        }

        let node = (schema.binding().build)(args)?;

        if !attached.is_empty() {
            let previous = self.context.replace_parent(Some(Rc::clone(&node)));
            let result = self.attach_fields(&node, &attached, record);
            self.context.replace_parent(previous);
            result?;
        }
        if let Some(hook) = schema.after_thaw() {
            hook(&node, &mut self.context);
        }
        thaw_extensions(&node, record, self);
        Ok(node)
    }

    fn attach_fields(
        &mut self,
        node: &NodeRef,
        specs: &[&FieldSpec],
        record: &FrozenRecord,
    ) -> Result<(), Error> {
        for spec in specs {
            let value = self.thaw_field(spec, record)?;
            node.attach(spec.name, value).map_err(ConstructionError::from)?;
        }
        Ok(())
    }

    fn thaw_field(&mut self, spec: &FieldSpec, record: &FrozenRecord) -> Result<LiveValue, Error> {
        let codec = spec.codec.unwrap_or(IDENTITY);
        (codec.thaw)(spec.name, record.get(spec.name), record, self)
    }
}
