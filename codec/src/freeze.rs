//! The freeze engine.

use hoard_types::{ModuleRef, Node, NodeRef, constructor_id};
use tracing::debug;

use crate::codecs::IDENTITY;
use crate::context::TraversalContext;
use crate::error::{CodecError, Error};
use crate::extensions::freeze_extensions;
use crate::record::FrozenRecord;
use crate::registry::{DEFAULT_MAX_DEPTH, SchemaDefinition, SchemaRegistry};

/// One freeze traversal. Owns the session's [`TraversalContext`]; start a new
/// session for every graph snapshot.
#[derive(Debug)]
pub struct FreezeSession<'r> {
    registry: &'r SchemaRegistry,
    context: TraversalContext,
    depth: usize,
    max_depth: usize,
}

impl<'r> FreezeSession<'r> {
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

    /// Freeze one node and everything it owns.
    ///
    /// Returns `Ok(None)` when the node's type has no schema in the active
    /// version. Any error invalidates everything this session produced.
    pub fn freeze(&mut self, node: &dyn Node) -> Result<Option<FrozenRecord>, Error> {
        let registry = self.registry;
        let Some(schema) = registry.resolve_by_constructor(constructor_id(node)) else {
            debug!(
                kind = node.kind(),
                version = %registry.version(),
                "no schema for node; skipped"
            );
            return Ok(None);
        };
        if self.depth >= self.max_depth {
            return Err(CodecError::DepthExceeded(self.max_depth).into());
        }
        self.depth += 1;
        let result = self.freeze_fields(schema, node);
        self.depth -= 1;
        result.map(Some)
    }

    /// Freeze a list of nodes, dropping those without a schema.
    pub fn freeze_all(&mut self, nodes: &[NodeRef]) -> Result<Vec<FrozenRecord>, Error> {
        let mut records = Vec::with_capacity(nodes.len());
        for node in nodes {
            if let Some(record) = self.freeze(node.as_ref())? {
                records.push(record);
            }
        }
        Ok(records)
    }

    fn freeze_fields(
        &mut self,
        schema: &SchemaDefinition,
        node: &dyn Node,
    ) -> Result<FrozenRecord, Error> {
        let mut record = FrozenRecord::new(schema.type_name());
        for spec in schema.fields() {
            let value = node.field(spec.name);
            let codec = spec.codec.unwrap_or(IDENTITY);
            if let Some(frozen) = (codec.freeze)(spec.name, &value, node, self)? {
                record.insert(spec.name, frozen);
            }
        }
        freeze_extensions(node, &mut record);
        Ok(record)
    }
}
