use std::cell::RefCell;
use std::rc::Rc;

use crate::extensions::ExtensionSlot;
use crate::location::SourceRange;
use crate::module::ModuleRef;
use crate::node::{AttachError, BlockLink, LiveValue, Node, NodeRef};

/// A lazily loaded chunk boundary (`import()`, `require.ensure`).
///
/// Blocks own their dependencies and nested blocks. Those children are
/// attached after the block exists, so that a child can point back at it.
#[derive(Debug, Default)]
pub struct AsyncBlock {
    chunk_name: Option<String>,
    request: Option<String>,
    module: Option<ModuleRef>,
    dependencies: RefCell<Vec<NodeRef>>,
    blocks: RefCell<Vec<NodeRef>>,
    ext: ExtensionSlot,
}

impl AsyncBlock {
    #[must_use]
    pub fn new(
        chunk_name: Option<String>,
        request: Option<String>,
        module: Option<ModuleRef>,
    ) -> Self {
        Self {
            chunk_name,
            request,
            module,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn chunk_name(&self) -> Option<&str> {
        self.chunk_name.as_deref()
    }

    #[must_use]
    pub fn request(&self) -> Option<&str> {
        self.request.as_deref()
    }

    #[must_use]
    pub fn module(&self) -> Option<&ModuleRef> {
        self.module.as_ref()
    }

    pub fn push_dependency(&self, dependency: NodeRef) {
        self.dependencies.borrow_mut().push(dependency);
    }

    pub fn push_block(&self, block: NodeRef) {
        self.blocks.borrow_mut().push(block);
    }

    #[must_use]
    pub fn dependencies(&self) -> Vec<NodeRef> {
        self.dependencies.borrow().clone()
    }

    #[must_use]
    pub fn blocks(&self) -> Vec<NodeRef> {
        self.blocks.borrow().clone()
    }
}

impl Node for AsyncBlock {
    fn kind(&self) -> &'static str {
        "AsyncBlock"
    }

    fn field(&self, name: &str) -> LiveValue {
        match name {
            "chunk_name" => LiveValue::opt_string(self.chunk_name.as_deref()),
            "request" => LiveValue::opt_string(self.request.as_deref()),
            "module" => LiveValue::opt_module(self.module.as_ref()),
            "dependencies" => LiveValue::Nodes(self.dependencies()),
            "blocks" => LiveValue::Nodes(self.blocks()),
            _ => LiveValue::Absent,
        }
    }

    fn children(&self) -> Vec<NodeRef> {
        let mut children = self.dependencies();
        children.extend(self.blocks());
        children
    }

    fn attach(&self, field: &str, value: LiveValue) -> Result<(), AttachError> {
        let target = match field {
            "dependencies" => &self.dependencies,
            "blocks" => &self.blocks,
            _ => {
                return Err(AttachError {
                    kind: self.kind(),
                    field: field.to_string(),
                });
            }
        };
        match value {
            LiveValue::Nodes(nodes) => target.borrow_mut().extend(nodes),
            LiveValue::Absent => {}
            _ => {
                return Err(AttachError {
                    kind: self.kind(),
                    field: field.to_string(),
                });
            }
        }
        Ok(())
    }

    fn extensions(&self) -> &ExtensionSlot {
        &self.ext
    }
}

/// The dependency created by a dynamic `import()`; it points at the block
/// that loads the imported module.
#[derive(Debug)]
pub struct ImportDependency {
    request: String,
    block: Option<BlockLink>,
    origin_module: Option<ModuleRef>,
    range: Option<SourceRange>,
    ext: ExtensionSlot,
}

impl ImportDependency {
    #[must_use]
    pub fn new(
        request: impl Into<String>,
        block: Option<BlockLink>,
        origin_module: Option<ModuleRef>,
        range: Option<SourceRange>,
    ) -> Self {
        Self {
            request: request.into(),
            block,
            origin_module,
            range,
            ext: ExtensionSlot::default(),
        }
    }

    #[must_use]
    pub fn request(&self) -> &str {
        &self.request
    }

    #[must_use]
    pub fn block(&self) -> Option<&BlockLink> {
        self.block.as_ref()
    }

    /// The block node, if one is linked and still alive.
    #[must_use]
    pub fn block_node(&self) -> Option<NodeRef> {
        self.block.as_ref().and_then(BlockLink::get)
    }

    #[must_use]
    pub fn origin_module(&self) -> Option<&ModuleRef> {
        self.origin_module.as_ref()
    }

    #[must_use]
    pub fn range(&self) -> Option<SourceRange> {
        self.range
    }
}

impl Node for ImportDependency {
    fn kind(&self) -> &'static str {
        "ImportDependency"
    }

    fn field(&self, name: &str) -> LiveValue {
        match name {
            "request" => LiveValue::string(&self.request),
            "block" => self.block.clone().map_or(LiveValue::Absent, LiveValue::Block),
            "origin_module" => LiveValue::opt_module(self.origin_module.as_ref()),
            "range" => LiveValue::encode(&self.range),
            _ => LiveValue::Absent,
        }
    }

    fn children(&self) -> Vec<NodeRef> {
        match &self.block {
            Some(BlockLink::Owned(block)) => vec![Rc::clone(block)],
            _ => Vec::new(),
        }
    }

    fn extensions(&self) -> &ExtensionSlot {
        &self.ext
    }
}
