//! The live node abstraction.
//!
//! A live graph is built from reference-counted [`Node`] trait objects. Owning
//! edges are [`NodeRef`]s; edges that point back at an ancestor are
//! [`WeakNode`]s so that a block and the dependencies it owns never keep each
//! other alive.

use std::any::{Any, TypeId};
use std::fmt;
use std::rc::{Rc, Weak};

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::extensions::{ExtensionSlot, NodeWarning};
use crate::module::ModuleRef;
use crate::pattern::Pattern;
use crate::shared::{LocalModule, SharedNames, StarExports};

pub type NodeRef = Rc<dyn Node>;
pub type WeakNode = Weak<dyn Node>;

/// A node of the module graph: a dependency or a dependency block.
pub trait Node: Any + fmt::Debug {
    /// Human-readable kind, used in diagnostics only. Schema lookup goes through
    /// [`constructor_id`], never through this name.
    fn kind(&self) -> &'static str;

    /// Read a named field. Unknown names yield [`LiveValue::Absent`].
    fn field(&self, name: &str) -> LiveValue;

    /// Nodes this node owns. Cycle closure consults this list to decide which
    /// direction of a block/dependency edge gets persisted.
    fn children(&self) -> Vec<NodeRef> {
        Vec::new()
    }

    /// Attach a field after construction. Only container kinds accept this.
    fn attach(&self, field: &str, value: LiveValue) -> Result<(), AttachError> {
        drop(value);
        Err(AttachError {
            kind: self.kind(),
            field: field.to_string(),
        })
    }

    fn extensions(&self) -> &ExtensionSlot;

    /// Warnings this node reports. Thawed nodes regenerate the volatile part
    /// of each stack at call time.
    fn warnings(&self) -> Vec<NodeWarning> {
        self.extensions().borrow().warnings.produce()
    }
}

impl dyn Node {
    #[must_use]
    pub fn downcast_ref<T: Node>(&self) -> Option<&T> {
        let any: &dyn Any = self;
        any.downcast_ref::<T>()
    }
}

#[derive(Debug, Error)]
#[error("{kind} does not accept `{field}` after construction")]
pub struct AttachError {
    pub kind: &'static str,
    pub field: String,
}

/// Identity of the concrete type behind a node. This is the key the schema
/// registry matches on when freezing.
#[must_use]
pub fn constructor_id(node: &dyn Node) -> TypeId {
    let any: &dyn Any = node;
    any.type_id()
}

/// Reference equality between a shared node and a borrowed one.
#[must_use]
pub fn same_node(shared: &NodeRef, node: &dyn Node) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(shared), std::ptr::from_ref(node))
}

/// The edge from a dependency to the block it belongs to.
///
/// `Owned` blocks are persisted nested inside the dependency. `Parent` blocks
/// own the dependency themselves; the edge is never persisted and is
/// re-derived from the traversal's parent slot on thaw.
#[derive(Debug, Clone)]
pub enum BlockLink {
    Owned(NodeRef),
    Parent(WeakNode),
}

impl BlockLink {
    #[must_use]
    pub fn parent(block: &NodeRef) -> Self {
        BlockLink::Parent(Rc::downgrade(block))
    }

    /// The block node, if it is still alive.
    #[must_use]
    pub fn get(&self) -> Option<NodeRef> {
        match self {
            BlockLink::Owned(node) => Some(Rc::clone(node)),
            BlockLink::Parent(weak) => weak.upgrade(),
        }
    }

    #[must_use]
    pub fn is_parent(&self) -> bool {
        matches!(self, BlockLink::Parent(_))
    }
}

/// A field value as read from, or handed to, a live node.
#[derive(Debug, Clone, Default)]
pub enum LiveValue {
    /// The field does not exist or was intentionally not persisted.
    #[default]
    Absent,
    /// JSON-safe data copied verbatim.
    Plain(Value),
    Pattern(Pattern),
    Node(NodeRef),
    Nodes(Vec<NodeRef>),
    Block(BlockLink),
    Module(ModuleRef),
    Local(Rc<LocalModule>),
    Names(SharedNames),
    StarExports(StarExports),
}

impl LiveValue {
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        LiveValue::Plain(Value::String(value.into()))
    }

    #[must_use]
    pub fn opt_string(value: Option<&str>) -> Self {
        LiveValue::Plain(value.map_or(Value::Null, |s| Value::String(s.to_string())))
    }

    #[must_use]
    pub fn bool(value: bool) -> Self {
        LiveValue::Plain(Value::Bool(value))
    }

    /// Encode serializable data as a plain value.
    #[must_use]
    pub fn encode<T: Serialize>(value: &T) -> Self {
        serde_json::to_value(value).map_or(LiveValue::Absent, LiveValue::Plain)
    }

    #[must_use]
    pub fn opt_module(module: Option<&ModuleRef>) -> Self {
        module.map_or(LiveValue::Absent, |m| LiveValue::Module(Rc::clone(m)))
    }

    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, LiveValue::Absent)
    }

    /// Short name of the variant, for error messages.
    #[must_use]
    pub fn shape(&self) -> &'static str {
        match self {
            LiveValue::Absent => "absent",
            LiveValue::Plain(_) => "plain",
            LiveValue::Pattern(_) => "pattern",
            LiveValue::Node(_) => "node",
            LiveValue::Nodes(_) => "node list",
            LiveValue::Block(_) => "block link",
            LiveValue::Module(_) => "module",
            LiveValue::Local(_) => "local module",
            LiveValue::Names(_) => "name set",
            LiveValue::StarExports(_) => "star export list",
        }
    }
}

impl From<Value> for LiveValue {
    fn from(value: Value) -> Self {
        LiveValue::Plain(value)
    }
}

impl From<NodeRef> for LiveValue {
    fn from(node: NodeRef) -> Self {
        LiveValue::Node(node)
    }
}
