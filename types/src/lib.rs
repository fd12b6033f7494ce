//! Live module-graph types for Hoard.
//!
//! This crate holds the in-memory side of the cache: the owning [`Module`], the
//! [`Node`] trait every dependency or block kind implements, the [`LiveValue`]
//! shapes those nodes expose field by field, and the session-shared handles
//! (local modules, export sets, star re-export lists) that thawed nodes point at.
//!
//! Nothing here performs IO or knows about the frozen wire format.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod extensions;
mod kinds;
mod location;
mod module;
mod node;
mod pattern;
mod shared;

pub use extensions::{
    ExtensionSlot, Extensions, FrozenWarning, NodeWarning, WARNING_FRAME_MARKER, Warnings,
    split_stack,
};
pub use kinds::{
    AsyncBlock, ConstDependency, ContextDependency, HarmonyCompatibilityDependency,
    HarmonyImportDependency, HarmonyImportSpecifierDependency, HarmonyReexportDependency,
    ImportDependency, LocalModuleDependency, ModuleDependency,
};
pub use location::{FlatLocation, Position, SourceLocation, SourceRange};
pub use module::{Module, ModuleRef};
pub use node::{
    AttachError, BlockLink, LiveValue, Node, NodeRef, WeakNode, constructor_id, same_node,
};
pub use pattern::{Pattern, PatternError};
pub use shared::{LocalModule, SharedNames, StarExports, new_shared_names, new_star_exports};
