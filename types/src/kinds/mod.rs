//! Concrete node kinds of the module graph.
//!
//! Plain dependencies live in `dependency`, the block/import pair that forms
//! the graph's cycles lives in `block`, and ES module bindings live in
//! `harmony`.

mod block;
mod dependency;
mod harmony;

pub use block::{AsyncBlock, ImportDependency};
pub use dependency::{ConstDependency, ContextDependency, LocalModuleDependency, ModuleDependency};
pub use harmony::{
    HarmonyCompatibilityDependency, HarmonyImportDependency, HarmonyImportSpecifierDependency,
    HarmonyReexportDependency,
};
