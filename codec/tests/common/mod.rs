//! Shared fixtures for codec integration tests.

#![allow(dead_code)]

use hoard_codec::{FrozenRecord, SchemaRegistry, SchemaVersion};
use hoard_types::{Module, ModuleRef, Node, NodeRef};

pub const CONTEXT: &str = "/repo/src";

/// The module every fixture graph belongs to.
pub fn owner() -> ModuleRef {
    Module::shared("/repo/src/index.js", CONTEXT)
}

pub fn registry(version: SchemaVersion) -> SchemaRegistry {
    SchemaRegistry::builtin(version)
}

/// Freeze a single node in a fresh session.
pub fn freeze(registry: &SchemaRegistry, node: &dyn Node) -> FrozenRecord {
    registry
        .freeze_session(Some(owner()))
        .freeze(node)
        .unwrap()
        .unwrap()
}

/// Thaw a single record in a fresh session.
pub fn thaw(registry: &SchemaRegistry, record: &FrozenRecord) -> NodeRef {
    registry
        .thaw_session(Some(owner()))
        .thaw(record)
        .unwrap()
        .unwrap()
}
