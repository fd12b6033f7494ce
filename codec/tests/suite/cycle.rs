//! Block/dependency cycles are cut on freeze and closed again on thaw.

use std::rc::Rc;

use hoard_codec::SchemaVersion;
use hoard_types::{
    AsyncBlock, BlockLink, ImportDependency, ModuleDependency, NodeRef, SourceRange, same_node,
};
use serde_json::{Value, json};

use crate::common::{freeze, owner, registry};

/// `B` owns `A` and `C`; `A.block` points back at `B`.
fn cyclic_block() -> (NodeRef, NodeRef) {
    let block: NodeRef = Rc::new(AsyncBlock::new(
        Some("lazy".to_string()),
        Some("/repo/src/lazy.js".to_string()),
        Some(owner()),
    ));
    let import: NodeRef = Rc::new(ImportDependency::new(
        "/repo/src/lazy.js",
        Some(BlockLink::parent(&block)),
        Some(owner()),
        Some(SourceRange(4, 24)),
    ));
    let sibling: NodeRef = Rc::new(ModuleDependency::new("/repo/src/shared.js", None));

    let container = block.downcast_ref::<AsyncBlock>().unwrap();
    container.push_dependency(Rc::clone(&import));
    container.push_dependency(sibling);
    (block, import)
}

#[test]
fn dependency_reached_first_omits_its_owning_block() {
    let registry = registry(SchemaVersion::V4);
    let (block, import) = cyclic_block();

    let frozen = freeze(&registry, import.as_ref());
    assert!(!frozen.contains("block"));
    assert_eq!(frozen.get("request"), Some(&json!("<context>/lazy.js")));

    let mut session = registry.thaw_session(Some(owner()));
    session.context_mut().replace_parent(Some(Rc::clone(&block)));
    let thawed = session.thaw(&frozen).unwrap().unwrap();

    let link = thawed
        .downcast_ref::<ImportDependency>()
        .unwrap()
        .block()
        .cloned()
        .unwrap();
    assert!(link.is_parent());
    assert!(same_node(&block, link.get().unwrap().as_ref()));
}

#[test]
fn freezing_the_block_terminates_and_nests_dependencies_once() {
    let registry = registry(SchemaVersion::V4);
    let (block, _import) = cyclic_block();

    let frozen = freeze(&registry, block.as_ref());
    let Some(Value::Array(dependencies)) = frozen.get("dependencies") else {
        panic!("dependencies not frozen: {frozen:?}");
    };
    assert_eq!(dependencies.len(), 2);
    assert_eq!(dependencies[0]["type"], json!("ImportDependency"));
    assert!(dependencies[0].get("block").is_none());
    assert!(!frozen.contains("module"));
}

#[test]
fn thawed_block_is_isomorphic_and_closes_the_cycle() {
    let registry = registry(SchemaVersion::V4);
    let (block, _import) = cyclic_block();
    let frozen = freeze(&registry, block.as_ref());

    let mut session = registry.thaw_session(Some(owner()));
    let thawed = session.thaw(&frozen).unwrap().unwrap();
    assert!(session.context().parent().is_none());

    let container = thawed.downcast_ref::<AsyncBlock>().unwrap();
    assert_eq!(container.chunk_name(), Some("lazy"));
    assert_eq!(container.request(), Some("/repo/src/lazy.js"));

    let dependencies = container.dependencies();
    assert_eq!(dependencies.len(), 2);
    let import = dependencies[0].downcast_ref::<ImportDependency>().unwrap();
    let back = import.block_node().unwrap();
    assert!(same_node(&back, thawed.as_ref()));
    assert!(dependencies[1].downcast_ref::<ModuleDependency>().is_some());
    assert!(dependencies[1].downcast_ref::<ImportDependency>().is_none());

    // A weak back edge keeps the block droppable.
    let weak = Rc::downgrade(&thawed);
    drop(back);
    drop(dependencies);
    drop(thawed);
    assert!(weak.upgrade().is_none());
}

#[test]
fn owned_block_is_nested_and_thawed_as_owned() {
    let registry = registry(SchemaVersion::V4);
    let block: NodeRef = Rc::new(AsyncBlock::new(None, Some("./chunk.js".to_string()), None));
    let import = ImportDependency::new("./chunk.js", Some(BlockLink::Owned(block)), None, None);

    let frozen = freeze(&registry, &import);
    assert_eq!(frozen.get("block").unwrap()["type"], json!("AsyncBlock"));

    let thawed = registry
        .thaw_session(Some(owner()))
        .thaw(&frozen)
        .unwrap()
        .unwrap();
    let import = thawed.downcast_ref::<ImportDependency>().unwrap();
    assert!(matches!(import.block(), Some(BlockLink::Owned(_))));
    assert_eq!(thawed.children().len(), 1);
}

#[test]
fn dependency_without_block_stays_without_block_inside_a_parent() {
    let registry = registry(SchemaVersion::V4);
    let outer: NodeRef = Rc::new(AsyncBlock::new(None, None, None));
    let orphan: NodeRef = Rc::new(ImportDependency::new("./x.js", None, None, None));
    outer
        .downcast_ref::<AsyncBlock>()
        .unwrap()
        .push_dependency(orphan);

    let frozen = freeze(&registry, outer.as_ref());
    let thawed = registry
        .thaw_session(Some(owner()))
        .thaw(&frozen)
        .unwrap()
        .unwrap();

    let dependencies = thawed.downcast_ref::<AsyncBlock>().unwrap().dependencies();
    let import = dependencies[0].downcast_ref::<ImportDependency>().unwrap();
    assert!(import.block().is_none());
}

#[test]
fn nested_blocks_point_at_their_nearest_container() {
    let registry = registry(SchemaVersion::V4);
    let outer: NodeRef = Rc::new(AsyncBlock::new(Some("outer".to_string()), None, None));
    let inner: NodeRef = Rc::new(AsyncBlock::new(Some("inner".to_string()), None, None));
    let import: NodeRef = Rc::new(ImportDependency::new(
        "./deep.js",
        Some(BlockLink::parent(&inner)),
        None,
        None,
    ));
    inner
        .downcast_ref::<AsyncBlock>()
        .unwrap()
        .push_dependency(import);
    outer
        .downcast_ref::<AsyncBlock>()
        .unwrap()
        .push_block(inner);

    let frozen = freeze(&registry, outer.as_ref());
    let thawed = registry
        .thaw_session(Some(owner()))
        .thaw(&frozen)
        .unwrap()
        .unwrap();

    let inner = thawed.downcast_ref::<AsyncBlock>().unwrap().blocks()[0].clone();
    let import = inner.downcast_ref::<AsyncBlock>().unwrap().dependencies()[0].clone();
    let back = import
        .downcast_ref::<ImportDependency>()
        .unwrap()
        .block_node()
        .unwrap();
    assert!(same_node(&back, inner.as_ref()));
    assert!(!same_node(&back, thawed.as_ref()));
}
