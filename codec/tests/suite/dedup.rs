//! Import dependencies shared by several specifiers thaw to one instance.

use std::rc::Rc;

use hoard_codec::{FrozenRecord, SchemaVersion};
use hoard_types::{
    HarmonyImportDependency, HarmonyImportSpecifierDependency, NodeRef, SourceRange, same_node,
};
use pretty_assertions::assert_eq;

use crate::common::{owner, registry};

fn specifiers() -> Vec<NodeRef> {
    let import: NodeRef = Rc::new(HarmonyImportDependency::new(
        "./math.js",
        Some(0),
        Some(SourceRange(0, 35)),
        Some(owner()),
    ));
    ["add", "sub"]
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let offset = 50 + 10 * i as u32;
            Rc::new(HarmonyImportSpecifierDependency::new(
                Rc::clone(&import),
                Some((*name).to_string()),
                *name,
                Some(SourceRange(offset, offset + 3)),
                Some(owner()),
            )) as NodeRef
        })
        .collect()
}

fn import_of(node: &NodeRef) -> NodeRef {
    Rc::clone(
        node.downcast_ref::<HarmonyImportSpecifierDependency>()
            .unwrap()
            .import_dependency(),
    )
}

fn frozen_specifiers() -> Vec<FrozenRecord> {
    registry(SchemaVersion::V4)
        .freeze_session(Some(owner()))
        .freeze_all(&specifiers())
        .unwrap()
}

#[test]
fn shared_import_is_nested_in_every_record() {
    let frozen = frozen_specifiers();
    assert_eq!(frozen.len(), 2);
    assert_eq!(frozen[0].get("import_dependency"), frozen[1].get("import_dependency"));
}

#[test]
fn same_range_thaws_to_the_same_instance_within_a_session() {
    let registry = registry(SchemaVersion::V4);
    let frozen = frozen_specifiers();

    let thawed = registry
        .thaw_session(Some(owner()))
        .thaw_all(&frozen)
        .unwrap();

    let first = import_of(&thawed[0]);
    let second = import_of(&thawed[1]);
    assert!(same_node(&first, second.as_ref()));
}

#[test]
fn sessions_do_not_share_instances() {
    let registry = registry(SchemaVersion::V4);
    let frozen = frozen_specifiers();

    let a = registry
        .thaw_session(Some(owner()))
        .thaw(&frozen[0])
        .unwrap()
        .unwrap();
    let b = registry
        .thaw_session(Some(owner()))
        .thaw(&frozen[1])
        .unwrap()
        .unwrap();

    assert!(!same_node(&import_of(&a), import_of(&b).as_ref()));
}

#[test]
fn first_thawed_instance_wins() {
    let registry = registry(SchemaVersion::V4);
    let mut frozen = frozen_specifiers();
    let mut nested = frozen[1].get("import_dependency").cloned().unwrap();
    nested["request"] = serde_json::json!("./renamed.js");
    frozen[1].insert("import_dependency", nested);

    let thawed = registry
        .thaw_session(Some(owner()))
        .thaw_all(&frozen)
        .unwrap();

    let kept = import_of(&thawed[1]);
    let kept = kept.downcast_ref::<HarmonyImportDependency>().unwrap();
    assert_eq!(kept.request(), "./math.js");
}

#[test]
fn imports_without_range_are_not_collapsed() {
    let registry = registry(SchemaVersion::V4);
    let import: NodeRef = Rc::new(HarmonyImportDependency::new("./a.js", None, None, None));
    let nodes: Vec<NodeRef> = (0..2)
        .map(|_| {
            Rc::new(HarmonyImportSpecifierDependency::new(
                Rc::clone(&import),
                None,
                "ns",
                None,
                None,
            )) as NodeRef
        })
        .collect();

    let frozen = registry
        .freeze_session(Some(owner()))
        .freeze_all(&nodes)
        .unwrap();
    let thawed = registry
        .thaw_session(Some(owner()))
        .thaw_all(&frozen)
        .unwrap();

    assert!(!same_node(&import_of(&thawed[0]), import_of(&thawed[1]).as_ref()));
}
