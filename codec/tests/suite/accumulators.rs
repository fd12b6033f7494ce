//! Export name sets and star re-export lists grow as siblings thaw.

use std::rc::Rc;

use hoard_codec::{FrozenRecord, SchemaVersion};
use hoard_types::{
    HarmonyImportDependency, HarmonyReexportDependency, NodeRef, SourceRange, new_shared_names,
    new_star_exports, same_node,
};
use serde_json::{Value, json};

use crate::common::{owner, registry};

fn reexport(name: Option<&str>, star: bool) -> NodeRef {
    let import: NodeRef = Rc::new(HarmonyImportDependency::new(
        "./lib.js",
        Some(1),
        Some(SourceRange(0, 24)),
        None,
    ));
    Rc::new(HarmonyReexportDependency::new(
        import,
        name.map(str::to_string),
        name.map(str::to_string),
        new_shared_names(),
        star.then(new_star_exports),
        None,
    ))
}

fn freeze_all(nodes: &[NodeRef]) -> Vec<FrozenRecord> {
    registry(SchemaVersion::V4)
        .freeze_session(Some(owner()))
        .freeze_all(nodes)
        .unwrap()
}

fn reexport_of(node: &NodeRef) -> &HarmonyReexportDependency {
    node.downcast_ref::<HarmonyReexportDependency>().unwrap()
}

#[test]
fn active_exports_are_never_stored() {
    let frozen = freeze_all(&[reexport(Some("a"), false)]);
    assert_eq!(frozen[0].get("active_exports"), Some(&Value::Null));
    assert!(!frozen[0].contains("other_star_exports"));
}

#[test]
fn active_exports_count_distinct_names_in_any_order() {
    let nodes = vec![
        reexport(Some("a"), false),
        reexport(Some("b"), false),
        reexport(Some("a"), false),
        reexport(None, true),
        reexport(Some(""), false),
    ];
    let frozen = freeze_all(&nodes);
    let registry = registry(SchemaVersion::V4);

    for order in [[0, 1, 2, 3, 4], [4, 3, 2, 1, 0], [2, 4, 0, 3, 1]] {
        let records: Vec<FrozenRecord> = order.iter().map(|&i| frozen[i].clone()).collect();
        let thawed = registry
            .thaw_session(Some(owner()))
            .thaw_all(&records)
            .unwrap();

        let names = Rc::clone(reexport_of(&thawed[0]).active_exports());
        assert_eq!(names.borrow().len(), 2, "order {order:?}");
        for node in &thawed {
            assert!(Rc::ptr_eq(reexport_of(node).active_exports(), &names));
        }
    }
}

#[test]
fn star_reexports_share_one_growing_list() {
    let nodes = vec![
        reexport(None, true),
        reexport(Some("x"), false),
        reexport(None, true),
    ];
    let frozen = freeze_all(&nodes);
    assert_eq!(frozen[0].get("other_star_exports"), Some(&json!(true)));

    let registry = registry(SchemaVersion::V4);
    let mut session = registry.thaw_session(Some(owner()));
    let thawed = session.thaw_all(&frozen).unwrap();

    let first = reexport_of(&thawed[0]).other_star_exports().cloned().unwrap();
    let last = reexport_of(&thawed[2]).other_star_exports().cloned().unwrap();
    assert!(Rc::ptr_eq(&first, &last));
    assert!(reexport_of(&thawed[1]).other_star_exports().is_none());

    // The first reader observes the star re-export thawed after it.
    let stars: Vec<NodeRef> = first.borrow().iter().filter_map(|weak| weak.upgrade()).collect();
    assert_eq!(stars.len(), 2);
    assert!(same_node(&stars[0], thawed[0].as_ref()));
    assert!(same_node(&stars[1], thawed[2].as_ref()));
    assert!(Rc::ptr_eq(&first, &session.context_mut().state_mut().star_list()));
}
