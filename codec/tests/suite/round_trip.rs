//! Freeze then thaw reproduces every persisted field.

use std::rc::Rc;

use hoard_codec::{CodecError, Error, SchemaVersion};
use hoard_types::{
    ConstDependency, ContextDependency, HarmonyImportDependency, LocalModule,
    LocalModuleDependency, ModuleDependency, NodeRef, Pattern, SourceRange, same_node,
};
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::{CONTEXT, freeze, owner, registry, thaw};

fn fixtures() -> Vec<NodeRef> {
    vec![
        Rc::new(
            ModuleDependency::new("/repo/src/lib/a.js", Some(SourceRange(0, 21)))
                .with_user_request("./lib/a.js"),
        ),
        Rc::new(ConstDependency::new(
            "__webpack_require__.n",
            Some(SourceRange(40, 45)),
            vec!["__webpack_require__".to_string()],
        )),
        Rc::new(
            ContextDependency::new(
                "/repo/src/locales",
                false,
                Some(Pattern::parse(r"/^\./.*\.json$/i").unwrap()),
                Some(SourceRange(60, 110)),
            )
            .with_mode("lazy"),
        ),
        Rc::new(ContextDependency::new("/repo/src/views", true, None, None)),
        Rc::new(HarmonyImportDependency::new(
            "/repo/node_modules/react/index.js",
            Some(2),
            Some(SourceRange(0, 26)),
            Some(owner()),
        )),
    ]
}

#[test]
fn thawed_nodes_freeze_to_the_same_record() {
    let registry = registry(SchemaVersion::V4);
    for node in fixtures() {
        let frozen = freeze(&registry, node.as_ref());
        let thawed = thaw(&registry, &frozen);
        assert_eq!(freeze(&registry, thawed.as_ref()), frozen, "{}", node.kind());
    }
}

#[test]
fn requests_under_the_module_directory_are_stored_relative() {
    let registry = registry(SchemaVersion::V4);
    let node = ModuleDependency::new("/repo/src/lib/a.js", None).with_user_request("./lib/a.js");

    let frozen = freeze(&registry, &node);
    assert_eq!(frozen.get("request"), Some(&json!("<context>/lib/a.js")));
    assert_eq!(frozen.get("user_request"), Some(&json!("./lib/a.js")));

    let thawed = thaw(&registry, &frozen);
    let thawed = thawed.downcast_ref::<ModuleDependency>().unwrap();
    assert_eq!(thawed.request(), format!("{CONTEXT}/lib/a.js"));
}

#[test]
fn patterns_are_stored_as_literals() {
    let registry = registry(SchemaVersion::V4);
    let node = ContextDependency::new(
        "./locales",
        true,
        Some(Pattern::parse(r"/\.json$/").unwrap()),
        None,
    );

    let frozen = freeze(&registry, &node);
    assert_eq!(frozen.get("pattern"), Some(&json!(r"/\.json$/")));

    let thawed = thaw(&registry, &frozen);
    let pattern = thawed
        .downcast_ref::<ContextDependency>()
        .unwrap()
        .pattern()
        .cloned()
        .unwrap();
    assert!(pattern.is_match("./en.json"));
    assert!(!pattern.is_match("./en.yaml"));
}

#[test]
fn malformed_stored_pattern_aborts_the_thaw() {
    let registry = registry(SchemaVersion::V4);
    let mut frozen = freeze(
        &registry,
        &ContextDependency::new("./locales", true, None, None),
    );
    frozen.insert("pattern", json!("not a literal"));

    let result = registry.thaw_session(Some(owner())).thaw(&frozen);
    assert!(matches!(
        result,
        Err(Error::Codec(CodecError::MalformedPattern { .. }))
    ));
}

#[test]
fn origin_module_is_never_stored_and_comes_back_as_owner() {
    let registry = registry(SchemaVersion::V4);
    let node = HarmonyImportDependency::new("./a.js", Some(0), None, Some(owner()));

    let frozen = freeze(&registry, &node);
    assert!(!frozen.contains("origin_module"));

    let session_owner = owner();
    let thawed = registry
        .thaw_session(Some(Rc::clone(&session_owner)))
        .thaw(&frozen)
        .unwrap()
        .unwrap();
    let origin = thawed
        .downcast_ref::<HarmonyImportDependency>()
        .unwrap()
        .origin_module()
        .cloned()
        .unwrap();
    assert!(Rc::ptr_eq(&origin, &session_owner));
}

#[test]
fn local_modules_are_shared_by_index_within_a_session() {
    let registry = registry(SchemaVersion::V4);
    let local = Rc::new(LocalModule::new("helpers", 3));
    local.flag_used();
    let nodes: Vec<NodeRef> = vec![
        Rc::new(LocalModuleDependency::new(Rc::clone(&local), Some(SourceRange(1, 2)))),
        Rc::new(LocalModuleDependency::new(Rc::clone(&local), Some(SourceRange(8, 9)))),
    ];

    let frozen = registry
        .freeze_session(Some(owner()))
        .freeze_all(&nodes)
        .unwrap();
    assert_eq!(
        frozen[0].get("local_module"),
        Some(&json!({ "name": "helpers", "index": 3, "used": true }))
    );

    let mut session = registry.thaw_session(Some(owner()));
    let thawed = session.thaw_all(&frozen).unwrap();
    let first = thawed[0].downcast_ref::<LocalModuleDependency>().unwrap();
    let second = thawed[1].downcast_ref::<LocalModuleDependency>().unwrap();

    assert!(Rc::ptr_eq(first.local_module(), second.local_module()));
    assert!(first.local_module().is_used());
    assert_eq!(first.local_module().variable_name(), "__LOCAL_MODULE_3__");
    assert_eq!(session.context().state().local_module_count(), 1);
    assert!(!same_node(&thawed[0], thawed[1].as_ref()));
}
