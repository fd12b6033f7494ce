//! Records written under one schema version are read under another.

use std::rc::Rc;

use hoard_codec::{FrozenRecord, SchemaVersion};
use hoard_types::{
    AsyncBlock, ContextDependency, HarmonyCompatibilityDependency, HarmonyImportDependency,
    ModuleDependency, NodeRef, Pattern, SourceRange,
};
use pretty_assertions::assert_eq;

use crate::common::{freeze, owner, registry, thaw};

/// Fields both versions declare for the type.
fn common_fields(record: &FrozenRecord) -> Vec<(String, serde_json::Value)> {
    let v3 = registry(SchemaVersion::V3);
    let schema = v3.resolve(record.type_name()).unwrap();
    schema
        .fields()
        .iter()
        .filter_map(|spec| {
            record
                .get(spec.name)
                .map(|value| (spec.name.to_string(), value.clone()))
        })
        .collect()
}

#[test]
fn v3_records_thaw_under_v4_like_v4_records() {
    let v3 = registry(SchemaVersion::V3);
    let v4 = registry(SchemaVersion::V4);
    let nodes: Vec<NodeRef> = vec![
        Rc::new(
            ContextDependency::new(
                "/repo/src/icons",
                true,
                Some(Pattern::parse(r"/\.svg$/").unwrap()),
                Some(SourceRange(3, 40)),
            )
            .with_mode("eager"),
        ),
        Rc::new(HarmonyImportDependency::new(
            "./a.js",
            Some(4),
            Some(SourceRange(0, 18)),
            Some(owner()),
        )),
        Rc::new(ModuleDependency::new("/repo/src/b.js", Some(SourceRange(7, 9)))),
    ];

    for node in nodes {
        let via_v3 = freeze(&v4, thaw(&v4, &freeze(&v3, node.as_ref())).as_ref());
        let via_v4 = freeze(&v4, thaw(&v4, &freeze(&v4, node.as_ref())).as_ref());
        assert_eq!(common_fields(&via_v3), common_fields(&via_v4), "{}", node.kind());
    }
}

#[test]
fn fields_missing_from_v3_take_defaults() {
    let v3 = registry(SchemaVersion::V3);
    let v4 = registry(SchemaVersion::V4);
    let node = ContextDependency::new("./locales", false, None, None).with_mode("weak");

    let frozen = freeze(&v3, &node);
    assert!(!frozen.contains("mode"));

    let thawed = thaw(&v4, &frozen);
    let thawed = thawed.downcast_ref::<ContextDependency>().unwrap();
    assert_eq!(thawed.mode(), ContextDependency::DEFAULT_MODE);
    assert!(!thawed.recursive());
}

#[test]
fn types_unknown_to_the_reader_are_dropped_from_lists() {
    let v3 = registry(SchemaVersion::V3);
    let v4 = registry(SchemaVersion::V4);
    let block: NodeRef = Rc::new(AsyncBlock::new(None, None, None));
    let container = block.downcast_ref::<AsyncBlock>().unwrap();
    container.push_dependency(Rc::new(HarmonyCompatibilityDependency::new(Some(owner()))));
    container.push_dependency(Rc::new(ModuleDependency::new("./kept.js", None)));

    let frozen = freeze(&v4, block.as_ref());
    let thawed = thaw(&v3, &frozen);

    let dependencies = thawed.downcast_ref::<AsyncBlock>().unwrap().dependencies();
    assert_eq!(dependencies.len(), 1);
    assert!(dependencies[0].downcast_ref::<ModuleDependency>().is_some());
}

#[test]
fn writer_skips_types_its_version_lacks() {
    let v3 = registry(SchemaVersion::V3);
    let block: NodeRef = Rc::new(AsyncBlock::new(None, None, None));
    block
        .downcast_ref::<AsyncBlock>()
        .unwrap()
        .push_dependency(Rc::new(HarmonyCompatibilityDependency::new(None)));

    let frozen = freeze(&v3, block.as_ref());
    assert_eq!(frozen.get("dependencies"), Some(&serde_json::json!([])));
}
