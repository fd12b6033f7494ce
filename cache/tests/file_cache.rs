//! End-to-end: configuration, file-backed storage, and a fresh reader.

use std::fs;
use std::rc::Rc;

use hoard_cache::{CACHE_FILE_NAME, GraphCache, HoardConfig, JsonFileSerializer, ModuleSnapshot};
use hoard_codec::SchemaVersion;
use hoard_types::{
    AsyncBlock, BlockLink, ContextDependency, ImportDependency, Module, ModuleRef, NodeRef,
    Pattern, SourceRange, same_node,
};

fn snapshot(module: &ModuleRef) -> ModuleSnapshot {
    let block: NodeRef = Rc::new(AsyncBlock::new(
        Some("locale".to_string()),
        Some("/app/src/locales".to_string()),
        Some(Rc::clone(module)),
    ));
    let import: NodeRef = Rc::new(ImportDependency::new(
        "/app/src/locales",
        Some(BlockLink::parent(&block)),
        Some(Rc::clone(module)),
        Some(SourceRange(10, 40)),
    ));
    block
        .downcast_ref::<AsyncBlock>()
        .unwrap()
        .push_dependency(import);

    let context: NodeRef = Rc::new(ContextDependency::new(
        "/app/src/locales",
        true,
        Some(Pattern::parse(r"/\.json$/").unwrap()),
        Some(SourceRange(50, 90)),
    ));
    ModuleSnapshot {
        module: Rc::clone(module),
        dependencies: vec![context],
        blocks: vec![block],
    }
}

#[test]
fn graph_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let cache_dir = dir.path().join("cache");
    let config_path = dir.path().join("config.toml");
    fs::write(
        &config_path,
        format!("[cache]\ndir = {:?}\nschema = \"v4\"\n", cache_dir.display().to_string()),
    )
    .unwrap();

    let config = HoardConfig::load_from(&config_path).unwrap().cache;
    let cache_dir = config.cache_dir().unwrap();
    let module = Module::shared("/app/src/i18n.js", "/app/src");

    let mut writer = GraphCache::from_config(JsonFileSerializer::in_dir(&cache_dir), &config);
    writer.store(&[snapshot(&module)]).unwrap();
    drop(writer);

    let text = fs::read_to_string(cache_dir.join(CACHE_FILE_NAME)).unwrap();
    assert!(text.contains("<context>/locales"));
    assert!(!text.contains("/app/src/locales"));

    // A new process sees the same module at a different checkout path.
    let moved = Module::shared("/app/src/i18n.js", "/checkout/src");
    let reader = GraphCache::from_config(JsonFileSerializer::in_dir(&cache_dir), &config);
    let loaded = reader.load(&[Rc::clone(&moved)]).unwrap();

    let context = loaded[0].dependencies[0]
        .downcast_ref::<ContextDependency>()
        .unwrap();
    assert_eq!(context.request(), "/checkout/src/locales");
    assert!(context.pattern().unwrap().is_match("en.json"));

    let block = &loaded[0].blocks[0];
    let import = block.downcast_ref::<AsyncBlock>().unwrap().dependencies()[0].clone();
    let back = import
        .downcast_ref::<ImportDependency>()
        .unwrap()
        .block_node()
        .unwrap();
    assert!(same_node(&back, block.as_ref()));
}

#[test]
fn corrupt_cache_file_is_a_miss() {
    let dir = tempfile::tempdir().unwrap();
    let serializer = JsonFileSerializer::in_dir(dir.path());
    fs::write(serializer.path(), "not json").unwrap();

    let cache = GraphCache::new(serializer, SchemaVersion::V4);
    assert!(
        cache
            .load(&[Module::shared("/app/src/a.js", "/app/src")])
            .is_none()
    );
}
