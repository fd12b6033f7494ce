//! Shape of the persisted records.

use std::rc::Rc;

use hoard_codec::SchemaVersion;
use hoard_types::{AsyncBlock, BlockLink, ImportDependency, NodeRef, SourceRange};
use insta::assert_snapshot;

use crate::common::{freeze, owner, registry};

#[test]
fn import_with_owned_block() {
    let block: NodeRef = Rc::new(AsyncBlock::new(
        Some("lazy".to_string()),
        Some("/repo/src/lazy.js".to_string()),
        Some(owner()),
    ));
    let import = ImportDependency::new(
        "/repo/src/lazy.js",
        Some(BlockLink::Owned(block)),
        Some(owner()),
        Some(SourceRange(12, 30)),
    );

    let frozen = freeze(&registry(SchemaVersion::V4), &import);
    let text = serde_json::to_string_pretty(&frozen).unwrap();
    assert_snapshot!(text, @r#"
    {
      "block": {
        "blocks": [],
        "chunk_name": "lazy",
        "dependencies": [],
        "request": "<context>/lazy.js",
        "type": "AsyncBlock"
      },
      "range": [
        12,
        30
      ],
      "request": "<context>/lazy.js",
      "type": "ImportDependency"
    }
    "#);
}
