//! Type-agnostic attributes copied alongside the schema fields.
//!
//! Only attributes that are set on the source side are copied; nothing on the
//! destination is ever cleared. This layer does not reject input: a malformed
//! stored attribute is logged and left unset.

use hoard_types::{
    FlatLocation, FrozenWarning, Node, NodeRef, SourceLocation, Warnings, split_stack,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::codecs::{freeze_local_module, thaw_local_module};
use crate::record::FrozenRecord;
use crate::thaw::ThawSession;

const PREPEND: &str = "prepend";
const REPLACES: &str = "replaces";
const CRITICAL: &str = "critical";
const OPTIONAL: &str = "optional";
const WEAK: &str = "weak";
const NAMESPACE_OBJECT_AS_CONTEXT: &str = "namespace_object_as_context";
const LOCAL_BINDING: &str = "local_binding";
const LOC: &str = "loc";
const WARNINGS: &str = "warnings";

/// Record keys reserved for extension attributes. No schema may declare a
/// field with one of these names.
pub const EXTENSION_KEYS: &[&str] = &[
    PREPEND,
    REPLACES,
    CRITICAL,
    OPTIONAL,
    WEAK,
    NAMESPACE_OBJECT_AS_CONTEXT,
    LOCAL_BINDING,
    LOC,
    WARNINGS,
];

pub(crate) fn freeze_extensions(node: &dyn Node, record: &mut FrozenRecord) {
    let ext = node.extensions().borrow();
    for (key, set) in [
        (PREPEND, ext.prepend),
        (CRITICAL, ext.critical),
        (OPTIONAL, ext.optional),
        (WEAK, ext.weak),
        (NAMESPACE_OBJECT_AS_CONTEXT, ext.namespace_object_as_context),
    ] {
        if set {
            record.insert(key, Value::Bool(true));
        }
    }
    if let Some(replaces) = &ext.replaces {
        record.insert(REPLACES, Value::String(replaces.clone()));
    }
    if let Some(local) = &ext.local_binding {
        record.insert(LOCAL_BINDING, freeze_local_module(local));
    }
    if let Some(loc) = &ext.loc {
        match serde_json::to_value(loc.flatten()) {
            Ok(flat) => record.insert(LOC, flat),
            Err(error) => debug!(%error, "location not persisted"),
        }
    }
    let has_warnings = !ext.warnings.is_empty();
    drop(ext);

    if has_warnings {
        let frozen: Vec<FrozenWarning> = node
            .warnings()
            .into_iter()
            .map(|warning| FrozenWarning {
                stack: split_stack(&warning.stack).to_string(),
                message: warning.message,
            })
            .collect();
        match serde_json::to_value(frozen) {
            Ok(list) => record.insert(WARNINGS, list),
            Err(error) => debug!(%error, "warnings not persisted"),
        }
    }
}

pub(crate) fn thaw_extensions(
    node: &NodeRef,
    record: &FrozenRecord,
    session: &mut ThawSession<'_>,
) {
    let local = record
        .get(LOCAL_BINDING)
        .filter(|value| !value.is_null())
        .and_then(|value| match thaw_local_module(LOCAL_BINDING, value, session) {
            Ok(local) => Some(local),
            Err(error) => {
                debug!(%error, kind = node.kind(), "local binding not restored");
                None
            }
        });

    let mut ext = node.extensions().borrow_mut();
    if is_true(record.get(PREPEND)) {
        ext.prepend = true;
    }
    if is_true(record.get(CRITICAL)) {
        ext.critical = true;
    }
    if is_true(record.get(OPTIONAL)) {
        ext.optional = true;
    }
    if is_true(record.get(WEAK)) {
        ext.weak = true;
    }
    if is_true(record.get(NAMESPACE_OBJECT_AS_CONTEXT)) {
        ext.namespace_object_as_context = true;
    }
    if let Some(Value::String(replaces)) = record.get(REPLACES) {
        ext.replaces = Some(replaces.clone());
    }
    if local.is_some() {
        ext.local_binding = local;
    }
    if let Some(loc) = record.get(LOC) {
        match FlatLocation::deserialize(loc) {
            Ok(flat) => ext.loc = Some(SourceLocation::from(flat)),
            Err(error) => debug!(%error, kind = node.kind(), "location not restored"),
        }
    }
    if let Some(warnings) = record.get(WARNINGS) {
        match Vec::<FrozenWarning>::deserialize(warnings) {
            Ok(list) if !list.is_empty() => ext.warnings = Warnings::Replay(list),
            Ok(_) => {}
            Err(error) => debug!(%error, kind = node.kind(), "warnings not restored"),
        }
    }
}

fn is_true(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::Bool(true)))
}
