//! The field codec library.
//!
//! Every codec is a stateless pair of functions. Freezing returns `None` to
//! leave the field out of the record entirely; thawing may consult or grow the
//! session's accumulators, recurse into the engines for nested nodes, or hand
//! back an instance the session already produced.

use std::fmt;
use std::path::{Path, is_separator};
use std::rc::Rc;

use hoard_types::{BlockLink, LiveValue, LocalModule, Node, Pattern, same_node};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::error::{CodecError, Error, json_kind};
use crate::freeze::FreezeSession;
use crate::record::FrozenRecord;
use crate::thaw::ThawSession;

pub type FreezeFn = fn(
    field: &str,
    value: &LiveValue,
    node: &dyn Node,
    session: &mut FreezeSession<'_>,
) -> Result<Option<Value>, Error>;

pub type ThawFn = fn(
    field: &str,
    value: Option<&Value>,
    record: &FrozenRecord,
    session: &mut ThawSession<'_>,
) -> Result<LiveValue, Error>;

#[derive(Clone, Copy)]
pub struct FieldCodec {
    pub name: &'static str,
    pub freeze: FreezeFn,
    pub thaw: ThawFn,
}

impl fmt::Debug for FieldCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FieldCodec").field(&self.name).finish()
    }
}

/// Prefix marking a request segment that was rewritten relative to the
/// owning module's directory.
pub const CONTEXT_MARKER: &str = "<context>";

pub const IDENTITY: FieldCodec = FieldCodec {
    name: "identity",
    freeze: freeze_identity,
    thaw: thaw_identity,
};

pub const PATTERN: FieldCodec = FieldCodec {
    name: "pattern",
    freeze: freeze_pattern,
    thaw: thaw_pattern,
};

pub const RELATIVE_PATH: FieldCodec = FieldCodec {
    name: "relative_path",
    freeze: freeze_relative_path,
    thaw: thaw_relative_path,
};

pub const NODE: FieldCodec = FieldCodec {
    name: "node",
    freeze: freeze_node,
    thaw: thaw_node,
};

pub const NODE_LIST: FieldCodec = FieldCodec {
    name: "node_list",
    freeze: freeze_node_list,
    thaw: thaw_node_list,
};

/// The owning module: never stored, always the session owner on thaw.
pub const CONTEXT_MODULE: FieldCodec = FieldCodec {
    name: "context_module",
    freeze: freeze_omitted,
    thaw: thaw_context_module,
};

/// The block a dependency belongs to.
///
/// A missing field means the enclosing block owns the dependency and the edge
/// is rebuilt from the session parent; `null` means no block; an object is a
/// block the dependency owns.
pub const PARENT_BLOCK: FieldCodec = FieldCodec {
    name: "parent_block",
    freeze: freeze_parent_block,
    thaw: thaw_parent_block,
};

pub const LOCAL_MODULE: FieldCodec = FieldCodec {
    name: "local_module",
    freeze: freeze_local_module_field,
    thaw: thaw_local_module_field,
};

pub const ACTIVE_EXPORTS: FieldCodec = FieldCodec {
    name: "active_exports",
    freeze: freeze_null,
    thaw: thaw_active_exports,
};

pub const STAR_EXPORTS: FieldCodec = FieldCodec {
    name: "star_exports",
    freeze: freeze_star_exports,
    thaw: thaw_star_exports,
};

/// A harmony import shared by several specifiers, collapsed by source range.
pub const DEDUP_IMPORT: FieldCodec = FieldCodec {
    name: "dedup_import",
    freeze: freeze_node,
    thaw: thaw_dedup_import,
};

fn unexpected(field: &str, expected: &'static str, found: impl Into<String>) -> Error {
    CodecError::UnexpectedShape {
        field: field.to_string(),
        expected,
        found: found.into(),
    }
    .into()
}

// ============================================================================
// Identity
// ============================================================================

fn freeze_identity(
    field: &str,
    value: &LiveValue,
    _node: &dyn Node,
    _session: &mut FreezeSession<'_>,
) -> Result<Option<Value>, Error> {
    match value {
        LiveValue::Absent => Ok(None),
        LiveValue::Plain(value) => Ok(Some(value.clone())),
        other => Err(CodecError::NotPlain {
            field: field.to_string(),
            shape: other.shape(),
        }
        .into()),
    }
}

fn thaw_identity(
    _field: &str,
    value: Option<&Value>,
    _record: &FrozenRecord,
    _session: &mut ThawSession<'_>,
) -> Result<LiveValue, Error> {
    Ok(value.cloned().map_or(LiveValue::Absent, LiveValue::Plain))
}

fn freeze_omitted(
    _field: &str,
    _value: &LiveValue,
    _node: &dyn Node,
    _session: &mut FreezeSession<'_>,
) -> Result<Option<Value>, Error> {
    Ok(None)
}

fn freeze_null(
    _field: &str,
    _value: &LiveValue,
    _node: &dyn Node,
    _session: &mut FreezeSession<'_>,
) -> Result<Option<Value>, Error> {
    Ok(Some(Value::Null))
}

// ============================================================================
// Pattern
// ============================================================================

fn freeze_pattern(
    field: &str,
    value: &LiveValue,
    _node: &dyn Node,
    _session: &mut FreezeSession<'_>,
) -> Result<Option<Value>, Error> {
    match value {
        LiveValue::Absent => Ok(None),
        LiveValue::Plain(Value::Null) => Ok(Some(Value::Null)),
        LiveValue::Pattern(pattern) => Ok(Some(Value::String(pattern.to_string()))),
        other => Err(unexpected(field, "a pattern", other.shape())),
    }
}

fn thaw_pattern(
    field: &str,
    value: Option<&Value>,
    _record: &FrozenRecord,
    _session: &mut ThawSession<'_>,
) -> Result<LiveValue, Error> {
    match value {
        None | Some(Value::Null) => Ok(LiveValue::Absent),
        Some(Value::String(literal)) => Pattern::parse(literal)
            .map(LiveValue::Pattern)
            .map_err(|source| {
                CodecError::MalformedPattern {
                    field: field.to_string(),
                    source,
                }
                .into()
            }),
        Some(other) => Err(unexpected(field, "a pattern literal", json_kind(other))),
    }
}

// ============================================================================
// Paths
// ============================================================================

/// Rewrite every absolute path segment of a loader request (`a!b?query`) that
/// lies under `context` into a context-relative form.
#[must_use]
pub fn relative_request(context: &Path, request: &str) -> String {
    request
        .split('!')
        .map(|segment| relative_segment(context, segment))
        .collect::<Vec<_>>()
        .join("!")
}

fn relative_segment(context: &Path, segment: &str) -> String {
    let Some(context) = context_prefix(context) else {
        return segment.to_string();
    };
    let (path, query) = split_query(segment);
    let Some(rest) = path.strip_prefix(context) else {
        return segment.to_string();
    };
    // Only whole components: `/repo/srcx` is not under `/repo/src`.
    if !rest.is_empty() && !rest.starts_with(is_separator) {
        return segment.to_string();
    }
    format!("{CONTEXT_MARKER}{rest}{query}")
}

/// The context as text, without a trailing separator. The path after it is
/// kept byte for byte, so `..`, `.` and doubled separators survive a round trip.
fn context_prefix(context: &Path) -> Option<&str> {
    let text = context.to_str()?;
    let trimmed = text.trim_end_matches(is_separator);
    if trimmed.is_empty() || !context.is_absolute() {
        return None;
    }
    Some(trimmed)
}

/// Inverse of [`relative_request`].
#[must_use]
pub fn absolute_request(context: &Path, request: &str) -> String {
    request
        .split('!')
        .map(|segment| absolute_segment(context, segment))
        .collect::<Vec<_>>()
        .join("!")
}

fn absolute_segment(context: &Path, segment: &str) -> String {
    match (segment.strip_prefix(CONTEXT_MARKER), context_prefix(context)) {
        (Some(rest), Some(context)) => format!("{context}{rest}"),
        _ => segment.to_string(),
    }
}

fn split_query(segment: &str) -> (&str, &str) {
    match segment.find('?') {
        Some(at) => segment.split_at(at),
        None => (segment, ""),
    }
}

fn freeze_relative_path(
    field: &str,
    value: &LiveValue,
    _node: &dyn Node,
    session: &mut FreezeSession<'_>,
) -> Result<Option<Value>, Error> {
    match value {
        LiveValue::Absent => Ok(None),
        LiveValue::Plain(Value::String(request)) => {
            let frozen = match session.context().owner() {
                Some(owner) => relative_request(owner.context(), request),
                None => request.clone(),
            };
            Ok(Some(Value::String(frozen)))
        }
        LiveValue::Plain(value) => Ok(Some(value.clone())),
        other => Err(unexpected(field, "a request string", other.shape())),
    }
}

fn thaw_relative_path(
    field: &str,
    value: Option<&Value>,
    _record: &FrozenRecord,
    session: &mut ThawSession<'_>,
) -> Result<LiveValue, Error> {
    match value {
        None => Ok(LiveValue::Absent),
        Some(Value::String(request)) if request.contains(CONTEXT_MARKER) => {
            let owner = session
                .context()
                .owner()
                .ok_or_else(|| CodecError::MissingOwner {
                    field: field.to_string(),
                })?;
            Ok(LiveValue::string(absolute_request(owner.context(), request)))
        }
        Some(value) => Ok(LiveValue::Plain(value.clone())),
    }
}

// ============================================================================
// Nested nodes
// ============================================================================

fn freeze_node(
    field: &str,
    value: &LiveValue,
    _node: &dyn Node,
    session: &mut FreezeSession<'_>,
) -> Result<Option<Value>, Error> {
    match value {
        LiveValue::Absent => Ok(None),
        LiveValue::Plain(Value::Null) => Ok(Some(Value::Null)),
        LiveValue::Node(nested) => Ok(session
            .freeze(nested.as_ref())?
            .map(FrozenRecord::into_value)),
        other => Err(unexpected(field, "a node", other.shape())),
    }
}

fn thaw_node(
    field: &str,
    value: Option<&Value>,
    _record: &FrozenRecord,
    session: &mut ThawSession<'_>,
) -> Result<LiveValue, Error> {
    match value {
        None | Some(Value::Null) => Ok(LiveValue::Absent),
        Some(value @ Value::Object(_)) => Ok(session
            .thaw_value(value)?
            .map_or(LiveValue::Absent, LiveValue::Node)),
        Some(other) => Err(unexpected(field, "a nested record", json_kind(other))),
    }
}

fn freeze_node_list(
    field: &str,
    value: &LiveValue,
    _node: &dyn Node,
    session: &mut FreezeSession<'_>,
) -> Result<Option<Value>, Error> {
    match value {
        LiveValue::Absent => Ok(None),
        LiveValue::Nodes(nodes) => {
            let frozen = session.freeze_all(nodes)?;
            Ok(Some(Value::Array(
                frozen.into_iter().map(FrozenRecord::into_value).collect(),
            )))
        }
        other => Err(unexpected(field, "a node list", other.shape())),
    }
}

fn thaw_node_list(
    field: &str,
    value: Option<&Value>,
    _record: &FrozenRecord,
    session: &mut ThawSession<'_>,
) -> Result<LiveValue, Error> {
    match value {
        None | Some(Value::Null) => Ok(LiveValue::Absent),
        Some(Value::Array(items)) => {
            let mut nodes = Vec::with_capacity(items.len());
            for item in items {
                if let Some(node) = session.thaw_value(item)? {
                    nodes.push(node);
                }
            }
            Ok(LiveValue::Nodes(nodes))
        }
        Some(other) => Err(unexpected(field, "an array of records", json_kind(other))),
    }
}

// ============================================================================
// Context-derived values
// ============================================================================

fn thaw_context_module(
    _field: &str,
    _value: Option<&Value>,
    _record: &FrozenRecord,
    session: &mut ThawSession<'_>,
) -> Result<LiveValue, Error> {
    Ok(LiveValue::opt_module(session.context().owner()))
}

fn freeze_parent_block(
    field: &str,
    value: &LiveValue,
    node: &dyn Node,
    session: &mut FreezeSession<'_>,
) -> Result<Option<Value>, Error> {
    let link = match value {
        LiveValue::Absent => return Ok(Some(Value::Null)),
        LiveValue::Block(link) => link,
        other => return Err(unexpected(field, "a block link", other.shape())),
    };
    let Some(block) = link.get() else {
        return Ok(None);
    };
    // The block owns this node: the edge is rebuilt from the parent on thaw.
    if block.children().iter().any(|child| same_node(child, node)) {
        return Ok(None);
    }
    Ok(session.freeze(block.as_ref())?.map(FrozenRecord::into_value))
}

fn thaw_parent_block(
    field: &str,
    value: Option<&Value>,
    _record: &FrozenRecord,
    session: &mut ThawSession<'_>,
) -> Result<LiveValue, Error> {
    match value {
        Some(value @ Value::Object(_)) => Ok(session
            .thaw_value(value)?
            .map_or(LiveValue::Absent, |block| {
                LiveValue::Block(BlockLink::Owned(block))
            })),
        Some(Value::Null) => Ok(LiveValue::Absent),
        None => Ok(session
            .context()
            .parent()
            .map_or(LiveValue::Absent, |parent| {
                LiveValue::Block(BlockLink::parent(parent))
            })),
        Some(other) => Err(unexpected(field, "a nested block", json_kind(other))),
    }
}

// ============================================================================
// Session accumulators
// ============================================================================

#[derive(Debug, Deserialize)]
struct FrozenLocalModule {
    name: String,
    index: usize,
    #[serde(default)]
    used: bool,
}

pub(crate) fn freeze_local_module(local: &LocalModule) -> Value {
    json!({
        "name": local.name(),
        "index": local.index(),
        "used": local.is_used(),
    })
}

pub(crate) fn thaw_local_module(
    field: &str,
    value: &Value,
    session: &mut ThawSession<'_>,
) -> Result<Rc<LocalModule>, Error> {
    let frozen = FrozenLocalModule::deserialize(value)
        .map_err(|_| unexpected(field, "a local module record", json_kind(value)))?;
    let local = session
        .context_mut()
        .state_mut()
        .local_module(frozen.index, &frozen.name)?;
    if frozen.used {
        local.flag_used();
    }
    Ok(local)
}

fn freeze_local_module_field(
    field: &str,
    value: &LiveValue,
    _node: &dyn Node,
    _session: &mut FreezeSession<'_>,
) -> Result<Option<Value>, Error> {
    match value {
        LiveValue::Absent => Ok(None),
        LiveValue::Local(local) => Ok(Some(freeze_local_module(local))),
        other => Err(unexpected(field, "a local module", other.shape())),
    }
}

fn thaw_local_module_field(
    field: &str,
    value: Option<&Value>,
    _record: &FrozenRecord,
    session: &mut ThawSession<'_>,
) -> Result<LiveValue, Error> {
    match value {
        None | Some(Value::Null) => Ok(LiveValue::Absent),
        Some(value) => Ok(LiveValue::Local(thaw_local_module(field, value, session)?)),
    }
}

fn thaw_active_exports(
    _field: &str,
    _value: Option<&Value>,
    record: &FrozenRecord,
    session: &mut ThawSession<'_>,
) -> Result<LiveValue, Error> {
    let names = session.context_mut().state_mut().active_names();
    if let Some(Value::String(name)) = record.get("name")
        && !name.is_empty()
    {
        names.borrow_mut().insert(name.clone());
    }
    Ok(LiveValue::Names(names))
}

fn freeze_star_exports(
    field: &str,
    value: &LiveValue,
    _node: &dyn Node,
    _session: &mut FreezeSession<'_>,
) -> Result<Option<Value>, Error> {
    match value {
        LiveValue::Absent => Ok(None),
        LiveValue::StarExports(_) => Ok(Some(Value::Bool(true))),
        other => Err(unexpected(field, "a star export list", other.shape())),
    }
}

fn thaw_star_exports(
    _field: &str,
    value: Option<&Value>,
    _record: &FrozenRecord,
    session: &mut ThawSession<'_>,
) -> Result<LiveValue, Error> {
    if value == Some(&Value::Bool(true)) {
        Ok(LiveValue::StarExports(
            session.context_mut().state_mut().star_list(),
        ))
    } else {
        Ok(LiveValue::Absent)
    }
}

fn thaw_dedup_import(
    field: &str,
    value: Option<&Value>,
    record: &FrozenRecord,
    session: &mut ThawSession<'_>,
) -> Result<LiveValue, Error> {
    let key = value
        .and_then(|nested| nested.get("range"))
        .filter(|range| !range.is_null())
        .map(Value::to_string);
    if let Some(key) = &key
        && let Some(existing) = session.context().state().deduped(key)
    {
        debug!(key = %key, "reusing thawed import dependency");
        return Ok(LiveValue::Node(existing));
    }
    match thaw_node(field, value, record, session)? {
        LiveValue::Node(node) => match key {
            Some(key) => Ok(LiveValue::Node(
                session.context_mut().state_mut().remember(key, node),
            )),
            None => Ok(LiveValue::Node(node)),
        },
        other => Ok(other),
    }
}
