//! Statically declared schemas, one table per upstream data-model version.
//!
//! A table only says which fields a type has and how each one is encoded.
//! Which Rust type stands behind a name is decided by a
//! [`TypeProvider`](crate::TypeProvider) when a registry is built.

mod v3;
mod v4;

use std::fmt;
use std::rc::Rc;

use hoard_types::{HarmonyReexportDependency, NodeRef};
use serde::{Deserialize, Serialize};

use crate::codecs::FieldCodec;
use crate::context::TraversalContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaVersion {
    V3,
    #[default]
    V4,
}

impl SchemaVersion {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V3 => "v3",
            Self::V4 => "v4",
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// When a field is thawed relative to construction of its node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Passed to the type's builder.
    Build,
    /// Thawed after the node exists, with the node as the session parent, and
    /// then attached to it. Child lists whose members point back at their
    /// container use this stage.
    Attach,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub codec: Option<FieldCodec>,
    pub stage: Stage,
}

impl FieldSpec {
    /// A field copied verbatim.
    #[must_use]
    pub const fn plain(name: &'static str) -> Self {
        Self {
            name,
            codec: None,
            stage: Stage::Build,
        }
    }

    #[must_use]
    pub const fn with(name: &'static str, codec: FieldCodec) -> Self {
        Self {
            name,
            codec: Some(codec),
            stage: Stage::Build,
        }
    }

    #[must_use]
    pub const fn attached(name: &'static str, codec: FieldCodec) -> Self {
        Self {
            name,
            codec: Some(codec),
            stage: Stage::Attach,
        }
    }
}

/// Hook run on a freshly thawed node before extensions are applied.
pub type AfterThawFn = fn(&NodeRef, &mut TraversalContext);

#[derive(Debug, Clone, Copy)]
pub struct SchemaDecl {
    pub type_name: &'static str,
    pub fields: &'static [FieldSpec],
    pub after_thaw: Option<AfterThawFn>,
}

impl SchemaDecl {
    #[must_use]
    pub const fn new(type_name: &'static str, fields: &'static [FieldSpec]) -> Self {
        Self {
            type_name,
            fields,
            after_thaw: None,
        }
    }

    #[must_use]
    pub const fn after_thaw(mut self, hook: AfterThawFn) -> Self {
        self.after_thaw = Some(hook);
        self
    }
}

#[must_use]
pub fn declarations(version: SchemaVersion) -> &'static [SchemaDecl] {
    match version {
        SchemaVersion::V3 => v3::SCHEMAS,
        SchemaVersion::V4 => v4::SCHEMAS,
    }
}

/// Star re-exports append themselves to the session's star list, so later
/// re-exports of the same module observe them.
fn register_star_export(node: &NodeRef, context: &mut TraversalContext) {
    let is_star = node
        .downcast_ref::<HarmonyReexportDependency>()
        .is_some_and(HarmonyReexportDependency::is_star);
    if is_star {
        context
            .state_mut()
            .star_list()
            .borrow_mut()
            .push(Rc::downgrade(node));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_names_are_unique_per_type() {
        for version in [SchemaVersion::V3, SchemaVersion::V4] {
            for decl in declarations(version) {
                let mut names: Vec<_> = decl.fields.iter().map(|f| f.name).collect();
                names.sort_unstable();
                names.dedup();
                assert_eq!(
                    names.len(),
                    decl.fields.len(),
                    "{version} {} declares a field twice",
                    decl.type_name
                );
            }
        }
    }

    #[test]
    fn no_field_collides_with_extensions_or_tag() {
        for version in [SchemaVersion::V3, SchemaVersion::V4] {
            for decl in declarations(version) {
                for field in decl.fields {
                    assert_ne!(field.name, crate::FrozenRecord::TYPE_KEY);
                    assert!(
                        !crate::EXTENSION_KEYS.contains(&field.name),
                        "{} collides with an extension key",
                        field.name
                    );
                }
            }
        }
    }

    #[test]
    fn v4_is_a_superset_of_v3_type_names() {
        let v4: Vec<_> = declarations(SchemaVersion::V4)
            .iter()
            .map(|d| d.type_name)
            .collect();
        for decl in declarations(SchemaVersion::V3) {
            assert!(v4.contains(&decl.type_name), "{} missing in v4", decl.type_name);
        }
    }
}
