//! The schema registry: one lookup table per active schema version.

use std::any::TypeId;
use std::collections::HashMap;

use hoard_types::ModuleRef;
use tracing::{debug, warn};

use crate::freeze::FreezeSession;
use crate::provider::{Binding, BuiltinTypes, TypeProvider};
use crate::schema::{AfterThawFn, FieldSpec, SchemaDecl, SchemaVersion, declarations};
use crate::thaw::ThawSession;

/// Nesting limit applied to sessions unless the caller picks another.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// A schema bound to the Rust type that implements it.
#[derive(Debug, Clone)]
pub struct SchemaDefinition {
    type_name: &'static str,
    fields: &'static [FieldSpec],
    binding: Binding,
    after_thaw: Option<AfterThawFn>,
}

impl SchemaDefinition {
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Declared fields, in builder order.
    #[must_use]
    pub fn fields(&self) -> &'static [FieldSpec] {
        self.fields
    }

    #[must_use]
    pub fn binding(&self) -> Binding {
        self.binding
    }

    #[must_use]
    pub fn after_thaw(&self) -> Option<AfterThawFn> {
        self.after_thaw
    }
}

/// Schemas for one version, addressable by tag (thaw) and by concrete type
/// (freeze). Immutable once built; sessions borrow it.
#[derive(Debug)]
pub struct SchemaRegistry {
    version: SchemaVersion,
    schemas: Vec<SchemaDefinition>,
    by_name: HashMap<&'static str, usize>,
    by_constructor: HashMap<TypeId, usize>,
}

impl SchemaRegistry {
    /// An empty registry. Populate it with [`define`](Self::define) or use
    /// [`for_version`](Self::for_version).
    #[must_use]
    pub fn new(version: SchemaVersion) -> Self {
        Self {
            version,
            schemas: Vec::new(),
            by_name: HashMap::new(),
            by_constructor: HashMap::new(),
        }
    }

    /// Register a schema. A later definition for the same type name replaces
    /// the earlier one.
    ///
    /// A concrete type freezes under one name only. Binding a type that another
    /// name already owns keeps the earlier owner and logs a warning.
    pub fn define(&mut self, decl: &SchemaDecl, binding: Binding) -> &SchemaDefinition {
        let definition = SchemaDefinition {
            type_name: decl.type_name,
            fields: decl.fields,
            binding,
            after_thaw: decl.after_thaw,
        };
        let index = match self.by_name.get(decl.type_name) {
            Some(&index) => {
                let previous = self.schemas[index].binding.constructor;
                self.schemas[index] = definition;
                if previous != binding.constructor
                    && self.by_constructor.get(&previous) == Some(&index)
                {
                    self.by_constructor.remove(&previous);
                    self.rebind_constructor(previous);
                }
                index
            }
            None => {
                self.schemas.push(definition);
                self.schemas.len() - 1
            }
        };
        self.by_name.insert(decl.type_name, index);

        match self.by_constructor.get(&binding.constructor).copied() {
            Some(owner) if owner != index => warn!(
                type_name = decl.type_name,
                owner = self.schemas[owner].type_name,
                "type already bound to another schema; keeping the earlier one"
            ),
            _ => {
                self.by_constructor.insert(binding.constructor, index);
            }
        }
        &self.schemas[index]
    }

    /// Hand `constructor` to the first remaining schema bound to it, if any.
    fn rebind_constructor(&mut self, constructor: TypeId) {
        if let Some(index) = self
            .schemas
            .iter()
            .position(|schema| schema.binding.constructor == constructor)
        {
            self.by_constructor.insert(constructor, index);
        }
    }

    /// Build the registry for `version`, asking `provider` for every declared
    /// type. Types the provider cannot bind are left out.
    #[must_use]
    pub fn for_version(version: SchemaVersion, provider: &dyn TypeProvider) -> Self {
        let mut registry = Self::new(version);
        for decl in declarations(version) {
            match provider.resolve(decl.type_name, version) {
                Some(binding) => {
                    registry.define(decl, binding);
                }
                None => debug!(
                    type_name = decl.type_name,
                    %version,
                    "type not provided; schema left out"
                ),
            }
        }
        registry
    }

    /// The registry for `version` over the kinds in `hoard-types`.
    #[must_use]
    pub fn builtin(version: SchemaVersion) -> Self {
        Self::for_version(version, &BuiltinTypes)
    }

    #[must_use]
    pub fn version(&self) -> SchemaVersion {
        self.version
    }

    #[must_use]
    pub fn resolve(&self, type_name: &str) -> Option<&SchemaDefinition> {
        self.by_name.get(type_name).map(|&index| &self.schemas[index])
    }

    #[must_use]
    pub fn resolve_by_constructor(&self, constructor: TypeId) -> Option<&SchemaDefinition> {
        self.by_constructor
            .get(&constructor)
            .map(|&index| &self.schemas[index])
    }

    pub fn iter(&self) -> impl Iterator<Item = &SchemaDefinition> {
        self.schemas.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Start a freeze session on behalf of `owner`.
    #[must_use]
    pub fn freeze_session(&self, owner: Option<ModuleRef>) -> FreezeSession<'_> {
        FreezeSession::new(self, owner)
    }

    /// Start a thaw session on behalf of `owner`.
    #[must_use]
    pub fn thaw_session(&self, owner: Option<ModuleRef>) -> ThawSession<'_> {
        ThawSession::new(self, owner)
    }
}
