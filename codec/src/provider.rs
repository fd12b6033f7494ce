//! Binding schema names to concrete Rust types.
//!
//! The schema tables only know type names. A [`TypeProvider`] decides, per
//! version, which Rust type stands behind a name and how to build it from the
//! thawed field values.

use std::any::TypeId;
use std::rc::Rc;

use hoard_types::{
    AsyncBlock, BlockLink, ConstDependency, ContextDependency, HarmonyCompatibilityDependency,
    HarmonyImportDependency, HarmonyImportSpecifierDependency, HarmonyReexportDependency,
    ImportDependency, LiveValue, LocalModule, LocalModuleDependency, ModuleDependency, ModuleRef,
    Node, NodeRef, Pattern, SharedNames, StarExports, new_shared_names,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ConstructionError;
use crate::schema::SchemaVersion;

/// Builds a node from its thawed field values.
pub type BuildFn = fn(Args) -> Result<NodeRef, ConstructionError>;

#[derive(Debug, Clone, Copy)]
pub struct Binding {
    pub constructor: TypeId,
    pub build: BuildFn,
}

impl Binding {
    #[must_use]
    pub fn of<T: Node>(build: BuildFn) -> Self {
        Self {
            constructor: TypeId::of::<T>(),
            build,
        }
    }
}

pub trait TypeProvider {
    /// The binding for `type_name` in `version`, or `None` when that version of
    /// the data model has no such type.
    fn resolve(&self, type_name: &str, version: SchemaVersion) -> Option<Binding>;
}

/// Provider for the kinds defined in `hoard-types`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinTypes;

impl TypeProvider for BuiltinTypes {
    fn resolve(&self, type_name: &str, version: SchemaVersion) -> Option<Binding> {
        let binding = match type_name {
            "ModuleDependency" => Binding::of::<ModuleDependency>(build_module_dependency),
            "ConstDependency" => Binding::of::<ConstDependency>(build_const_dependency),
            "ContextDependency" => Binding::of::<ContextDependency>(build_context_dependency),
            "AsyncBlock" => Binding::of::<AsyncBlock>(build_async_block),
            "ImportDependency" => Binding::of::<ImportDependency>(build_import_dependency),
            "LocalModuleDependency" => {
                Binding::of::<LocalModuleDependency>(build_local_module_dependency)
            }
            "HarmonyImportDependency" => {
                Binding::of::<HarmonyImportDependency>(build_harmony_import)
            }
            "HarmonyImportSpecifierDependency" => {
                Binding::of::<HarmonyImportSpecifierDependency>(build_harmony_import_specifier)
            }
            "HarmonyReexportDependency" => {
                Binding::of::<HarmonyReexportDependency>(build_harmony_reexport)
            }
            "HarmonyCompatibilityDependency" if version == SchemaVersion::V4 => {
                Binding::of::<HarmonyCompatibilityDependency>(build_harmony_compatibility)
            }
            _ => return None,
        };
        Some(binding)
    }
}

/// Thawed field values for one node, keyed by field name.
///
/// Fields a record did not carry (for instance because it was written by an
/// older schema version) read as [`LiveValue::Absent`], and builders fall back
/// to the type's defaults for them.
#[derive(Debug)]
pub struct Args {
    type_name: &'static str,
    values: Vec<(&'static str, LiveValue)>,
}

impl Args {
    #[must_use]
    pub fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            values: Vec::new(),
        }
    }

    pub fn push(&mut self, name: &'static str, value: LiveValue) {
        self.values.push((name, value));
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Remove and return a field's value.
    pub fn take(&mut self, name: &str) -> LiveValue {
        self.values
            .iter()
            .position(|(field, _)| *field == name)
            .map_or(LiveValue::Absent, |at| self.values.swap_remove(at).1)
    }

    fn missing(&self, field: &'static str) -> ConstructionError {
        ConstructionError::MissingField {
            type_name: self.type_name,
            field,
        }
    }

    fn wrong(
        &self,
        field: &'static str,
        expected: &'static str,
        found: &LiveValue,
    ) -> ConstructionError {
        ConstructionError::WrongShape {
            type_name: self.type_name,
            field,
            expected,
            found: found.shape(),
        }
    }

    pub fn string(&mut self, name: &'static str) -> Result<String, ConstructionError> {
        match self.take(name) {
            LiveValue::Plain(Value::String(value)) => Ok(value),
            LiveValue::Absent | LiveValue::Plain(Value::Null) => Err(self.missing(name)),
            other => Err(self.wrong(name, "a string", &other)),
        }
    }

    pub fn opt_string(&mut self, name: &'static str) -> Result<Option<String>, ConstructionError> {
        match self.take(name) {
            LiveValue::Plain(Value::String(value)) => Ok(Some(value)),
            LiveValue::Absent | LiveValue::Plain(Value::Null) => Ok(None),
            other => Err(self.wrong(name, "a string", &other)),
        }
    }

    pub fn bool_or(
        &mut self,
        name: &'static str,
        default: bool,
    ) -> Result<bool, ConstructionError> {
        match self.take(name) {
            LiveValue::Plain(Value::Bool(value)) => Ok(value),
            LiveValue::Absent | LiveValue::Plain(Value::Null) => Ok(default),
            other => Err(self.wrong(name, "a boolean", &other)),
        }
    }

    /// Deserialize a plain field; an absent field yields `T::default()`.
    pub fn decode<T: DeserializeOwned + Default>(
        &mut self,
        name: &'static str,
    ) -> Result<T, ConstructionError> {
        match self.take(name) {
            LiveValue::Plain(value) => {
                serde_json::from_value(value).map_err(|source| ConstructionError::Decode {
                    type_name: self.type_name,
                    field: name,
                    source,
                })
            }
            LiveValue::Absent => Ok(T::default()),
            other => Err(self.wrong(name, "plain data", &other)),
        }
    }

    pub fn node(&mut self, name: &'static str) -> Result<NodeRef, ConstructionError> {
        match self.take(name) {
            LiveValue::Node(node) => Ok(node),
            LiveValue::Absent => Err(self.missing(name)),
            other => Err(self.wrong(name, "a node", &other)),
        }
    }

    pub fn opt_block(
        &mut self,
        name: &'static str,
    ) -> Result<Option<BlockLink>, ConstructionError> {
        match self.take(name) {
            LiveValue::Block(link) => Ok(Some(link)),
            LiveValue::Absent => Ok(None),
            other => Err(self.wrong(name, "a block link", &other)),
        }
    }

    pub fn opt_module(
        &mut self,
        name: &'static str,
    ) -> Result<Option<ModuleRef>, ConstructionError> {
        match self.take(name) {
            LiveValue::Module(module) => Ok(Some(module)),
            LiveValue::Absent => Ok(None),
            other => Err(self.wrong(name, "a module", &other)),
        }
    }

    pub fn opt_pattern(
        &mut self,
        name: &'static str,
    ) -> Result<Option<Pattern>, ConstructionError> {
        match self.take(name) {
            LiveValue::Pattern(pattern) => Ok(Some(pattern)),
            LiveValue::Absent | LiveValue::Plain(Value::Null) => Ok(None),
            other => Err(self.wrong(name, "a pattern", &other)),
        }
    }

    pub fn local(&mut self, name: &'static str) -> Result<Rc<LocalModule>, ConstructionError> {
        match self.take(name) {
            LiveValue::Local(local) => Ok(local),
            LiveValue::Absent => Err(self.missing(name)),
            other => Err(self.wrong(name, "a local module", &other)),
        }
    }

    /// A shared name set; absent yields a fresh, unshared one.
    pub fn names(&mut self, name: &'static str) -> Result<SharedNames, ConstructionError> {
        match self.take(name) {
            LiveValue::Names(names) => Ok(names),
            LiveValue::Absent => Ok(new_shared_names()),
            other => Err(self.wrong(name, "a name set", &other)),
        }
    }

    pub fn opt_star_exports(
        &mut self,
        name: &'static str,
    ) -> Result<Option<StarExports>, ConstructionError> {
        match self.take(name) {
            LiveValue::StarExports(list) => Ok(Some(list)),
            LiveValue::Absent => Ok(None),
            other => Err(self.wrong(name, "a star export list", &other)),
        }
    }
}

// ============================================================================
// Builders
// ============================================================================

fn build_module_dependency(mut args: Args) -> Result<NodeRef, ConstructionError> {
    let request = args.string("request")?;
    let user_request = args.opt_string("user_request")?;
    let mut node = ModuleDependency::new(request, args.decode("range")?);
    if let Some(user_request) = user_request {
        node = node.with_user_request(user_request);
    }
    Ok(Rc::new(node))
}

fn build_const_dependency(mut args: Args) -> Result<NodeRef, ConstructionError> {
    Ok(Rc::new(ConstDependency::new(
        args.string("expression")?,
        args.decode("range")?,
        args.decode("requirements")?,
    )))
}

fn build_context_dependency(mut args: Args) -> Result<NodeRef, ConstructionError> {
    let mut node = ContextDependency::new(
        args.string("request")?,
        args.bool_or("recursive", true)?,
        args.opt_pattern("pattern")?,
        args.decode("range")?,
    );
    if let Some(mode) = args.opt_string("mode")? {
        node = node.with_mode(mode);
    }
    Ok(Rc::new(node))
}

fn build_async_block(mut args: Args) -> Result<NodeRef, ConstructionError> {
    Ok(Rc::new(AsyncBlock::new(
        args.opt_string("chunk_name")?,
        args.opt_string("request")?,
        args.opt_module("module")?,
    )))
}

fn build_import_dependency(mut args: Args) -> Result<NodeRef, ConstructionError> {
    Ok(Rc::new(ImportDependency::new(
        args.string("request")?,
        args.opt_block("block")?,
        args.opt_module("origin_module")?,
        args.decode("range")?,
    )))
}

fn build_local_module_dependency(mut args: Args) -> Result<NodeRef, ConstructionError> {
    Ok(Rc::new(LocalModuleDependency::new(
        args.local("local_module")?,
        args.decode("range")?,
    )))
}

fn build_harmony_import(mut args: Args) -> Result<NodeRef, ConstructionError> {
    Ok(Rc::new(HarmonyImportDependency::new(
        args.string("request")?,
        args.decode("source_order")?,
        args.decode("range")?,
        args.opt_module("origin_module")?,
    )))
}

fn build_harmony_import_specifier(mut args: Args) -> Result<NodeRef, ConstructionError> {
    Ok(Rc::new(HarmonyImportSpecifierDependency::new(
        args.node("import_dependency")?,
        args.opt_string("id")?,
        args.string("name")?,
        args.decode("range")?,
        args.opt_module("origin_module")?,
    )))
}

fn build_harmony_reexport(mut args: Args) -> Result<NodeRef, ConstructionError> {
    Ok(Rc::new(HarmonyReexportDependency::new(
        args.node("import_dependency")?,
        args.opt_string("id")?,
        args.opt_string("name")?,
        args.names("active_exports")?,
        args.opt_star_exports("other_star_exports")?,
        args.opt_module("origin_module")?,
    )))
}

fn build_harmony_compatibility(mut args: Args) -> Result<NodeRef, ConstructionError> {
    Ok(Rc::new(HarmonyCompatibilityDependency::new(
        args.opt_module("origin_module")?,
    )))
}
