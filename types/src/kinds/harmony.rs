use std::rc::Rc;

use crate::extensions::ExtensionSlot;
use crate::location::SourceRange;
use crate::module::ModuleRef;
use crate::node::{LiveValue, Node, NodeRef};
use crate::shared::{SharedNames, StarExports};

/// `import ... from "request"`: one per import statement.
///
/// Specifier and re-export dependencies of the same statement all point at
/// the same instance.
#[derive(Debug)]
pub struct HarmonyImportDependency {
    request: String,
    source_order: Option<u32>,
    range: Option<SourceRange>,
    origin_module: Option<ModuleRef>,
    ext: ExtensionSlot,
}

impl HarmonyImportDependency {
    #[must_use]
    pub fn new(
        request: impl Into<String>,
        source_order: Option<u32>,
        range: Option<SourceRange>,
        origin_module: Option<ModuleRef>,
    ) -> Self {
        Self {
            request: request.into(),
            source_order,
            range,
            origin_module,
            ext: ExtensionSlot::default(),
        }
    }

    #[must_use]
    pub fn request(&self) -> &str {
        &self.request
    }

    /// Position of the import statement among the module's imports.
    #[must_use]
    pub fn source_order(&self) -> Option<u32> {
        self.source_order
    }

    #[must_use]
    pub fn range(&self) -> Option<SourceRange> {
        self.range
    }

    #[must_use]
    pub fn origin_module(&self) -> Option<&ModuleRef> {
        self.origin_module.as_ref()
    }
}

impl Node for HarmonyImportDependency {
    fn kind(&self) -> &'static str {
        "HarmonyImportDependency"
    }

    fn field(&self, name: &str) -> LiveValue {
        match name {
            "request" => LiveValue::string(&self.request),
            "source_order" => LiveValue::encode(&self.source_order),
            "range" => LiveValue::encode(&self.range),
            "origin_module" => LiveValue::opt_module(self.origin_module.as_ref()),
            _ => LiveValue::Absent,
        }
    }

    fn extensions(&self) -> &ExtensionSlot {
        &self.ext
    }
}

/// A use site of an imported binding (`foo` in `import { foo } from "a"`).
#[derive(Debug)]
pub struct HarmonyImportSpecifierDependency {
    import_dependency: NodeRef,
    id: Option<String>,
    name: String,
    range: Option<SourceRange>,
    origin_module: Option<ModuleRef>,
    ext: ExtensionSlot,
}

impl HarmonyImportSpecifierDependency {
    #[must_use]
    pub fn new(
        import_dependency: NodeRef,
        id: Option<String>,
        name: impl Into<String>,
        range: Option<SourceRange>,
        origin_module: Option<ModuleRef>,
    ) -> Self {
        Self {
            import_dependency,
            id,
            name: name.into(),
            range,
            origin_module,
            ext: ExtensionSlot::default(),
        }
    }

    #[must_use]
    pub fn import_dependency(&self) -> &NodeRef {
        &self.import_dependency
    }

    /// Exported name in the imported module; `None` for the namespace.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Local name in the importing module.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn range(&self) -> Option<SourceRange> {
        self.range
    }

    #[must_use]
    pub fn origin_module(&self) -> Option<&ModuleRef> {
        self.origin_module.as_ref()
    }
}

impl Node for HarmonyImportSpecifierDependency {
    fn kind(&self) -> &'static str {
        "HarmonyImportSpecifierDependency"
    }

    fn field(&self, name: &str) -> LiveValue {
        match name {
            "import_dependency" => LiveValue::Node(Rc::clone(&self.import_dependency)),
            "id" => LiveValue::opt_string(self.id.as_deref()),
            "name" => LiveValue::string(&self.name),
            "range" => LiveValue::encode(&self.range),
            "origin_module" => LiveValue::opt_module(self.origin_module.as_ref()),
            _ => LiveValue::Absent,
        }
    }

    fn extensions(&self) -> &ExtensionSlot {
        &self.ext
    }
}

/// `export { x } from "a"` or, without a name, `export * from "a"`.
///
/// Every re-export of a module shares that module's set of active export
/// names. Star re-exports share one live list of every star re-export thawed
/// in the session, themselves and later siblings included.
#[derive(Debug)]
pub struct HarmonyReexportDependency {
    import_dependency: NodeRef,
    id: Option<String>,
    name: Option<String>,
    active_exports: SharedNames,
    other_star_exports: Option<StarExports>,
    origin_module: Option<ModuleRef>,
    ext: ExtensionSlot,
}

impl HarmonyReexportDependency {
    #[must_use]
    pub fn new(
        import_dependency: NodeRef,
        id: Option<String>,
        name: Option<String>,
        active_exports: SharedNames,
        other_star_exports: Option<StarExports>,
        origin_module: Option<ModuleRef>,
    ) -> Self {
        Self {
            import_dependency,
            id,
            name,
            active_exports,
            other_star_exports,
            origin_module,
            ext: ExtensionSlot::default(),
        }
    }

    #[must_use]
    pub fn import_dependency(&self) -> &NodeRef {
        &self.import_dependency
    }

    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn is_star(&self) -> bool {
        self.name.is_none()
    }

    #[must_use]
    pub fn active_exports(&self) -> &SharedNames {
        &self.active_exports
    }

    #[must_use]
    pub fn other_star_exports(&self) -> Option<&StarExports> {
        self.other_star_exports.as_ref()
    }

    #[must_use]
    pub fn origin_module(&self) -> Option<&ModuleRef> {
        self.origin_module.as_ref()
    }
}

impl Node for HarmonyReexportDependency {
    fn kind(&self) -> &'static str {
        "HarmonyReexportDependency"
    }

    fn field(&self, name: &str) -> LiveValue {
        match name {
            "import_dependency" => LiveValue::Node(Rc::clone(&self.import_dependency)),
            "id" => LiveValue::opt_string(self.id.as_deref()),
            "name" => LiveValue::opt_string(self.name.as_deref()),
            "active_exports" => LiveValue::Names(Rc::clone(&self.active_exports)),
            "other_star_exports" => self
                .other_star_exports
                .as_ref()
                .map_or(LiveValue::Absent, |list| {
                    LiveValue::StarExports(Rc::clone(list))
                }),
            "origin_module" => LiveValue::opt_module(self.origin_module.as_ref()),
            _ => LiveValue::Absent,
        }
    }

    fn extensions(&self) -> &ExtensionSlot {
        &self.ext
    }
}

/// Marks a module as an ES module.
#[derive(Debug, Default)]
pub struct HarmonyCompatibilityDependency {
    origin_module: Option<ModuleRef>,
    ext: ExtensionSlot,
}

impl HarmonyCompatibilityDependency {
    #[must_use]
    pub fn new(origin_module: Option<ModuleRef>) -> Self {
        Self {
            origin_module,
            ext: ExtensionSlot::default(),
        }
    }

    #[must_use]
    pub fn origin_module(&self) -> Option<&ModuleRef> {
        self.origin_module.as_ref()
    }
}

impl Node for HarmonyCompatibilityDependency {
    fn kind(&self) -> &'static str {
        "HarmonyCompatibilityDependency"
    }

    fn field(&self, name: &str) -> LiveValue {
        match name {
            "origin_module" => LiveValue::opt_module(self.origin_module.as_ref()),
            _ => LiveValue::Absent,
        }
    }

    fn extensions(&self) -> &ExtensionSlot {
        &self.ext
    }
}
