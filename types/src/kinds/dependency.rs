use std::rc::Rc;

use crate::extensions::ExtensionSlot;
use crate::location::SourceRange;
use crate::node::{LiveValue, Node};
use crate::pattern::Pattern;
use crate::shared::LocalModule;

/// A plain request for another module (`require("./a")`).
#[derive(Debug, Default)]
pub struct ModuleDependency {
    request: String,
    user_request: String,
    range: Option<SourceRange>,
    ext: ExtensionSlot,
}

impl ModuleDependency {
    #[must_use]
    pub fn new(request: impl Into<String>, range: Option<SourceRange>) -> Self {
        let request = request.into();
        Self {
            user_request: request.clone(),
            request,
            range,
            ext: ExtensionSlot::default(),
        }
    }

    /// Request as written by the user, when it differs from the resolved one.
    #[must_use]
    pub fn with_user_request(mut self, user_request: impl Into<String>) -> Self {
        self.user_request = user_request.into();
        self
    }

    #[must_use]
    pub fn request(&self) -> &str {
        &self.request
    }

    #[must_use]
    pub fn user_request(&self) -> &str {
        &self.user_request
    }

    #[must_use]
    pub fn range(&self) -> Option<SourceRange> {
        self.range
    }
}

impl Node for ModuleDependency {
    fn kind(&self) -> &'static str {
        "ModuleDependency"
    }

    fn field(&self, name: &str) -> LiveValue {
        match name {
            "request" => LiveValue::string(&self.request),
            "user_request" => LiveValue::string(&self.user_request),
            "range" => LiveValue::encode(&self.range),
            _ => LiveValue::Absent,
        }
    }

    fn extensions(&self) -> &ExtensionSlot {
        &self.ext
    }
}

/// A constant expression substituted into the module source.
#[derive(Debug, Default)]
pub struct ConstDependency {
    expression: String,
    range: Option<SourceRange>,
    requirements: Vec<String>,
    ext: ExtensionSlot,
}

impl ConstDependency {
    #[must_use]
    pub fn new(
        expression: impl Into<String>,
        range: Option<SourceRange>,
        requirements: Vec<String>,
    ) -> Self {
        Self {
            expression: expression.into(),
            range,
            requirements,
            ext: ExtensionSlot::default(),
        }
    }

    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }

    #[must_use]
    pub fn range(&self) -> Option<SourceRange> {
        self.range
    }

    /// Runtime helpers the expression needs.
    #[must_use]
    pub fn requirements(&self) -> &[String] {
        &self.requirements
    }
}

impl Node for ConstDependency {
    fn kind(&self) -> &'static str {
        "ConstDependency"
    }

    fn field(&self, name: &str) -> LiveValue {
        match name {
            "expression" => LiveValue::string(&self.expression),
            "range" => LiveValue::encode(&self.range),
            "requirements" => LiveValue::encode(&self.requirements),
            _ => LiveValue::Absent,
        }
    }

    fn extensions(&self) -> &ExtensionSlot {
        &self.ext
    }
}

/// A request for every module in a directory matching a pattern
/// (`require.context("./locales", true, /\.json$/)`).
#[derive(Debug)]
pub struct ContextDependency {
    request: String,
    recursive: bool,
    pattern: Option<Pattern>,
    mode: String,
    range: Option<SourceRange>,
    ext: ExtensionSlot,
}

impl ContextDependency {
    pub const DEFAULT_MODE: &'static str = "sync";

    #[must_use]
    pub fn new(
        request: impl Into<String>,
        recursive: bool,
        pattern: Option<Pattern>,
        range: Option<SourceRange>,
    ) -> Self {
        Self {
            request: request.into(),
            recursive,
            pattern,
            mode: Self::DEFAULT_MODE.to_string(),
            range,
            ext: ExtensionSlot::default(),
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = mode.into();
        self
    }

    #[must_use]
    pub fn request(&self) -> &str {
        &self.request
    }

    #[must_use]
    pub fn recursive(&self) -> bool {
        self.recursive
    }

    #[must_use]
    pub fn pattern(&self) -> Option<&Pattern> {
        self.pattern.as_ref()
    }

    #[must_use]
    pub fn mode(&self) -> &str {
        &self.mode
    }

    #[must_use]
    pub fn range(&self) -> Option<SourceRange> {
        self.range
    }
}

impl Node for ContextDependency {
    fn kind(&self) -> &'static str {
        "ContextDependency"
    }

    fn field(&self, name: &str) -> LiveValue {
        match name {
            "request" => LiveValue::string(&self.request),
            "recursive" => LiveValue::bool(self.recursive),
            "pattern" => self
                .pattern
                .clone()
                .map_or(LiveValue::Plain(serde_json::Value::Null), LiveValue::Pattern),
            "mode" => LiveValue::string(&self.mode),
            "range" => LiveValue::encode(&self.range),
            _ => LiveValue::Absent,
        }
    }

    fn extensions(&self) -> &ExtensionSlot {
        &self.ext
    }
}

/// A reference to a module defined inline in the same file.
#[derive(Debug)]
pub struct LocalModuleDependency {
    local_module: Rc<LocalModule>,
    range: Option<SourceRange>,
    ext: ExtensionSlot,
}

impl LocalModuleDependency {
    #[must_use]
    pub fn new(local_module: Rc<LocalModule>, range: Option<SourceRange>) -> Self {
        Self {
            local_module,
            range,
            ext: ExtensionSlot::default(),
        }
    }

    #[must_use]
    pub fn local_module(&self) -> &Rc<LocalModule> {
        &self.local_module
    }

    #[must_use]
    pub fn range(&self) -> Option<SourceRange> {
        self.range
    }
}

impl Node for LocalModuleDependency {
    fn kind(&self) -> &'static str {
        "LocalModuleDependency"
    }

    fn field(&self, name: &str) -> LiveValue {
        match name {
            "local_module" => LiveValue::Local(Rc::clone(&self.local_module)),
            "range" => LiveValue::encode(&self.range),
            _ => LiveValue::Absent,
        }
    }

    fn extensions(&self) -> &ExtensionSlot {
        &self.ext
    }
}
