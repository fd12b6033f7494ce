//! The owning module of a traversal.

use std::path::{Path, PathBuf};
use std::rc::Rc;

/// A compiled module as seen by the cache.
///
/// Every freeze or thaw session runs on behalf of exactly one module. Its
/// `context` directory anchors path relativization and its identity is what
/// context-derived fields (`origin_module`) resolve to on thaw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    identifier: String,
    context: PathBuf,
}

pub type ModuleRef = Rc<Module>;

impl Module {
    #[must_use]
    pub fn new(identifier: impl Into<String>, context: impl Into<PathBuf>) -> Self {
        Self {
            identifier: identifier.into(),
            context: context.into(),
        }
    }

    #[must_use]
    pub fn shared(identifier: impl Into<String>, context: impl Into<PathBuf>) -> ModuleRef {
        Rc::new(Self::new(identifier, context))
    }

    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Directory the module lives in.
    #[must_use]
    pub fn context(&self) -> &Path {
        &self.context
    }
}
