//! Cross-cutting optional attributes any node may carry.

use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::location::SourceLocation;
use crate::shared::LocalModule;

/// Stack line separating caller frames from frames inside the cache machinery.
/// Everything before it is worth persisting; everything after it is rebuilt.
pub const WARNING_FRAME_MARKER: &str = "    at hoard::warning_boundary";

pub type ExtensionSlot = RefCell<Extensions>;

/// Attributes that are not part of any kind's schema.
///
/// Defaults mean "not set"; only set attributes are persisted.
#[derive(Debug, Clone, Default)]
pub struct Extensions {
    /// Emit this dependency's code before the module body.
    pub prepend: bool,
    /// Identifier of the dependency this one supersedes.
    pub replaces: Option<String>,
    /// Resolution failure should be reported as critical.
    pub critical: bool,
    pub optional: bool,
    pub weak: bool,
    pub namespace_object_as_context: bool,
    /// Local module this dependency binds to.
    pub local_binding: Option<Rc<LocalModule>>,
    pub loc: Option<SourceLocation>,
    pub warnings: Warnings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeWarning {
    pub message: String,
    pub stack: String,
}

impl NodeWarning {
    #[must_use]
    pub fn new(message: impl Into<String>, stack: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stack: stack.into(),
        }
    }
}

/// The persisted part of a warning: its message and the caller frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrozenWarning {
    pub message: String,
    pub stack: String,
}

#[derive(Debug, Clone, Default)]
pub enum Warnings {
    #[default]
    None,
    /// Warnings produced while building this node in the current process.
    Live(Vec<NodeWarning>),
    /// Warnings restored from a cache; stacks are completed on demand.
    Replay(Vec<FrozenWarning>),
}

impl Warnings {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Warnings::None => true,
            Warnings::Live(list) => list.is_empty(),
            Warnings::Replay(list) => list.is_empty(),
        }
    }

    /// Materialize the warnings.
    ///
    /// Replayed warnings get their persisted caller frames followed by the
    /// marker and a stack captured right now.
    #[must_use]
    pub fn produce(&self) -> Vec<NodeWarning> {
        match self {
            Warnings::None => Vec::new(),
            Warnings::Live(list) => list.clone(),
            Warnings::Replay(list) => list
                .iter()
                .map(|frozen| {
                    let suffix = Backtrace::force_capture();
                    NodeWarning {
                        message: frozen.message.clone(),
                        stack: format!("{}\n{WARNING_FRAME_MARKER}\n{suffix}", frozen.stack),
                    }
                })
                .collect(),
        }
    }
}

/// The caller frames of `stack`: every line before the first marker line.
/// A stack without the marker is returned whole.
#[must_use]
pub fn split_stack(stack: &str) -> &str {
    match stack.find(WARNING_FRAME_MARKER) {
        Some(at) => stack[..at].trim_end_matches('\n'),
        None => stack,
    }
}
