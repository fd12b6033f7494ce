//! Handles shared between nodes thawed in the same session.
//!
//! These are reference-counted with a single writer: the session that created
//! them. Nothing here is global; two sessions never see each other's handles.

use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::rc::Rc;

use crate::node::WeakNode;

/// Names a module actively exports. Grows as sibling export nodes thaw.
pub type SharedNames = Rc<RefCell<BTreeSet<String>>>;

/// Star re-exports seen so far in a module. Grows as sibling re-exports thaw.
pub type StarExports = Rc<RefCell<Vec<WeakNode>>>;

#[must_use]
pub fn new_shared_names() -> SharedNames {
    Rc::new(RefCell::new(BTreeSet::new()))
}

#[must_use]
pub fn new_star_exports() -> StarExports {
    Rc::new(RefCell::new(Vec::new()))
}

/// A module declared inline inside another module (AMD `define("name", ...)`).
///
/// Several dependencies refer to the same local module by its index; they must
/// share one instance so that marking it used through one is visible to all.
#[derive(Debug)]
pub struct LocalModule {
    name: String,
    index: usize,
    used: Cell<bool>,
}

impl LocalModule {
    #[must_use]
    pub fn new(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            index,
            used: Cell::new(false),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn is_used(&self) -> bool {
        self.used.get()
    }

    pub fn flag_used(&self) {
        self.used.set(true);
    }

    /// Variable name the local module is bound to in generated code.
    #[must_use]
    pub fn variable_name(&self) -> String {
        format!("__LOCAL_MODULE_{}__", self.index)
    }
}
