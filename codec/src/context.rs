//! Per-session traversal state.
//!
//! A [`TraversalContext`] lives exactly as long as one freeze or thaw session.
//! Its accumulators encode identity within that session only: sharing one
//! between sessions would merge the identities of unrelated graphs, which is
//! why it is neither `Clone` nor resettable.

use std::collections::HashMap;
use std::rc::Rc;

use hoard_types::{
    LocalModule, ModuleRef, NodeRef, SharedNames, StarExports, new_shared_names,
    new_star_exports,
};

use crate::error::CodecError;

/// Upper bound on local module indices accepted from a frozen record.
pub const MAX_LOCAL_MODULES: usize = 1 << 16;

#[derive(Debug, Default)]
pub struct TraversalContext {
    owner: Option<ModuleRef>,
    parent: Option<NodeRef>,
    state: SessionState,
}

impl TraversalContext {
    #[must_use]
    pub fn new(owner: Option<ModuleRef>) -> Self {
        Self {
            owner,
            parent: None,
            state: SessionState::default(),
        }
    }

    /// The module this session runs on behalf of.
    #[must_use]
    pub fn owner(&self) -> Option<&ModuleRef> {
        self.owner.as_ref()
    }

    /// The node whose children are being thawed, if any.
    #[must_use]
    pub fn parent(&self) -> Option<&NodeRef> {
        self.parent.as_ref()
    }

    /// Swap the parent slot, returning the previous occupant so the caller can
    /// restore it once the children are done.
    pub fn replace_parent(&mut self, parent: Option<NodeRef>) -> Option<NodeRef> {
        std::mem::replace(&mut self.parent, parent)
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }
}

/// Accumulators shared by every node thawed in one session.
#[derive(Debug, Default)]
pub struct SessionState {
    local_modules: Vec<Option<Rc<LocalModule>>>,
    active_names: Option<SharedNames>,
    star_list: Option<StarExports>,
    by_key: HashMap<String, NodeRef>,
}

impl SessionState {
    /// The local module at `index`, created with `name` the first time the
    /// index is seen in this session.
    pub fn local_module(
        &mut self,
        index: usize,
        name: &str,
    ) -> Result<Rc<LocalModule>, CodecError> {
        if index >= MAX_LOCAL_MODULES {
            return Err(CodecError::LocalModuleIndex {
                index,
                limit: MAX_LOCAL_MODULES,
            });
        }
        if self.local_modules.len() <= index {
            self.local_modules.resize(index + 1, None);
        }
        let slot = &mut self.local_modules[index];
        let module = slot.get_or_insert_with(|| Rc::new(LocalModule::new(name, index)));
        Ok(Rc::clone(module))
    }

    /// Number of distinct local modules created so far.
    #[must_use]
    pub fn local_module_count(&self) -> usize {
        self.local_modules.iter().flatten().count()
    }

    /// The session's active export names, created on first use.
    pub fn active_names(&mut self) -> SharedNames {
        Rc::clone(self.active_names.get_or_insert_with(new_shared_names))
    }

    /// The session's star re-export list, created on first use.
    pub fn star_list(&mut self) -> StarExports {
        Rc::clone(self.star_list.get_or_insert_with(new_star_exports))
    }

    #[must_use]
    pub fn deduped(&self, key: &str) -> Option<NodeRef> {
        self.by_key.get(key).cloned()
    }

    /// Record `node` under `key` unless something already holds the key.
    /// Returns the instance that ends up stored.
    pub fn remember(&mut self, key: String, node: NodeRef) -> NodeRef {
        Rc::clone(self.by_key.entry(key).or_insert(node))
    }
}
