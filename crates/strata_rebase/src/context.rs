//! State threaded through every rebase.
//!
//! [`Rebaser`] borrows the scope tree being extended and the configuration.
//! [`LookupCx`] carries what one hierarchy handle contributes to a lookup:
//! its cache, its destination module and its port identity map.

use crate::cache::RebaseCache;
use crate::hierarchy::InstanceRoot;
use strata_common::Ident;
use strata_config::RebaseConfig;
use strata_ir::{ModuleId, ScopeTree};

/// Rebases modules, values and views within one scope tree.
pub struct Rebaser<'a> {
    pub(crate) tree: &'a mut ScopeTree,
    pub(crate) config: &'a RebaseConfig,
}

impl<'a> Rebaser<'a> {
    /// Creates a rebaser over `tree`.
    pub fn new(tree: &'a mut ScopeTree, config: &'a RebaseConfig) -> Self {
        Self { tree, config }
    }

    /// Returns the scope tree.
    pub fn tree(&self) -> &ScopeTree {
        self.tree
    }

    /// Returns the scope tree mutably.
    pub fn tree_mut(&mut self) -> &mut ScopeTree {
        self.tree
    }
}

/// One handle's view of a lookup in progress.
pub struct LookupCx<'c> {
    /// Memo of values and memories already rebased for this handle.
    pub cache: &'c mut RebaseCache,
    /// The module lookups are rebased against. `None` for handles over a
    /// standalone instantiable object.
    pub context: Option<ModuleId>,
    /// A direct instantiation whose ports are identity-mapped.
    pub io_module: Option<ModuleId>,
    /// The handle the lookup goes through, recorded by nested instantiable
    /// handles as their origin.
    pub origin: &'c InstanceRoot,
    /// The member name being resolved, for error reporting.
    pub member: Option<Ident>,
}
