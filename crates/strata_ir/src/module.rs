//! Modules: nodes of the scope tree.
//!
//! A module's parent is fixed when the module is created. Proxies are modules
//! too; they differ from prototypes only in their [`ModuleKind`].

use crate::ids::{ModuleId, ValueId};
use crate::member::Member;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strata_common::Ident;

/// What a module is: an original, or a proxy situating an original elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModuleKind {
    /// A module as originally elaborated.
    Proto,
    /// A direct instantiation of `proto`. It owns real ports; `io_map` maps
    /// each prototype port to the corresponding port of this clone.
    ModuleClone {
        /// The instantiated module.
        proto: ModuleId,
        /// Prototype port to clone port.
        io_map: IndexMap<ValueId, ValueId>,
    },
    /// A placeholder that exists only so `proto` can appear beneath a
    /// different parent.
    InstanceClone {
        /// The module this placeholder stands in for.
        proto: ModuleId,
    },
}

/// A node of the scope tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    /// The ID of this module.
    pub id: ModuleId,
    /// The module (or instance) name.
    pub name: Ident,
    /// The enclosing module. `None` for a global root.
    pub parent: Option<ModuleId>,
    /// Prototype or proxy.
    pub kind: ModuleKind,
    /// Declared ports, in declaration order.
    pub ports: Vec<ValueId>,
    /// Named members exposed for hierarchy lookups.
    pub members: IndexMap<Ident, Member>,
}

impl Module {
    /// Returns `true` if this module is a proxy of another module.
    pub fn is_proxy(&self) -> bool {
        !matches!(self.kind, ModuleKind::Proto)
    }

    /// Returns the module this one directly stands in for, if it is a proxy.
    pub fn direct_proto(&self) -> Option<ModuleId> {
        match self.kind {
            ModuleKind::Proto => None,
            ModuleKind::ModuleClone { proto, .. } | ModuleKind::InstanceClone { proto } => {
                Some(proto)
            }
        }
    }

    /// Returns the port identity map of a direct instantiation.
    pub fn io_map(&self) -> Option<&IndexMap<ValueId, ValueId>> {
        match &self.kind {
            ModuleKind::ModuleClone { io_map, .. } => Some(io_map),
            ModuleKind::Proto | ModuleKind::InstanceClone { .. } => None,
        }
    }
}
