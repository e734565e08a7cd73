//! Module rebasing.
//!
//! Given a module and a destination, decides where the module sits relative
//! to the destination and builds the proxies needed to situate it there.
//!
//! The ancestor chain is walked upward until it reaches the destination, a
//! proxy of the same original as the destination, or a global root. If the
//! walk ended at a proxy, one placeholder proxy is built per level on the way
//! back down, each parented under the one built before it.

use crate::context::Rebaser;
use strata_common::{InternalError, StrataResult};
use strata_ir::ModuleId;

/// A module reference tagged with whether it is an original or a proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Underlying {
    /// The module as originally elaborated.
    Proto(ModuleId),
    /// A proxy situating an original under a different parent.
    Clone(ModuleId),
}

impl Underlying {
    /// Returns the referenced module, original or proxy.
    pub fn module(self) -> ModuleId {
        match self {
            Underlying::Proto(m) | Underlying::Clone(m) => m,
        }
    }
}

/// Where a module sits relative to a destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    /// Already inside the destination; nothing to build.
    InPlace,
    /// The destination itself is the rebased form of the module.
    Existing(ModuleId),
    /// The module must be proxied beneath this parent.
    Under(ModuleId),
}

impl Rebaser<'_> {
    /// Rebases a module against `destination`.
    ///
    /// Proxies are never shared: every call that needs one builds a fresh
    /// one.
    pub fn rebase_module(
        &mut self,
        original: Underlying,
        destination: ModuleId,
    ) -> StrataResult<Underlying> {
        let module = original.module();
        let result = match (original, self.placement(module, destination)?) {
            (_, Placement::InPlace) => original,
            (_, Placement::Existing(proxy)) => Underlying::Clone(proxy),
            (Underlying::Proto(_), Placement::Under(parent)) => {
                Underlying::Clone(self.tree.new_instance_clone(module, parent))
            }
            (Underlying::Clone(clone), Placement::Under(parent)) => {
                // Re-proxy the original rather than nesting proxies.
                let proto = self.tree.module(clone).direct_proto().ok_or_else(|| {
                    InternalError::new(format!("{clone} is tagged as a clone but is a prototype"))
                })?;
                Underlying::Clone(self.tree.new_instance_clone(proto, parent))
            }
        };
        log::debug!("rebased {original:?} into {destination} as {result:?}");
        Ok(result)
    }

    fn placement(&mut self, module: ModuleId, destination: ModuleId) -> StrataResult<Placement> {
        let max_depth = self.config.limits.max_hierarchy_depth;
        let dest_is_proxy = self.tree.module(destination).is_proxy();

        // Modules between `module` (exclusive) and the terminal ancestor.
        let mut chain = Vec::new();
        let mut current = module;
        let terminal = loop {
            if current == destination {
                break None;
            }
            if dest_is_proxy && self.tree.has_same_proto(destination, current)? {
                break Some(destination);
            }
            match self.tree.module(current).parent {
                None => break None,
                Some(parent) => {
                    if chain.len() >= max_depth {
                        return Err(InternalError::new(format!(
                            "ancestor chain of {module} exceeds {max_depth} levels"
                        )));
                    }
                    if current != module {
                        chain.push(current);
                    }
                    current = parent;
                }
            }
        };

        let placement = match terminal {
            None => Placement::InPlace,
            Some(proxy) if current == module => Placement::Existing(proxy),
            Some(proxy) => {
                let mut parent = proxy;
                for ancestor in chain.into_iter().rev() {
                    parent = self.tree.new_instance_clone(ancestor, parent);
                }
                Placement::Under(parent)
            }
        };
        Ok(placement)
    }
}
