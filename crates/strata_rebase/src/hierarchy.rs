//! Hierarchy handles: the client-facing entry points for member lookups.
//!
//! A [`Definition`] is the canonical, unrebased root of a prototype. An
//! [`Instance`] is a possibly-rebased root that owns the [`RebaseCache`] for
//! everything looked up through it. [`Hierarchy`] is either one.

use crate::cache::RebaseCache;
use crate::context::{LookupCx, Rebaser};
use crate::errors::{RebaseError, RebaseResult};
use crate::lookup::{Lookupable, Resolved};
use crate::module::Underlying;
use strata_common::Ident;
use strata_ir::{InstantiableId, Member, ModuleId, ScopeTree};

/// The prototype a handle was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefinitionRoot {
    /// A module.
    Module(ModuleId),
    /// An instantiable object.
    Instantiable(InstantiableId),
}

/// The root of an [`Instance`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceRoot {
    /// A module, original or proxy.
    Module(Underlying),
    /// An instantiable object, with the handle it was looked up through.
    Instantiable {
        /// The object.
        proto: InstantiableId,
        /// The handle the object was reached from. `None` for an object
        /// wrapped directly.
        context: Option<Box<InstanceRoot>>,
    },
}

impl InstanceRoot {
    /// Returns the module lookups through this root are rebased against.
    pub fn inner_context(&self) -> Option<ModuleId> {
        match self {
            InstanceRoot::Module(underlying) => Some(underlying.module()),
            InstanceRoot::Instantiable { context, .. } => {
                context.as_deref().and_then(InstanceRoot::inner_context)
            }
        }
    }

    /// Returns the direct instantiation whose ports are identity-mapped for
    /// lookups through this root.
    pub fn io_module(&self, tree: &ScopeTree) -> Option<ModuleId> {
        match self {
            InstanceRoot::Module(Underlying::Clone(m)) if tree.module(*m).io_map().is_some() => {
                Some(*m)
            }
            InstanceRoot::Module(_) => None,
            InstanceRoot::Instantiable { context, .. } => {
                context.as_deref().and_then(|c| c.io_module(tree))
            }
        }
    }

    /// Returns the prototype behind this root.
    pub fn proto(&self, tree: &ScopeTree) -> RebaseResult<DefinitionRoot> {
        Ok(match self {
            InstanceRoot::Module(underlying) => {
                DefinitionRoot::Module(tree.proto_of(underlying.module())?)
            }
            InstanceRoot::Instantiable { proto, .. } => DefinitionRoot::Instantiable(*proto),
        })
    }
}

impl From<DefinitionRoot> for InstanceRoot {
    fn from(root: DefinitionRoot) -> Self {
        match root {
            DefinitionRoot::Module(m) => InstanceRoot::Module(Underlying::Proto(m)),
            DefinitionRoot::Instantiable(proto) => InstanceRoot::Instantiable {
                proto,
                context: None,
            },
        }
    }
}

fn named_member(
    tree: &ScopeTree,
    proto: DefinitionRoot,
    name: &str,
) -> RebaseResult<(Ident, Member)> {
    let members = match proto {
        DefinitionRoot::Module(m) => &tree.module(m).members,
        DefinitionRoot::Instantiable(obj) => &tree.instantiable(obj).members,
    };
    tree.ident(name)
        .and_then(|ident| Some((ident, members.get(&ident)?.clone())))
        .ok_or_else(|| RebaseError::UnknownMember {
            name: name.to_string(),
        })
}

/// The canonical root of a prototype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Definition {
    root: DefinitionRoot,
}

impl Definition {
    /// Wraps a module.
    pub fn new(module: ModuleId) -> Self {
        Self {
            root: DefinitionRoot::Module(module),
        }
    }

    /// Wraps an instantiable object.
    pub fn of_instantiable(obj: InstantiableId) -> Self {
        Self {
            root: DefinitionRoot::Instantiable(obj),
        }
    }

    /// Returns the wrapped prototype.
    pub fn proto(&self) -> DefinitionRoot {
        self.root
    }

    /// Resolves a named member of the prototype.
    ///
    /// Definition lookups never relocate anything that belongs to the
    /// prototype, so no cache outlives the call.
    pub fn get(&self, rb: &mut Rebaser<'_>, name: &str) -> RebaseResult<Resolved> {
        let (ident, member) = named_member(rb.tree(), self.root, name)?;
        self.with_cx(rb, Some(ident), |rb, cx| member.lookup(rb, cx))
    }

    /// Looks up a member through this definition.
    pub fn lookup<B: Lookupable>(
        &self,
        rb: &mut Rebaser<'_>,
        member: B,
    ) -> RebaseResult<B::Output> {
        self.with_cx(rb, None, |rb, cx| member.lookup(rb, cx))
    }

    fn with_cx<R>(
        &self,
        rb: &mut Rebaser<'_>,
        member: Option<Ident>,
        f: impl FnOnce(&mut Rebaser<'_>, &mut LookupCx<'_>) -> RebaseResult<R>,
    ) -> RebaseResult<R> {
        let origin = InstanceRoot::from(self.root);
        let mut scratch = RebaseCache::new();
        let mut cx = LookupCx {
            cache: &mut scratch,
            context: origin.inner_context(),
            io_module: None,
            origin: &origin,
            member,
        };
        f(rb, &mut cx)
    }
}

/// A possibly-rebased root, with the cache of everything looked up through it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    root: InstanceRoot,
    cache: RebaseCache,
}

impl Instance {
    /// Creates an instance over `root` with an empty cache.
    pub fn new(root: InstanceRoot) -> Self {
        Self {
            root,
            cache: RebaseCache::new(),
        }
    }

    /// Views a definition as an instance of itself.
    pub fn of_definition(definition: &Definition) -> Self {
        Self::new(definition.root.into())
    }

    /// Instantiates a definition inside `parent`.
    ///
    /// A module definition becomes a direct instantiation with its own
    /// ports. An instantiable object is placed in `parent`'s context.
    pub fn instantiate(
        tree: &mut ScopeTree,
        definition: &Definition,
        parent: ModuleId,
        name: &str,
    ) -> RebaseResult<Self> {
        let root = match definition.root {
            DefinitionRoot::Module(proto) => {
                InstanceRoot::Module(Underlying::Clone(tree.instantiate(proto, parent, name)?))
            }
            DefinitionRoot::Instantiable(proto) => {
                tree.set_member(parent, name, Member::Instantiable(proto));
                InstanceRoot::Instantiable {
                    proto,
                    context: Some(Box::new(InstanceRoot::Module(Underlying::Proto(parent)))),
                }
            }
        };
        Ok(Self::new(root))
    }

    /// Returns the root this instance stands for.
    pub fn underlying(&self) -> &InstanceRoot {
        &self.root
    }

    /// Returns the prototype behind this instance.
    pub fn proto(&self, tree: &ScopeTree) -> RebaseResult<DefinitionRoot> {
        self.root.proto(tree)
    }

    /// Returns the definition of this instance's prototype.
    pub fn to_definition(&self, tree: &ScopeTree) -> RebaseResult<Definition> {
        Ok(Definition {
            root: self.proto(tree)?,
        })
    }

    /// Returns the cache of this instance.
    pub fn cache(&self) -> &RebaseCache {
        &self.cache
    }

    /// Resolves a named member of the prototype through this instance.
    pub fn get(&mut self, rb: &mut Rebaser<'_>, name: &str) -> RebaseResult<Resolved> {
        let proto = self.proto(rb.tree())?;
        let (ident, member) = named_member(rb.tree(), proto, name)?;
        let mut cx = self.cx(rb.tree(), Some(ident));
        member.lookup(rb, &mut cx)
    }

    /// Looks up a member through this instance.
    pub fn lookup<B: Lookupable>(
        &mut self,
        rb: &mut Rebaser<'_>,
        member: B,
    ) -> RebaseResult<B::Output> {
        let mut cx = self.cx(rb.tree(), None);
        member.lookup(rb, &mut cx)
    }

    fn cx(&mut self, tree: &ScopeTree, member: Option<Ident>) -> LookupCx<'_> {
        LookupCx {
            context: self.root.inner_context(),
            io_module: self.root.io_module(tree),
            cache: &mut self.cache,
            origin: &self.root,
            member,
        }
    }
}

/// Either kind of hierarchy handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hierarchy {
    /// A canonical root.
    Definition(Definition),
    /// A possibly-rebased root.
    Instance(Instance),
}

impl Hierarchy {
    /// Resolves a named member through this handle.
    pub fn get(&mut self, rb: &mut Rebaser<'_>, name: &str) -> RebaseResult<Resolved> {
        match self {
            Hierarchy::Definition(d) => d.get(rb, name),
            Hierarchy::Instance(i) => i.get(rb, name),
        }
    }

    /// Looks up a member through this handle.
    pub fn lookup<B: Lookupable>(
        &mut self,
        rb: &mut Rebaser<'_>,
        member: B,
    ) -> RebaseResult<B::Output> {
        match self {
            Hierarchy::Definition(d) => d.lookup(rb, member),
            Hierarchy::Instance(i) => i.lookup(rb, member),
        }
    }

    /// Returns the definition of this handle's prototype.
    pub fn to_definition(&self, tree: &ScopeTree) -> RebaseResult<Definition> {
        match self {
            Hierarchy::Definition(d) => Ok(*d),
            Hierarchy::Instance(i) => i.to_definition(tree),
        }
    }

    /// Returns the instance, if this handle is one.
    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Hierarchy::Instance(i) => Some(i),
            Hierarchy::Definition(_) => None,
        }
    }
}

impl From<Definition> for Hierarchy {
    fn from(d: Definition) -> Self {
        Hierarchy::Definition(d)
    }
}

impl From<Instance> for Hierarchy {
    fn from(i: Instance) -> Self {
        Hierarchy::Instance(i)
    }
}
