//! The scope tree: every module, value and memory of one elaboration.
//!
//! A [`ScopeTree`] is the explicit elaboration context. Nothing about naming
//! or the "current module" is ambient: every operation that creates or binds
//! an entity goes through a `&mut ScopeTree`. Independent elaborations use
//! independent trees.

use crate::arena::Arena;
use crate::ids::{InstantiableId, MemoryId, ModuleId, TypeId, ValueId};
use crate::member::{Instantiable, Member};
use crate::memory::{Memory, MemoryKind};
use crate::module::{Module, ModuleKind};
use crate::namespace::Namespace;
use crate::types::{Type, TypeDb};
use crate::value::{
    AggregateViewBinding, Binding, HwValue, PortDirection, Ref, Selector, ViewBinding, ViewEntry,
    Writability,
};
use indexmap::{IndexMap, IndexSet};
use strata_common::{Ident, InternalError, Interner, StrataResult};

/// All entities of one elaboration.
#[derive(Debug, Default)]
pub struct ScopeTree {
    /// Prototype modules and proxies.
    pub modules: Arena<ModuleId, Module>,
    /// Hardware values, including every field of every aggregate.
    pub values: Arena<ValueId, HwValue>,
    /// Memory handles.
    pub memories: Arena<MemoryId, Memory>,
    /// Instantiable objects.
    pub instantiables: Arena<InstantiableId, Instantiable>,
    /// Interned types.
    pub types: TypeDb,
    interner: Interner,
    view_names: Namespace,
    unnamed_views: IndexSet<ValueId>,
}

impl ScopeTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a name.
    pub fn intern(&self, s: &str) -> Ident {
        self.interner.get_or_intern(s)
    }

    /// Returns the [`Ident`] of a name seen before, without interning it.
    pub fn ident(&self, s: &str) -> Option<Ident> {
        self.interner.get(s)
    }

    /// Resolves an interned name.
    pub fn resolve(&self, ident: Ident) -> &str {
        self.interner.resolve(ident)
    }

    /// Interns a type.
    pub fn intern_type(&mut self, ty: Type) -> TypeId {
        self.types.intern(ty)
    }

    /// Returns a module.
    pub fn module(&self, id: ModuleId) -> &Module {
        &self.modules[id]
    }

    /// Returns a hardware value.
    pub fn value(&self, id: ValueId) -> &HwValue {
        &self.values[id]
    }

    /// Returns a memory.
    pub fn memory(&self, id: MemoryId) -> &Memory {
        &self.memories[id]
    }

    /// Returns an instantiable object.
    pub fn instantiable(&self, id: InstantiableId) -> &Instantiable {
        &self.instantiables[id]
    }

    // ---- modules ----

    /// Creates a prototype module. A module with a parent is registered as a
    /// member of it under `name`.
    pub fn add_module(&mut self, name: &str, parent: Option<ModuleId>) -> ModuleId {
        let name = self.intern(name);
        let id = self.modules.alloc(Module {
            id: self.modules.next_id(),
            name,
            parent,
            kind: ModuleKind::Proto,
            ports: Vec::new(),
            members: IndexMap::new(),
        });
        if let Some(parent) = parent {
            self.modules[parent].members.insert(name, Member::Module(id));
        }
        id
    }

    /// Instantiates `proto` inside `parent`.
    ///
    /// The result is a proxy with its own copy of every port of `proto` and a
    /// port identity map from the prototype's ports to those copies. It is
    /// registered as a member of `parent` under `name`.
    pub fn instantiate(
        &mut self,
        proto: ModuleId,
        parent: ModuleId,
        name: &str,
    ) -> StrataResult<ModuleId> {
        let name = self.intern(name);
        let root_proto = self.proto_of(proto)?;
        let clone = self.modules.alloc(Module {
            id: self.modules.next_id(),
            name,
            parent: Some(parent),
            kind: ModuleKind::ModuleClone {
                proto: root_proto,
                io_map: IndexMap::new(),
            },
            ports: Vec::new(),
            members: IndexMap::new(),
        });

        let proto_ports = self.modules[root_proto].ports.clone();
        let mut io_map = IndexMap::with_capacity(proto_ports.len());
        for port in proto_ports {
            let (ty, port_name, direction) = self.port_signature(port)?;
            let copy = self.alloc_value(ty);
            self.bind(copy, Binding::Port(direction), Some(clone))?;
            self.set_reference(
                copy,
                Ref::Port {
                    module: clone,
                    name: port_name,
                },
            )?;
            self.values[copy].name = Some(port_name);
            self.modules[clone].ports.push(copy);
            io_map.insert(port, copy);
        }
        if let ModuleKind::ModuleClone { io_map: slot, .. } = &mut self.modules[clone].kind {
            *slot = io_map;
        }
        self.modules[parent].members.insert(name, Member::Module(clone));
        log::debug!(
            "instantiated {} as {} in {}",
            self.resolve(self.modules[root_proto].name),
            clone,
            parent
        );
        Ok(clone)
    }

    /// Creates a placeholder proxy standing in for `proto` beneath `parent`.
    ///
    /// Placeholders are not registered as members; they are owned by whoever
    /// asked for them.
    pub fn new_instance_clone(&mut self, proto: ModuleId, parent: ModuleId) -> ModuleId {
        let name = self.modules[proto].name;
        let id = self.modules.alloc(Module {
            id: self.modules.next_id(),
            name,
            parent: Some(parent),
            kind: ModuleKind::InstanceClone { proto },
            ports: Vec::new(),
            members: IndexMap::new(),
        });
        log::trace!("new instance clone {id} of {proto} under {parent}");
        id
    }

    /// Follows proxy links down to the original module.
    pub fn proto_of(&self, module: ModuleId) -> StrataResult<ModuleId> {
        let mut current = module;
        for _ in 0..=self.modules.len() {
            match self.modules[current].direct_proto() {
                Some(proto) => current = proto,
                None => return Ok(current),
            }
        }
        Err(InternalError::new(format!(
            "proxy chain of {module} does not end in a prototype"
        )))
    }

    /// Returns `true` if both modules stand for the same original module.
    pub fn has_same_proto(&self, a: ModuleId, b: ModuleId) -> StrataResult<bool> {
        Ok(self.proto_of(a)? == self.proto_of(b)?)
    }

    /// Sets a named member of a module.
    pub fn set_member(&mut self, module: ModuleId, name: &str, member: Member) {
        let name = self.intern(name);
        self.modules[module].members.insert(name, member);
    }

    // ---- instantiable objects ----

    /// Creates an instantiable object with no members.
    pub fn add_instantiable(&mut self, name: &str) -> InstantiableId {
        let name = self.intern(name);
        self.instantiables.alloc(Instantiable {
            id: self.instantiables.next_id(),
            name,
            members: IndexMap::new(),
        })
    }

    /// Sets a named member of an instantiable object.
    pub fn set_instantiable_member(&mut self, obj: InstantiableId, name: &str, member: Member) {
        let name = self.intern(name);
        self.instantiables[obj].members.insert(name, member);
    }

    // ---- hardware values ----

    /// Allocates an unbound value of type `ty` together with its field tree.
    ///
    /// Fields are bound to their aggregate immediately; the root stays
    /// unbound until [`bind`](Self::bind).
    pub fn alloc_value(&mut self, ty: TypeId) -> ValueId {
        let root = self.alloc_node(ty, None, None);
        let mut pending = vec![root];
        while let Some(aggregate) = pending.pop() {
            let ty = self.values[aggregate].ty;
            for (selector, child_ty) in self.types.child_selectors(ty) {
                let reference = match selector {
                    Selector::Field(name) => Ref::Field {
                        parent: aggregate,
                        name,
                    },
                    Selector::Index(index) => Ref::Index {
                        parent: aggregate,
                        index,
                    },
                };
                let child = self.alloc_node(
                    child_ty,
                    Some(Binding::Child { parent: aggregate }),
                    Some(reference),
                );
                self.values[aggregate].children.push(child);
                pending.push(child);
            }
        }
        root
    }

    fn alloc_node(
        &mut self,
        ty: TypeId,
        binding: Option<Binding>,
        reference: Option<Ref>,
    ) -> ValueId {
        self.values.alloc(HwValue {
            id: self.values.next_id(),
            name: None,
            ty,
            binding,
            parent: None,
            reference,
            children: Vec::new(),
        })
    }

    /// Binds a root value and sets the owning module of its whole field tree.
    ///
    /// Binding is set exactly once; binding twice, or binding a field
    /// directly, is an internal error.
    pub fn bind(
        &mut self,
        value: ValueId,
        binding: Binding,
        parent: Option<ModuleId>,
    ) -> StrataResult<()> {
        if let Some(existing) = &self.values[value].binding {
            return Err(InternalError::new(format!(
                "{value} is already bound as {existing:?}"
            )));
        }
        self.values[value].binding = Some(binding);
        for node in self.subtree(value) {
            self.values[node].parent = parent;
        }
        Ok(())
    }

    /// Sets where a root value lives. A value's reference is set once.
    pub fn set_reference(&mut self, value: ValueId, reference: Ref) -> StrataResult<()> {
        if let Some(existing) = self.values[value].reference {
            return Err(InternalError::new(format!(
                "{value} already has reference {existing:?}"
            )));
        }
        self.values[value].reference = Some(reference);
        Ok(())
    }

    /// Sets or clears the name of a value.
    pub fn set_name(&mut self, value: ValueId, name: Option<Ident>) {
        self.values[value].name = name;
    }

    /// Adds a port to a module and exposes it as a member.
    pub fn add_port(
        &mut self,
        module: ModuleId,
        name: &str,
        direction: PortDirection,
        ty: TypeId,
    ) -> StrataResult<ValueId> {
        let name = self.intern(name);
        let port = self.alloc_value(ty);
        self.bind(port, Binding::Port(direction), Some(module))?;
        self.set_reference(port, Ref::Port { module, name })?;
        self.values[port].name = Some(name);
        let module = &mut self.modules[module];
        module.ports.push(port);
        module.members.insert(name, Member::Hardware(port));
        Ok(port)
    }

    /// Adds a wire to a module and exposes it as a member.
    pub fn add_wire(&mut self, module: ModuleId, name: &str, ty: TypeId) -> StrataResult<ValueId> {
        self.add_node(module, name, ty, Binding::Wire)
    }

    /// Adds a register to a module and exposes it as a member.
    pub fn add_reg(&mut self, module: ModuleId, name: &str, ty: TypeId) -> StrataResult<ValueId> {
        self.add_node(module, name, ty, Binding::Reg)
    }

    fn add_node(
        &mut self,
        module: ModuleId,
        name: &str,
        ty: TypeId,
        binding: Binding,
    ) -> StrataResult<ValueId> {
        let name = self.intern(name);
        let node = self.alloc_value(ty);
        self.bind(node, binding, Some(module))?;
        self.set_reference(node, Ref::Node(name))?;
        self.values[node].name = Some(name);
        self.modules[module]
            .members
            .insert(name, Member::Hardware(node));
        Ok(node)
    }

    /// Creates a literal. Literals belong to no module.
    pub fn add_literal(&mut self, ty: TypeId) -> StrataResult<ValueId> {
        let literal = self.alloc_value(ty);
        self.bind(literal, Binding::Literal, None)?;
        Ok(literal)
    }

    /// Creates a view of a single target with the target's type.
    pub fn add_view(
        &mut self,
        name: &str,
        target: ValueId,
        writability: Writability,
    ) -> StrataResult<ValueId> {
        let ty = self.values[target].ty;
        let view = self.alloc_value(ty);
        self.bind(
            view,
            Binding::View(ViewBinding {
                target,
                writability,
            }),
            None,
        )?;
        let name = self.intern(name);
        self.set_reference(view, Ref::Node(name))?;
        self.values[view].name = Some(name);
        Ok(view)
    }

    /// Creates a field-by-field view of type `ty`.
    ///
    /// Each entry gives the selector path of a view field (empty for the whole
    /// view), the target providing its storage, and its access policy.
    pub fn add_aggregate_view(
        &mut self,
        name: &str,
        ty: TypeId,
        entries: &[(Vec<Selector>, ValueId, Writability)],
    ) -> StrataResult<ValueId> {
        let view = self.alloc_value(ty);
        let mut map = IndexMap::with_capacity(entries.len());
        for (path, target, writability) in entries {
            let field = self.select_path(view, path)?;
            if self.values[field].ty != self.values[*target].ty {
                return Err(InternalError::new(format!(
                    "view field {field} and target {target} have different types"
                )));
            }
            map.insert(
                field,
                ViewEntry {
                    target: *target,
                    writability: *writability,
                },
            );
        }
        self.bind(
            view,
            Binding::AggregateView(AggregateViewBinding { entries: map }),
            None,
        )?;
        let name = self.intern(name);
        self.set_reference(view, Ref::Node(name))?;
        self.values[view].name = Some(name);
        Ok(view)
    }

    // ---- structural navigation ----

    /// Applies one selector to a value.
    ///
    /// A selector that does not fit the value's declared shape is an internal
    /// error: callers only navigate trees that are congruent by construction.
    pub fn select(&self, value: ValueId, selector: &Selector) -> StrataResult<ValueId> {
        let node = &self.values[value];
        self.types
            .child_position(node.ty, selector)
            .and_then(|position| node.children.get(position).copied())
            .ok_or_else(|| {
                InternalError::new(format!(
                    "selector {selector:?} does not resolve against {value} of type {:?}",
                    self.types.get(node.ty)
                ))
            })
    }

    /// Applies a selector path to a value.
    pub fn select_path(&self, value: ValueId, path: &[Selector]) -> StrataResult<ValueId> {
        path.iter()
            .try_fold(value, |current, selector| self.select(current, selector))
    }

    /// Walks from a value up to its structural root.
    ///
    /// Returns the selector path from the root down to `value` and the root.
    pub fn unroll(&self, value: ValueId) -> StrataResult<(Vec<Selector>, ValueId)> {
        let mut path = Vec::new();
        let mut current = value;
        while let Some(parent) = self.values[current].child_of() {
            let selector = self.values[current]
                .reference
                .and_then(|r| r.selector())
                .ok_or_else(|| {
                    InternalError::new(format!(
                        "field {current} of {parent} has no field or index reference"
                    ))
                })?;
            path.push(selector);
            current = parent;
        }
        path.reverse();
        Ok((path, current))
    }

    /// Returns the binding of a value's structural root.
    pub fn top_binding(&self, value: ValueId) -> Option<&Binding> {
        let mut current = value;
        while let Some(parent) = self.values[current].child_of() {
            current = parent;
        }
        self.values[current].binding.as_ref()
    }

    /// Returns a value and all of its fields in pre-order.
    pub fn subtree(&self, value: ValueId) -> Vec<ValueId> {
        let mut order = Vec::new();
        let mut pending = vec![value];
        while let Some(node) = pending.pop() {
            order.push(node);
            pending.extend(self.values[node].children.iter().rev().copied());
        }
        order
    }

    // ---- memories ----

    /// Adds a memory to a module and exposes it as a member.
    pub fn add_memory(
        &mut self,
        module: ModuleId,
        name: &str,
        element: TypeId,
        depth: u32,
        kind: MemoryKind,
    ) -> MemoryId {
        let name = self.intern(name);
        let id = self.memories.alloc(Memory {
            id: self.memories.next_id(),
            name,
            element,
            depth,
            kind,
            parent: Some(module),
            reference: Some(Ref::Node(name)),
        });
        self.modules[module].members.insert(name, Member::Memory(id));
        id
    }

    /// Creates a memory of the same shape as `original`, owned by `parent`,
    /// keeping the original's reference.
    pub fn clone_memory(&mut self, original: MemoryId, parent: ModuleId) -> MemoryId {
        let source = &self.memories[original];
        let copy = Memory {
            id: self.memories.next_id(),
            name: source.name,
            element: source.element,
            depth: source.depth,
            kind: source.kind,
            parent: Some(parent),
            reference: source.reference,
        };
        self.memories.alloc(copy)
    }

    // ---- naming ----

    /// Returns a fresh view name derived from `prefix`.
    pub fn fresh_view_name(&mut self, prefix: &str) -> Ident {
        let name = self.view_names.fresh(prefix);
        self.intern(&name)
    }

    /// Records that a synthesized view field cannot be given a stable name.
    pub fn mark_unnamed(&mut self, value: ValueId) {
        self.unnamed_views.insert(value);
    }

    /// Returns `true` if `value` was marked as unnameable.
    pub fn is_unnamed(&self, value: ValueId) -> bool {
        self.unnamed_views.contains(&value)
    }

    /// Iterates over all values marked as unnameable, in marking order.
    pub fn unnamed_views(&self) -> impl Iterator<Item = ValueId> + '_ {
        self.unnamed_views.iter().copied()
    }

    fn port_signature(&self, port: ValueId) -> StrataResult<(TypeId, Ident, PortDirection)> {
        let value = &self.values[port];
        match (&value.binding, value.name) {
            (Some(Binding::Port(direction)), Some(name)) => Ok((value.ty, name, *direction)),
            _ => Err(InternalError::new(format!(
                "{port} is listed as a port but is not a named port binding"
            ))),
        }
    }
}
