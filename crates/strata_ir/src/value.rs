//! Hardware values, their bindings, and the references that locate them.
//!
//! A [`HwValue`] is created unbound with its whole field tree, then bound
//! exactly once. Fields of an aggregate carry [`Binding::Child`] and a
//! [`Ref::Field`]/[`Ref::Index`] reference naming their position, so the
//! selector path from any leaf back to its structural root can be read off
//! the tree.

use crate::ids::{ModuleId, TypeId, ValueId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strata_common::Ident;

/// The direction of a port on a module boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortDirection {
    /// Data flows into the module.
    Input,
    /// Data flows out of the module.
    Output,
    /// Data flows both ways.
    InOut,
}

/// One step of a selector path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Selector {
    /// A named record field.
    Field(Ident),
    /// An array element.
    Index(u32),
}

/// Whether a view may be driven through.
///
/// Ordered so that the stricter policy compares greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Writability {
    /// The view can be read and driven.
    #[default]
    ReadWrite,
    /// The view can only be read.
    ReadOnly,
}

impl Writability {
    /// Combines two policies, keeping the stricter.
    pub fn combine(self, other: Writability) -> Writability {
        self.max(other)
    }
}

/// Where a value lives, as seen from the IR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ref {
    /// A named node inside its owning module.
    Node(Ident),
    /// A port of a module.
    Port {
        /// The module that declares the port.
        module: ModuleId,
        /// The port name.
        name: Ident,
    },
    /// A record field of `parent`.
    Field {
        /// The enclosing aggregate.
        parent: ValueId,
        /// The field name.
        name: Ident,
    },
    /// An array element of `parent`.
    Index {
        /// The enclosing aggregate.
        parent: ValueId,
        /// The element index.
        index: u32,
    },
}

impl Ref {
    /// Returns the selector this reference applies to its parent aggregate,
    /// or `None` for root references.
    pub fn selector(&self) -> Option<Selector> {
        match *self {
            Ref::Field { name, .. } => Some(Selector::Field(name)),
            Ref::Index { index, .. } => Some(Selector::Index(index)),
            Ref::Node(_) | Ref::Port { .. } => None,
        }
    }
}

/// A view onto a single target value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewBinding {
    /// The value providing the storage.
    pub target: ValueId,
    /// Access policy of the view.
    pub writability: Writability,
}

/// One mapped field of an aggregate view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewEntry {
    /// The value providing the storage for this field.
    pub target: ValueId,
    /// Access policy of this field.
    pub writability: Writability,
}

/// A field-by-field view.
///
/// Keys are fields of the view value itself (the root included). A field
/// that is neither a key nor below a key has no storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateViewBinding {
    /// Mapped fields, in field-tree order.
    pub entries: IndexMap<ValueId, ViewEntry>,
}

/// How a value is bound into the design.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Binding {
    /// A module port.
    Port(PortDirection),
    /// A combinational wire.
    Wire,
    /// A register.
    Reg,
    /// A literal with no owning module.
    Literal,
    /// A field of an aggregate; the aggregate's binding applies.
    Child {
        /// The enclosing aggregate.
        parent: ValueId,
    },
    /// A reference to a value whose true location is outside the immediate
    /// syntactic scope of its owning proxy.
    CrossModule,
    /// A view of a single target.
    View(ViewBinding),
    /// A field-by-field view.
    AggregateView(AggregateViewBinding),
}

impl Binding {
    /// Returns `true` for view bindings.
    pub fn is_view(&self) -> bool {
        matches!(self, Binding::View(_) | Binding::AggregateView(_))
    }
}

/// A hardware value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HwValue {
    /// The ID of this value.
    pub id: ValueId,
    /// The assigned name, if any.
    pub name: Option<Ident>,
    /// The declared type.
    pub ty: TypeId,
    /// The binding, set once.
    pub binding: Option<Binding>,
    /// The owning module. Views and literals have none.
    pub parent: Option<ModuleId>,
    /// Where the value lives.
    pub reference: Option<Ref>,
    /// Direct fields of an aggregate, in field-tree order.
    pub children: Vec<ValueId>,
}

impl HwValue {
    /// Returns `true` if the value has been bound.
    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    /// Returns the enclosing aggregate if this value is a field.
    pub fn child_of(&self) -> Option<ValueId> {
        match self.binding {
            Some(Binding::Child { parent }) => Some(parent),
            _ => None,
        }
    }
}
