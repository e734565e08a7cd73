//! Named members exposed by modules and instantiable objects.
//!
//! A [`Member`] is the dynamic shape of anything a hierarchy handle can be
//! asked to read: scalars, hardware, child modules, memories, nested
//! instantiable objects, and containers of those.

use crate::const_value::ConstValue;
use crate::ids::{InstantiableId, MemoryId, ModuleId, ValueId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strata_common::Ident;

/// One of two alternatives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Either<L, R> {
    /// The left alternative.
    Left(L),
    /// The right alternative.
    Right(R),
}

impl<L, R> Either<L, R> {
    /// Returns `true` for [`Either::Left`].
    pub fn is_left(&self) -> bool {
        matches!(self, Either::Left(_))
    }
}

/// A handle naming a structural target for external tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    /// An SRAM backed by a memory.
    Sram(MemoryId),
}

/// The dynamic shape of a member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Member {
    /// An immutable scalar.
    Scalar(ConstValue),
    /// A hardware value.
    Hardware(ValueId),
    /// A child module or a direct instantiation.
    Module(ModuleId),
    /// A nested instantiable object.
    Instantiable(InstantiableId),
    /// A memory handle.
    Memory(MemoryId),
    /// A structural target handle.
    Target(Target),
    /// An ordered container.
    List(Vec<Member>),
    /// An optional member.
    Optional(Option<Box<Member>>),
    /// One of two members.
    Either(Either<Box<Member>, Box<Member>>),
    /// Two members.
    Pair(Box<Member>, Box<Member>),
    /// A host object with no registered lookup.
    Opaque {
        /// Name of the host type, for error reporting.
        type_name: String,
    },
}

/// A non-module object that groups members and can be wrapped in a hierarchy
/// handle of its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instantiable {
    /// The ID of this object.
    pub id: InstantiableId,
    /// The object name.
    pub name: Ident,
    /// Named members.
    pub members: IndexMap<Ident, Member>,
}
