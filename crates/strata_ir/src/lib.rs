//! The strata scope-tree IR.
//!
//! Elaborated hardware is stored in a [`ScopeTree`]: modules (prototypes and
//! their proxies), hardware values with their field trees, memories and
//! instantiable objects, all held in arenas and referenced by opaque IDs.
//! The rebasing layer in `strata_rebase` reads and extends this tree.

#![warn(missing_docs)]

pub mod arena;
pub mod const_value;
pub mod ids;
pub mod member;
pub mod memory;
pub mod module;
pub mod namespace;
pub mod tree;
pub mod types;
pub mod value;

pub use arena::{Arena, ArenaId};
pub use const_value::ConstValue;
pub use ids::{InstantiableId, MemoryId, ModuleId, TypeId, ValueId};
pub use member::{Either, Instantiable, Member, Target};
pub use memory::{Memory, MemoryKind};
pub use module::{Module, ModuleKind};
pub use namespace::Namespace;
pub use tree::ScopeTree;
pub use types::{Type, TypeDb};
pub use value::{
    AggregateViewBinding, Binding, HwValue, PortDirection, Ref, Selector, ViewBinding, ViewEntry,
    Writability,
};
