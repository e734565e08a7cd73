//! Opaque ID newtypes for scope-tree entities.
//!
//! Each ID is a `u32` handed out by an [`Arena`](crate::arena::Arena). Equality
//! of IDs is the identity relation the rebaser preserves.

use crate::arena::ArenaId;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl ArenaId for $name {
            fn from_raw(index: u32) -> Self {
                Self(index)
            }

            fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

define_id!(
    /// A module: an original prototype or a proxy standing in for one.
    ModuleId,
    "m"
);

define_id!(
    /// A hardware value: port, wire, register, literal, view or aggregate field.
    ValueId,
    "v"
);

define_id!(
    /// A memory handle owned by a module.
    MemoryId,
    "mem"
);

define_id!(
    /// A non-module object that groups hardware members.
    InstantiableId,
    "obj"
);

define_id!(
    /// An interned type in the [`TypeDb`](crate::types::TypeDb).
    TypeId,
    "t"
);
