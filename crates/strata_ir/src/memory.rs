//! Memory handles.

use crate::ids::{MemoryId, ModuleId, TypeId};
use crate::value::Ref;
use serde::{Deserialize, Serialize};
use strata_common::Ident;

/// Read-port timing of a memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemoryKind {
    /// Combinational read.
    Async,
    /// Registered read.
    SyncRead,
}

/// A memory owned by a module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Memory {
    /// The ID of this memory.
    pub id: MemoryId,
    /// The declared name.
    pub name: Ident,
    /// Type of one word.
    pub element: TypeId,
    /// Number of words.
    pub depth: u32,
    /// Read-port timing.
    pub kind: MemoryKind,
    /// The owning module.
    pub parent: Option<ModuleId>,
    /// Where the memory lives.
    pub reference: Option<Ref>,
}
