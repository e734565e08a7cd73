//! Per-handle memo of rebased values and memories.

use std::collections::HashMap;
use strata_ir::{MemoryId, ValueId};

/// Maps originals to their rebased counterparts within one destination
/// context.
///
/// Entries are never invalidated; the cache lives exactly as long as the
/// [`Instance`](crate::hierarchy::Instance) that owns it. Views are keyed in
/// the value map like any other hardware value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RebaseCache {
    values: HashMap<ValueId, ValueId>,
    memories: HashMap<MemoryId, MemoryId>,
}

impl RebaseCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the rebased counterpart of a value, if already computed.
    pub fn value(&self, original: ValueId) -> Option<ValueId> {
        self.values.get(&original).copied()
    }

    /// Records the rebased counterpart of a value.
    pub fn insert_value(&mut self, original: ValueId, rebased: ValueId) {
        self.values.insert(original, rebased);
    }

    /// Returns the rebased counterpart of a memory, if already computed.
    pub fn memory(&self, original: MemoryId) -> Option<MemoryId> {
        self.memories.get(&original).copied()
    }

    /// Records the rebased counterpart of a memory.
    pub fn insert_memory(&mut self, original: MemoryId, rebased: MemoryId) {
        self.memories.insert(original, rebased);
    }

    /// Returns the number of memoized entries.
    pub fn len(&self) -> usize {
        self.values.len() + self.memories.len()
    }

    /// Returns `true` if nothing has been memoized.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
