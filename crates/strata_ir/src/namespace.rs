//! Unique-name allocation for synthesized values.

use std::collections::HashMap;

/// Hands out names that are unique within this namespace.
///
/// The first request for a base name returns it unchanged; later requests get
/// `_1`, `_2`, ... appended.
#[derive(Debug, Clone, Default)]
pub struct Namespace {
    counters: HashMap<String, u32>,
}

impl Namespace {
    /// Creates an empty namespace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a fresh name derived from `base`.
    pub fn fresh(&mut self, base: &str) -> String {
        let counter = self.counters.entry(base.to_string()).or_insert(0);
        let name = if *counter == 0 {
            base.to_string()
        } else {
            format!("{base}_{counter}")
        };
        *counter += 1;
        name
    }
}
