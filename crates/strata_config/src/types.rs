//! Configuration types deserialized from `strata.toml`.

use serde::Deserialize;

/// Default base name given to rebased views.
pub const DEFAULT_VIEW_PREFIX: &str = "view";

/// Default bound on the length of an ancestor chain.
pub const DEFAULT_MAX_HIERARCHY_DEPTH: usize = 4096;

/// Top-level rebasing configuration.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RebaseConfig {
    /// Naming of synthesized values.
    #[serde(default)]
    pub naming: NamingConfig,
    /// Structural limits checked while walking the scope tree.
    #[serde(default)]
    pub limits: LimitsConfig,
}

/// Naming of values synthesized during rebasing.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct NamingConfig {
    /// Base name for rebased views. Collisions get a `_N` suffix.
    #[serde(default = "default_view_prefix")]
    pub view_prefix: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            view_prefix: default_view_prefix(),
        }
    }
}

/// Structural limits.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LimitsConfig {
    /// Longest ancestor chain the module rebaser will walk before reporting a
    /// broken scope tree.
    #[serde(default = "default_max_hierarchy_depth")]
    pub max_hierarchy_depth: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_hierarchy_depth: default_max_hierarchy_depth(),
        }
    }
}

fn default_view_prefix() -> String {
    DEFAULT_VIEW_PREFIX.to_string()
}

fn default_max_hierarchy_depth() -> usize {
    DEFAULT_MAX_HIERARCHY_DEPTH
}
