//! Context rebasing for elaborated module hierarchies.
//!
//! A prototype module is elaborated once and then referenced from any number
//! of enclosing scopes. Reading a member through a hierarchy handle situates
//! it in the handle's scope: modules become proxies under the right parent,
//! hardware values become cross-module references owned by those proxies,
//! and views are rebuilt over their rebased targets. Results are memoized per
//! handle, so reading the same member twice yields the same value.
//!
//! # Usage
//!
//! ```ignore
//! let config = RebaseConfig::default();
//! let mut inst = Instance::instantiate(&mut tree, &Definition::new(leaf), top, "u0")?;
//! let mut rb = Rebaser::new(&mut tree, &config);
//! let out = inst.get(&mut rb, "out")?;
//! ```

#![warn(missing_docs)]

pub mod cache;
pub mod context;
pub mod errors;
pub mod hierarchy;
pub mod lookup;
pub mod module;
pub mod value;
pub mod view;

pub use cache::RebaseCache;
pub use context::{LookupCx, Rebaser};
pub use errors::{RebaseError, RebaseResult};
pub use hierarchy::{Definition, DefinitionRoot, Hierarchy, Instance, InstanceRoot};
pub use lookup::{Lookupable, Resolved};
pub use module::Underlying;
