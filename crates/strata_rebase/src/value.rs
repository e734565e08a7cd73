//! Hardware value and memory rebasing.
//!
//! [`Rebaser::rebase_value`] moves one root value into a destination by
//! rebasing its owning module. [`Rebaser::lookup_data`] is what handles call:
//! it consults the port identity map and the cache, routes views to the view
//! rebaser, and for fields rebases only the structural root and then
//! re-selects the same path on the result.

use crate::context::{LookupCx, Rebaser};
use crate::errors::{RebaseError, RebaseResult};
use crate::module::Underlying;
use strata_common::{InternalError, StrataResult};
use strata_ir::{Binding, MemoryId, ModuleId, ValueId};

impl Rebaser<'_> {
    /// Rebases a root value against `destination`.
    ///
    /// Values with no owning module are returned unchanged, as are values
    /// whose module needs no proxy. Otherwise the result is a new value of
    /// the same type and reference, bound as a cross-module reference under
    /// the proxy. No caching happens here; see [`lookup_data`](Self::lookup_data).
    pub fn rebase_value(&mut self, value: ValueId, destination: ModuleId) -> StrataResult<ValueId> {
        let Some(parent) = self.tree.value(value).parent else {
            return Ok(value);
        };
        match self.rebase_module(Underlying::Proto(parent), destination)? {
            Underlying::Proto(module) if module == parent => Ok(value),
            Underlying::Proto(module) => Err(InternalError::new(format!(
                "{value} of {parent} rebased in place onto unrelated {module}"
            ))),
            Underlying::Clone(proxy) => {
                let original = self.tree.value(value);
                let (ty, name, reference) = (original.ty, original.name, original.reference);
                let copy = self.tree.alloc_value(ty);
                if let Some(reference) = reference {
                    self.tree.set_reference(copy, reference)?;
                }
                self.tree.set_name(copy, name);
                self.tree.bind(copy, Binding::CrossModule, Some(proxy))?;
                log::debug!("rebased {value} into {destination} as {copy} under {proxy}");
                Ok(copy)
            }
        }
    }

    /// Rebases a memory against `destination`, keeping its shape and
    /// reference.
    pub fn rebase_memory(
        &mut self,
        memory: MemoryId,
        destination: ModuleId,
    ) -> StrataResult<MemoryId> {
        let Some(parent) = self.tree.memory(memory).parent else {
            return Ok(memory);
        };
        match self.rebase_module(Underlying::Proto(parent), destination)? {
            Underlying::Proto(_) => Ok(memory),
            Underlying::Clone(proxy) => {
                let copy = self.tree.clone_memory(memory, proxy);
                log::debug!("rebased {memory} into {destination} as {copy} under {proxy}");
                Ok(copy)
            }
        }
    }

    /// Looks up a hardware value through a handle.
    pub fn lookup_data(&mut self, cx: &mut LookupCx<'_>, value: ValueId) -> RebaseResult<ValueId> {
        match self.tree.top_binding(value) {
            None => return Ok(value),
            Some(binding) if binding.is_view() => return self.lookup_view(cx, value),
            Some(_) => {}
        }
        let (path, root) = self.tree.unroll(value)?;
        let mapped = self.lookup_root(cx, root)?;
        Ok(self.tree.select_path(mapped, &path)?)
    }

    fn lookup_root(&mut self, cx: &mut LookupCx<'_>, root: ValueId) -> RebaseResult<ValueId> {
        let ported = cx
            .io_module
            .and_then(|m| self.tree.module(m).io_map())
            .and_then(|io_map| io_map.get(&root).copied());
        if let Some(port) = ported {
            log::trace!("{root} is identity-mapped to port {port}");
            return Ok(port);
        }
        if let Some(hit) = cx.cache.value(root) {
            log::trace!("cache hit for {root}");
            return Ok(hit);
        }
        if self.tree.value(root).parent.is_none() {
            return Ok(root);
        }
        let context = cx.context.ok_or_else(|| RebaseError::MissingContext {
            what: format!("hardware value {root}"),
        })?;
        let rebased = self.rebase_value(root, context)?;
        cx.cache.insert_value(root, rebased);
        Ok(rebased)
    }

    /// Looks up a memory through a handle.
    pub fn lookup_memory(
        &mut self,
        cx: &mut LookupCx<'_>,
        memory: MemoryId,
    ) -> RebaseResult<MemoryId> {
        if let Some(hit) = cx.cache.memory(memory) {
            log::trace!("cache hit for {memory}");
            return Ok(hit);
        }
        let context = cx.context.ok_or_else(|| RebaseError::MissingContext {
            what: format!("memory {memory}"),
        })?;
        let rebased = self.rebase_memory(memory, context)?;
        cx.cache.insert_memory(memory, rebased);
        Ok(rebased)
    }
}
