//! View rebasing.
//!
//! A view owns no storage: it maps onto one target (a simple view) or maps
//! its fields onto several (an aggregate view). Rebasing a view looks up
//! each target through the same handle and binds a new view with the same
//! shape over the results.

use crate::context::{LookupCx, Rebaser};
use crate::errors::RebaseResult;
use indexmap::IndexMap;
use std::collections::HashSet;
use strata_common::{InternalError, StrataResult};
use strata_ir::{
    AggregateViewBinding, Binding, Ref, Selector, ValueId, ViewBinding, ViewEntry, Writability,
};

impl Rebaser<'_> {
    /// Looks up a view, or a field of one, through a handle.
    ///
    /// Results are memoized per handle. A view whose targets all stay in
    /// place is returned as is.
    pub fn lookup_view(&mut self, cx: &mut LookupCx<'_>, view: ValueId) -> RebaseResult<ValueId> {
        if let Some(hit) = cx.cache.value(view) {
            log::trace!("cache hit for view {view}");
            return Ok(hit);
        }
        let rebased = self.rebase_view(cx, view)?;
        cx.cache.insert_value(view, rebased);
        Ok(rebased)
    }

    /// Rebases a view against the handle's destination.
    pub fn rebase_view(&mut self, cx: &mut LookupCx<'_>, view: ValueId) -> RebaseResult<ValueId> {
        let ty = self.tree.value(view).ty;
        let (_, root) = self.tree.unroll(view)?;
        let entries = match &self.tree.value(root).binding {
            Some(Binding::AggregateView(avb)) if self.tree.types.is_aggregate(ty) => {
                avb.entries.clone()
            }
            _ => return self.rebase_simple_view(cx, view),
        };

        // Originally-mapped nodes of the view's field tree, by pre-order position.
        let original_nodes = self.tree.subtree(view);
        let mut mapped = Vec::new();
        let mut changed = false;
        for (position, node) in original_nodes.iter().enumerate() {
            let mapping = if position == 0 {
                self.view_target(*node)?
            } else {
                entries.get(node).map(|e| (e.target, e.writability))
            };
            let Some((target, writability)) = mapping else {
                continue;
            };
            let (reified, combined) = self.reify(target, writability)?;
            let new_target = self.lookup_data(cx, reified)?;
            changed |= new_target != reified;
            mapped.push((position, new_target, combined));
        }
        if mapped.is_empty() && root != view {
            return self.follow_enclosing_view(cx, view);
        }
        if !changed {
            return Ok(view);
        }

        let new_view = self.tree.alloc_value(ty);
        let new_nodes = self.tree.subtree(new_view);
        if new_nodes.len() != original_nodes.len() {
            return Err(InternalError::new(format!(
                "field tree of {new_view} is not congruent with view {view}"
            ))
            .into());
        }
        let mut new_entries = IndexMap::with_capacity(mapped.len());
        for (position, target, writability) in mapped {
            new_entries.insert(
                new_nodes[position],
                ViewEntry {
                    target,
                    writability,
                },
            );
        }

        let mut covered = HashSet::new();
        for node in &new_nodes {
            let parent_covered = self
                .tree
                .value(*node)
                .child_of()
                .is_some_and(|p| covered.contains(&p));
            if parent_covered || new_entries.contains_key(node) {
                covered.insert(*node);
            } else if *node != new_view {
                self.tree.mark_unnamed(*node);
            }
        }

        self.tree.bind(
            new_view,
            Binding::AggregateView(AggregateViewBinding {
                entries: new_entries,
            }),
            None,
        )?;
        self.name_view(new_view)?;
        log::debug!("rebased aggregate view {view} as {new_view}");
        Ok(new_view)
    }

    fn rebase_simple_view(
        &mut self,
        cx: &mut LookupCx<'_>,
        view: ValueId,
    ) -> RebaseResult<ValueId> {
        let ty = self.tree.value(view).ty;
        let Some((target, writability)) = self.view_target(view)? else {
            return self.follow_enclosing_view(cx, view);
        };
        let (reified, combined) = self.reify(target, writability)?;
        let new_target = self.lookup_data(cx, reified)?;
        if new_target == reified {
            return Ok(view);
        }
        let new_view = self.tree.alloc_value(ty);
        self.tree.bind(
            new_view,
            Binding::View(ViewBinding {
                target: new_target,
                writability: combined,
            }),
            None,
        )?;
        self.name_view(new_view)?;
        log::debug!("rebased view {view} as {new_view} over {new_target}");
        Ok(new_view)
    }

    /// Resolves an unmapped view field to the same field of its rebased
    /// enclosing view.
    fn follow_enclosing_view(
        &mut self,
        cx: &mut LookupCx<'_>,
        field: ValueId,
    ) -> RebaseResult<ValueId> {
        let (path, root) = self.tree.unroll(field)?;
        if root == field {
            return Ok(field);
        }
        let rebased_root = self.lookup_view(cx, root)?;
        if rebased_root == root {
            return Ok(field);
        }
        Ok(self.tree.select_path(rebased_root, &path)?)
    }

    /// Finds the value providing storage for a view or view field, with its
    /// access policy. `None` for an unmapped aggregate-view field.
    pub fn view_target(&self, value: ValueId) -> StrataResult<Option<(ValueId, Writability)>> {
        let (path, root) = self.tree.unroll(value)?;
        match &self.tree.value(root).binding {
            Some(Binding::View(vb)) => {
                let target = self.tree.select_path(vb.target, &path)?;
                Ok(Some((target, vb.writability)))
            }
            Some(Binding::AggregateView(avb)) => {
                let mut remaining: Vec<Selector> = Vec::new();
                let mut current = value;
                loop {
                    if let Some(entry) = avb.entries.get(&current) {
                        remaining.reverse();
                        let target = self.tree.select_path(entry.target, &remaining)?;
                        return Ok(Some((target, entry.writability)));
                    }
                    let node = self.tree.value(current);
                    let Some(parent) = node.child_of() else {
                        return Ok(None);
                    };
                    let selector = node.reference.and_then(|r| r.selector()).ok_or_else(|| {
                        InternalError::new(format!("view field {current} has no selector"))
                    })?;
                    remaining.push(selector);
                    current = parent;
                }
            }
            other => Err(InternalError::new(format!(
                "{value} is not a view (root binding {other:?})"
            ))),
        }
    }

    /// Follows views of views down to a value with storage, keeping the
    /// stricter access policy along the way.
    fn reify(
        &self,
        target: ValueId,
        writability: Writability,
    ) -> StrataResult<(ValueId, Writability)> {
        let max_depth = self.config.limits.max_hierarchy_depth;
        let (mut target, mut writability) = (target, writability);
        for _ in 0..max_depth {
            if !self.tree.top_binding(target).is_some_and(Binding::is_view) {
                return Ok((target, writability));
            }
            match self.view_target(target)? {
                Some((next, policy)) => {
                    target = next;
                    writability = writability.combine(policy);
                }
                None => return Ok((target, writability)),
            }
        }
        Err(InternalError::new(format!(
            "view chain through {target} exceeds {max_depth} levels"
        )))
    }

    fn name_view(&mut self, view: ValueId) -> StrataResult<()> {
        let name = self.tree.fresh_view_name(&self.config.naming.view_prefix);
        self.tree.set_reference(view, Ref::Node(name))?;
        self.tree.set_name(view, Some(name));
        Ok(())
    }
}
