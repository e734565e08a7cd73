//! End-to-end lookups through definitions and instances.

use strata_config::{load_config_from_str, RebaseConfig};
use strata_ir::{
    Binding, Either, Member, MemoryKind, ModuleId, ModuleKind, PortDirection, ScopeTree, Selector,
    Target, Type, TypeId, ValueId, Writability,
};
use strata_rebase::{
    Definition, Hierarchy, Instance, InstanceRoot, RebaseError, Rebaser, Resolved, Underlying,
};

fn byte(tree: &mut ScopeTree) -> TypeId {
    tree.intern_type(Type::BitVec {
        width: 8,
        signed: false,
    })
}

/// `Leaf` is a global root with one output port `out` and an internal wire.
fn leaf_design(tree: &mut ScopeTree) -> (ModuleId, ValueId, ValueId) {
    let ty = byte(tree);
    let leaf = tree.add_module("Leaf", None);
    let out = tree.add_port(leaf, "out", PortDirection::Output, ty).unwrap();
    let state = tree.add_wire(leaf, "state", ty).unwrap();
    (leaf, out, state)
}

/// `Mid` elaborates a `Leaf` in place as its prototype child `leaf`.
fn mid_design(tree: &mut ScopeTree) -> (ModuleId, ModuleId, ValueId) {
    let ty = byte(tree);
    let mid = tree.add_module("Mid", None);
    let leaf = tree.add_module("leaf", Some(mid));
    let out = tree.add_port(leaf, "out", PortDirection::Output, ty).unwrap();
    (mid, leaf, out)
}

#[test]
fn leaf_out_through_two_instances() {
    let mut tree = ScopeTree::new();
    let (leaf, out, _) = leaf_design(&mut tree);
    let top = tree.add_module("Top", None);
    let def = Definition::new(leaf);
    let mut u0 = Instance::instantiate(&mut tree, &def, top, "u0").unwrap();
    let mut u1 = Instance::instantiate(&mut tree, &def, top, "u1").unwrap();
    let config = RebaseConfig::default();
    let mut rb = Rebaser::new(&mut tree, &config);

    let a = u0.lookup(&mut rb, out).unwrap();
    let b = u1.lookup(&mut rb, out).unwrap();
    assert_ne!(a, b);
    assert_eq!(u0.lookup(&mut rb, out).unwrap(), a);
    assert_eq!(u1.get(&mut rb, "out").unwrap(), Resolved::Hardware(b));
    assert_eq!(def.lookup(&mut rb, out).unwrap(), out);
}

#[test]
fn ports_of_direct_instantiation_are_identity_mapped() {
    let mut tree = ScopeTree::new();
    let (leaf, out, _) = leaf_design(&mut tree);
    let top = tree.add_module("Top", None);
    let mut u0 = Instance::instantiate(&mut tree, &Definition::new(leaf), top, "u0").unwrap();
    let InstanceRoot::Module(Underlying::Clone(clone)) = u0.underlying().clone() else {
        panic!("instantiation should yield a clone");
    };
    let config = RebaseConfig::default();
    let mut rb = Rebaser::new(&mut tree, &config);

    let mapped = u0.lookup(&mut rb, out).unwrap();
    let expected = rb.tree().module(clone).io_map().unwrap()[&out];
    assert_eq!(mapped, expected);
    assert_eq!(
        rb.tree().value(mapped).binding,
        Some(Binding::Port(PortDirection::Output))
    );
}

#[test]
fn internal_wire_becomes_cross_module_reference() {
    let mut tree = ScopeTree::new();
    let (leaf, _, state) = leaf_design(&mut tree);
    let top = tree.add_module("Top", None);
    let mut u0 = Instance::instantiate(&mut tree, &Definition::new(leaf), top, "u0").unwrap();
    let config = RebaseConfig::default();
    let mut rb = Rebaser::new(&mut tree, &config);

    let rebased = u0.get(&mut rb, "state").unwrap().as_hardware().unwrap();
    let value = rb.tree().value(rebased);
    assert_eq!(value.binding, Some(Binding::CrossModule));
    let owner = value.parent.unwrap();
    assert!(rb.tree().module(owner).is_proxy());
    assert_eq!(rb.tree().proto_of(owner).unwrap(), leaf);
}

#[test]
fn mid_child_rebases_under_proxy_of_mid() {
    let mut tree = ScopeTree::new();
    let (mid, leaf, out) = mid_design(&mut tree);
    let top = tree.add_module("Top", None);
    let mut m0 = Instance::instantiate(&mut tree, &Definition::new(mid), top, "m0").unwrap();
    let m0_module = m0.underlying().inner_context().unwrap();
    let config = RebaseConfig::default();
    let mut rb = Rebaser::new(&mut tree, &config);

    let rebased = m0.lookup(&mut rb, out).unwrap();
    let owner = rb.tree().value(rebased).parent.unwrap();
    assert_ne!(owner, leaf);
    assert_ne!(owner, m0_module);
    assert_eq!(rb.tree().module(owner).kind, ModuleKind::InstanceClone { proto: leaf });
    assert_eq!(rb.tree().module(owner).parent, Some(m0_module));

    let mut child = m0.get(&mut rb, "leaf").unwrap().into_instance().unwrap();
    let InstanceRoot::Module(Underlying::Clone(proxy)) = child.underlying().clone() else {
        panic!("child of a rebased module should be a proxy");
    };
    assert_eq!(rb.tree().module(proxy).parent, Some(m0_module));
    let through_child = child.get(&mut rb, "out").unwrap().as_hardware().unwrap();
    assert_eq!(rb.tree().value(through_child).parent, Some(proxy));
}

#[test]
fn rebase_onto_own_root_is_noop() {
    let mut tree = ScopeTree::new();
    let (mid, leaf, out) = mid_design(&mut tree);
    let config = RebaseConfig::default();
    let mut rb = Rebaser::new(&mut tree, &config);
    for m in [mid, leaf] {
        assert_eq!(
            rb.rebase_module(Underlying::Proto(m), m).unwrap(),
            Underlying::Proto(m)
        );
    }
    let mut inst = Instance::of_definition(&Definition::new(mid));
    assert_eq!(inst.lookup(&mut rb, out).unwrap(), out);
    assert!(inst.get(&mut rb, "leaf").unwrap().into_instance().is_some_and(|i| {
        i.underlying() == &InstanceRoot::Module(Underlying::Proto(leaf))
    }));
}

#[test]
fn rebase_commutes_with_selection() {
    let mut tree = ScopeTree::new();
    let b = byte(&mut tree);
    let (lo, hi, rec) = (tree.intern("lo"), tree.intern("hi"), tree.intern("Word"));
    let word = tree.intern_type(Type::Record {
        name: rec,
        fields: vec![(lo, b), (hi, b)],
    });
    let bank = tree.intern_type(Type::Array {
        element: word,
        size: 4,
    });
    let mid = tree.add_module("Mid", None);
    let leaf = tree.add_module("leaf", Some(mid));
    let regs = tree.add_reg(leaf, "regs", bank).unwrap();
    let path = [Selector::Index(2), Selector::Field(hi)];
    let leaf_value = tree.select_path(regs, &path).unwrap();
    let top = tree.add_module("Top", None);
    let mut m0 = Instance::instantiate(&mut tree, &Definition::new(mid), top, "m0").unwrap();
    let config = RebaseConfig::default();
    let mut rb = Rebaser::new(&mut tree, &config);

    // Field first, then the whole register.
    let rebased_leaf = m0.lookup(&mut rb, leaf_value).unwrap();
    let rebased_root = m0.lookup(&mut rb, regs).unwrap();
    assert_eq!(rb.tree().select_path(rebased_root, &path).unwrap(), rebased_leaf);
    let (unrolled, root) = rb.tree().unroll(rebased_leaf).unwrap();
    assert_eq!(root, rebased_root);
    assert_eq!(unrolled, path);
}

#[test]
fn sibling_lookup_order_does_not_matter() {
    let mut tree = ScopeTree::new();
    let b = byte(&mut tree);
    let (x, y, rec) = (tree.intern("x"), tree.intern("y"), tree.intern("Pt"));
    let pt = tree.intern_type(Type::Record {
        name: rec,
        fields: vec![(x, b), (y, b)],
    });
    let mid = tree.add_module("Mid", None);
    let leaf = tree.add_module("leaf", Some(mid));
    let p = tree.add_wire(leaf, "p", pt).unwrap();
    let px = tree.select(p, &Selector::Field(x)).unwrap();
    let py = tree.select(p, &Selector::Field(y)).unwrap();
    let top = tree.add_module("Top", None);
    let mut m0 = Instance::instantiate(&mut tree, &Definition::new(mid), top, "m0").unwrap();
    let config = RebaseConfig::default();
    let mut rb = Rebaser::new(&mut tree, &config);

    let ry = m0.lookup(&mut rb, py).unwrap();
    let rx = m0.lookup(&mut rb, px).unwrap();
    let root = m0.lookup(&mut rb, p).unwrap();
    assert_eq!(rb.tree().select(root, &Selector::Field(x)).unwrap(), rx);
    assert_eq!(rb.tree().select(root, &Selector::Field(y)).unwrap(), ry);
}

#[test]
fn proxies_differ_across_contexts() {
    let mut tree = ScopeTree::new();
    let (mid, leaf, out) = mid_design(&mut tree);
    let top = tree.add_module("Top", None);
    let def = Definition::new(mid);
    let mut m0 = Instance::instantiate(&mut tree, &def, top, "m0").unwrap();
    let mut m1 = Instance::instantiate(&mut tree, &def, top, "m1").unwrap();
    let config = RebaseConfig::default();
    let mut rb = Rebaser::new(&mut tree, &config);

    let a = m0.lookup(&mut rb, out).unwrap();
    let b = m1.lookup(&mut rb, out).unwrap();
    let pa = rb.tree().value(a).parent.unwrap();
    let pb = rb.tree().value(b).parent.unwrap();
    assert_ne!(pa, pb);
    assert!(rb.tree().has_same_proto(pa, pb).unwrap());
    assert_eq!(rb.tree().proto_of(pa).unwrap(), leaf);
}

#[test]
fn containers_preserve_shape_and_case() {
    let mut tree = ScopeTree::new();
    let (leaf, out, state) = leaf_design(&mut tree);
    tree.set_member(
        leaf,
        "taps",
        Member::List(vec![Member::Hardware(state), Member::Hardware(out)]),
    );
    tree.set_member(leaf, "spare", Member::Optional(None));
    tree.set_member(
        leaf,
        "sel",
        Member::Either(Either::Right(Box::new(Member::Hardware(state)))),
    );
    let top = tree.add_module("Top", None);
    let mut u0 = Instance::instantiate(&mut tree, &Definition::new(leaf), top, "u0").unwrap();
    let config = RebaseConfig::default();
    let mut rb = Rebaser::new(&mut tree, &config);

    let Resolved::List(taps) = u0.get(&mut rb, "taps").unwrap() else {
        panic!("expected a list");
    };
    assert_eq!(taps.len(), 2);
    let rebased_state = u0.lookup(&mut rb, state).unwrap();
    let rebased_out = u0.lookup(&mut rb, out).unwrap();
    assert_eq!(taps[0], Resolved::Hardware(rebased_state));
    assert_eq!(taps[1], Resolved::Hardware(rebased_out));

    assert_eq!(
        u0.get(&mut rb, "spare").unwrap(),
        Resolved::Optional(None)
    );
    assert_eq!(
        u0.get(&mut rb, "sel").unwrap(),
        Resolved::Either(Either::Right(Box::new(Resolved::Hardware(rebased_state))))
    );

    let typed: (Vec<ValueId>, Option<ValueId>) =
        u0.lookup(&mut rb, (vec![state, out], Some(out))).unwrap();
    assert_eq!(typed.0, vec![rebased_state, rebased_out]);
    assert_eq!(typed.1, Some(rebased_out));
}

#[test]
fn aggregate_view_over_two_signals() {
    let mut tree = ScopeTree::new();
    let b = byte(&mut tree);
    let (fa, fb, rec) = (tree.intern("a"), tree.intern("b"), tree.intern("AB"));
    let ab = tree.intern_type(Type::Record {
        name: rec,
        fields: vec![(fa, b), (fb, b)],
    });
    let mid = tree.add_module("Mid", None);
    let leaf = tree.add_module("leaf", Some(mid));
    let a = tree.add_wire(leaf, "a", b).unwrap();
    let bw = tree.add_wire(leaf, "b", b).unwrap();
    let view = tree
        .add_aggregate_view(
            "ab",
            ab,
            &[
                (vec![Selector::Field(fa)], a, Writability::ReadWrite),
                (vec![Selector::Field(fb)], bw, Writability::ReadOnly),
            ],
        )
        .unwrap();
    tree.set_member(leaf, "ab", Member::Hardware(view));
    let top = tree.add_module("Top", None);
    let mut m0 = Instance::instantiate(&mut tree, &Definition::new(mid), top, "m0").unwrap();
    let config = RebaseConfig::default();
    let mut rb = Rebaser::new(&mut tree, &config);

    let rebased_a = m0.lookup(&mut rb, a).unwrap();
    let rebased_b = m0.lookup(&mut rb, bw).unwrap();
    let rebased_view = m0.lookup(&mut rb, view).unwrap();
    assert_ne!(rebased_view, view);
    assert_eq!(m0.lookup(&mut rb, view).unwrap(), rebased_view);

    let tree = rb.tree();
    let Some(Binding::AggregateView(avb)) = &tree.value(rebased_view).binding else {
        panic!("expected an aggregate view");
    };
    let new_a = tree.select(rebased_view, &Selector::Field(fa)).unwrap();
    let new_b = tree.select(rebased_view, &Selector::Field(fb)).unwrap();
    assert_eq!(avb.entries.len(), 2);
    assert_eq!(avb.entries[&new_a].target, rebased_a);
    assert_eq!(avb.entries[&new_a].writability, Writability::ReadWrite);
    assert_eq!(avb.entries[&new_b].target, rebased_b);
    assert_eq!(avb.entries[&new_b].writability, Writability::ReadOnly);
    assert_eq!(tree.value(rebased_view).parent, None);
    assert_eq!(tree.unnamed_views().count(), 0);
}

#[test]
fn unmapped_view_field_is_stable_across_lookups() {
    let mut tree = ScopeTree::new();
    let b = byte(&mut tree);
    let (fa, fb, rec) = (tree.intern("a"), tree.intern("b"), tree.intern("AB"));
    let ab = tree.intern_type(Type::Record {
        name: rec,
        fields: vec![(fa, b), (fb, b)],
    });
    let mid = tree.add_module("Mid", None);
    let leaf = tree.add_module("leaf", Some(mid));
    let a = tree.add_wire(leaf, "a", b).unwrap();
    let view = tree
        .add_aggregate_view(
            "only_a",
            ab,
            &[(vec![Selector::Field(fa)], a, Writability::ReadWrite)],
        )
        .unwrap();
    let field_b = tree.select(view, &Selector::Field(fb)).unwrap();
    let top = tree.add_module("Top", None);
    let mut m0 = Instance::instantiate(&mut tree, &Definition::new(mid), top, "m0").unwrap();
    let config = RebaseConfig::default();
    let mut rb = Rebaser::new(&mut tree, &config);

    // Nothing relocates through the leaf's own definition.
    let def = Definition::new(leaf);
    let first = def.lookup(&mut rb, field_b).unwrap();
    let second = def.lookup(&mut rb, field_b).unwrap();
    assert_eq!(first, field_b);
    assert_eq!(second, field_b);
    let mut in_place = Instance::of_definition(&def);
    assert_eq!(in_place.lookup(&mut rb, field_b).unwrap(), field_b);
    assert_eq!(rb.tree().unnamed_views().count(), 0);

    // Through m0 the field follows the rebased view.
    let rebased_b = m0.lookup(&mut rb, field_b).unwrap();
    assert_eq!(m0.lookup(&mut rb, field_b).unwrap(), rebased_b);
    let rebased_view = m0.lookup(&mut rb, view).unwrap();
    assert_ne!(rebased_view, view);
    assert_eq!(
        rb.tree().select(rebased_view, &Selector::Field(fb)).unwrap(),
        rebased_b
    );
    assert!(rb.tree().is_unnamed(rebased_b));
}

#[test]
fn rebased_views_use_configured_prefix() {
    let mut tree = ScopeTree::new();
    let b = byte(&mut tree);
    let mid = tree.add_module("Mid", None);
    let leaf = tree.add_module("leaf", Some(mid));
    let a = tree.add_wire(leaf, "a", b).unwrap();
    let first = tree.add_view("first", a, Writability::ReadWrite).unwrap();
    let second = tree.add_view("second", a, Writability::ReadOnly).unwrap();
    let top = tree.add_module("Top", None);
    let mut m0 = Instance::instantiate(&mut tree, &Definition::new(mid), top, "m0").unwrap();
    let config = load_config_from_str("[naming]\nview_prefix = \"alias\"\n").unwrap();
    let mut rb = Rebaser::new(&mut tree, &config);

    let r1 = m0.lookup(&mut rb, first).unwrap();
    let r2 = m0.lookup(&mut rb, second).unwrap();
    let tree = rb.tree();
    let names: Vec<&str> = [r1, r2]
        .iter()
        .map(|v| tree.resolve(tree.value(*v).name.unwrap()))
        .collect();
    assert_eq!(names, vec!["alias", "alias_1"]);
}

#[test]
fn memories_and_targets_are_rebased_and_cached() {
    let mut tree = ScopeTree::new();
    let (mid, leaf, _) = mid_design(&mut tree);
    let word = byte(&mut tree);
    let ram = tree.add_memory(leaf, "ram", word, 256, MemoryKind::SyncRead);
    tree.set_member(leaf, "sram", Member::Target(Target::Sram(ram)));
    let top = tree.add_module("Top", None);
    let mut m0 = Instance::instantiate(&mut tree, &Definition::new(mid), top, "m0").unwrap();
    let config = RebaseConfig::default();
    let mut rb = Rebaser::new(&mut tree, &config);

    let rebased = m0.lookup(&mut rb, ram).unwrap();
    assert_ne!(rebased, ram);
    assert_eq!(m0.lookup(&mut rb, ram).unwrap(), rebased);
    assert_eq!(m0.lookup(&mut rb, Target::Sram(ram)).unwrap(), Target::Sram(rebased));
    assert_eq!(rb.tree().memory(rebased).depth, 256);

    let mut child = m0.get(&mut rb, "leaf").unwrap().into_instance().unwrap();
    let through_child = child.get(&mut rb, "ram").unwrap().as_memory().unwrap();
    assert_ne!(through_child, ram);
    assert_eq!(
        child.get(&mut rb, "sram").unwrap(),
        Resolved::Target(Target::Sram(through_child))
    );
}

#[test]
fn instantiable_handles_recover_context() {
    let mut tree = ScopeTree::new();
    let (leaf, out, state) = leaf_design(&mut tree);
    let bundle = tree.add_instantiable("Bundle");
    tree.set_instantiable_member(bundle, "state", Member::Hardware(state));
    tree.set_member(leaf, "bundle", Member::Instantiable(bundle));
    let top = tree.add_module("Top", None);
    let mut u0 = Instance::instantiate(&mut tree, &Definition::new(leaf), top, "u0").unwrap();
    let config = RebaseConfig::default();
    let mut rb = Rebaser::new(&mut tree, &config);

    let direct = u0.lookup(&mut rb, state).unwrap();
    let mut nested = u0.get(&mut rb, "bundle").unwrap().into_instance().unwrap();
    let through_bundle = nested.get(&mut rb, "state").unwrap().as_hardware().unwrap();
    assert_ne!(through_bundle, state);
    assert_eq!(
        rb.tree().value(through_bundle).parent,
        rb.tree().value(direct).parent
    );
    assert_ne!(through_bundle, direct);
    // Ports stay identity-mapped through the back-reference.
    let port = nested.lookup(&mut rb, out).unwrap();
    assert_eq!(port, u0.lookup(&mut rb, out).unwrap());
}

#[test]
fn lookup_errors_are_reported() {
    let mut tree = ScopeTree::new();
    let (leaf, _, state) = leaf_design(&mut tree);
    tree.set_member(
        leaf,
        "probe",
        Member::Opaque {
            type_name: "DebugProbe".into(),
        },
    );
    let standalone = tree.add_instantiable("Loose");
    tree.set_instantiable_member(standalone, "state", Member::Hardware(state));
    let config = RebaseConfig::default();
    let mut rb = Rebaser::new(&mut tree, &config);

    let mut def = Hierarchy::from(Definition::new(leaf));
    assert_eq!(
        def.get(&mut rb, "probe").unwrap_err(),
        RebaseError::UnsupportedMember {
            name: "probe".into(),
            type_name: "DebugProbe".into(),
        }
    );
    assert_eq!(
        def.get(&mut rb, "nope").unwrap_err(),
        RebaseError::UnknownMember {
            name: "nope".into()
        }
    );

    let mut loose = Instance::of_definition(&Definition::of_instantiable(standalone));
    assert!(matches!(
        loose.get(&mut rb, "state"),
        Err(RebaseError::MissingContext { .. })
    ));
}

#[test]
fn shape_violations_are_internal_errors() {
    let mut tree = ScopeTree::new();
    let b = byte(&mut tree);
    let arr = tree.intern_type(Type::Array {
        element: b,
        size: 2,
    });
    let leaf = tree.add_module("Leaf", None);
    let w = tree.add_wire(leaf, "w", arr).unwrap();
    assert!(tree.select(w, &Selector::Index(2)).is_err());
    let missing = tree.intern("missing");
    assert!(tree.select(w, &Selector::Field(missing)).is_err());
    assert!(tree.bind(w, Binding::Reg, Some(leaf)).is_err());

    let err: RebaseError = tree.select(w, &Selector::Index(9)).unwrap_err().into();
    assert!(matches!(err, RebaseError::Internal(_)));
}
