//! Model-level properties checked through the public API and the writers.

use hdlgen_conformance::{verilog, vhdl};
use hdlgen_ir::{DataType, EntityManager, Expr, NameTemplates, NetDecl, RtlError, Scope};
use hdlgen_writer::ExprRender;

#[test]
fn data_type_equality_is_structural() {
    assert_eq!(DataType::BitVector(4), DataType::bitvector(4));
    assert_ne!(DataType::bitvector(4), DataType::signed_bitvector(4));
    assert_ne!(DataType::bitvector(4), DataType::bitvector(5));
    assert_ne!(
        DataType::array(DataType::Bit, 10),
        DataType::array(DataType::bitvector(1), 10)
    );
    assert_eq!(
        DataType::array(DataType::bitvector(8), 4),
        DataType::array(DataType::bitvector(8), 4)
    );
    assert_eq!(
        DataType::record([("a", DataType::Bit), ("b", DataType::bitvector(2))]),
        DataType::record([("a", DataType::Bit), ("b", DataType::bitvector(2))])
    );
    assert_ne!(
        DataType::record([("a", DataType::Bit)]),
        DataType::record([("b", DataType::Bit)])
    );
}

#[test]
fn greater_than_swaps_operands() {
    let mut mgr = EntityManager::new();
    let top = mgr.create_entity("cmp").unwrap();
    let e = mgr.entity_mut(top);
    let a = e.add_input_port(Some("a"), DataType::bitvector(4)).unwrap();
    let b = e.add_input_port(Some("b"), DataType::bitvector(4)).unwrap();

    assert_eq!(Expr::make_gt(a.clone(), &b), Expr::make_lt(b.clone(), &a));
    assert_eq!(Expr::make_ge(a.clone(), &b), Expr::make_le(b.clone(), &a));

    let e = mgr.entity(top);
    assert_eq!(a.greater(&b).verilog_str(e).unwrap(), "(b < a)");
    assert_eq!(a.greater_equal(&b).vhdl_str(e).unwrap(), "(b <= a)");
}

#[test]
fn extension_is_idempotent() {
    let mut mgr = EntityManager::new();
    let top = mgr.create_entity("ext").unwrap();
    let e = mgr.entity_mut(top);
    let x = e.add_input_port(Some("x"), DataType::bitvector(8)).unwrap();
    let s = e
        .add_input_port(Some("s"), DataType::signed_bitvector(4))
        .unwrap();

    assert_eq!(x.zero_extend(8).unwrap(), x);
    assert_eq!(s.sign_extend(4).unwrap(), s);

    let wide = x.zero_extend(12).unwrap();
    assert_eq!(wide.data_type().width(), Some(12));
    assert_eq!(wide.zero_extend(12).unwrap(), wide);

    let signed = s.sign_extend(8).unwrap();
    assert_eq!(signed.sign_extend(8).unwrap(), signed);
    assert!(matches!(
        x.zero_extend(4),
        Err(RtlError::StructuralViolation(_))
    ));
}

#[test]
fn anonymous_nets_named_in_creation_order() {
    let mut mgr = EntityManager::new();
    let top = mgr.create_entity("anon").unwrap();
    let e = mgr.entity_mut(top);
    let nets: Vec<Expr> = (0..4)
        .map(|_| e.add_net(NetDecl::new()).unwrap())
        .collect();

    let templates = NameTemplates::default();
    mgr.resolve_names(top, &templates).unwrap();
    let e = mgr.entity(top);
    let names: Vec<&str> = nets
        .iter()
        .map(|n| e.leaf_name(n.as_leaf().unwrap()).unwrap())
        .collect();
    assert_eq!(names, vec!["net1", "net2", "net3", "net4"]);

    assert_eq!(mgr.entity_mut(top).resolve_names(&templates).unwrap(), 0);
    let e = mgr.entity(top);
    assert_eq!(e.leaf_name(nets[3].as_leaf().unwrap()), Some("net4"));
}

#[test]
fn anonymous_names_skip_taken_ones() {
    let mut mgr = EntityManager::new();
    let top = mgr.create_entity("skip").unwrap();
    let e = mgr.entity_mut(top);
    e.add_net(NetDecl::named("net1")).unwrap();
    let anon = e.add_net(NetDecl::new()).unwrap();

    mgr.resolve_names(top, &NameTemplates::default()).unwrap();
    let e = mgr.entity(top);
    assert_eq!(e.leaf_name(anon.as_leaf().unwrap()), Some("net2"));
}

#[test]
fn block_local_names_do_not_shadow_entity_names() {
    let mut mgr = EntityManager::new();
    let top = mgr.create_entity("shadow").unwrap();
    let e = mgr.entity_mut(top);
    let a = e.add_input_port(Some("a"), DataType::Bit).unwrap();
    let outer = e.add_net(NetDecl::new().reg()).unwrap();
    let block = e.add_block(Some("work"), Scope::Entity).unwrap();
    let inner = e.add_net(NetDecl::new().in_block(block).reg()).unwrap();
    let p = e.add_comb_process(Some("proc")).unwrap();
    let body = e
        .process_mut(p)
        .unwrap()
        .body_mut()
        .add_scoped_block(block);
    body.add_assign(inner.clone(), a, true);
    body.add_assign(outer, inner, true);

    let v = verilog(&mut mgr, top);
    assert!(v.contains("  reg net1;\n"), "{v}");
    assert!(
        v.contains("begin: work\n      reg net2;\n      net2 = a;\n      net1 = net2;\n"),
        "{v}"
    );

    let h = vhdl(&mut mgr, top);
    assert!(h.contains("  signal net1 : std_logic;\n"), "{h}");
    assert!(
        h.contains("    variable net2 : std_logic;\n  begin\n    net2 := a;\n    net1 <= net2;\n"),
        "{h}"
    );
}

#[test]
fn rendering_does_not_rename() {
    let mut mgr = EntityManager::new();
    let top = mgr.create_entity("stable").unwrap();
    let e = mgr.entity_mut(top);
    let a = e.add_input_port(None, DataType::Bit).unwrap();
    let n = e.add_net(NetDecl::new()).unwrap();
    e.connect(&n, !&a).unwrap();
    e.add_output_port(None, DataType::Bit, Some(n)).unwrap();

    let first = verilog(&mut mgr, top);
    let second = verilog(&mut mgr, top);
    assert_eq!(first, second);
    assert!(first.contains("assign net1 = ~port1;"));
    assert!(first.contains("assign port2 = net1;"));
}

#[test]
fn name_collision_leaves_table_unchanged() {
    let mut mgr = EntityManager::new();
    let top = mgr.create_entity("clash").unwrap();
    let e = mgr.entity_mut(top);
    e.add_input_port(Some("a"), DataType::Bit).unwrap();
    let before_names = e.names().len();
    let before_nets = e.nets().count();

    let err = e.add_net(NetDecl::named("a")).unwrap_err();
    assert!(matches!(err, RtlError::NameCollision { ref name, .. } if name == "a"));
    assert!(matches!(
        e.add_output_port(Some("a"), DataType::Bit, None),
        Err(RtlError::NameCollision { .. })
    ));
    assert_eq!(e.names().len(), before_names);
    assert_eq!(e.nets().count(), before_nets);
    assert_eq!(e.port_count(), 1);
}

#[test]
fn lut_renders_every_row_and_one_default() {
    let mut mgr = EntityManager::new();
    let top = mgr.create_entity("table").unwrap();
    let e = mgr.entity_mut(top);
    let lut = e
        .add_lut(Some("rom"), None, Some(3), DataType::bitvector(3))
        .unwrap();
    let table = e.lut_mut(lut).unwrap();
    for i in 0..8u32 {
        table.add_data(i, 7 - i).unwrap();
    }

    let v = verilog(&mut mgr, top);
    assert_eq!(v.matches("net2 <= 3'b").count(), 8);
    assert_eq!(v.matches("default:").count(), 1);

    let h = vhdl(&mut mgr, top);
    assert_eq!(h.matches("=> net2 <= \"").count(), 8);
    assert_eq!(h.matches("when others").count(), 1);
}
