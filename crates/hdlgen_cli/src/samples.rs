//! Built-in sample designs for `hdlgen gen`.
//!
//! Each sample builds a fresh [`EntityManager`] and returns it with the
//! entity to render from.

use hdlgen_ir::{
    DataType, DffDecl, EntityId, EntityManager, Expr, ItemId, NetDecl, Polarity, RtlError,
    RtlResult,
};

/// A named sample design.
pub struct Sample {
    /// Name used on the command line.
    pub name: &'static str,
    /// One-line description for `hdlgen list`.
    pub description: &'static str,
    build: fn() -> RtlResult<(EntityManager, EntityId)>,
}

impl Sample {
    /// Builds the design and returns it with its top entity.
    pub fn build(&self) -> RtlResult<(EntityManager, EntityId)> {
        (self.build)()
    }
}

/// Every built-in sample, in listing order.
pub const SAMPLES: &[Sample] = &[
    Sample {
        name: "dff",
        description: "8-bit register with active-low asynchronous reset and enable",
        build: dff,
    },
    Sample {
        name: "delay",
        description: "three-stage delay line",
        build: delay,
    },
    Sample {
        name: "mux",
        description: "8-bit 2:1 multiplexer",
        build: mux,
    },
    Sample {
        name: "alu",
        description: "combinational ALU selecting its operation with a case statement",
        build: alu,
    },
    Sample {
        name: "decoder",
        description: "2-to-4 one-hot decoder built from a lookup table",
        build: decoder,
    },
    Sample {
        name: "fsm",
        description: "linear state machine with four running states",
        build: fsm,
    },
    Sample {
        name: "chain",
        description: "two inverter instances wired in series",
        build: chain,
    },
];

/// Looks up a sample by name.
pub fn find(name: &str) -> Option<&'static Sample> {
    SAMPLES.iter().find(|s| s.name == name)
}

fn dff() -> RtlResult<(EntityManager, EntityId)> {
    let mut mgr = EntityManager::new();
    let top = mgr.create_entity("dff")?;
    let e = mgr.entity_mut(top);
    let clock = e.add_input_port(Some("clock"), DataType::Bit)?;
    let reset = e.add_input_port(Some("reset"), DataType::Bit)?;
    let enable = e.add_input_port(Some("enable"), DataType::Bit)?;
    let data_in = e.add_input_port(Some("data_in"), DataType::bitvector(8))?;
    let reg = e.add_dff(
        DffDecl::new()
            .data_in(data_in)
            .clock(clock, Polarity::Positive)
            .reset(reset, Polarity::Negative)
            .enable(enable, Polarity::Positive),
    )?;
    e.add_output_port(Some("data_out"), DataType::bitvector(8), Some(reg.q))?;
    Ok((mgr, top))
}

fn delay() -> RtlResult<(EntityManager, EntityId)> {
    let mut mgr = EntityManager::new();
    let top = mgr.create_entity("delay")?;
    let e = mgr.entity_mut(top);
    let clock = e.add_input_port(Some("clock"), DataType::Bit)?;
    let reset = e.add_input_port(Some("reset"), DataType::Bit)?;
    let data_in = e.add_input_port(Some("data_in"), DataType::Bit)?;
    let delayed = e.add_delay(
        data_in,
        3,
        Some("delayed"),
        Some((clock, Polarity::Positive)),
        Some((reset, Polarity::Positive)),
    )?;
    e.add_output_port(Some("data_out"), DataType::Bit, Some(delayed))?;
    Ok((mgr, top))
}

fn mux() -> RtlResult<(EntityManager, EntityId)> {
    let mut mgr = EntityManager::new();
    let top = mgr.create_entity("mux")?;
    let e = mgr.entity_mut(top);
    let sel = e.add_input_port(Some("sel"), DataType::Bit)?;
    let a = e.add_input_port(Some("a"), DataType::bitvector(8))?;
    let b = e.add_input_port(Some("b"), DataType::bitvector(8))?;
    let selected = e.add_mux2(sel, a, b, None, Some("selected"))?;
    e.add_output_port(Some("y"), DataType::bitvector(8), Some(selected))?;
    Ok((mgr, top))
}

fn alu() -> RtlResult<(EntityManager, EntityId)> {
    let mut mgr = EntityManager::new();
    let top = mgr.create_entity("alu")?;
    let e = mgr.entity_mut(top);
    let op = e.add_input_port(Some("op"), DataType::bitvector(2))?;
    let a = e.add_input_port(Some("a"), DataType::bitvector(8))?;
    let b = e.add_input_port(Some("b"), DataType::bitvector(8))?;
    let result = e.add_net(
        NetDecl::named("result")
            .data_type(DataType::bitvector(8))
            .reg(),
    )?;

    let process = e.add_comb_process(Some("compute"))?;
    let select = e.process_mut(process)?.body_mut().add_case(op);
    select.add_label(0).add_assign(result.clone(), &a + &b, false);
    select.add_label(1).add_assign(result.clone(), &a - &b, false);
    select.add_label(2).add_assign(result.clone(), &a & &b, false);
    select
        .default_body_mut()
        .add_assign(result.clone(), &a | &b, false);

    e.add_output_port(Some("y"), DataType::bitvector(8), Some(result))?;
    Ok((mgr, top))
}

fn decoder() -> RtlResult<(EntityManager, EntityId)> {
    let mut mgr = EntityManager::new();
    let top = mgr.create_entity("decoder")?;
    let e = mgr.entity_mut(top);
    let sel = e.add_input_port(Some("sel"), DataType::bitvector(2))?;
    let table = e.add_lut(Some("decode"), Some(sel), None, DataType::bitvector(4))?;
    let lut = e.lut_mut(table)?;
    for i in 0..4u32 {
        lut.add_data(i, 1u32 << i)?;
    }
    let onehot = lut.output().clone();
    e.add_output_port(Some("onehot"), DataType::bitvector(4), Some(onehot))?;
    Ok((mgr, top))
}

fn fsm() -> RtlResult<(EntityManager, EntityId)> {
    let mut mgr = EntityManager::new();
    let top = mgr.create_entity("sequencer")?;
    let e = mgr.entity_mut(top);
    let clock = e.add_input_port(Some("clock"), DataType::Bit)?;
    let reset = e.add_input_port(Some("reset"), DataType::Bit)?;
    let start = e.add_input_port(Some("start"), DataType::Bit)?;
    let machine = e.add_linear_fsm(
        4,
        Some((clock, Polarity::Positive)),
        Some((reset, Polarity::Positive)),
        start,
    )?;
    e.add_output_port(Some("busy"), DataType::Bit, Some(machine.running))?;
    e.add_output_port(Some("state"), DataType::bitvector(2), Some(machine.count))?;
    Ok((mgr, top))
}

fn chain() -> RtlResult<(EntityManager, EntityId)> {
    let mut mgr = EntityManager::new();
    let top = mgr.create_entity("chain")?;
    let inverter = mgr.create_entity("inverter")?;

    let inv = mgr.entity_mut(inverter);
    let a = inv.add_input_port(Some("a"), DataType::Bit)?;
    inv.add_output_port(Some("y"), DataType::Bit, Some(!&a))?;

    let u0 = mgr.add_instance(top, inverter, Some("u0"))?;
    let u1 = mgr.add_instance(top, inverter, Some("u1"))?;
    let [a0, y0] = instance_nets(&mgr, top, u0, ["a", "y"])?;
    let [a1, y1] = instance_nets(&mgr, top, u1, ["a", "y"])?;

    let e = mgr.entity_mut(top);
    let data_in = e.add_input_port(Some("data_in"), DataType::Bit)?;
    e.connect(&a0, data_in)?;
    e.connect(&a1, y0)?;
    e.add_output_port(Some("data_out"), DataType::Bit, Some(y1))?;
    Ok((mgr, top))
}

fn instance_nets<const N: usize>(
    mgr: &EntityManager,
    parent: EntityId,
    item: ItemId,
    ports: [&str; N],
) -> RtlResult<[Expr; N]> {
    let instance = mgr
        .entity(parent)
        .instance(item)
        .ok_or_else(|| RtlError::config("item is not an instance"))?;
    let mut nets = Vec::with_capacity(N);
    for port in ports {
        nets.push(instance.port_by_name(port)?.clone());
    }
    nets.try_into()
        .map_err(|_| RtlError::config("instance port count changed"))
}
