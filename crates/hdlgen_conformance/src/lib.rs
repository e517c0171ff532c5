//! Conformance test helpers for the hdlgen writers.
//!
//! Provides small builders for the designs exercised by the integration
//! tests and functions that render a design to a `String` in either
//! language, optionally under a configuration given as TOML text.

#![warn(missing_docs)]

use hdlgen_config::load_config_from_str;
use hdlgen_ir::{DataType, DffDecl, EntityId, EntityManager, Polarity};
use hdlgen_writer::{verilog_string, vhdl_string, WriterOptions};

/// Control inputs of the single-bit flip-flop built by [`dff_design`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DffControls {
    /// Clock edge.
    pub edge: Polarity,
    /// Asynchronous reset polarity; no reset port when `None`.
    pub reset: Option<Polarity>,
    /// Enable polarity; no enable port when `None`.
    pub enable: Option<Polarity>,
}

/// Builds entity `name` with ports `clock`, `data_in`, `data_out` and then
/// `reset` and `enable` when requested, holding one flip-flop that drives
/// `data_out`. The reset value is zero.
pub fn dff_design(name: &str, controls: DffControls) -> (EntityManager, EntityId) {
    let mut mgr = EntityManager::new();
    let top = mgr.create_entity(name).unwrap();
    let e = mgr.entity_mut(top);
    let clock = e.add_input_port(Some("clock"), DataType::Bit).unwrap();
    let data_in = e.add_input_port(Some("data_in"), DataType::Bit).unwrap();
    let data_out = e
        .add_output_port(Some("data_out"), DataType::Bit, None)
        .unwrap();

    let mut decl = DffDecl::new().clock(clock, controls.edge).data_in(data_in);
    if let Some(polarity) = controls.reset {
        let reset = e.add_input_port(Some("reset"), DataType::Bit).unwrap();
        decl = decl.reset(reset, polarity).reset_value(0);
    }
    if let Some(polarity) = controls.enable {
        let enable = e.add_input_port(Some("enable"), DataType::Bit).unwrap();
        decl = decl.enable(enable, polarity);
    }
    let dff = e.add_dff(decl).unwrap();
    e.connect(&data_out, &dff.q).unwrap();
    (mgr, top)
}

/// Renders the design below `top` as Verilog with default options.
pub fn verilog(mgr: &mut EntityManager, top: EntityId) -> String {
    verilog_string(mgr, top, &WriterOptions::default()).unwrap()
}

/// Renders the design below `top` as VHDL with default options.
pub fn vhdl(mgr: &mut EntityManager, top: EntityId) -> String {
    vhdl_string(mgr, top, &WriterOptions::default()).unwrap()
}

/// Parses `toml` as an `hdlgen.toml` file and returns the writer options.
pub fn options_from_toml(toml: &str) -> WriterOptions {
    WriterOptions::from_config(&load_config_from_str(toml).unwrap())
}
