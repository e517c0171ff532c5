//! Verilog and VHDL writers for hdlgen designs.
//!
//! Both writers share one pipeline. [`HdlWriter::write_entity`] and
//! [`HdlWriter::write_design`] first resolve anonymous names over every
//! entity reachable from the top and seal those entities. Each entity is
//! then rendered in turn: header, declarations, items in insertion order,
//! continuous assignments last. Column alignment and indentation come from
//! [`LineWriter`].

#![warn(missing_docs)]

pub mod error;
pub mod line;
pub mod render;
pub mod verilog;
pub mod vhdl;

pub use error::{WriteError, WriteResult};
pub use line::LineWriter;
pub use render::ExprRender;
pub use verilog::VerilogWriter;
pub use vhdl::VhdlWriter;

use hdlgen_config::{GeneratorConfig, VhdlConfig};
use hdlgen_ir::{EntityId, EntityManager, NameTemplates};
use tracing::debug;

/// Options shared by both writers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriterOptions {
    /// Templates for naming anonymous objects before rendering.
    pub templates: NameTemplates,
    /// VHDL architecture name and extra use clauses.
    pub vhdl: VhdlConfig,
}

impl WriterOptions {
    /// Takes the writer-relevant parts of a generator configuration.
    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self {
            templates: config.naming.templates(),
            vhdl: config.vhdl.clone(),
        }
    }
}

/// A backend that renders entities of an [`EntityManager`].
pub trait HdlWriter {
    /// Human-readable backend name.
    fn language(&self) -> &'static str;

    /// Conventional file extension, without the dot.
    fn extension(&self) -> &'static str;

    /// The options this writer was created with.
    fn options(&self) -> &WriterOptions;

    /// Renders one entity whose names are already resolved.
    fn render_entity(&mut self, mgr: &EntityManager, id: EntityId) -> WriteResult<()>;

    /// Writes whatever separates two consecutive entities of a design.
    fn write_separator(&mut self) -> WriteResult<()>;

    /// Resolves names below `top` and renders `top` alone.
    fn write_entity(&mut self, mgr: &mut EntityManager, top: EntityId) -> WriteResult<()> {
        let templates = self.options().templates.clone();
        mgr.prepare_render(top, &templates)?;
        debug!(language = self.language(), entity = %mgr.entity(top).name(), "writing entity");
        self.render_entity(mgr, top)
    }

    /// Resolves names below `top` and renders every reachable entity, `top`
    /// first.
    fn write_design(&mut self, mgr: &mut EntityManager, top: EntityId) -> WriteResult<()> {
        let templates = self.options().templates.clone();
        let list = mgr.prepare_render(top, &templates)?;
        debug!(
            language = self.language(),
            top = %mgr.entity(top).name(),
            entities = list.len(),
            "writing design"
        );
        for (i, id) in list.into_iter().enumerate() {
            if i > 0 {
                self.write_separator()?;
            }
            self.render_entity(mgr, id)?;
        }
        Ok(())
    }
}

/// Renders the design below `top` as Verilog text.
pub fn verilog_string(
    mgr: &mut EntityManager,
    top: EntityId,
    options: &WriterOptions,
) -> WriteResult<String> {
    let mut writer = VerilogWriter::with_options(Vec::new(), options.clone());
    writer.write_design(mgr, top)?;
    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}

/// Renders the design below `top` as VHDL text.
pub fn vhdl_string(
    mgr: &mut EntityManager,
    top: EntityId,
    options: &WriterOptions,
) -> WriteResult<String> {
    let mut writer = VhdlWriter::with_options(Vec::new(), options.clone());
    writer.write_design(mgr, top)?;
    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdlgen_ir::DataType;

    #[test]
    fn options_follow_config() {
        let mut config = GeneratorConfig::default();
        config.naming.net = "n_{}".to_string();
        config.vhdl.architecture = "behav".to_string();
        let options = WriterOptions::from_config(&config);
        assert_eq!(options.templates.net, "n_{}");
        assert_eq!(options.vhdl.architecture, "behav");
    }

    #[test]
    fn design_renders_children_after_top() {
        let mut mgr = EntityManager::new();
        let top = mgr.create_entity("top").unwrap();
        let leaf = mgr.create_entity("leaf").unwrap();
        mgr.entity_mut(leaf)
            .add_input_port(Some("a"), DataType::Bit)
            .unwrap();
        mgr.add_instance(top, leaf, Some("u0")).unwrap();

        let text = verilog_string(&mut mgr, top, &WriterOptions::default()).unwrap();
        let top_at = text.find("module top;").unwrap();
        let leaf_at = text.find("module leaf(").unwrap();
        assert!(top_at < leaf_at);
        assert!(mgr.entity(top).is_sealed());
        assert!(mgr.entity(leaf).is_sealed());
    }

    #[test]
    fn write_entity_renders_only_top() {
        let mut mgr = EntityManager::new();
        let top = mgr.create_entity("top").unwrap();
        let leaf = mgr.create_entity("leaf").unwrap();
        mgr.add_instance(top, leaf, None).unwrap();

        let mut writer = VhdlWriter::new(Vec::new());
        writer.write_entity(&mut mgr, top).unwrap();
        let text = String::from_utf8(writer.into_inner()).unwrap();
        assert!(text.contains("entity top is"));
        assert!(!text.contains("entity leaf is"));
        assert!(text.contains("component leaf is"));
    }

    #[test]
    fn rendering_twice_is_stable() {
        let mut mgr = EntityManager::new();
        let top = mgr.create_entity("top").unwrap();
        let e = mgr.entity_mut(top);
        let a = e.add_input_port(None, DataType::Bit).unwrap();
        let y = e.add_output_port(None, DataType::Bit, None).unwrap();
        e.connect(&y, !&a).unwrap();

        let options = WriterOptions::default();
        let first = verilog_string(&mut mgr, top, &options).unwrap();
        let second = verilog_string(&mut mgr, top, &options).unwrap();
        assert_eq!(first, second);
        assert!(first.contains("assign port2 = ~port1;"));
    }
}
