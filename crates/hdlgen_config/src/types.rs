//! Strongly-typed configuration structures deserialized from `hdlgen.toml`.

use hdlgen_ir::NameTemplates;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level generator configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Templates for anonymous names.
    #[serde(default)]
    pub naming: NamingConfig,
    /// VHDL output options.
    #[serde(default)]
    pub vhdl: VhdlConfig,
    /// Output selection for the command-line tool.
    #[serde(default)]
    pub output: OutputConfig,
}

/// `[naming]`: one template per object category, each with one `{}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NamingConfig {
    /// Template for ports.
    pub port: String,
    /// Template for nets.
    pub net: String,
    /// Template for variables.
    pub var: String,
    /// Template for processes, instances and LUTs.
    pub item: String,
    /// Template for named blocks.
    pub block: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        let t = NameTemplates::default();
        Self {
            port: t.port,
            net: t.net,
            var: t.var,
            item: t.item,
            block: t.block,
        }
    }
}

impl NamingConfig {
    /// Converts to the templates the model's name resolution takes.
    pub fn templates(&self) -> NameTemplates {
        NameTemplates {
            port: self.port.clone(),
            net: self.net.clone(),
            var: self.var.clone(),
            item: self.item.clone(),
            block: self.block.clone(),
        }
    }
}

/// `[vhdl]`: VHDL writer options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VhdlConfig {
    /// Architecture name used for every entity.
    pub architecture: String,
    /// Extra `use` clauses emitted after the IEEE ones.
    pub use_clauses: Vec<String>,
}

impl Default for VhdlConfig {
    fn default() -> Self {
        Self {
            architecture: "rtl".to_string(),
            use_clauses: Vec::new(),
        }
    }
}

/// Which backends to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Verilog only.
    Verilog,
    /// VHDL only.
    Vhdl,
    /// Both backends.
    #[default]
    Both,
}

impl Language {
    /// Returns `true` if Verilog output is selected.
    pub fn wants_verilog(self) -> bool {
        matches!(self, Language::Verilog | Language::Both)
    }

    /// Returns `true` if VHDL output is selected.
    pub fn wants_vhdl(self) -> bool {
        matches!(self, Language::Vhdl | Language::Both)
    }
}

/// `[output]`: what the command-line tool writes and where.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Backends to render.
    pub language: Language,
    /// Output directory; standard output when absent.
    pub directory: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn naming_defaults_match_model_defaults() {
        assert_eq!(NamingConfig::default().templates(), NameTemplates::default());
    }

    #[test]
    fn vhdl_default_architecture() {
        let v = VhdlConfig::default();
        assert_eq!(v.architecture, "rtl");
        assert!(v.use_clauses.is_empty());
    }

    #[test]
    fn language_selection() {
        assert!(Language::Both.wants_verilog());
        assert!(Language::Both.wants_vhdl());
        assert!(!Language::Verilog.wants_vhdl());
        assert!(!Language::Vhdl.wants_verilog());
        assert_eq!(Language::default(), Language::Both);
    }
}
