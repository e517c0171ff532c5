//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::GeneratorConfig;
use std::path::Path;

/// File name looked up in a project directory.
pub const CONFIG_FILE_NAME: &str = "hdlgen.toml";

/// Loads and validates `<dir>/hdlgen.toml`.
pub fn load_config(dir: &Path) -> Result<GeneratorConfig, ConfigError> {
    let content = std::fs::read_to_string(dir.join(CONFIG_FILE_NAME))?;
    load_config_from_str(&content)
}

/// Like [`load_config`], but a missing file yields the default configuration.
pub fn load_config_or_default(dir: &Path) -> Result<GeneratorConfig, ConfigError> {
    let path = dir.join(CONFIG_FILE_NAME);
    if !path.exists() {
        return Ok(GeneratorConfig::default());
    }
    load_config(dir)
}

/// Parses and validates an `hdlgen.toml` configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<GeneratorConfig, ConfigError> {
    let config: GeneratorConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &GeneratorConfig) -> Result<(), ConfigError> {
    config
        .naming
        .templates()
        .validate()
        .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
    if !is_vhdl_identifier(&config.vhdl.architecture) {
        return Err(ConfigError::ValidationError(format!(
            "vhdl.architecture '{}' is not a VHDL identifier",
            config.vhdl.architecture
        )));
    }
    if config.vhdl.use_clauses.iter().any(|u| u.trim().is_empty()) {
        return Err(ConfigError::ValidationError(
            "vhdl.use_clauses must not contain empty entries".to_string(),
        ));
    }
    Ok(())
}

fn is_vhdl_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !s.ends_with('_')
        && !s.contains("__")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Language;

    #[test]
    fn empty_config_is_default() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config, GeneratorConfig::default());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[naming]
net = "n_{}"
item = "proc{}"

[vhdl]
architecture = "behav"
use_clauses = ["work.types_pkg.all"]

[output]
language = "vhdl"
directory = "out"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.naming.net, "n_{}");
        assert_eq!(config.naming.port, "port{}");
        assert_eq!(config.naming.item, "proc{}");
        assert_eq!(config.vhdl.architecture, "behav");
        assert_eq!(config.vhdl.use_clauses, vec!["work.types_pkg.all"]);
        assert_eq!(config.output.language, Language::Vhdl);
        assert_eq!(
            config.output.directory.as_deref(),
            Some(Path::new("out"))
        );
    }

    #[test]
    fn template_without_placeholder_fails() {
        let err = load_config_from_str("[naming]\nnet = \"wire\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn bad_architecture_name_fails() {
        for name in ["", "1rtl", "my arch", "rtl_", "a__b"] {
            let toml = format!("[vhdl]\narchitecture = \"{name}\"\n");
            assert!(
                matches!(load_config_from_str(&toml), Err(ConfigError::ValidationError(_))),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn unknown_language_is_parse_error() {
        let err = load_config_from_str("[output]\nlanguage = \"systemc\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn unknown_key_is_parse_error() {
        let err = load_config_from_str("[naming]\nsignal = \"s{}\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[output]\nlanguage = \"verilog\"\n",
        )
        .unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.output.language, Language::Verilog);
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(load_config(dir.path()), Err(ConfigError::IoError(_))));
        assert_eq!(
            load_config_or_default(dir.path()).unwrap(),
            GeneratorConfig::default()
        );
    }
}
