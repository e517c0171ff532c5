//! Parsing and validation of `hdlgen.toml` generator configuration files.
//!
//! The configuration controls how anonymous objects are named, a few VHDL
//! output options, and where the CLI writes its files. Every section is
//! optional and a missing file means all defaults.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, load_config_or_default, CONFIG_FILE_NAME};
pub use types::*;
