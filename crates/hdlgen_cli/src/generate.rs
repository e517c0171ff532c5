//! `hdlgen gen`: renders a sample design.
//!
//! The design below the chosen top is rendered in every selected language,
//! one file per language named after the top entity. Without an output
//! directory the text goes to standard output, Verilog first.

use std::fs;
use std::path::{Path, PathBuf};

use hdlgen_config::{
    load_config_from_str, load_config_or_default, ConfigError, GeneratorConfig, Language,
};
use hdlgen_writer::{verilog_string, vhdl_string, WriterOptions};
use tracing::debug;

use crate::samples;
use crate::{GenArgs, GlobalArgs};

/// One rendered file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    /// File name, `<top>.v` or `<top>.vhd`.
    pub file_name: String,
    /// Rendered text.
    pub text: String,
}

/// Runs the `hdlgen gen` command.
pub fn run(args: &GenArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config = load_config(global.config.as_deref())?;
    let language = args
        .lang
        .map(Language::from)
        .unwrap_or(config.output.language);
    let directory = args
        .out
        .as_ref()
        .map(PathBuf::from)
        .or_else(|| config.output.directory.clone());
    let options = WriterOptions::from_config(&config);

    let outputs = render(&args.sample, args.top.as_deref(), language, &options)?;

    match directory {
        Some(dir) => {
            for path in write_outputs(&dir, &outputs)? {
                if !global.quiet {
                    eprintln!("     Created {}", path.display());
                }
            }
        }
        None => {
            for (i, output) in outputs.iter().enumerate() {
                if i > 0 {
                    println!();
                }
                print!("{}", output.text);
            }
        }
    }
    Ok(0)
}

/// Loads the configuration from `path`, or from `hdlgen.toml` in the
/// current directory when no path is given.
pub fn load_config(path: Option<&str>) -> Result<GeneratorConfig, ConfigError> {
    match path {
        Some(path) => load_config_from_str(&fs::read_to_string(path)?),
        None => load_config_or_default(&std::env::current_dir()?),
    }
}

/// Builds `sample` and renders it from `top`, or from the sample's own top.
pub fn render(
    sample: &str,
    top: Option<&str>,
    language: Language,
    options: &WriterOptions,
) -> Result<Vec<Output>, Box<dyn std::error::Error>> {
    let sample = samples::find(sample)
        .ok_or_else(|| format!("unknown sample '{sample}' (see `hdlgen list`)"))?;
    let (mut mgr, default_top) = sample.build()?;
    let top = match top {
        Some(name) => mgr
            .find(name)
            .ok_or_else(|| format!("sample '{}' has no entity '{name}'", sample.name))?,
        None => default_top,
    };
    let top_name = mgr.entity(top).name().to_string();
    debug!(sample = sample.name, top = %top_name, ?language, "generating");

    let mut outputs = Vec::new();
    if language.wants_verilog() {
        outputs.push(Output {
            file_name: format!("{top_name}.v"),
            text: verilog_string(&mut mgr, top, options)?,
        });
    }
    if language.wants_vhdl() {
        outputs.push(Output {
            file_name: format!("{top_name}.vhd"),
            text: vhdl_string(&mut mgr, top, options)?,
        });
    }
    Ok(outputs)
}

/// Writes `outputs` into `dir`, creating it if needed.
pub fn write_outputs(dir: &Path, outputs: &[Output]) -> std::io::Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(outputs.len());
    for output in outputs {
        let path = dir.join(&output.file_name);
        fs::write(&path, &output.text)?;
        written.push(path);
    }
    Ok(written)
}
