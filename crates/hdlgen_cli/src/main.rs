//! hdlgen CLI: renders the built-in sample designs as Verilog or VHDL.
//!
//! Provides `hdlgen list` to show the available samples and `hdlgen gen` to
//! render one of them to files or standard output.

#![warn(missing_docs)]

mod generate;
mod list;
mod samples;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use hdlgen_config::Language;
use tracing::Level;

/// hdlgen: a Verilog and VHDL generator.
#[derive(Parser, Debug)]
#[command(name = "hdlgen", version, about = "Verilog and VHDL generator")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a custom `hdlgen.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the built-in sample designs.
    List,
    /// Render a sample design.
    Gen(GenArgs),
}

/// Arguments for the `hdlgen gen` subcommand.
#[derive(Parser, Debug)]
pub struct GenArgs {
    /// Sample design name (see `hdlgen list`).
    pub sample: String,

    /// Output language; defaults to `output.language` from the configuration.
    #[arg(short, long, value_enum)]
    pub lang: Option<OutputLanguage>,

    /// Directory for the generated files; standard output when omitted.
    #[arg(short, long)]
    pub out: Option<String>,

    /// Entity of the sample to render from (default: the sample's top).
    #[arg(long)]
    pub top: Option<String>,
}

/// Output language selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputLanguage {
    /// Verilog-2001.
    Verilog,
    /// VHDL-2008.
    Vhdl,
    /// Both languages.
    Both,
}

impl From<OutputLanguage> for Language {
    fn from(lang: OutputLanguage) -> Self {
        match lang {
            OutputLanguage::Verilog => Language::Verilog,
            OutputLanguage::Vhdl => Language::Vhdl,
            OutputLanguage::Both => Language::Both,
        }
    }
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

impl GlobalArgs {
    /// Maximum level for log events.
    pub fn log_level(&self) -> Level {
        if self.verbose {
            Level::DEBUG
        } else if self.quiet {
            Level::ERROR
        } else {
            Level::WARN
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };

    tracing_subscriber::fmt()
        .with_max_level(global.log_level())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Command::List => list::run(&global),
        Command::Gen(ref args) => generate::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
