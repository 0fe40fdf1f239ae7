//! pipweave CLI: coverage-guided interconnect fuzzing.
//!
//! Provides `pipweave generate` to produce routed Vivado designs that
//! exercise every fuzzable PIP of a routing graph, and `pipweave info` to
//! summarize what a graph offers.

#![warn(missing_docs)]

mod generate;
mod info;
mod pipeline;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;

/// pipweave: routed design generator for interconnect fuzzing.
#[derive(Parser, Debug)]
#[command(name = "pipweave", version, about = "Coverage-guided interconnect fuzzer")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a `pipweave.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate routed designs.
    Generate(GenerateArgs),
    /// Print routing graph statistics.
    Info(InfoArgs),
}

/// Arguments for the `pipweave generate` subcommand.
#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Routing graph dump (`.gz` is decompressed).
    #[arg(long)]
    pub graph: PathBuf,

    /// Directory receiving `design_<n>.tcl`.
    #[arg(long)]
    pub out: PathBuf,

    /// Number of designs to generate.
    #[arg(long, default_value_t = 1)]
    pub designs: usize,

    /// RNG seed.
    #[arg(long, default_value_t = pipweave_fuzz::DEFAULT_SEED)]
    pub seed: u64,

    /// Write the final per-ttpip coverage here.
    #[arg(long)]
    pub coverage_report: Option<PathBuf>,

    /// Start from the counts of an earlier coverage report.
    #[arg(long)]
    pub resume: Option<PathBuf>,
}

/// Arguments for the `pipweave info` subcommand.
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Routing graph dump (`.gz` is decompressed).
    #[arg(long)]
    pub graph: PathBuf,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a config file.
    pub config: Option<PathBuf>,
}

impl GlobalArgs {
    /// Log level selected by `--quiet`/`--verbose`.
    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            LevelFilter::ERROR
        } else if self.verbose {
            LevelFilter::DEBUG
        } else {
            LevelFilter::INFO
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
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let result = match cli.command {
        Command::Generate(ref args) => generate::run(args, &global),
        Command::Info(ref args) => info::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
