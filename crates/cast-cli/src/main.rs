use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    decode::{self, DecodeArgs},
    expand::{self, ExpandArgs},
    postproc::{self, PostprocArgs},
    status::{self, StatusArgs},
};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "cast", version, about = "Simulation campaign design and post-processing")]
struct Cli {
    /// Emit per-case debug events.
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Expand a design file into its tag table.
    Expand(ExpandArgs),
    /// Report input/result freshness for every selected case.
    Status(StatusArgs),
    /// Dump the channels of one result file as CSV.
    Decode(DecodeArgs),
    /// Compute statistics over a campaign or a result directory.
    Postproc(PostprocArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Command::Expand(args) => expand::run(&args),
        Command::Status(args) => status::run(&args),
        Command::Decode(args) => decode::run(&args),
        Command::Postproc(args) => postproc::run(&args),
    }
}

fn init_tracing(verbose: bool) {
    // `--verbose` wins over `RUST_LOG`; without either the level is info.
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
