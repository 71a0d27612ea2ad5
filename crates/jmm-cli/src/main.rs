//! jmmc: Java-- compiler driver
//!
//! Reads a checked syntax tree as JSON and writes Jasmin assembly (or the
//! IR listing) for it.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::compile::{CompileArgs, Emit, StackLimitArg};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "jmmc")]
#[command(about = "Java-- compiler backend", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a JSON syntax tree to Jasmin
    Compile {
        /// Checked program as JSON
        input: PathBuf,
        /// Run constant propagation and folding
        #[arg(short = 'O', long)]
        optimize: bool,
        /// TOML file with compiler options
        #[arg(long)]
        config: Option<PathBuf>,
        /// Upstream diagnostics as a JSON array
        #[arg(long)]
        diagnostics: Option<PathBuf>,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// What to emit
        #[arg(long, value_enum, default_value = "jasmin")]
        emit: Emit,
        /// Override the optimizer iteration cap
        #[arg(long)]
        max_passes: Option<usize>,
        /// Override how `.limit stack` is computed
        #[arg(long, value_enum)]
        stack_limit: Option<StackLimitArg>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    use tracing_subscriber::{fmt, EnvFilter};

    // RUST_LOG controls the level, warn by default
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("warn"))?;
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Compile {
            input,
            optimize,
            config,
            diagnostics,
            output,
            emit,
            max_passes,
            stack_limit,
        } => commands::compile::execute(CompileArgs {
            input,
            optimize,
            config,
            diagnostics,
            output,
            emit,
            max_passes,
            stack_limit,
        }),
    }
}
