//! `jmmc compile`: JSON syntax tree to Jasmin or IR text

use anyhow::{Context, Result};
use clap::ValueEnum;
use jmm_engine::{
    CompileOptions, Compiler, Diagnostic, Program, SemanticsResult, StackLimitPolicy,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Emit {
    /// Jasmin assembly
    Jasmin,
    /// Three-address IR listing
    Ir,
}

/// `--stack-limit` values
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StackLimitArg {
    Conservative,
    Exact,
}

impl From<StackLimitArg> for StackLimitPolicy {
    fn from(arg: StackLimitArg) -> Self {
        match arg {
            StackLimitArg::Conservative => StackLimitPolicy::Conservative,
            StackLimitArg::Exact => StackLimitPolicy::Exact,
        }
    }
}

pub struct CompileArgs {
    pub input: PathBuf,
    pub optimize: bool,
    pub config: Option<PathBuf>,
    pub diagnostics: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub emit: Emit,
    pub max_passes: Option<usize>,
    pub stack_limit: Option<StackLimitArg>,
}

/// Options from the config file (defaults when absent), with flags on top
pub fn resolve_options(args: &CompileArgs) -> Result<CompileOptions> {
    let mut options = match &args.config {
        Some(path) => load_config(path)?,
        None => CompileOptions::default(),
    };
    if args.optimize {
        options.optimize = true;
    }
    if let Some(max_passes) = args.max_passes {
        options.max_optimization_passes = max_passes;
    }
    if let Some(stack_limit) = args.stack_limit {
        options.stack_limit = stack_limit.into();
    }
    Ok(options)
}

fn load_config(path: &Path) -> Result<CompileOptions> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
}

fn load_diagnostics(path: &Path) -> Result<Vec<Diagnostic>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read diagnostics {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid diagnostics {}", path.display()))
}

pub fn execute(args: CompileArgs) -> Result<()> {
    let options = resolve_options(&args)?;
    debug!(?options, "compiler options");

    let source = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let program: Program = serde_json::from_str(&source)
        .with_context(|| format!("invalid syntax tree in {}", args.input.display()))?;

    let mut semantics = SemanticsResult::new(program)?;
    if let Some(path) = &args.diagnostics {
        let diagnostics = load_diagnostics(path)?;
        for diagnostic in &diagnostics {
            if diagnostic.is_error() {
                eprintln!("{}", diagnostic);
            } else {
                warn!("{}", diagnostic);
            }
        }
        semantics = semantics.with_diagnostics(diagnostics);
    }

    let compiler = Compiler::new(options);
    let text = match args.emit {
        Emit::Ir => compiler.emit_ir(semantics)?,
        Emit::Jasmin => compiler
            .compile(semantics)?
            .into_iter()
            .map(|unit| unit.code)
            .collect::<Vec<_>>()
            .join("\n"),
    };

    match &args.output {
        Some(path) => fs::write(path, text)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => print!("{}", text),
    }
    Ok(())
}
