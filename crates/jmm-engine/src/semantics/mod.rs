//! Semantic analysis results
//!
//! The checking passes themselves run upstream. What arrives here is the
//! checked program, its symbol table and the diagnostics those passes
//! accumulated. Warnings are carried along; any error blocks lowering.

pub mod symbols;

pub use symbols::{MethodSignature, Symbol, SymbolTable};

use crate::ast::Program;
use crate::compiler::error::{CompileError, CompileResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// Pipeline stage that produced a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Syntactic,
    Semantic,
    Optimization,
    Generation,
}

/// A non-fatal report from an analysis pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub stage: Stage,
    pub line: u32,
    pub column: u32,
    pub message: String,
}

impl Diagnostic {
    pub fn error(stage: Stage, line: u32, column: u32, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            stage,
            line,
            column,
            message: message.into(),
        }
    }

    pub fn warning(stage: Stage, line: u32, column: u32, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            stage,
            line,
            column,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        write!(
            f,
            "{}:{}: {} ({:?}): {}",
            self.line, self.column, severity, self.stage, self.message
        )
    }
}

/// Checked program handed to the backend
#[derive(Debug, Clone)]
pub struct SemanticsResult {
    pub program: Program,
    pub symbols: SymbolTable,
    pub diagnostics: Vec<Diagnostic>,
}

impl SemanticsResult {
    /// Wrap a program with no diagnostics, deriving its symbol table
    pub fn new(program: Program) -> CompileResult<Self> {
        let symbols = SymbolTable::build(&program)?;
        Ok(Self {
            program,
            symbols,
            diagnostics: Vec::new(),
        })
    }

    /// Builder: attach upstream diagnostics
    pub fn with_diagnostics(mut self, diagnostics: Vec<Diagnostic>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    /// Fail when any error diagnostic was recorded
    pub fn check(&self) -> CompileResult<()> {
        match self.error_count() {
            0 => Ok(()),
            count => Err(CompileError::SemanticErrors { count }),
        }
    }
}
