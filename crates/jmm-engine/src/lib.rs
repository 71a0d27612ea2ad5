//! Java-- Compiler Backend
//!
//! This crate takes a checked Java-- program and produces JVM assembly:
//! - **AST**: the typed tree handed over by the front end (`ast` module)
//! - **Semantics**: symbol table and diagnostics gate (`semantics` module)
//! - **Compiler**: optimizer, IR lowering and Jasmin emission (`compiler` module)
//!
//! # Example
//!
//! ```rust,ignore
//! use jmm_engine::{Compiler, CompileOptions, SemanticsResult};
//!
//! let program: jmm_engine::ast::Program = serde_json::from_str(&json)?;
//! let compiler = Compiler::new(CompileOptions::optimized());
//! for unit in compiler.compile(SemanticsResult::new(program)?)? {
//!     println!("{}", unit.code);
//! }
//! ```

#![warn(rust_2018_idioms)]

// ============================================================================
// Core Modules
// ============================================================================

/// Typed syntax tree
pub mod ast;

/// Symbol table and upstream diagnostics
pub mod semantics;

/// Optimizer, IR, lowering and code generation
pub mod compiler;

// ============================================================================
// Re-exports
// ============================================================================

pub use ast::Program;

pub use semantics::{Diagnostic, SemanticsResult, Severity, Stage, SymbolTable};

pub use compiler::{
    // Configuration
    CompileOptions, NegationLowering, StackLimitPolicy,
    // Compiler
    CompileError, CompileResult, Compiler,
    // IR
    ir,
    // Code generation
    JasminGenerator, JasminUnit,
};
