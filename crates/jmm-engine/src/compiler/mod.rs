//! Java-- Compiler Backend
//!
//! Pipeline from a checked program to Jasmin text:
//!
//! 1. semantic gate (error diagnostics block compilation)
//! 2. optional constant propagation and folding on the tree
//! 3. lowering to three-address IR
//! 4. Jasmin emission with stack and locals limits

pub mod codegen;
pub mod error;
pub mod ir;
pub mod lower;
pub mod optimize;
pub mod options;

pub use codegen::{JasminGenerator, JasminUnit};
pub use error::{CompileError, CompileResult};
pub use lower::Lowerer;
pub use options::{CompileOptions, NegationLowering, StackLimitPolicy};

use crate::ast::Program;
use crate::semantics::SemanticsResult;
use ir::{IrModule, PrettyPrint};
use tracing::debug;

/// Main compiler entry point
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    options: CompileOptions,
}

impl Compiler {
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compile a checked program into one Jasmin unit per class
    pub fn compile(&self, semantics: SemanticsResult) -> CompileResult<Vec<JasminUnit>> {
        let module = self.lower(semantics)?;
        self.emit(&module)
    }

    /// Compile a program that carries no upstream diagnostics
    pub fn compile_program(&self, program: Program) -> CompileResult<Vec<JasminUnit>> {
        self.compile(SemanticsResult::new(program)?)
    }

    /// Run the gate, the optimizer (when enabled) and lowering
    pub fn lower(&self, semantics: SemanticsResult) -> CompileResult<IrModule> {
        semantics.check()?;
        let SemanticsResult {
            program, symbols, ..
        } = semantics;

        let program = if self.options.optimize {
            debug!(
                class = %program.class.name,
                max_passes = self.options.max_optimization_passes,
                "optimizing"
            );
            optimize::optimize_program(program, self.options.max_optimization_passes)?
        } else {
            program
        };

        let mut lowerer = Lowerer::new(&symbols);
        lowerer.lower_program(&program)
    }

    /// IR listing of a checked program
    pub fn emit_ir(&self, semantics: SemanticsResult) -> CompileResult<String> {
        Ok(self.lower(semantics)?.pretty_print())
    }

    /// Jasmin emission of an already lowered module
    pub fn emit(&self, module: &IrModule) -> CompileResult<Vec<JasminUnit>> {
        JasminGenerator::new(self.options.clone()).generate(module)
    }
}
