//! AST Optimization
//!
//! Constant propagation and constant folding over the checked tree, run
//! alternately per method until neither pass changes anything or the
//! iteration cap is reached.

pub mod constant_fold;
pub mod constant_prop;

pub use constant_fold::{fold, ConstantFolder};
pub use constant_prop::propagate;

use crate::ast::{MethodDecl, Program};
use crate::compiler::error::CompileResult;
use tracing::{debug, warn};

/// Output of a pure rewrite pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite<T> {
    pub node: T,
    pub changed: bool,
}

/// Optimize every method of a program
pub fn optimize_program(program: Program, max_passes: usize) -> CompileResult<Program> {
    let Program { imports, mut class } = program;
    class.methods = class
        .methods
        .into_iter()
        .map(|m| optimize_method(m, max_passes))
        .collect::<CompileResult<_>>()?;
    Ok(Program { imports, class })
}

/// Alternate propagation and folding on one method to a fixed point
pub fn optimize_method(method: MethodDecl, max_passes: usize) -> CompileResult<MethodDecl> {
    let mut current = method;
    for pass in 1..=max_passes {
        let propagated = propagate(current)?;
        let folded = fold(propagated.node)?;
        current = folded.node;

        debug!(
            method = %current.name,
            pass,
            propagated = propagated.changed,
            folded = folded.changed,
            "optimizer iteration"
        );
        if !propagated.changed && !folded.changed {
            return Ok(current);
        }
    }

    warn!(
        method = %current.name,
        max_passes,
        "optimizer stopped at iteration cap before reaching a fixed point"
    );
    Ok(current)
}
