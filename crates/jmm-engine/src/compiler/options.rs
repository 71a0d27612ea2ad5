//! Compiler configuration
//!
//! Options are plain data with serde defaults so that a driver can read them
//! from a config file and override single keys from flags.

use serde::{Deserialize, Serialize};

/// Default cap on optimizer iterations
pub const DEFAULT_MAX_OPTIMIZATION_PASSES: usize = 100;

/// How `.limit stack` is computed from the replayed pushes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StackLimitPolicy {
    /// Depth at instruction start plus every push of the instruction.
    /// Never under-declares, usually a few slots loose.
    #[default]
    Conservative,
    /// Exact historical peak of the simulated depth
    Exact,
}

/// How logical negation `!v` is emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegationLowering {
    /// `load v; load v; ixor` (always 0). Kept for output compatibility.
    #[default]
    SelfXor,
    /// `load v; iconst_1; ixor`
    XorOne,
}

/// Options for one compilation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Run constant propagation and folding before lowering
    pub optimize: bool,
    /// Upper bound on propagate/fold iterations
    pub max_optimization_passes: usize,
    /// Stack limit computation
    pub stack_limit: StackLimitPolicy,
    /// Negation instruction sequence
    pub negation: NegationLowering,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            optimize: false,
            max_optimization_passes: DEFAULT_MAX_OPTIMIZATION_PASSES,
            stack_limit: StackLimitPolicy::default(),
            negation: NegationLowering::default(),
        }
    }
}

impl CompileOptions {
    /// Default options with the optimizer enabled
    pub fn optimized() -> Self {
        Self {
            optimize: true,
            ..Self::default()
        }
    }
}
