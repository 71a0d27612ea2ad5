//! Compilation errors

use thiserror::Error;

pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("Unsupported construct: {construct}")]
    Unsupported { construct: String },

    #[error("Unresolved name '{name}' in method {method}")]
    UnresolvedName { name: String, method: String },

    #[error("Indexing into non-array value '{name}' of type {ty}")]
    NotAnArray { name: String, ty: String },

    #[error("Undefined label '{label}' in method {method}")]
    UndefinedLabel { label: String, method: String },

    #[error("Label '{label}' defined more than once in method {method}")]
    DuplicateLabel { label: String, method: String },

    #[error("Expression produced no value where one is required: {context}")]
    MissingOperand { context: String },

    #[error("Internal compiler error: {message}")]
    Contract { message: String },

    #[error("More than one method named '{name}'")]
    DuplicateMethod { name: String },

    #[error("Varargs not allowed on {position} '{name}'")]
    VarargsNotAllowed { position: &'static str, name: String },

    #[error("Integer division by zero in constant expression (method {method})")]
    DivisionByZero { method: String },

    #[error("Semantic analysis reported {count} error(s)")]
    SemanticErrors { count: usize },
}

impl CompileError {
    pub(crate) fn unsupported(construct: impl Into<String>) -> Self {
        CompileError::Unsupported {
            construct: construct.into(),
        }
    }

    pub(crate) fn contract(message: impl Into<String>) -> Self {
        CompileError::Contract {
            message: message.into(),
        }
    }
}
