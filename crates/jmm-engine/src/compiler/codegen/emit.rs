//! Jasmin Emission Helpers
//!
//! Helper functions for emitting common instruction patterns: literal
//! pushes, typed loads and stores, and type descriptors.

use crate::compiler::ir::{BinaryOp, IrType};

/// Default superclass when none is declared
pub const OBJECT_CLASS: &str = "java/lang/Object";

/// Internal name of `String`
pub const STRING_CLASS: &str = "java/lang/String";

/// Most compact push of an integer constant:
/// `iconst_m1..iconst_5`, `bipush`, `sipush`, then `ldc`
pub fn push_int(value: i32) -> String {
    match value {
        -1 => "iconst_m1".to_string(),
        0..=5 => format!("iconst_{}", value),
        -128..=127 => format!("bipush {}", value),
        -32768..=32767 => format!("sipush {}", value),
        _ => format!("ldc {}", value),
    }
}

/// Register operand: `_n` for the short forms (n < 4), ` n` otherwise
pub fn register_suffix(register: u32) -> String {
    if register < 4 {
        format!("_{}", register)
    } else {
        format!(" {}", register)
    }
}

/// Load of a stored value of the given type
pub fn load(ty: &IrType, register: u32) -> String {
    let prefix = if ty.is_reference() { "aload" } else { "iload" };
    format!("{}{}", prefix, register_suffix(register))
}

/// Store of a value of the given type
pub fn store(ty: &IrType, register: u32) -> String {
    let prefix = if ty.is_reference() { "astore" } else { "istore" };
    format!("{}{}", prefix, register_suffix(register))
}

/// Return instruction for a method's return type
pub fn return_instr(ty: &IrType) -> &'static str {
    match ty {
        IrType::Void => "return",
        ty if ty.is_reference() => "areturn",
        _ => "ireturn",
    }
}

/// Element load for arrays of the given element type
pub fn array_load(element: &IrType) -> &'static str {
    match element {
        IrType::Bool => "baload",
        IrType::Int32 => "iaload",
        _ => "aaload",
    }
}

/// Element store for arrays of the given element type
pub fn array_store(element: &IrType) -> &'static str {
    match element {
        IrType::Bool => "bastore",
        IrType::Int32 => "iastore",
        _ => "aastore",
    }
}

/// Arithmetic mnemonic; `None` for `<`, which is a compare-and-branch
pub fn arithmetic(op: BinaryOp) -> Option<&'static str> {
    match op {
        BinaryOp::Add => Some("iadd"),
        BinaryOp::Sub => Some("isub"),
        BinaryOp::Mul => Some("imul"),
        BinaryOp::Div => Some("idiv"),
        BinaryOp::And => Some("iand"),
        BinaryOp::Lt => None,
    }
}

/// Resolves simple class names to internal names through the imports
#[derive(Debug, Clone)]
pub struct ClassResolver {
    class_name: String,
    imports: Vec<String>,
}

impl ClassResolver {
    pub fn new(class_name: impl Into<String>, imports: &[String]) -> Self {
        Self {
            class_name: class_name.into(),
            imports: imports.to_vec(),
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Import declaring `name`, in internal (slashed) form
    fn imported(&self, name: &str) -> Option<String> {
        self.imports
            .iter()
            .find(|i| i.as_str() == name || i.ends_with(&format!(".{}", name)))
            .map(|i| i.replace('.', "/"))
    }

    /// Internal name of a class reference. `this` and names matching no
    /// import denote the current class.
    pub fn internal_name(&self, name: &str) -> String {
        if name == "this" || name == self.class_name {
            return self.class_name.clone();
        }
        self.imported(name)
            .unwrap_or_else(|| self.class_name.clone())
    }

    /// Internal name of the superclass, `java/lang/Object` when absent
    pub fn superclass(&self, superclass: Option<&str>) -> String {
        match superclass {
            Some(name) if !name.is_empty() => {
                self.imported(name).unwrap_or_else(|| name.to_string())
            }
            _ => OBJECT_CLASS.to_string(),
        }
    }

    /// Type descriptor: `I Z V`, `[` + element, `L<internal>;`
    pub fn descriptor(&self, ty: &IrType) -> String {
        match ty {
            IrType::Int32 => "I".to_string(),
            IrType::Bool => "Z".to_string(),
            IrType::Void => "V".to_string(),
            IrType::String => format!("L{};", STRING_CLASS),
            IrType::Class(name) => format!("L{};", self.internal_name(name)),
            IrType::Array(element) => format!("[{}", self.descriptor(element)),
        }
    }

    /// Method descriptor `(params)ret`
    pub fn method_descriptor<'t>(
        &self,
        params: impl IntoIterator<Item = &'t IrType>,
        ret: &IrType,
    ) -> String {
        let params: String = params.into_iter().map(|p| self.descriptor(p)).collect();
        format!("({}){}", params, self.descriptor(ret))
    }

    /// Operand of `anewarray` for a reference element type
    pub fn array_class(&self, element: &IrType) -> String {
        match element {
            IrType::String => STRING_CLASS.to_string(),
            IrType::Class(name) => self.internal_name(name),
            other => self.descriptor(other),
        }
    }
}
