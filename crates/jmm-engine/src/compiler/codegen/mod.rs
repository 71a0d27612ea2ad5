//! Jasmin Code Generation
//!
//! Emits one Jasmin assembly unit per lowered class: header, fields, a
//! synthesized default constructor, then every method with its
//! `.limit stack` and `.limit locals` directives.

pub mod context;
pub mod emit;

pub use context::{MethodContext, StackTracker};
pub use emit::ClassResolver;

use crate::compiler::error::CompileResult;
use crate::compiler::ir::{ClassUnit, IrField, IrMethod, IrModule, Literal};
use crate::compiler::options::CompileOptions;
use std::fmt::Write;
use tracing::debug;

/// Assembly text of one class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JasminUnit {
    pub class_name: String,
    pub code: String,
}

/// Jasmin generator for one emission
pub struct JasminGenerator {
    options: CompileOptions,
    /// Counter for emitter-generated labels
    next_label: u32,
}

impl JasminGenerator {
    pub fn new(options: CompileOptions) -> Self {
        Self {
            options,
            next_label: 0,
        }
    }

    /// Emit every class of a module
    pub fn generate(&mut self, module: &IrModule) -> CompileResult<Vec<JasminUnit>> {
        module
            .classes
            .iter()
            .map(|class| -> CompileResult<JasminUnit> {
                Ok(JasminUnit {
                    class_name: class.name.clone(),
                    code: self.generate_class(class)?,
                })
            })
            .collect()
    }

    /// Emit one class
    pub fn generate_class(&mut self, class: &ClassUnit) -> CompileResult<String> {
        let resolver = ClassResolver::new(class.name.clone(), &class.imports);
        let superclass = resolver.superclass(class.superclass.as_deref());

        let mut out = String::new();
        let _ = writeln!(out, ".class public {}", class.name);
        let _ = writeln!(out, ".super {}", superclass);
        out.push('\n');

        for field in &class.fields {
            let _ = writeln!(out, "{}", field_directive(field, &resolver));
        }
        if !class.fields.is_empty() {
            out.push('\n');
        }

        let _ = writeln!(out, ".method public <init>()V");
        let _ = writeln!(out, "    aload_0");
        let _ = writeln!(out, "    invokespecial {}/<init>()V", superclass);
        let _ = writeln!(out, "    return");
        let _ = writeln!(out, ".end method");

        for method in &class.methods {
            out.push('\n');
            out.push_str(&self.generate_method(method, class, &resolver)?);
        }

        debug!(
            class = %class.name,
            methods = class.methods.len(),
            fields = class.fields.len(),
            "emitted class"
        );
        Ok(out)
    }

    fn generate_method(
        &mut self,
        method: &IrMethod,
        class: &ClassUnit,
        resolver: &ClassResolver,
    ) -> CompileResult<String> {
        let mut ctx = MethodContext::new(
            method,
            class,
            resolver,
            &self.options,
            &mut self.next_label,
        );
        for instr in &method.instructions {
            ctx.emit_instr(instr)?;
        }
        ctx.finish();

        let stack_limit = ctx.stack.limit(self.options.stack_limit);
        let locals_limit = method.locals_limit();
        let body = ctx.into_code();

        let mut out = String::new();
        let _ = writeln!(out, "{}", method_header(method, resolver));
        let _ = writeln!(out, "    .limit stack {}", stack_limit);
        let _ = writeln!(out, "    .limit locals {}", locals_limit);
        out.push_str(&body);
        let _ = writeln!(out, ".end method");

        debug!(
            method = %method.name,
            stack_limit,
            locals_limit,
            instructions = method.instructions.len(),
            "emitted method"
        );
        Ok(out)
    }
}

fn modifiers(access: Option<&str>, is_static: bool, is_final: bool) -> String {
    let mut parts = Vec::new();
    parts.extend(access);
    if is_static {
        parts.push("static");
    }
    if is_final {
        parts.push("final");
    }
    parts.iter().map(|p| format!("{} ", p)).collect()
}

fn field_directive(field: &IrField, resolver: &ClassResolver) -> String {
    let mut line = format!(
        ".field {}{} {}",
        modifiers(field.access.keyword(), field.is_static, field.is_final),
        field.name,
        resolver.descriptor(&field.ty)
    );
    match field.initial_value {
        Some(Literal::Int(value)) => line.push_str(&format!(" = {}", value)),
        Some(Literal::Bool(value)) => line.push_str(&format!(" = {}", i32::from(value))),
        None => {}
    }
    line
}

fn method_header(method: &IrMethod, resolver: &ClassResolver) -> String {
    format!(
        ".method {}{}{}",
        modifiers(method.access.keyword(), method.is_static, method.is_final),
        method.name,
        resolver.method_descriptor(method.params.iter().map(|p| &p.ty), &method.return_type)
    )
}
