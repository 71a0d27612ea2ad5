//! AST to IR Lowering
//!
//! Converts the checked (and optionally optimized) AST into the IR
//! representation, one `ClassUnit` per program.

mod control_flow;
mod expr;
mod stmt;

pub use expr::ExprResult;

use crate::ast::{Expression, FieldDecl, MethodDecl, Program, Statement, Type};
use crate::compiler::error::{CompileError, CompileResult};
use crate::compiler::ir::{
    ClassUnit, IrField, IrInstr, IrMethod, IrModule, IrType, Literal, Operand,
};
use crate::semantics::{MethodSignature, SymbolTable};
use tracing::{debug, trace};

/// Fresh-name counters for one compilation
#[derive(Debug, Default)]
pub struct LowerContext {
    next_temp: u32,
    next_label: u32,
}

impl LowerContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh temporary of the given type
    pub fn new_temp(&mut self, ty: IrType) -> Operand {
        let id = self.next_temp;
        self.next_temp += 1;
        trace!(temp = id, ty = %ty, "allocated temporary");
        Operand::Temp { id, ty }
    }

    /// Allocate a fresh label suffix
    pub fn new_label_id(&mut self) -> u32 {
        let id = self.next_label;
        self.next_label += 1;
        trace!(label = id, "allocated label id");
        id
    }

    /// Number of temporaries allocated so far
    pub fn temp_count(&self) -> u32 {
        self.next_temp
    }
}

/// What a name denotes inside the current method
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Binding {
    /// Local or parameter
    Local(Type),
    /// Field of the current class
    Field(Type),
    /// Imported class or the current class, by simple name
    Class(String),
}

/// Lowers a program to an IR module
pub struct Lowerer<'a> {
    symbols: &'a SymbolTable,
    ctx: LowerContext,
    method: Option<&'a MethodDecl>,
}

impl<'a> Lowerer<'a> {
    pub fn new(symbols: &'a SymbolTable) -> Self {
        Self {
            symbols,
            ctx: LowerContext::new(),
            method: None,
        }
    }

    /// Lower the whole program
    pub fn lower_program(&mut self, program: &'a Program) -> CompileResult<IrModule> {
        let class = &program.class;
        let mut unit = ClassUnit::new(class.name.clone());
        unit.superclass = class.superclass.clone();
        unit.imports = self.symbols.imports.clone();

        for field in &class.fields {
            unit.fields.push(lower_field(field)?);
        }
        for method in &class.methods {
            unit.methods.push(self.lower_method(method)?);
        }

        debug!(
            class = %unit.name,
            methods = unit.methods.len(),
            temps = self.ctx.temp_count(),
            "lowered class"
        );
        let mut module = IrModule::new();
        module.add_class(unit);
        Ok(module)
    }

    /// Lower one method declaration
    pub fn lower_method(&mut self, decl: &'a MethodDecl) -> CompileResult<IrMethod> {
        self.method = Some(decl);

        let mut method = IrMethod::new(
            decl.name.clone(),
            &self.symbols.class_name,
            decl.is_static,
            IrType::from(&decl.return_type),
        );
        method.access = decl.access;
        method.is_final = decl.is_final;
        for param in &decl.params {
            method.add_param(param.name.clone(), IrType::from(&param.ty));
        }
        for local in &decl.locals {
            method.add_local(local.name.clone(), IrType::from(&local.ty));
        }

        let mut instructions = Vec::new();
        for stmt in &decl.body {
            instructions.extend(self.lower_stmt(stmt)?);
        }
        let ends_with_return = decl.body.last().is_some_and(Statement::ends_with_return);
        if decl.return_type.is_void() && !ends_with_return {
            instructions.push(IrInstr::Return(None));
        }

        method.set_body(instructions)?;
        debug!(
            method = %method.name,
            instructions = method.instructions.len(),
            temps = method.temp_count(),
            "lowered method"
        );

        self.method = None;
        Ok(method)
    }

    fn current_method(&self) -> CompileResult<&'a MethodDecl> {
        self.method
            .ok_or_else(|| CompileError::contract("lowering outside of a method"))
    }

    fn class_name(&self) -> &str {
        &self.symbols.class_name
    }

    /// Resolve a name: locals and parameters, then fields, then imports,
    /// then the current class name.
    pub(crate) fn resolve(&self, name: &str) -> CompileResult<Binding> {
        let method = self.current_method()?;
        if let Some(local) = method.locals.iter().find(|l| l.name == name) {
            return Ok(Binding::Local(local.ty.clone()));
        }
        if let Some(param) = method.params.iter().find(|p| p.name == name) {
            return Ok(Binding::Local(param.ty.clone()));
        }
        if let Some(field) = self.symbols.field(name) {
            return Ok(Binding::Field(field.ty.clone()));
        }
        if self.symbols.is_import(name) || name == self.class_name() {
            return Ok(Binding::Class(name.to_string()));
        }
        Err(CompileError::UnresolvedName {
            name: name.to_string(),
            method: method.name.clone(),
        })
    }

    /// Signature of a method of the current class called on `target`
    fn own_signature(&self, target: &Operand, method: &str) -> Option<&'a MethodSignature> {
        let symbols = self.symbols;
        let own = match target {
            Operand::Receiver { .. } => true,
            Operand::ClassRef(name) => name == self.class_name(),
            other => other.ty() == IrType::Class(self.class_name().to_string()),
        };
        if own {
            symbols.method(method)
        } else {
            None
        }
    }

    /// `this`, refusing static contexts
    fn receiver(&self, what: &str) -> CompileResult<Operand> {
        let method = self.current_method()?;
        if method.is_static {
            return Err(CompileError::unsupported(format!(
                "{} in static method {}",
                what, method.name
            )));
        }
        Ok(Operand::Receiver {
            class: self.class_name().to_string(),
        })
    }
}

fn lower_field(field: &FieldDecl) -> CompileResult<IrField> {
    let initial_value = match &field.initializer {
        None => None,
        Some(Expression::IntLiteral(v)) => Some(Literal::Int(*v)),
        Some(Expression::BoolLiteral(b)) => Some(Literal::Bool(*b)),
        Some(_) => {
            return Err(CompileError::unsupported(format!(
                "non-constant initializer for field {}",
                field.name
            )))
        }
    };
    Ok(IrField {
        name: field.name.clone(),
        ty: IrType::from(&field.ty),
        access: field.access,
        is_static: field.is_static,
        is_final: field.is_final,
        initial_value,
    })
}
