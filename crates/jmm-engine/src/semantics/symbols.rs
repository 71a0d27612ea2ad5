//! Symbol table
//!
//! Class-level view of a program: class name, superclass, imports, fields
//! and method signatures. Lowering and emission resolve names against it.

use crate::ast::{Param, Program, Type};
use crate::compiler::error::{CompileError, CompileResult};
use rustc_hash::FxHashSet;

/// A named, typed entry (field or local)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub ty: Type,
}

impl Symbol {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Signature of a declared method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    pub name: String,
    pub return_type: Type,
    pub params: Vec<Param>,
    pub locals: Vec<Symbol>,
    pub is_static: bool,
}

impl MethodSignature {
    /// Check if the last formal parameter is varargs
    pub fn is_varargs(&self) -> bool {
        self.params.last().is_some_and(|p| p.is_varargs)
    }

    /// Number of parameters before a trailing varargs parameter
    pub fn fixed_arity(&self) -> usize {
        if self.is_varargs() {
            self.params.len() - 1
        } else {
            self.params.len()
        }
    }

    pub fn param(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn local(&self, name: &str) -> Option<&Symbol> {
        self.locals.iter().find(|l| l.name == name)
    }
}

/// Symbol table for one compilation unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolTable {
    pub class_name: String,
    pub superclass: Option<String>,
    /// Dotted import names in declaration order
    pub imports: Vec<String>,
    pub fields: Vec<Symbol>,
    /// Methods in declaration order
    pub methods: Vec<MethodSignature>,
}

impl SymbolTable {
    /// Derive the table from a program.
    ///
    /// Rejects duplicate method names, varargs fields, varargs return types
    /// and a varargs parameter that is not the last one.
    pub fn build(program: &Program) -> CompileResult<Self> {
        let class = &program.class;

        let mut fields = Vec::with_capacity(class.fields.len());
        for field in &class.fields {
            if field.is_varargs {
                return Err(CompileError::VarargsNotAllowed {
                    position: "field",
                    name: field.name.clone(),
                });
            }
            fields.push(Symbol::new(field.name.clone(), field.ty.clone()));
        }

        let mut seen = FxHashSet::default();
        let mut methods = Vec::with_capacity(class.methods.len());
        for method in &class.methods {
            if !seen.insert(method.name.as_str()) {
                return Err(CompileError::DuplicateMethod {
                    name: method.name.clone(),
                });
            }
            if method.returns_varargs {
                return Err(CompileError::VarargsNotAllowed {
                    position: "return type of",
                    name: method.name.clone(),
                });
            }
            let last = method.params.len().saturating_sub(1);
            if let Some((_, p)) = method
                .params
                .iter()
                .enumerate()
                .find(|(i, p)| p.is_varargs && *i != last)
            {
                return Err(CompileError::VarargsNotAllowed {
                    position: "non-final parameter",
                    name: p.name.clone(),
                });
            }

            methods.push(MethodSignature {
                name: method.name.clone(),
                return_type: method.return_type.clone(),
                params: method.params.clone(),
                locals: method
                    .locals
                    .iter()
                    .map(|l| Symbol::new(l.name.clone(), l.ty.clone()))
                    .collect(),
                is_static: method.is_static,
            });
        }

        Ok(Self {
            class_name: class.name.clone(),
            superclass: class.superclass.clone(),
            imports: program.imports.iter().map(|i| i.dotted()).collect(),
            fields,
            methods,
        })
    }

    pub fn method(&self, name: &str) -> Option<&MethodSignature> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn field(&self, name: &str) -> Option<&Symbol> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Dotted import whose last segment is `simple`
    pub fn import_for(&self, simple: &str) -> Option<&str> {
        self.imports
            .iter()
            .map(String::as_str)
            .find(|i| i.rsplit('.').next() == Some(simple))
    }

    /// Check if `name` is an imported simple name
    pub fn is_import(&self, name: &str) -> bool {
        self.import_for(name).is_some()
    }
}
