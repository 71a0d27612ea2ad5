//! IR Modules
//!
//! A module holds the lowered classes of one compilation.

use super::method::IrMethod;
use super::value::{IrType, Literal};
use crate::ast::Access;

/// A field of a lowered class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrField {
    pub name: String,
    pub ty: IrType,
    pub access: Access,
    pub is_static: bool,
    pub is_final: bool,
    pub initial_value: Option<Literal>,
}

/// A lowered class, immutable once built
#[derive(Debug, Clone)]
pub struct ClassUnit {
    pub name: String,
    pub superclass: Option<String>,
    /// Dotted import names
    pub imports: Vec<String>,
    pub fields: Vec<IrField>,
    /// Methods in declaration order
    pub methods: Vec<IrMethod>,
}

impl ClassUnit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            superclass: None,
            imports: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn method(&self, name: &str) -> Option<&IrMethod> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn field(&self, name: &str) -> Option<&IrField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// The IR produced by one compilation
#[derive(Debug, Clone, Default)]
pub struct IrModule {
    pub classes: Vec<ClassUnit>,
}

impl IrModule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_class(&mut self, class: ClassUnit) {
        self.classes.push(class);
    }

    pub fn class(&self, name: &str) -> Option<&ClassUnit> {
        self.classes.iter().find(|c| c.name == name)
    }
}
