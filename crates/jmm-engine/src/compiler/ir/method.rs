//! IR Methods
//!
//! A method holds its flat instruction list, the label map and the var table
//! assigning one virtual register per receiver, parameter, local and
//! temporary. Register 0 is the receiver in instance methods.

use super::instr::{IrInstr, Place};
use super::value::{IrType, Operand};
use crate::ast::Access;
use crate::compiler::error::{CompileError, CompileResult};
use rustc_hash::{FxHashMap, FxHashSet};

/// Var table key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VarKey {
    /// `this`
    Receiver,
    /// Parameter or local by name
    Named(String),
    /// Temporary by id
    Temp(u32),
}

/// Var table entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarDescriptor {
    pub register: u32,
    pub ty: IrType,
}

/// Named and typed parameter or local
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrVar {
    pub name: String,
    pub ty: IrType,
}

/// An IR method
#[derive(Debug, Clone)]
pub struct IrMethod {
    pub name: String,
    pub access: Access,
    pub is_static: bool,
    pub is_final: bool,
    pub params: Vec<IrVar>,
    pub return_type: IrType,
    pub locals: Vec<IrVar>,
    pub var_table: FxHashMap<VarKey, VarDescriptor>,
    pub instructions: Vec<IrInstr>,
    /// Label name to index of its `Label` instruction
    pub labels: FxHashMap<String, usize>,
    next_register: u32,
}

impl IrMethod {
    /// Create a method with an empty body. Instance methods get the receiver
    /// in register 0.
    pub fn new(
        name: impl Into<String>,
        class: &str,
        is_static: bool,
        return_type: IrType,
    ) -> Self {
        let mut method = Self {
            name: name.into(),
            access: Access::Public,
            is_static,
            is_final: false,
            params: Vec::new(),
            return_type,
            locals: Vec::new(),
            var_table: FxHashMap::default(),
            instructions: Vec::new(),
            labels: FxHashMap::default(),
            next_register: 0,
        };
        if !is_static {
            method.bind(VarKey::Receiver, IrType::Class(class.to_string()));
        }
        method
    }

    fn bind(&mut self, key: VarKey, ty: IrType) -> u32 {
        if let Some(existing) = self.var_table.get(&key) {
            return existing.register;
        }
        let register = self.next_register;
        self.next_register += 1;
        self.var_table.insert(key, VarDescriptor { register, ty });
        register
    }

    /// Add a parameter; parameters must be added before locals
    pub fn add_param(&mut self, name: impl Into<String>, ty: IrType) -> u32 {
        let name = name.into();
        self.params.push(IrVar {
            name: name.clone(),
            ty: ty.clone(),
        });
        self.bind(VarKey::Named(name), ty)
    }

    /// Declare a local. A local shadowing a parameter shares its register.
    pub fn add_local(&mut self, name: impl Into<String>, ty: IrType) -> u32 {
        let name = name.into();
        self.locals.push(IrVar {
            name: name.clone(),
            ty: ty.clone(),
        });
        self.bind(VarKey::Named(name), ty)
    }

    /// Install the body: registers temporaries in definition order, builds
    /// the label map and validates the result.
    pub fn set_body(&mut self, instructions: Vec<IrInstr>) -> CompileResult<()> {
        self.labels.clear();
        for (index, instr) in instructions.iter().enumerate() {
            if let IrInstr::Label(label) = instr {
                if self.labels.insert(label.clone(), index).is_some() {
                    return Err(CompileError::DuplicateLabel {
                        label: label.clone(),
                        method: self.name.clone(),
                    });
                }
            }
            if let IrInstr::Assign {
                dest: Place::Var(Operand::Temp { id, ty }),
                ..
            } = instr
            {
                self.bind(VarKey::Temp(*id), ty.clone());
            }
        }
        self.instructions = instructions;
        self.validate()
    }

    /// Check label and temporary invariants
    ///
    /// - every jump target has a `Label` in this method
    /// - every temporary is assigned (textually) before its first use
    /// - every named operand is in the var table
    pub fn validate(&self) -> CompileResult<()> {
        let mut defined: FxHashSet<u32> = FxHashSet::default();
        for instr in &self.instructions {
            if let Some(label) = instr.jump_target() {
                if !self.labels.contains_key(label) {
                    return Err(CompileError::UndefinedLabel {
                        label: label.to_string(),
                        method: self.name.clone(),
                    });
                }
            }
            for op in instr.used_operands() {
                match op {
                    Operand::Temp { id, .. } if !defined.contains(id) => {
                        return Err(CompileError::contract(format!(
                            "temporary t{} used before definition in {}",
                            id, self.name
                        )));
                    }
                    Operand::Local { name, .. } if self.register_of(op).is_none() => {
                        return Err(CompileError::UnresolvedName {
                            name: name.clone(),
                            method: self.name.clone(),
                        });
                    }
                    _ => {}
                }
            }
            if let Some(id) = instr.defined_temp() {
                defined.insert(id);
            }
        }
        Ok(())
    }

    /// Register holding the operand, if it is stored in one
    pub fn register_of(&self, operand: &Operand) -> Option<u32> {
        let key = match operand {
            Operand::Local { name, .. } => VarKey::Named(name.clone()),
            Operand::Temp { id, .. } => VarKey::Temp(*id),
            Operand::Receiver { .. } => VarKey::Receiver,
            Operand::Literal(_) | Operand::ClassRef(_) => return None,
        };
        self.var_table.get(&key).map(|d| d.register)
    }

    /// Highest register in the var table
    pub fn max_register(&self) -> Option<u32> {
        self.var_table.values().map(|d| d.register).max()
    }

    /// Slots needed for `.limit locals`
    pub fn locals_limit(&self) -> u32 {
        self.max_register().map_or(0, |r| r + 1)
    }

    /// Number of temporaries in the var table
    pub fn temp_count(&self) -> usize {
        self.var_table
            .keys()
            .filter(|k| matches!(k, VarKey::Temp(_)))
            .count()
    }
}
