//! Method Emission Context
//!
//! Per-method state while emitting Jasmin: the output buffer, the simulated
//! operand stack and the object whose constructor call is pending.

use super::emit::{self, ClassResolver, STRING_CLASS};
use crate::compiler::error::{CompileError, CompileResult};
use crate::compiler::ir::{
    BinaryOp, Call, CallKind, ClassUnit, IrInstr, IrMethod, IrType, IrValue, Literal, Operand,
    Place,
};
use crate::compiler::options::{CompileOptions, NegationLowering, StackLimitPolicy};
use std::fmt::Write;
use tracing::{trace, warn};

/// Simulated operand stack depth
///
/// Tracks both the exact historical peak and a conservative bound: the
/// depth at the start of each instruction plus every push it makes.
#[derive(Debug, Clone, Default)]
pub struct StackTracker {
    depth: u32,
    peak: u32,
    conservative_peak: u32,
    instr_start: u32,
    instr_pushes: u32,
}

impl StackTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the start of an IR instruction
    pub fn begin_instruction(&mut self) {
        self.instr_start = self.depth;
        self.instr_pushes = 0;
    }

    pub fn push(&mut self, count: u32) {
        self.depth += count;
        self.peak = self.peak.max(self.depth);
        self.instr_pushes += count;
        self.conservative_peak = self
            .conservative_peak
            .max(self.instr_start + self.instr_pushes);
    }

    /// Never goes below zero
    pub fn pop(&mut self, count: u32) {
        self.depth = self.depth.saturating_sub(count);
    }

    /// Reset the depth at a branch merge
    pub fn set_depth(&mut self, depth: u32) {
        self.depth = depth;
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn peak(&self) -> u32 {
        self.peak
    }

    /// Value for `.limit stack`
    pub fn limit(&self, policy: StackLimitPolicy) -> u32 {
        match policy {
            StackLimitPolicy::Exact => self.peak,
            StackLimitPolicy::Conservative => self.conservative_peak.max(self.peak),
        }
    }
}

/// Emission state for one method body
pub struct MethodContext<'g> {
    method: &'g IrMethod,
    class: &'g ClassUnit,
    resolver: &'g ClassResolver,
    options: &'g CompileOptions,
    next_label: &'g mut u32,
    pub stack: StackTracker,
    code: String,
    /// Object whose `new; dup` copy is still on the stack awaiting `<init>`
    pending_init: Option<Operand>,
    warned_self_xor: bool,
}

impl<'g> MethodContext<'g> {
    pub fn new(
        method: &'g IrMethod,
        class: &'g ClassUnit,
        resolver: &'g ClassResolver,
        options: &'g CompileOptions,
        next_label: &'g mut u32,
    ) -> Self {
        Self {
            method,
            class,
            resolver,
            options,
            next_label,
            stack: StackTracker::new(),
            code: String::new(),
            pending_init: None,
            warned_self_xor: false,
        }
    }

    /// Emitted instruction lines
    pub fn into_code(self) -> String {
        self.code
    }

    fn emit(&mut self, instr: &str) {
        let _ = writeln!(self.code, "    {}", instr);
    }

    fn emit_label(&mut self, label: &str) {
        let _ = writeln!(self.code, "{}:", label);
    }

    fn fresh_label(&mut self, prefix: &str) -> String {
        let label = format!("{}_{}", prefix, *self.next_label);
        *self.next_label += 1;
        trace!(label = %label, "allocated emitter label");
        label
    }

    // ========================================================================
    // Operands
    // ========================================================================

    fn register(&self, operand: &Operand) -> CompileResult<u32> {
        self.method.register_of(operand).ok_or_else(|| {
            CompileError::contract(format!(
                "operand {} has no register in method {}",
                operand, self.method.name
            ))
        })
    }

    fn load(&mut self, operand: &Operand) -> CompileResult<()> {
        let instr = match operand {
            Operand::Literal(Literal::Int(value)) => emit::push_int(*value),
            Operand::Literal(Literal::Bool(value)) => emit::push_int(i32::from(*value)),
            Operand::Local { ty, .. } | Operand::Temp { ty, .. } => {
                emit::load(ty, self.register(operand)?)
            }
            Operand::Receiver { .. } => "aload_0".to_string(),
            Operand::ClassRef(name) => {
                return Err(CompileError::unsupported(format!(
                    "class name '{}' used as a value",
                    name
                )))
            }
        };
        self.emit(&instr);
        self.stack.push(1);
        Ok(())
    }

    fn store(&mut self, operand: &Operand) -> CompileResult<()> {
        let instr = match operand {
            Operand::Local { ty, .. } | Operand::Temp { ty, .. } => {
                emit::store(ty, self.register(operand)?)
            }
            other => {
                return Err(CompileError::contract(format!(
                    "cannot store into {}",
                    other
                )))
            }
        };
        self.emit(&instr);
        self.stack.pop(1);
        Ok(())
    }

    /// Internal name of the class an object operand belongs to
    fn owner_of(&self, object: &Operand) -> CompileResult<String> {
        match object.ty() {
            IrType::Class(name) => Ok(self.resolver.internal_name(&name)),
            IrType::String => Ok(STRING_CLASS.to_string()),
            other => Err(CompileError::contract(format!(
                "{} of type {} is not an object",
                object, other
            ))),
        }
    }

    // ========================================================================
    // Instructions
    // ========================================================================

    /// Emit one IR instruction
    pub fn emit_instr(&mut self, instr: &IrInstr) -> CompileResult<()> {
        self.stack.begin_instruction();
        self.settle_pending_init(instr);

        match instr {
            IrInstr::Assign {
                dest: Place::Var(dest),
                value: IrValue::Call(call),
            } if call.kind == CallKind::New && !call.is_array_new() => {
                let class = self.resolver.internal_name(&class_name_of(call)?);
                self.emit(&format!("new {}", class));
                self.emit("dup");
                self.stack.push(2);
                self.store(dest)?;
                self.pending_init = Some(dest.clone());
            }

            IrInstr::Assign {
                dest: Place::Var(dest),
                value,
            } => {
                if value.ty().is_void() {
                    return Err(CompileError::contract(format!(
                        "void value assigned to {}",
                        dest
                    )));
                }
                self.emit_value(value)?;
                self.store(dest)?;
            }

            IrInstr::Assign {
                dest: Place::Element { array, index, ty },
                value,
            } => {
                self.load(array)?;
                self.load(index)?;
                self.emit_value(value)?;
                self.emit(emit::array_store(ty));
                self.stack.pop(3);
            }

            IrInstr::PutField {
                object,
                field,
                value,
            } => {
                let owner = self.owner_of(object)?;
                let ty = self
                    .class
                    .field(field)
                    .filter(|_| owner == self.resolver.class_name())
                    .map(|f| f.ty.clone())
                    .unwrap_or_else(|| value.ty());
                self.load(object)?;
                self.load(value)?;
                let desc = self.resolver.descriptor(&ty);
                self.emit(&format!("putfield {}/{} {}", owner, field, desc));
                self.stack.pop(2);
            }

            IrInstr::Call(call) => {
                if call.kind == CallKind::New && !call.is_array_new() {
                    return Err(CompileError::contract(
                        "object allocation must be assigned to a variable",
                    ));
                }
                self.emit_call(call)?;
                if !call.return_type.is_void() {
                    self.emit("pop");
                    self.stack.pop(1);
                }
            }

            IrInstr::Label(label) => self.emit_label(label),

            IrInstr::Goto(label) => self.emit(&format!("goto {}", label)),

            IrInstr::CondGoto { condition, label } => match condition {
                IrValue::Binary {
                    op: BinaryOp::Lt,
                    left,
                    right,
                } => {
                    self.load(left)?;
                    self.load(right)?;
                    self.emit(&format!("if_icmplt {}", label));
                    self.stack.pop(2);
                }
                other => {
                    self.emit_value(other)?;
                    self.emit(&format!("ifne {}", label));
                    self.stack.pop(1);
                }
            },

            IrInstr::Return(Some(value)) => {
                self.load(value)?;
                self.emit(emit::return_instr(&self.method.return_type));
                self.stack.pop(1);
            }

            IrInstr::Return(None) => self.emit("return"),
        }
        Ok(())
    }

    /// Drop a `new; dup` copy that is not consumed by the next instruction
    fn settle_pending_init(&mut self, next: &IrInstr) {
        let Some(pending) = self.pending_init.take() else {
            return;
        };
        let consumed = matches!(
            next,
            IrInstr::Call(Call { kind: CallKind::InvokeSpecial, target, .. }) if *target == pending
        );
        if consumed {
            self.pending_init = Some(pending);
        } else {
            self.emit("pop");
            self.stack.pop(1);
        }
    }

    /// Leave a pending constructor copy balanced at the end of the body
    pub fn finish(&mut self) {
        if self.pending_init.take().is_some() {
            self.emit("pop");
            self.stack.pop(1);
        }
    }

    /// Push the value of an expression
    fn emit_value(&mut self, value: &IrValue) -> CompileResult<()> {
        match value {
            IrValue::Operand(operand) => self.load(operand),

            IrValue::Binary {
                op: BinaryOp::Lt,
                left,
                right,
            } => {
                let on_true = self.fresh_label("cmp_true");
                let end = self.fresh_label("cmp_end");
                self.load(left)?;
                self.load(right)?;
                self.emit(&format!("if_icmplt {}", on_true));
                self.stack.pop(2);
                let base = self.stack.depth();
                self.emit("iconst_0");
                self.stack.push(1);
                self.emit(&format!("goto {}", end));
                self.emit_label(&on_true);
                self.stack.set_depth(base);
                self.emit("iconst_1");
                self.stack.push(1);
                self.emit_label(&end);
                Ok(())
            }

            IrValue::Binary { op, left, right } => {
                let mnemonic = emit::arithmetic(*op)
                    .ok_or_else(|| CompileError::contract("comparison without a mnemonic"))?;
                self.load(left)?;
                self.load(right)?;
                self.emit(mnemonic);
                self.stack.pop(2);
                self.stack.push(1);
                Ok(())
            }

            IrValue::Unary { operand, .. } => {
                self.load(operand)?;
                match self.options.negation {
                    NegationLowering::SelfXor => {
                        if !self.warned_self_xor {
                            warn!(
                                method = %self.method.name,
                                "negation emitted as self-xor, which always yields 0"
                            );
                            self.warned_self_xor = true;
                        }
                        self.load(operand)?;
                    }
                    NegationLowering::XorOne => {
                        self.emit("iconst_1");
                        self.stack.push(1);
                    }
                }
                self.emit("ixor");
                self.stack.pop(2);
                self.stack.push(1);
                Ok(())
            }

            IrValue::GetField { object, field, ty } => {
                let owner = self.owner_of(object)?;
                self.load(object)?;
                let desc = self.resolver.descriptor(ty);
                self.emit(&format!("getfield {}/{} {}", owner, field, desc));
                self.stack.pop(1);
                self.stack.push(1);
                Ok(())
            }

            IrValue::ArrayLoad { array, index, ty } => {
                self.load(array)?;
                self.load(index)?;
                self.emit(emit::array_load(ty));
                self.stack.pop(2);
                self.stack.push(1);
                Ok(())
            }

            IrValue::Call(call) => self.emit_call(call),
        }
    }

    /// Emit a call; non-void results are left on the stack
    fn emit_call(&mut self, call: &Call) -> CompileResult<()> {
        match call.kind {
            CallKind::New => {
                let element = call.return_type.element().ok_or_else(|| {
                    CompileError::contract("object allocation outside an assignment")
                })?;
                let size = call
                    .args
                    .first()
                    .ok_or_else(|| CompileError::contract("array allocation without a size"))?;
                self.load(size)?;
                let instr = match element {
                    IrType::Int32 => "newarray int".to_string(),
                    IrType::Bool => "newarray boolean".to_string(),
                    other => format!("anewarray {}", self.resolver.array_class(other)),
                };
                self.emit(&instr);
                self.stack.pop(1);
                self.stack.push(1);
                Ok(())
            }

            CallKind::ArrayLength => {
                self.load(&call.target)?;
                self.emit("arraylength");
                self.stack.pop(1);
                self.stack.push(1);
                Ok(())
            }

            CallKind::InvokeSpecial | CallKind::InvokeVirtual | CallKind::InvokeStatic => {
                let name = call.method.as_deref().ok_or_else(|| {
                    CompileError::contract(format!("{} without a method name", call.kind.name()))
                })?;
                let owner = match (&call.kind, &call.target) {
                    (CallKind::InvokeStatic, Operand::ClassRef(class)) => {
                        self.resolver.internal_name(class)
                    }
                    (_, target) => self.owner_of(target)?,
                };

                let mut popped = call.args.len() as u32;
                match call.kind {
                    CallKind::InvokeStatic => {}
                    CallKind::InvokeSpecial if self.pending_init.as_ref() == Some(&call.target) => {
                        self.pending_init = None;
                        popped += 1;
                    }
                    _ => {
                        self.load(&call.target)?;
                        popped += 1;
                    }
                }
                for arg in &call.args {
                    self.load(arg)?;
                }

                let descriptor = self.call_descriptor(&owner, name, call);
                self.emit(&format!(
                    "{} {}/{}{}",
                    call.kind.name(),
                    owner,
                    name,
                    descriptor
                ));
                self.stack.pop(popped);
                if !call.return_type.is_void() {
                    self.stack.push(1);
                }
                Ok(())
            }
        }
    }

    /// Descriptor of a call: declared signature for methods of this class,
    /// otherwise the argument types
    fn call_descriptor(&self, owner: &str, name: &str, call: &Call) -> String {
        if owner == self.resolver.class_name() {
            if let Some(method) = self.class.method(name) {
                return self
                    .resolver
                    .method_descriptor(method.params.iter().map(|p| &p.ty), &method.return_type);
            }
        }
        let arg_types: Vec<IrType> = call.args.iter().map(Operand::ty).collect();
        self.resolver
            .method_descriptor(arg_types.iter(), &call.return_type)
    }
}

fn class_name_of(call: &Call) -> CompileResult<String> {
    match &call.return_type {
        IrType::Class(name) => Ok(name.clone()),
        other => Err(CompileError::contract(format!(
            "allocation of non-class type {}",
            other
        ))),
    }
}
