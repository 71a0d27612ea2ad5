//! IR Instructions
//!
//! Three-address code instructions for the IR.

use super::value::{IrType, Operand};
use std::fmt;

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    /// Signed less-than, produces a bool
    Lt,
    /// Non-short-circuit boolean and
    And,
}

impl BinaryOp {
    /// Result type of the operator
    pub fn result_type(&self) -> IrType {
        match self {
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => IrType::Int32,
            BinaryOp::Lt | BinaryOp::And => IrType::Bool,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Lt => "<",
            BinaryOp::And => "&&",
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// Logical not
    Not,
}

/// Invocation kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    /// Object or array allocation
    New,
    /// Constructor invocation
    InvokeSpecial,
    /// Instance method invocation
    InvokeVirtual,
    /// Static invocation on a class or import name
    InvokeStatic,
    /// `arraylength`
    ArrayLength,
}

impl CallKind {
    pub fn name(&self) -> &'static str {
        match self {
            CallKind::New => "new",
            CallKind::InvokeSpecial => "invokespecial",
            CallKind::InvokeVirtual => "invokevirtual",
            CallKind::InvokeStatic => "invokestatic",
            CallKind::ArrayLength => "arraylength",
        }
    }
}

/// Marker target of an array allocation
pub const ARRAY_TARGET: &str = "array";

/// A call of any kind
///
/// - `New` of a class: target `ClassRef(C)`, return type `Class(C)`
/// - `New` of an array: target `ClassRef("array")`, one size argument,
///   return type `Array(elem)`
/// - `ArrayLength`: target is the array operand
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub kind: CallKind,
    pub target: Operand,
    pub method: Option<String>,
    pub args: Vec<Operand>,
    pub return_type: IrType,
}

impl Call {
    /// `new C`
    pub fn new_object(class: impl Into<String>) -> Self {
        let class = class.into();
        Self {
            kind: CallKind::New,
            target: Operand::ClassRef(class.clone()),
            method: None,
            args: Vec::new(),
            return_type: IrType::Class(class),
        }
    }

    /// `new elem[size]`
    pub fn new_array(element: IrType, size: Operand) -> Self {
        Self {
            kind: CallKind::New,
            target: Operand::ClassRef(ARRAY_TARGET.to_string()),
            method: None,
            args: vec![size],
            return_type: IrType::array_of(element),
        }
    }

    /// `<init>` on a freshly allocated object
    pub fn constructor(object: Operand) -> Self {
        Self {
            kind: CallKind::InvokeSpecial,
            target: object,
            method: Some("<init>".to_string()),
            args: Vec::new(),
            return_type: IrType::Void,
        }
    }

    /// `array.length`
    pub fn array_length(array: Operand) -> Self {
        Self {
            kind: CallKind::ArrayLength,
            target: array,
            method: None,
            args: Vec::new(),
            return_type: IrType::Int32,
        }
    }

    /// Check if this allocates an array
    pub fn is_array_new(&self) -> bool {
        self.kind == CallKind::New && self.return_type.element().is_some()
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}", self.kind.name(), self.target)?;
        if let Some(method) = &self.method {
            write!(f, ", \"{}\"", method)?;
        }
        for arg in &self.args {
            write!(f, ", {}", arg)?;
        }
        write!(f, ").{}", self.return_type)
    }
}

/// Expression-producing source of an assignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IrValue {
    Operand(Operand),
    Binary {
        op: BinaryOp,
        left: Operand,
        right: Operand,
    },
    Unary {
        op: UnaryOp,
        operand: Operand,
    },
    GetField {
        object: Operand,
        field: String,
        ty: IrType,
    },
    ArrayLoad {
        array: Operand,
        index: Operand,
        ty: IrType,
    },
    Call(Call),
}

impl IrValue {
    /// Type of the produced value
    pub fn ty(&self) -> IrType {
        match self {
            IrValue::Operand(op) => op.ty(),
            IrValue::Binary { op, .. } => op.result_type(),
            IrValue::Unary { .. } => IrType::Bool,
            IrValue::GetField { ty, .. } | IrValue::ArrayLoad { ty, .. } => ty.clone(),
            IrValue::Call(call) => call.return_type.clone(),
        }
    }

    /// Operands read by this value
    pub fn operands(&self) -> Vec<&Operand> {
        match self {
            IrValue::Operand(op) => vec![op],
            IrValue::Binary { left, right, .. } => vec![left, right],
            IrValue::Unary { operand, .. } => vec![operand],
            IrValue::GetField { object, .. } => vec![object],
            IrValue::ArrayLoad { array, index, .. } => vec![array, index],
            IrValue::Call(call) => std::iter::once(&call.target).chain(&call.args).collect(),
        }
    }
}

impl fmt::Display for IrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrValue::Operand(op) => write!(f, "{}", op),
            IrValue::Binary { op, left, right } => {
                write!(f, "{} {}.{} {}", left, op.symbol(), op.result_type(), right)
            }
            IrValue::Unary { operand, .. } => write!(f, "!.bool {}", operand),
            IrValue::GetField { object, field, ty } => {
                write!(f, "getfield({}, {}.{}).{}", object, field, ty, ty)
            }
            IrValue::ArrayLoad { array, index, ty } => write!(f, "{}[{}].{}", array, index, ty),
            IrValue::Call(call) => write!(f, "{}", call),
        }
    }
}

/// Assignment destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Place {
    /// Local, parameter or temporary
    Var(Operand),
    /// Array element
    Element {
        array: Operand,
        index: Operand,
        ty: IrType,
    },
}

impl Place {
    pub fn ty(&self) -> IrType {
        match self {
            Place::Var(op) => op.ty(),
            Place::Element { ty, .. } => ty.clone(),
        }
    }
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Place::Var(op) => write!(f, "{}", op),
            Place::Element { array, index, ty } => write!(f, "{}[{}].{}", array, index, ty),
        }
    }
}

/// IR instruction (Three-Address Code)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IrInstr {
    /// dest = value
    Assign { dest: Place, value: IrValue },

    /// object.field = value
    PutField {
        object: Operand,
        field: String,
        value: Operand,
    },

    /// Call whose result is discarded
    Call(Call),

    /// Branch target
    Label(String),

    /// Unconditional jump
    Goto(String),

    /// Jump when the bool condition holds
    CondGoto { condition: IrValue, label: String },

    /// Return with an optional value
    Return(Option<Operand>),
}

impl IrInstr {
    /// `dest := value` into a variable or temporary
    pub fn assign(dest: Operand, value: IrValue) -> Self {
        IrInstr::Assign {
            dest: Place::Var(dest),
            value,
        }
    }

    /// Temporary defined by this instruction
    pub fn defined_temp(&self) -> Option<u32> {
        match self {
            IrInstr::Assign {
                dest: Place::Var(Operand::Temp { id, .. }),
                ..
            } => Some(*id),
            _ => None,
        }
    }

    /// Operands read by this instruction (array/index of a store included)
    pub fn used_operands(&self) -> Vec<&Operand> {
        match self {
            IrInstr::Assign { dest, value } => {
                let mut ops = value.operands();
                if let Place::Element { array, index, .. } = dest {
                    ops.push(array);
                    ops.push(index);
                }
                ops
            }
            IrInstr::PutField { object, value, .. } => vec![object, value],
            IrInstr::Call(call) => std::iter::once(&call.target).chain(&call.args).collect(),
            IrInstr::CondGoto { condition, .. } => condition.operands(),
            IrInstr::Return(Some(op)) => vec![op],
            IrInstr::Label(_) | IrInstr::Goto(_) | IrInstr::Return(None) => Vec::new(),
        }
    }

    /// Label this instruction jumps to
    pub fn jump_target(&self) -> Option<&str> {
        match self {
            IrInstr::Goto(label) | IrInstr::CondGoto { label, .. } => Some(label),
            _ => None,
        }
    }
}

impl fmt::Display for IrInstr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrInstr::Assign { dest, value } => {
                write!(f, "{} :=.{} {};", dest, dest.ty(), value)
            }
            IrInstr::PutField {
                object,
                field,
                value,
            } => write!(f, "putfield({}, {}.{}, {}).V;", object, field, value.ty(), value),
            IrInstr::Call(call) => write!(f, "{};", call),
            IrInstr::Label(label) => write!(f, "{}:", label),
            IrInstr::Goto(label) => write!(f, "goto {};", label),
            IrInstr::CondGoto { condition, label } => {
                write!(f, "if ({}) goto {};", condition, label)
            }
            IrInstr::Return(Some(op)) => write!(f, "ret.{} {};", op.ty(), op),
            IrInstr::Return(None) => write!(f, "ret.V;"),
        }
    }
}
