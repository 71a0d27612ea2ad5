//! IR Values and Operands
//!
//! Every operand carries its type tag, decided once during lowering. The
//! emitter selects load/store/return instructions from that tag alone.

use crate::ast::Type;
use std::fmt;

/// IR type tag
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IrType {
    /// 32-bit signed integer
    Int32,
    /// Boolean (0/1 on the operand stack)
    Bool,
    /// `java/lang/String`
    String,
    /// Class reference by simple name (resolved against imports at emission)
    Class(String),
    /// Array of the element type
    Array(Box<IrType>),
    /// No value
    Void,
}

impl IrType {
    /// Array type with the given element type
    pub fn array_of(element: IrType) -> Self {
        IrType::Array(Box::new(element))
    }

    /// Element type of an array type
    pub fn element(&self) -> Option<&IrType> {
        match self {
            IrType::Array(elem) => Some(elem),
            _ => None,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, IrType::Void)
    }

    /// Check if values of this type live in the stack as references
    pub fn is_reference(&self) -> bool {
        matches!(self, IrType::String | IrType::Class(_) | IrType::Array(_))
    }
}

impl From<&Type> for IrType {
    fn from(ty: &Type) -> Self {
        match ty {
            Type::Int => IrType::Int32,
            Type::Boolean => IrType::Bool,
            Type::String => IrType::String,
            Type::Void => IrType::Void,
            Type::Class(name) => IrType::Class(name.clone()),
            Type::Array(elem) => IrType::array_of(IrType::from(elem.as_ref())),
        }
    }
}

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrType::Int32 => write!(f, "i32"),
            IrType::Bool => write!(f, "bool"),
            IrType::String => write!(f, "String"),
            IrType::Class(name) => write!(f, "{}", name),
            IrType::Array(elem) => write!(f, "array.{}", elem),
            IrType::Void => write!(f, "V"),
        }
    }
}

/// Constant values in IR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Literal {
    Int(i32),
    Bool(bool),
}

impl Literal {
    pub fn ty(&self) -> IrType {
        match self {
            Literal::Int(_) => IrType::Int32,
            Literal::Bool(_) => IrType::Bool,
        }
    }

    /// Value as pushed on the operand stack
    pub fn as_i32(&self) -> i32 {
        match self {
            Literal::Int(v) => *v,
            Literal::Bool(b) => i32::from(*b),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(v) => write!(f, "{}.i32", v),
            Literal::Bool(b) => write!(f, "{}.bool", i32::from(*b)),
        }
    }
}

/// Value-denoting operand
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operand {
    /// Constant
    Literal(Literal),
    /// Named local or parameter
    Local { name: String, ty: IrType },
    /// Compiler temporary
    Temp { id: u32, ty: IrType },
    /// `this`
    Receiver { class: String },
    /// Class or import name used as a static call target (never loaded)
    ClassRef(String),
}

impl Operand {
    pub fn int(value: i32) -> Self {
        Operand::Literal(Literal::Int(value))
    }

    pub fn bool(value: bool) -> Self {
        Operand::Literal(Literal::Bool(value))
    }

    pub fn local(name: impl Into<String>, ty: IrType) -> Self {
        Operand::Local {
            name: name.into(),
            ty,
        }
    }

    /// Type tag of the operand
    pub fn ty(&self) -> IrType {
        match self {
            Operand::Literal(lit) => lit.ty(),
            Operand::Local { ty, .. } | Operand::Temp { ty, .. } => ty.clone(),
            Operand::Receiver { class } => IrType::Class(class.clone()),
            Operand::ClassRef(name) => IrType::Class(name.clone()),
        }
    }

    pub fn is_temp(&self) -> bool {
        matches!(self, Operand::Temp { .. })
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Literal(lit) => write!(f, "{}", lit),
            Operand::Local { name, ty } => write!(f, "{}.{}", name, ty),
            Operand::Temp { id, ty } => write!(f, "t{}.{}", id, ty),
            Operand::Receiver { class } => write!(f, "this.{}", class),
            Operand::ClassRef(name) => write!(f, "{}", name),
        }
    }
}
