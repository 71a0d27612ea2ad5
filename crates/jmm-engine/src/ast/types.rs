//! Source-level types of the Java-- language

use serde::{Deserialize, Serialize};
use std::fmt;

/// A type as written in (or inferred for) Java-- source
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Type {
    /// `int` (32-bit signed integer)
    Int,
    /// `boolean`
    Boolean,
    /// `String`
    String,
    /// `void` (method return type only)
    Void,
    /// A class referenced by its simple name (own class or an import)
    Class(String),
    /// `T[]` (and `T...` for varargs parameters)
    Array(Box<Type>),
}

impl Type {
    /// Create an array type with the given element type
    pub fn array_of(element: Type) -> Self {
        Type::Array(Box::new(element))
    }

    /// Create a class type
    pub fn class(name: impl Into<String>) -> Self {
        Type::Class(name.into())
    }

    /// `int[]`, the most common array type
    pub fn int_array() -> Self {
        Type::array_of(Type::Int)
    }

    /// Check if this is an array type
    pub fn is_array(&self) -> bool {
        matches!(self, Type::Array(_))
    }

    /// Check if this is `void`
    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    /// Element type of an array type
    pub fn element(&self) -> Option<&Type> {
        match self {
            Type::Array(elem) => Some(elem),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Boolean => write!(f, "boolean"),
            Type::String => write!(f, "String"),
            Type::Void => write!(f, "void"),
            Type::Class(name) => write!(f, "{}", name),
            Type::Array(elem) => write!(f, "{}[]", elem),
        }
    }
}
