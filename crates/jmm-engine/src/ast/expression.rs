//! Expression AST nodes
//!
//! Expressions of the Java-- language:
//! - Literals (`int`, `boolean`) and `this`
//! - Variable references (locals, parameters, fields, imported class names)
//! - Arithmetic, relational and logical operators
//! - Array creation, literals, indexing and `length`
//! - Object creation and method calls

use super::types::Type;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Expression (produces a value)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expression {
    /// Integer literal: 42
    IntLiteral(i32),

    /// Boolean literal: true, false
    BoolLiteral(bool),

    /// `this`
    This,

    /// Name reference: local, parameter, field or imported class
    Var(String),

    /// Parenthesized expression: (e)
    Paren(Box<Expression>),

    /// Binary expression: a + b, a < b, a && b
    Binary {
        /// Operator
        op: BinaryOperator,
        /// Left operand
        left: Box<Expression>,
        /// Right operand
        right: Box<Expression>,
    },

    /// Logical negation: !e
    Not(Box<Expression>),

    /// Array creation: new int[n]
    NewArray {
        /// Element type
        element: Type,
        /// Length expression
        size: Box<Expression>,
    },

    /// Array literal: [1, 2, 3]
    ArrayLiteral(Vec<Expression>),

    /// Array element access: a[i]
    Index {
        /// Array expression
        array: Box<Expression>,
        /// Index expression
        index: Box<Expression>,
    },

    /// Array length: a.length
    Length(Box<Expression>),

    /// Object creation: new C()
    NewObject(String),

    /// Method call: target.method(args)
    MethodCall {
        /// Receiver expression or class name
        target: Box<Expression>,
        /// Method name
        method: String,
        /// Arguments in source order
        args: Vec<Expression>,
    },
}

impl Expression {
    /// Integer literal
    pub fn int(value: i32) -> Self {
        Expression::IntLiteral(value)
    }

    /// Boolean literal
    pub fn bool(value: bool) -> Self {
        Expression::BoolLiteral(value)
    }

    /// Name reference
    pub fn var(name: impl Into<String>) -> Self {
        Expression::Var(name.into())
    }

    /// Parenthesized expression
    pub fn paren(inner: Expression) -> Self {
        Expression::Paren(Box::new(inner))
    }

    /// Binary expression
    pub fn binary(op: BinaryOperator, left: Expression, right: Expression) -> Self {
        Expression::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Logical negation
    pub fn not(operand: Expression) -> Self {
        Expression::Not(Box::new(operand))
    }

    /// `new T[size]`
    pub fn new_array(element: Type, size: Expression) -> Self {
        Expression::NewArray {
            element,
            size: Box::new(size),
        }
    }

    /// `array[index]`
    pub fn index(array: Expression, index: Expression) -> Self {
        Expression::Index {
            array: Box::new(array),
            index: Box::new(index),
        }
    }

    /// `array.length`
    pub fn length(array: Expression) -> Self {
        Expression::Length(Box::new(array))
    }

    /// `new C()`
    pub fn new_object(class: impl Into<String>) -> Self {
        Expression::NewObject(class.into())
    }

    /// `target.method(args)`
    pub fn call(target: Expression, method: impl Into<String>, args: Vec<Expression>) -> Self {
        Expression::MethodCall {
            target: Box::new(target),
            method: method.into(),
            args,
        }
    }

    /// Check if this expression is an integer or boolean literal
    pub fn is_literal(&self) -> bool {
        matches!(self, Expression::IntLiteral(_) | Expression::BoolLiteral(_))
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOperator {
    /// +
    Add,
    /// -
    Sub,
    /// *
    Mul,
    /// /
    Div,
    /// <
    Lt,
    /// &&
    And,
    /// ||
    Or,
}

impl BinaryOperator {
    /// Arithmetic operators produce `int`
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinaryOperator::Add | BinaryOperator::Sub | BinaryOperator::Mul | BinaryOperator::Div
        )
    }

    /// Short-circuiting logical operators
    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOperator::And | BinaryOperator::Or)
    }

    /// Result type of the operator
    pub fn result_type(&self) -> Type {
        if self.is_arithmetic() {
            Type::Int
        } else {
            Type::Boolean
        }
    }

    /// Type both operands must have
    pub fn operand_type(&self) -> Type {
        if self.is_logical() {
            Type::Boolean
        } else {
            Type::Int
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Lt => "<",
            BinaryOperator::And => "&&",
            BinaryOperator::Or => "||",
        };
        write!(f, "{}", symbol)
    }
}
