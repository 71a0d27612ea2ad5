//! Statement AST nodes

use super::expression::Expression;
use serde::{Deserialize, Serialize};

/// Statement (no value)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statement {
    /// Assignment to a local, parameter or field: x = e;
    Assign {
        /// Assigned name
        target: String,
        /// Assigned value
        value: Expression,
    },

    /// Array element assignment: a[i] = e;
    ArrayAssign {
        /// Array variable name
        target: String,
        /// Index expression
        index: Expression,
        /// Assigned value
        value: Expression,
    },

    /// if (c) then else
    If {
        /// Condition
        condition: Expression,
        /// Branch taken when the condition holds
        then_branch: Box<Statement>,
        /// Branch taken otherwise
        else_branch: Box<Statement>,
    },

    /// while (c) body
    While {
        /// Loop condition
        condition: Expression,
        /// Loop body
        body: Box<Statement>,
    },

    /// { s1 s2 ... }
    Block(Vec<Statement>),

    /// return e; / return;
    Return(Option<Expression>),

    /// Expression statement: e;
    Expr(Expression),
}

impl Statement {
    /// `target = value;`
    pub fn assign(target: impl Into<String>, value: Expression) -> Self {
        Statement::Assign {
            target: target.into(),
            value,
        }
    }

    /// `target[index] = value;`
    pub fn array_assign(target: impl Into<String>, index: Expression, value: Expression) -> Self {
        Statement::ArrayAssign {
            target: target.into(),
            index,
            value,
        }
    }

    /// `if (condition) then_branch else else_branch`
    pub fn if_else(condition: Expression, then_branch: Statement, else_branch: Statement) -> Self {
        Statement::If {
            condition,
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        }
    }

    /// `while (condition) body`
    pub fn while_loop(condition: Expression, body: Statement) -> Self {
        Statement::While {
            condition,
            body: Box::new(body),
        }
    }

    /// `return value;`
    pub fn ret(value: Expression) -> Self {
        Statement::Return(Some(value))
    }

    /// Check if this statement unconditionally ends with a return
    pub fn ends_with_return(&self) -> bool {
        match self {
            Statement::Return(_) => true,
            Statement::Block(stmts) => stmts.last().is_some_and(Statement::ends_with_return),
            Statement::If {
                then_branch,
                else_branch,
                ..
            } => then_branch.ends_with_return() && else_branch.ends_with_return(),
            _ => false,
        }
    }
}
