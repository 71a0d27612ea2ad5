//! Constant Folding Optimization
//!
//! Evaluates constant expressions at compile time.

use super::Rewrite;
use crate::ast::{BinaryOperator, Expression, MethodDecl, Statement};
use crate::compiler::error::{CompileError, CompileResult};

/// Constant folder for one method
pub struct ConstantFolder<'m> {
    method: &'m str,
    changed: bool,
}

impl<'m> ConstantFolder<'m> {
    pub fn new(method: &'m str) -> Self {
        Self {
            method,
            changed: false,
        }
    }

    /// Fold every expression in a statement
    pub fn fold_stmt(&mut self, stmt: Statement) -> CompileResult<Statement> {
        Ok(match stmt {
            Statement::Assign { target, value } => Statement::Assign {
                target,
                value: self.fold_expr(value)?,
            },
            Statement::ArrayAssign {
                target,
                index,
                value,
            } => Statement::ArrayAssign {
                target,
                index: self.fold_expr(index)?,
                value: self.fold_expr(value)?,
            },
            Statement::If {
                condition,
                then_branch,
                else_branch,
            } => Statement::If {
                condition: self.fold_expr(condition)?,
                then_branch: Box::new(self.fold_stmt(*then_branch)?),
                else_branch: Box::new(self.fold_stmt(*else_branch)?),
            },
            Statement::While { condition, body } => Statement::While {
                condition: self.fold_expr(condition)?,
                body: Box::new(self.fold_stmt(*body)?),
            },
            Statement::Block(stmts) => Statement::Block(
                stmts
                    .into_iter()
                    .map(|s| self.fold_stmt(s))
                    .collect::<CompileResult<_>>()?,
            ),
            Statement::Return(value) => {
                Statement::Return(value.map(|v| self.fold_expr(v)).transpose()?)
            }
            Statement::Expr(expr) => Statement::Expr(self.fold_expr(expr)?),
        })
    }

    /// Fold an expression bottom-up
    pub fn fold_expr(&mut self, expr: Expression) -> CompileResult<Expression> {
        Ok(match expr {
            Expression::Paren(inner) => match self.fold_expr(*inner)? {
                lit if lit.is_literal() => {
                    self.changed = true;
                    lit
                }
                other => Expression::paren(other),
            },

            Expression::Binary { op, left, right } => {
                let left = self.fold_expr(*left)?;
                let right = self.fold_expr(*right)?;
                match self.eval_binary(op, &left, &right)? {
                    Some(folded) => {
                        self.changed = true;
                        folded
                    }
                    None => Expression::binary(op, left, right),
                }
            }

            Expression::Not(operand) => match self.fold_expr(*operand)? {
                Expression::BoolLiteral(b) => {
                    self.changed = true;
                    Expression::BoolLiteral(!b)
                }
                other => Expression::not(other),
            },

            Expression::NewArray { element, size } => Expression::NewArray {
                element,
                size: Box::new(self.fold_expr(*size)?),
            },
            Expression::ArrayLiteral(elements) => Expression::ArrayLiteral(
                elements
                    .into_iter()
                    .map(|e| self.fold_expr(e))
                    .collect::<CompileResult<_>>()?,
            ),
            Expression::Index { array, index } => {
                Expression::index(self.fold_expr(*array)?, self.fold_expr(*index)?)
            }
            Expression::Length(array) => Expression::length(self.fold_expr(*array)?),
            Expression::MethodCall {
                target,
                method,
                args,
            } => Expression::MethodCall {
                target: Box::new(self.fold_expr(*target)?),
                method,
                args: args
                    .into_iter()
                    .map(|a| self.fold_expr(a))
                    .collect::<CompileResult<_>>()?,
            },

            leaf @ (Expression::IntLiteral(_)
            | Expression::BoolLiteral(_)
            | Expression::This
            | Expression::Var(_)
            | Expression::NewObject(_)) => leaf,
        })
    }

    /// Evaluate an operator over two literals with 32-bit wrapping semantics
    fn eval_binary(
        &self,
        op: BinaryOperator,
        left: &Expression,
        right: &Expression,
    ) -> CompileResult<Option<Expression>> {
        let folded = match (left, right) {
            (Expression::IntLiteral(l), Expression::IntLiteral(r)) => match op {
                BinaryOperator::Add => Some(Expression::IntLiteral(l.wrapping_add(*r))),
                BinaryOperator::Sub => Some(Expression::IntLiteral(l.wrapping_sub(*r))),
                BinaryOperator::Mul => Some(Expression::IntLiteral(l.wrapping_mul(*r))),
                BinaryOperator::Div => {
                    if *r == 0 {
                        return Err(CompileError::DivisionByZero {
                            method: self.method.to_string(),
                        });
                    }
                    Some(Expression::IntLiteral(l.wrapping_div(*r)))
                }
                BinaryOperator::Lt => Some(Expression::BoolLiteral(l < r)),
                BinaryOperator::And | BinaryOperator::Or => None,
            },
            (Expression::BoolLiteral(l), Expression::BoolLiteral(r)) => match op {
                BinaryOperator::And => Some(Expression::BoolLiteral(*l && *r)),
                BinaryOperator::Or => Some(Expression::BoolLiteral(*l || *r)),
                _ => None,
            },
            _ => None,
        };
        Ok(folded)
    }
}

/// One folding pass over a method
pub fn fold(mut method: MethodDecl) -> CompileResult<Rewrite<MethodDecl>> {
    let body = std::mem::take(&mut method.body);
    let mut folder = ConstantFolder::new(&method.name);
    let body = body
        .into_iter()
        .map(|s| folder.fold_stmt(s))
        .collect::<CompileResult<Vec<_>>>()?;
    let changed = folder.changed;
    method.body = body;
    Ok(Rewrite {
        node: method,
        changed,
    })
}
