//! Constant Propagation
//!
//! Replaces reads of locals and parameters holding a known `int`/`boolean`
//! literal with the literal, and deletes `x = literal` stores once no read
//! can observe them.
//!
//! Knowledge never crosses control flow unsafely:
//! - an `if` branch starts from a copy of the facts before it, and every
//!   variable assigned in either branch is forgotten after it
//! - every variable assigned in a loop body is forgotten before the loop
//!   condition
//!
//! A store is deleted when it is overwritten in the same scope, or when it
//! is still known at the end of the method body. Facts that are forgotten
//! any other way keep their store.

use super::Rewrite;
use crate::ast::{Expression, MethodDecl, Statement};
use crate::compiler::error::CompileResult;
use rustc_hash::{FxHashMap, FxHashSet};

/// A known literal value and the store that produced it
#[derive(Debug, Clone)]
struct Known {
    value: Expression,
    /// Preorder index of the defining assignment
    def: usize,
    /// Branch nesting depth of the definition
    depth: usize,
}

/// Constant propagator for one method
struct Propagator<'m> {
    method: &'m MethodDecl,
    known: FxHashMap<String, Known>,
    deletable: FxHashSet<usize>,
    next_def: usize,
    depth: usize,
    changed: bool,
}

impl<'m> Propagator<'m> {
    fn new(method: &'m MethodDecl) -> Self {
        Self {
            method,
            known: FxHashMap::default(),
            deletable: FxHashSet::default(),
            next_def: 0,
            depth: 0,
            changed: false,
        }
    }

    /// Forget `name`. An overwrite in the defining scope frees its store.
    fn kill(&mut self, name: &str, overwrite: bool) {
        if let Some(known) = self.known.remove(name) {
            if overwrite && known.depth == self.depth {
                self.deletable.insert(known.def);
            }
        }
    }

    /// Run `f` on a copy of the current facts one scope deeper
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = self.known.clone();
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        self.known = saved;
        result
    }

    fn stmt(&mut self, stmt: Statement) -> Statement {
        match stmt {
            Statement::Assign { target, value } => {
                let value = self.expr(value);
                let def = self.next_def;
                self.next_def += 1;
                if self.method.declares(&target) {
                    self.kill(&target, true);
                    if value.is_literal() {
                        self.known.insert(
                            target.clone(),
                            Known {
                                value: value.clone(),
                                def,
                                depth: self.depth,
                            },
                        );
                    }
                }
                Statement::Assign { target, value }
            }

            Statement::ArrayAssign {
                target,
                index,
                value,
            } => Statement::ArrayAssign {
                target,
                index: self.expr(index),
                value: self.expr(value),
            },

            Statement::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let condition = self.expr(condition);
                let mut assigned = FxHashSet::default();
                assigned_vars(&then_branch, &mut assigned);
                assigned_vars(&else_branch, &mut assigned);

                let then_branch = self.nested(|p| p.stmt(*then_branch));
                let else_branch = self.nested(|p| p.stmt(*else_branch));
                for name in &assigned {
                    self.kill(name, false);
                }
                Statement::If {
                    condition,
                    then_branch: Box::new(then_branch),
                    else_branch: Box::new(else_branch),
                }
            }

            Statement::While { condition, body } => {
                let mut assigned = FxHashSet::default();
                assigned_vars(&body, &mut assigned);
                for name in &assigned {
                    self.kill(name, false);
                }
                let condition = self.expr(condition);
                let body = self.nested(|p| p.stmt(*body));
                Statement::While {
                    condition,
                    body: Box::new(body),
                }
            }

            Statement::Block(stmts) => {
                Statement::Block(stmts.into_iter().map(|s| self.stmt(s)).collect())
            }
            Statement::Return(value) => Statement::Return(value.map(|v| self.expr(v))),
            Statement::Expr(expr) => Statement::Expr(self.expr(expr)),
        }
    }

    fn expr(&mut self, expr: Expression) -> Expression {
        match expr {
            Expression::Var(name) => match self.known.get(&name) {
                Some(known) => {
                    self.changed = true;
                    known.value.clone()
                }
                None => Expression::Var(name),
            },
            Expression::Paren(inner) => Expression::paren(self.expr(*inner)),
            Expression::Binary { op, left, right } => {
                let left = self.expr(*left);
                let right = self.expr(*right);
                Expression::binary(op, left, right)
            }
            Expression::Not(operand) => Expression::not(self.expr(*operand)),
            Expression::NewArray { element, size } => Expression::NewArray {
                element,
                size: Box::new(self.expr(*size)),
            },
            Expression::ArrayLiteral(elements) => {
                Expression::ArrayLiteral(elements.into_iter().map(|e| self.expr(e)).collect())
            }
            Expression::Index { array, index } => {
                let array = self.expr(*array);
                let index = self.expr(*index);
                Expression::index(array, index)
            }
            Expression::Length(array) => Expression::length(self.expr(*array)),
            Expression::MethodCall {
                target,
                method,
                args,
            } => {
                let target = self.expr(*target);
                let args = args.into_iter().map(|a| self.expr(a)).collect();
                Expression::call(target, method, args)
            }
            leaf @ (Expression::IntLiteral(_)
            | Expression::BoolLiteral(_)
            | Expression::This
            | Expression::NewObject(_)) => leaf,
        }
    }
}

/// Names assigned (not element-assigned) anywhere in `stmt`
fn assigned_vars(stmt: &Statement, out: &mut FxHashSet<String>) {
    match stmt {
        Statement::Assign { target, .. } => {
            out.insert(target.clone());
        }
        Statement::If {
            then_branch,
            else_branch,
            ..
        } => {
            assigned_vars(then_branch, out);
            assigned_vars(else_branch, out);
        }
        Statement::While { body, .. } => assigned_vars(body, out),
        Statement::Block(stmts) => stmts.iter().for_each(|s| assigned_vars(s, out)),
        Statement::ArrayAssign { .. } | Statement::Return(_) | Statement::Expr(_) => {}
    }
}

/// Drop assignments whose preorder index is in `deletable`
struct StoreRemover<'d> {
    deletable: &'d FxHashSet<usize>,
    next_def: usize,
}

impl StoreRemover<'_> {
    fn stmt(&mut self, stmt: Statement) -> Option<Statement> {
        match stmt {
            Statement::Assign { target, value } => {
                let def = self.next_def;
                self.next_def += 1;
                if self.deletable.contains(&def) {
                    None
                } else {
                    Some(Statement::Assign { target, value })
                }
            }
            Statement::If {
                condition,
                then_branch,
                else_branch,
            } => Some(Statement::If {
                condition,
                then_branch: Box::new(self.branch(*then_branch)),
                else_branch: Box::new(self.branch(*else_branch)),
            }),
            Statement::While { condition, body } => Some(Statement::While {
                condition,
                body: Box::new(self.branch(*body)),
            }),
            Statement::Block(stmts) => Some(Statement::Block(
                stmts.into_iter().filter_map(|s| self.stmt(s)).collect(),
            )),
            other => Some(other),
        }
    }

    fn branch(&mut self, stmt: Statement) -> Statement {
        self.stmt(stmt)
            .unwrap_or_else(|| Statement::Block(Vec::new()))
    }
}

/// One propagation pass over a method
pub fn propagate(mut method: MethodDecl) -> CompileResult<Rewrite<MethodDecl>> {
    let body = std::mem::take(&mut method.body);

    let mut propagator = Propagator::new(&method);
    let body: Vec<Statement> = body.into_iter().map(|s| propagator.stmt(s)).collect();
    let survivors: Vec<usize> = propagator
        .known
        .values()
        .filter(|k| k.depth == 0)
        .map(|k| k.def)
        .collect();
    let mut deletable = std::mem::take(&mut propagator.deletable);
    deletable.extend(survivors);
    let mut changed = propagator.changed;

    let mut remover = StoreRemover {
        deletable: &deletable,
        next_def: 0,
    };
    let body: Vec<Statement> = body.into_iter().filter_map(|s| remover.stmt(s)).collect();
    changed |= !deletable.is_empty();

    method.body = body;
    Ok(Rewrite {
        node: method,
        changed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinaryOperator, Param, Type};

    fn method(body: Vec<Statement>) -> MethodDecl {
        MethodDecl::new("f", Type::Int)
            .with_param(Param::new("c", Type::Boolean))
            .with_local("x", Type::Int)
            .with_local("y", Type::Int)
            .with_body(body)
    }

    fn run(body: Vec<Statement>) -> Rewrite<MethodDecl> {
        propagate(method(body)).unwrap()
    }

    #[test]
    fn test_assign_then_return() {
        let rewrite = run(vec![
            Statement::assign("x", Expression::int(10)),
            Statement::ret(Expression::var("x")),
        ]);
        assert!(rewrite.changed);
        assert_eq!(rewrite.node.body, vec![Statement::ret(Expression::int(10))]);
    }

    #[test]
    fn test_non_literal_assignment_invalidates() {
        let rewrite = run(vec![
            Statement::assign("x", Expression::int(1)),
            Statement::assign("y", Expression::var("x")),
            Statement::assign(
                "x",
                Expression::call(Expression::This, "g", vec![]),
            ),
            Statement::ret(Expression::binary(
                BinaryOperator::Add,
                Expression::var("x"),
                Expression::var("y"),
            )),
        ]);
        // x = 1 is overwritten in the same scope; y = 1 survives to the end
        assert_eq!(
            rewrite.node.body,
            vec![
                Statement::assign("x", Expression::call(Expression::This, "g", vec![])),
                Statement::ret(Expression::binary(
                    BinaryOperator::Add,
                    Expression::var("x"),
                    Expression::int(1),
                )),
            ]
        );
    }

    #[test]
    fn test_fields_not_propagated() {
        let rewrite = run(vec![
            Statement::assign("field", Expression::int(3)),
            Statement::ret(Expression::var("field")),
        ]);
        assert!(!rewrite.changed);
    }

    #[test]
    fn test_conditional_assignment_keeps_store() {
        let body = vec![
            Statement::assign("x", Expression::int(1)),
            Statement::if_else(
                Expression::var("c"),
                Statement::assign("x", Expression::int(2)),
                Statement::Block(vec![]),
            ),
            Statement::ret(Expression::var("x")),
        ];
        let rewrite = run(body.clone());
        assert!(!rewrite.changed);
        assert_eq!(rewrite.node.body, body);
    }

    #[test]
    fn test_branch_reads_outer_fact() {
        let rewrite = run(vec![
            Statement::assign("x", Expression::int(4)),
            Statement::if_else(
                Expression::var("c"),
                Statement::assign("y", Expression::var("x")),
                Statement::assign("y", Expression::int(0)),
            ),
            Statement::ret(Expression::var("y")),
        ]);
        assert_eq!(
            rewrite.node.body,
            vec![
                Statement::if_else(
                    Expression::var("c"),
                    Statement::assign("y", Expression::int(4)),
                    Statement::assign("y", Expression::int(0)),
                ),
                Statement::ret(Expression::var("y")),
            ]
        );
    }

    #[test]
    fn test_loop_assigned_variable_not_propagated() {
        let body = vec![
            Statement::assign("x", Expression::int(0)),
            Statement::while_loop(
                Expression::binary(BinaryOperator::Lt, Expression::var("x"), Expression::int(10)),
                Statement::assign(
                    "x",
                    Expression::binary(BinaryOperator::Add, Expression::var("x"), Expression::int(1)),
                ),
            ),
            Statement::ret(Expression::var("x")),
        ];
        let rewrite = run(body.clone());
        assert!(!rewrite.changed);
        assert_eq!(rewrite.node.body, body);
    }

    #[test]
    fn test_loop_invariant_propagated() {
        let rewrite = run(vec![
            Statement::assign("y", Expression::int(2)),
            Statement::assign("x", Expression::int(0)),
            Statement::while_loop(
                Expression::binary(BinaryOperator::Lt, Expression::var("x"), Expression::int(10)),
                Statement::assign(
                    "x",
                    Expression::binary(BinaryOperator::Add, Expression::var("x"), Expression::var("y")),
                ),
            ),
            Statement::ret(Expression::var("x")),
        ]);
        assert_eq!(
            rewrite.node.body,
            vec![
                Statement::assign("x", Expression::int(0)),
                Statement::while_loop(
                    Expression::binary(BinaryOperator::Lt, Expression::var("x"), Expression::int(10)),
                    Statement::assign(
                        "x",
                        Expression::binary(BinaryOperator::Add, Expression::var("x"), Expression::int(2)),
                    ),
                ),
                Statement::ret(Expression::var("x")),
            ]
        );
    }

    #[test]
    fn test_assigned_vars() {
        let mut out = FxHashSet::default();
        assigned_vars(
            &Statement::while_loop(
                Expression::bool(true),
                Statement::Block(vec![
                    Statement::assign("a", Expression::int(1)),
                    Statement::array_assign("b", Expression::int(0), Expression::int(1)),
                ]),
            ),
            &mut out,
        );
        assert!(out.contains("a"));
        assert!(!out.contains("b"));
    }
}
