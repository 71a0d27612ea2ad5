//! Control Flow Lowering
//!
//! Branch layouts for `if`, `while` and the short-circuit operators. Each
//! construct takes one label id from the context so its labels share a
//! suffix.

use super::expr::ExprResult;
use super::Lowerer;
use crate::ast::{BinaryOperator, Expression, Statement};
use crate::compiler::error::CompileResult;
use crate::compiler::ir::{BinaryOp, IrInstr, IrType, IrValue, Operand};

/// Labels of one `if` statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfLabels {
    pub then_label: String,
    pub end_label: String,
}

impl IfLabels {
    pub fn new(id: u32) -> Self {
        Self {
            then_label: format!("then_{}", id),
            end_label: format!("endif_{}", id),
        }
    }
}

/// Labels of one `while` loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopLabels {
    pub body_label: String,
    pub cond_label: String,
}

impl LoopLabels {
    pub fn new(id: u32) -> Self {
        Self {
            body_label: format!("whilebody_{}", id),
            cond_label: format!("whilecond_{}", id),
        }
    }
}

/// Labels of one `&&` / `||`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortCircuitLabels {
    /// Taken when the left operand does not decide the result (`&&`) or
    /// decides it (`||`)
    pub branch_label: String,
    pub end_label: String,
}

impl ShortCircuitLabels {
    pub fn new(op: BinaryOperator, id: u32) -> Self {
        let prefix = if op == BinaryOperator::And { "and" } else { "or" };
        let branch = if op == BinaryOperator::And { "rhs" } else { "true" };
        Self {
            branch_label: format!("{}_{}_{}", prefix, branch, id),
            end_label: format!("{}_end_{}", prefix, id),
        }
    }
}

pub(super) fn strip_parens(expr: &Expression) -> &Expression {
    match expr {
        Expression::Paren(inner) => strip_parens(inner),
        other => other,
    }
}

impl<'a> Lowerer<'a> {
    /// Lower a branch condition. A `<` comparison stays a compare-and-branch;
    /// anything else becomes a bool operand.
    pub(crate) fn lower_condition(
        &mut self,
        condition: &Expression,
    ) -> CompileResult<(Vec<IrInstr>, IrValue)> {
        if let Expression::Binary {
            op: BinaryOperator::Lt,
            left,
            right,
        } = strip_parens(condition)
        {
            let lhs = self.lower_expr(left, Some(&IrType::Int32))?;
            let rhs = self.lower_expr(right, Some(&IrType::Int32))?;
            let left = lhs.require("left operand of <")?;
            let right = rhs.require("right operand of <")?;
            let mut computation = lhs.computation;
            computation.extend(rhs.computation);
            return Ok((
                computation,
                IrValue::Binary {
                    op: BinaryOp::Lt,
                    left,
                    right,
                },
            ));
        }

        let lowered = self.lower_expr(condition, Some(&IrType::Bool))?;
        let value = lowered.require("condition")?;
        Ok((lowered.computation, IrValue::Operand(value)))
    }

    /// `if (c) then else`:
    ///
    /// ```text
    ///   <c>; if (c) goto then_N; <else>; goto endif_N;
    /// then_N: <then>
    /// endif_N:
    /// ```
    ///
    /// When the else branch returns, nothing jumps to `endif_N` and neither
    /// the `goto` nor the label is emitted.
    pub(crate) fn lower_if(
        &mut self,
        condition: &Expression,
        then_branch: &Statement,
        else_branch: &Statement,
    ) -> CompileResult<Vec<IrInstr>> {
        let labels = IfLabels::new(self.ctx.new_label_id());
        let (mut instrs, condition) = self.lower_condition(condition)?;
        instrs.push(IrInstr::CondGoto {
            condition,
            label: labels.then_label.clone(),
        });
        instrs.extend(self.lower_stmt(else_branch)?);
        let else_falls_through = !else_branch.ends_with_return();
        if else_falls_through {
            instrs.push(IrInstr::Goto(labels.end_label.clone()));
        }
        instrs.push(IrInstr::Label(labels.then_label));
        instrs.extend(self.lower_stmt(then_branch)?);
        if else_falls_through {
            instrs.push(IrInstr::Label(labels.end_label));
        }
        Ok(instrs)
    }

    /// `while (c) body`, test at the bottom:
    ///
    /// ```text
    ///   goto whilecond_N;
    /// whilebody_N: <body>
    /// whilecond_N: <c>; if (c) goto whilebody_N;
    /// ```
    pub(crate) fn lower_while(
        &mut self,
        condition: &Expression,
        body: &Statement,
    ) -> CompileResult<Vec<IrInstr>> {
        let labels = LoopLabels::new(self.ctx.new_label_id());
        let mut instrs = vec![
            IrInstr::Goto(labels.cond_label.clone()),
            IrInstr::Label(labels.body_label.clone()),
        ];
        instrs.extend(self.lower_stmt(body)?);
        instrs.push(IrInstr::Label(labels.cond_label));
        let (computation, condition) = self.lower_condition(condition)?;
        instrs.extend(computation);
        instrs.push(IrInstr::CondGoto {
            condition,
            label: labels.body_label,
        });
        Ok(instrs)
    }

    /// `a && b` / `a || b` with the right operand evaluated only when needed.
    ///
    /// A literal left operand decides statically: `false && b` and
    /// `true || b` produce the literal, `true && b` and `false || b` produce
    /// `b`.
    pub(crate) fn lower_short_circuit(
        &mut self,
        op: BinaryOperator,
        left: &Expression,
        right: &Expression,
    ) -> CompileResult<ExprResult> {
        let is_and = op == BinaryOperator::And;

        if let Expression::BoolLiteral(value) = strip_parens(left) {
            return if *value == is_and {
                self.lower_expr(right, Some(&IrType::Bool))
            } else {
                Ok(ExprResult::value(Operand::bool(*value)))
            };
        }

        let lhs = self.lower_expr(left, Some(&IrType::Bool))?;
        let left_op = lhs.require("left operand of logical operator")?;
        let labels = ShortCircuitLabels::new(op, self.ctx.new_label_id());
        let result = self.ctx.new_temp(IrType::Bool);

        let mut instrs = lhs.computation;
        instrs.push(IrInstr::CondGoto {
            condition: IrValue::Operand(left_op),
            label: labels.branch_label.clone(),
        });

        if is_and {
            // left false: result false
            instrs.push(IrInstr::assign(result.clone(), IrValue::Operand(Operand::bool(false))));
            instrs.push(IrInstr::Goto(labels.end_label.clone()));
            instrs.push(IrInstr::Label(labels.branch_label));
            let rhs = self.lower_expr(right, Some(&IrType::Bool))?;
            let right_op = rhs.require("right operand of &&")?;
            instrs.extend(rhs.computation);
            instrs.push(IrInstr::assign(result.clone(), IrValue::Operand(right_op)));
        } else {
            let rhs = self.lower_expr(right, Some(&IrType::Bool))?;
            let right_op = rhs.require("right operand of ||")?;
            instrs.extend(rhs.computation);
            instrs.push(IrInstr::assign(result.clone(), IrValue::Operand(right_op)));
            instrs.push(IrInstr::Goto(labels.end_label.clone()));
            instrs.push(IrInstr::Label(labels.branch_label));
            instrs.push(IrInstr::assign(result.clone(), IrValue::Operand(Operand::bool(true))));
        }
        instrs.push(IrInstr::Label(labels.end_label));

        Ok(ExprResult::computed(instrs, result))
    }
}
