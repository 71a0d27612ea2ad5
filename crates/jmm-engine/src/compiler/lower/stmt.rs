//! Statement Lowering

use super::control_flow::strip_parens;
use super::{Binding, Lowerer};
use crate::ast::{Expression, Statement};
use crate::compiler::error::{CompileError, CompileResult};
use crate::compiler::ir::{IrInstr, IrType, IrValue, Operand, Place};

impl<'a> Lowerer<'a> {
    /// Lower a statement to a flat instruction sequence
    pub fn lower_stmt(&mut self, stmt: &Statement) -> CompileResult<Vec<IrInstr>> {
        match stmt {
            Statement::Assign { target, value } => self.lower_assign(target, value),

            Statement::ArrayAssign {
                target,
                index,
                value,
            } => self.lower_array_assign(target, index, value),

            Statement::If {
                condition,
                then_branch,
                else_branch,
            } => self.lower_if(condition, then_branch, else_branch),

            Statement::While { condition, body } => self.lower_while(condition, body),

            Statement::Block(stmts) => {
                let mut instrs = Vec::new();
                for stmt in stmts {
                    instrs.extend(self.lower_stmt(stmt)?);
                }
                Ok(instrs)
            }

            Statement::Return(None) => Ok(vec![IrInstr::Return(None)]),

            Statement::Return(Some(value)) => {
                let return_type = IrType::from(&self.current_method()?.return_type);
                let lowered = self.lower_expr(value, Some(&return_type))?;
                let operand = lowered.require("return value")?;
                let mut instrs = lowered.computation;
                instrs.push(IrInstr::Return(Some(operand)));
                Ok(instrs)
            }

            Statement::Expr(expr) => match strip_parens(expr) {
                Expression::MethodCall {
                    target,
                    method,
                    args,
                } => Ok(self.lower_call(target, method, args, None, true)?.computation),
                expr => Ok(self.lower_expr(expr, None)?.computation),
            },
        }
    }

    fn lower_assign(&mut self, target: &str, value: &Expression) -> CompileResult<Vec<IrInstr>> {
        match self.resolve(target)? {
            Binding::Local(ty) => {
                let ty = IrType::from(&ty);
                let lowered = self.lower_expr(value, Some(&ty))?;
                let operand = lowered.require("assigned value")?;
                let mut instrs = lowered.computation;
                instrs.push(IrInstr::assign(
                    Operand::local(target, ty),
                    IrValue::Operand(operand),
                ));
                Ok(instrs)
            }
            Binding::Field(ty) => {
                let ty = IrType::from(&ty);
                let lowered = self.lower_expr(value, Some(&ty))?;
                let operand = lowered.require("assigned value")?;
                let object = self.receiver(&format!("assignment to field '{}'", target))?;
                let mut instrs = lowered.computation;
                instrs.push(IrInstr::PutField {
                    object,
                    field: target.to_string(),
                    value: operand,
                });
                Ok(instrs)
            }
            Binding::Class(class) => Err(CompileError::unsupported(format!(
                "assignment to class name '{}'",
                class
            ))),
        }
    }

    fn lower_array_assign(
        &mut self,
        target: &str,
        index: &Expression,
        value: &Expression,
    ) -> CompileResult<Vec<IrInstr>> {
        let array = self.lower_expr(&Expression::var(target), None)?;
        let array_op = array.require("assigned array")?;
        let element = match array_op.ty() {
            IrType::Array(element) => *element,
            other => {
                return Err(CompileError::NotAnArray {
                    name: target.to_string(),
                    ty: other.to_string(),
                })
            }
        };

        let index = self.lower_expr(index, Some(&IrType::Int32))?;
        let index_op = index.require("array index")?;
        let value = self.lower_expr(value, Some(&element))?;
        let value_op = value.require("assigned element")?;

        let mut instrs = array.computation;
        instrs.extend(index.computation);
        instrs.extend(value.computation);
        instrs.push(IrInstr::Assign {
            dest: Place::Element {
                array: array_op,
                index: index_op,
                ty: element,
            },
            value: IrValue::Operand(value_op),
        });
        Ok(instrs)
    }
}
