//! Expression Lowering
//!
//! Lowers an expression to the instructions computing it plus the operand
//! denoting its value.

use super::{Binding, Lowerer};
use crate::ast::{BinaryOperator, Expression};
use crate::compiler::error::{CompileError, CompileResult};
use crate::compiler::ir::{
    BinaryOp, Call, CallKind, IrInstr, IrType, IrValue, Operand, Place, UnaryOp,
};

/// Result of lowering an expression
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExprResult {
    /// Side-effecting instructions, in evaluation order
    pub computation: Vec<IrInstr>,
    /// Operand denoting the value; `None` for void calls
    pub code: Option<Operand>,
}

impl ExprResult {
    /// Value with no computation
    pub fn value(code: Operand) -> Self {
        Self {
            computation: Vec::new(),
            code: Some(code),
        }
    }

    /// Value produced by the given instructions
    pub fn computed(computation: Vec<IrInstr>, code: Operand) -> Self {
        Self {
            computation,
            code: Some(code),
        }
    }

    /// Take the operand, failing for void results
    pub fn require(&self, context: &str) -> CompileResult<Operand> {
        self.code.clone().ok_or_else(|| CompileError::MissingOperand {
            context: context.to_string(),
        })
    }
}

impl<'a> Lowerer<'a> {
    /// Lower an expression. `expected` is the type the surrounding code
    /// wants, used for calls whose signature is unknown.
    pub fn lower_expr(
        &mut self,
        expr: &Expression,
        expected: Option<&IrType>,
    ) -> CompileResult<ExprResult> {
        match expr {
            Expression::IntLiteral(v) => Ok(ExprResult::value(Operand::int(*v))),
            Expression::BoolLiteral(b) => Ok(ExprResult::value(Operand::bool(*b))),
            Expression::This => Ok(ExprResult::value(self.receiver("this")?)),
            Expression::Paren(inner) => self.lower_expr(inner, expected),
            Expression::Var(name) => self.lower_var(name),

            Expression::Binary { op, left, right } => match op {
                BinaryOperator::And | BinaryOperator::Or => {
                    self.lower_short_circuit(*op, left, right)
                }
                _ => self.lower_binary(*op, left, right),
            },

            Expression::Not(operand) => {
                let inner = self.lower_expr(operand, Some(&IrType::Bool))?;
                let value = inner.require("operand of !")?;
                let dest = self.ctx.new_temp(IrType::Bool);
                let mut computation = inner.computation;
                computation.push(IrInstr::assign(
                    dest.clone(),
                    IrValue::Unary {
                        op: UnaryOp::Not,
                        operand: value,
                    },
                ));
                Ok(ExprResult::computed(computation, dest))
            }

            Expression::NewArray { element, size } => {
                let size = self.lower_expr(size, Some(&IrType::Int32))?;
                let length = size.require("array size")?;
                let element = IrType::from(element);
                let dest = self.ctx.new_temp(IrType::array_of(element.clone()));
                let mut computation = size.computation;
                computation.push(IrInstr::assign(
                    dest.clone(),
                    IrValue::Call(Call::new_array(element, length)),
                ));
                Ok(ExprResult::computed(computation, dest))
            }

            Expression::ArrayLiteral(elements) => {
                let mut items = Vec::with_capacity(elements.len());
                for element in elements {
                    let hint = expected.and_then(IrType::element);
                    items.push(self.lower_expr(element, hint)?);
                }
                let element = match items.first().and_then(|i| i.code.as_ref()) {
                    Some(first) => first.ty(),
                    None => expected
                        .and_then(IrType::element)
                        .cloned()
                        .unwrap_or(IrType::Int32),
                };
                self.pack_array(element, items)
            }

            Expression::Index { array, index } => {
                let array_result = self.lower_expr(array, None)?;
                let array_op = array_result.require("indexed array")?;
                let element = element_type(array, &array_op)?;
                let index = self.lower_expr(index, Some(&IrType::Int32))?;
                let index_op = index.require("array index")?;

                let dest = self.ctx.new_temp(element.clone());
                let mut computation = array_result.computation;
                computation.extend(index.computation);
                computation.push(IrInstr::assign(
                    dest.clone(),
                    IrValue::ArrayLoad {
                        array: array_op,
                        index: index_op,
                        ty: element,
                    },
                ));
                Ok(ExprResult::computed(computation, dest))
            }

            Expression::Length(array) => {
                let array_result = self.lower_expr(array, None)?;
                let array_op = array_result.require("array of .length")?;
                element_type(array, &array_op)?;

                let dest = self.ctx.new_temp(IrType::Int32);
                let mut computation = array_result.computation;
                computation.push(IrInstr::assign(
                    dest.clone(),
                    IrValue::Call(Call::array_length(array_op)),
                ));
                Ok(ExprResult::computed(computation, dest))
            }

            Expression::NewObject(class) => {
                let dest = self.ctx.new_temp(IrType::Class(class.clone()));
                let computation = vec![
                    IrInstr::assign(dest.clone(), IrValue::Call(Call::new_object(class.clone()))),
                    IrInstr::Call(Call::constructor(dest.clone())),
                ];
                Ok(ExprResult::computed(computation, dest))
            }

            Expression::MethodCall {
                target,
                method,
                args,
            } => self.lower_call(target, method, args, expected, false),
        }
    }

    fn lower_var(&mut self, name: &str) -> CompileResult<ExprResult> {
        match self.resolve(name)? {
            Binding::Local(ty) => Ok(ExprResult::value(Operand::local(name, IrType::from(&ty)))),
            Binding::Field(ty) => {
                let object = self.receiver(&format!("field access '{}'", name))?;
                let ty = IrType::from(&ty);
                let dest = self.ctx.new_temp(ty.clone());
                let computation = vec![IrInstr::assign(
                    dest.clone(),
                    IrValue::GetField {
                        object,
                        field: name.to_string(),
                        ty,
                    },
                )];
                Ok(ExprResult::computed(computation, dest))
            }
            Binding::Class(class) => Err(CompileError::unsupported(format!(
                "class name '{}' used as a value",
                class
            ))),
        }
    }

    fn lower_binary(
        &mut self,
        op: BinaryOperator,
        left: &Expression,
        right: &Expression,
    ) -> CompileResult<ExprResult> {
        let op = match op {
            BinaryOperator::Add => BinaryOp::Add,
            BinaryOperator::Sub => BinaryOp::Sub,
            BinaryOperator::Mul => BinaryOp::Mul,
            BinaryOperator::Div => BinaryOp::Div,
            BinaryOperator::Lt => BinaryOp::Lt,
            BinaryOperator::And | BinaryOperator::Or => {
                return Err(CompileError::contract(
                    "logical operator reached arithmetic lowering",
                ))
            }
        };

        let lhs = self.lower_expr(left, Some(&IrType::Int32))?;
        let rhs = self.lower_expr(right, Some(&IrType::Int32))?;
        let left_op = lhs.require("left operand")?;
        let right_op = rhs.require("right operand")?;

        let dest = self.ctx.new_temp(op.result_type());
        let mut computation = lhs.computation;
        computation.extend(rhs.computation);
        computation.push(IrInstr::assign(
            dest.clone(),
            IrValue::Binary {
                op,
                left: left_op,
                right: right_op,
            },
        ));
        Ok(ExprResult::computed(computation, dest))
    }

    /// Lower a method call.
    ///
    /// With `discard` set the call is a bare statement: no result temporary
    /// is allocated and an unknown return type is taken as void.
    pub(crate) fn lower_call(
        &mut self,
        target: &Expression,
        method: &str,
        args: &[Expression],
        expected: Option<&IrType>,
        discard: bool,
    ) -> CompileResult<ExprResult> {
        let mut computation = Vec::new();

        let target_op = match target {
            Expression::Var(name) => match self.resolve(name)? {
                Binding::Class(class) => Operand::ClassRef(class),
                _ => {
                    let lowered = self.lower_var(name)?;
                    let operand = lowered.require("call target")?;
                    computation.extend(lowered.computation);
                    operand
                }
            },
            other => {
                let lowered = self.lower_expr(other, None)?;
                let operand = lowered.require("call target")?;
                computation.extend(lowered.computation);
                operand
            }
        };
        let kind = match target_op {
            Operand::ClassRef(_) => CallKind::InvokeStatic,
            _ => CallKind::InvokeVirtual,
        };

        let signature = self.own_signature(&target_op, method);
        let arg_ops = match signature {
            Some(sig) if sig.is_varargs() => {
                let fixed = sig.fixed_arity().min(args.len());
                let mut ops = Vec::with_capacity(fixed + 1);
                for (arg, param) in args[..fixed].iter().zip(&sig.params) {
                    let lowered = self.lower_expr(arg, Some(&IrType::from(&param.ty)))?;
                    computation.extend(lowered.computation.iter().cloned());
                    ops.push(lowered.require("call argument")?);
                }

                let varargs_ty = sig
                    .params
                    .last()
                    .map(|p| IrType::from(&p.ty))
                    .unwrap_or_else(|| IrType::array_of(IrType::Int32));
                let element = varargs_ty.element().cloned().unwrap_or(IrType::Int32);
                let mut trailing = Vec::with_capacity(args.len() - fixed);
                for arg in &args[fixed..] {
                    trailing.push(self.lower_expr(arg, Some(&element))?);
                }

                let passes_array = trailing.len() == 1
                    && trailing[0].code.as_ref().map(Operand::ty) == Some(varargs_ty);
                if passes_array {
                    let single = trailing.remove(0);
                    computation.extend(single.computation.iter().cloned());
                    ops.push(single.require("varargs array")?);
                } else {
                    let packed = self.pack_array(element, trailing)?;
                    computation.extend(packed.computation.iter().cloned());
                    ops.push(packed.require("varargs array")?);
                }
                ops
            }
            _ => {
                let params = signature.map(|s| s.params.as_slice()).unwrap_or_default();
                let mut ops = Vec::with_capacity(args.len());
                for (i, arg) in args.iter().enumerate() {
                    let hint = params.get(i).map(|p| IrType::from(&p.ty));
                    let lowered = self.lower_expr(arg, hint.as_ref())?;
                    computation.extend(lowered.computation.iter().cloned());
                    ops.push(lowered.require("call argument")?);
                }
                ops
            }
        };

        let return_type = match signature {
            Some(sig) => IrType::from(&sig.return_type),
            None if discard => IrType::Void,
            None => expected.cloned().unwrap_or(IrType::Int32),
        };
        let call = Call {
            kind,
            target: target_op,
            method: Some(method.to_string()),
            args: arg_ops,
            return_type,
        };

        if discard || call.return_type.is_void() {
            computation.push(IrInstr::Call(call));
            return Ok(ExprResult {
                computation,
                code: None,
            });
        }
        let dest = self.ctx.new_temp(call.return_type.clone());
        computation.push(IrInstr::assign(dest.clone(), IrValue::Call(call)));
        Ok(ExprResult::computed(computation, dest))
    }

    /// Allocate an array of `items.len()` elements, then store each item in
    /// order.
    pub(crate) fn pack_array(
        &mut self,
        element: IrType,
        items: Vec<ExprResult>,
    ) -> CompileResult<ExprResult> {
        let length = i32::try_from(items.len())
            .map_err(|_| CompileError::unsupported("array literal too long"))?;
        let array = self.ctx.new_temp(IrType::array_of(element.clone()));
        let mut computation = vec![IrInstr::assign(
            array.clone(),
            IrValue::Call(Call::new_array(element.clone(), Operand::int(length))),
        )];
        for (index, item) in (0..length).zip(items) {
            let value = item.require("array element")?;
            computation.extend(item.computation);
            computation.push(IrInstr::Assign {
                dest: Place::Element {
                    array: array.clone(),
                    index: Operand::int(index),
                    ty: element.clone(),
                },
                value: IrValue::Operand(value),
            });
        }
        Ok(ExprResult::computed(computation, array))
    }
}

/// Element type of an indexed operand
fn element_type(expr: &Expression, array: &Operand) -> CompileResult<IrType> {
    match array.ty() {
        IrType::Array(element) => Ok(*element),
        other => Err(CompileError::NotAnArray {
            name: describe(expr),
            ty: other.to_string(),
        }),
    }
}

fn describe(expr: &Expression) -> String {
    match expr {
        Expression::Var(name) => name.clone(),
        Expression::This => "this".to_string(),
        Expression::Paren(inner) => describe(inner),
        _ => "<expression>".to_string(),
    }
}
