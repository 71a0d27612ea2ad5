//! Integration tests for constant propagation and folding

mod common;

use common::{jasmin, method_lines, program};
use jmm_engine::ast::{BinaryOperator, Expression, MethodDecl, Param, Statement, Type};
use jmm_engine::compiler::optimize::{optimize_method, optimize_program};
use jmm_engine::{CompileError, CompileOptions, Compiler};
use pretty_assertions::assert_eq;

fn add(left: Expression, right: Expression) -> Expression {
    Expression::binary(BinaryOperator::Add, left, right)
}

fn lt(left: Expression, right: Expression) -> Expression {
    Expression::binary(BinaryOperator::Lt, left, right)
}

// =============================================================================
// FOLDING
// =============================================================================

#[test]
fn test_addition_folds_to_literal() {
    let f = MethodDecl::new("f", Type::Int)
        .with_body(vec![Statement::ret(add(Expression::int(3), Expression::int(4)))]);
    let code = jasmin(program(vec![], vec![f]), CompileOptions::optimized());
    assert_eq!(method_lines(&code, "f"), vec!["bipush 7", "ireturn"]);
}

#[test]
fn test_comparison_folds_to_true() {
    let f = MethodDecl::new("f", Type::Boolean)
        .with_body(vec![Statement::ret(lt(Expression::int(2), Expression::int(5)))]);

    let optimized = jasmin(program(vec![], vec![f.clone()]), CompileOptions::optimized());
    assert_eq!(method_lines(&optimized, "f"), vec!["iconst_1", "ireturn"]);

    let plain = jasmin(program(vec![], vec![f]), CompileOptions::default());
    assert!(method_lines(&plain, "f").iter().any(|l| l.starts_with("if_icmplt")));
}

#[test]
fn test_division_by_zero_is_reported() {
    let f = MethodDecl::new("f", Type::Int).with_body(vec![Statement::ret(Expression::binary(
        BinaryOperator::Div,
        Expression::int(1),
        Expression::int(0),
    ))]);
    let result = Compiler::new(CompileOptions::optimized()).compile_program(program(vec![], vec![f]));
    assert_eq!(
        result.unwrap_err(),
        CompileError::DivisionByZero {
            method: "f".to_string()
        }
    );
}

// =============================================================================
// PROPAGATION
// =============================================================================

#[test]
fn test_store_then_return_becomes_literal_return() {
    let f = MethodDecl::new("f", Type::Int)
        .with_local("x", Type::Int)
        .with_body(vec![
            Statement::assign("x", Expression::int(10)),
            Statement::ret(Expression::var("x")),
        ]);
    let optimized = optimize_method(f.clone(), 100).unwrap();
    assert_eq!(optimized.body, vec![Statement::ret(Expression::int(10))]);

    let code = jasmin(program(vec![], vec![f]), CompileOptions::optimized());
    assert_eq!(method_lines(&code, "f"), vec!["bipush 10", "ireturn"]);
}

#[test]
fn test_loop_variable_not_propagated() {
    let f = MethodDecl::new("f", Type::Int)
        .with_local("x", Type::Int)
        .with_body(vec![
            Statement::assign("x", Expression::int(0)),
            Statement::while_loop(
                lt(Expression::var("x"), Expression::int(10)),
                Statement::assign("x", add(Expression::var("x"), Expression::int(1))),
            ),
            Statement::ret(Expression::var("x")),
        ]);
    let optimized = optimize_method(f.clone(), 100).unwrap();
    assert_eq!(optimized, f);
}

#[test]
fn test_branch_assignment_blocks_propagation() {
    let f = MethodDecl::new("f", Type::Int)
        .with_param(Param::new("c", Type::Boolean))
        .with_local("x", Type::Int)
        .with_body(vec![
            Statement::assign("x", Expression::int(1)),
            Statement::if_else(
                Expression::var("c"),
                Statement::assign("x", Expression::int(2)),
                Statement::Block(vec![]),
            ),
            Statement::ret(Expression::var("x")),
        ]);
    let optimized = optimize_method(f, 100).unwrap();
    assert_eq!(optimized.body[0], Statement::assign("x", Expression::int(1)));
    assert_eq!(optimized.body[2], Statement::ret(Expression::var("x")));
}

#[test]
fn test_fields_are_never_propagated() {
    let f = MethodDecl::new("f", Type::Int).with_body(vec![
        Statement::assign("count", Expression::int(4)),
        Statement::ret(Expression::var("count")),
    ]);
    let optimized = optimize_method(f.clone(), 100).unwrap();
    assert_eq!(optimized, f);
}

#[test]
fn test_program_methods_optimized_independently() {
    let f = MethodDecl::new("f", Type::Int)
        .with_body(vec![Statement::ret(add(Expression::int(1), Expression::int(1)))]);
    let g = MethodDecl::new("g", Type::Boolean)
        .with_param(Param::new("a", Type::Int))
        .with_body(vec![Statement::ret(lt(Expression::var("a"), Expression::int(1)))]);

    let optimized = optimize_program(program(vec![], vec![f, g.clone()]), 100).unwrap();
    assert_eq!(
        optimized.class.methods[0].body,
        vec![Statement::ret(Expression::int(2))]
    );
    assert_eq!(optimized.class.methods[1], g);
}
