//! Integration tests for AST to IR lowering
//!
//! Tests cover:
//! - Short-circuit operators, including literal left operands
//! - Varargs packing at call sites
//! - Branch and loop layouts
//! - The IR listing

mod common;

use common::{ir_lines, lower, program};
use jmm_engine::ast::{BinaryOperator, Expression, FieldDecl, MethodDecl, Param, Statement, Type};
use jmm_engine::compiler::ir::PrettyPrint;
use jmm_engine::{CompileError, CompileOptions, Compiler, SemanticsResult};
use pretty_assertions::assert_eq;

fn predicate() -> MethodDecl {
    MethodDecl::new("g", Type::Boolean).with_body(vec![Statement::ret(Expression::bool(true))])
}

fn returning(expr: Expression) -> MethodDecl {
    MethodDecl::new("f", Type::Boolean)
        .with_param(Param::new("a", Type::Boolean))
        .with_param(Param::new("b", Type::Boolean))
        .with_body(vec![Statement::ret(expr)])
}

fn call_g() -> Expression {
    Expression::call(Expression::This, "g", vec![])
}

// =============================================================================
// SHORT-CIRCUIT TESTS
// =============================================================================

#[test]
fn test_false_and_omits_right_operand() {
    let f = returning(Expression::binary(BinaryOperator::And, Expression::bool(false), call_g()));
    let lines = ir_lines(program(vec![], vec![predicate(), f]), CompileOptions::default(), "f");
    assert_eq!(lines, vec!["ret.bool 0.bool;"]);
}

#[test]
fn test_true_or_omits_right_operand() {
    let f = returning(Expression::binary(
        BinaryOperator::Or,
        Expression::paren(Expression::bool(true)),
        call_g(),
    ));
    let lines = ir_lines(program(vec![], vec![predicate(), f]), CompileOptions::default(), "f");
    assert_eq!(lines, vec!["ret.bool 1.bool;"]);
}

#[test]
fn test_true_and_evaluates_right_operand() {
    let f = returning(Expression::binary(BinaryOperator::And, Expression::bool(true), call_g()));
    let lines = ir_lines(program(vec![], vec![predicate(), f]), CompileOptions::default(), "f");
    assert_eq!(
        lines,
        vec![
            "t0.bool :=.bool invokevirtual(this.Foo, \"g\").bool;",
            "ret.bool t0.bool;",
        ]
    );
}

#[test]
fn test_and_layout() {
    let f = returning(Expression::binary(
        BinaryOperator::And,
        Expression::var("a"),
        Expression::var("b"),
    ));
    let lines = ir_lines(program(vec![], vec![f]), CompileOptions::default(), "f");
    assert_eq!(
        lines,
        vec![
            "if (a.bool) goto and_rhs_0;",
            "t0.bool :=.bool 0.bool;",
            "goto and_end_0;",
            "and_rhs_0:",
            "t0.bool :=.bool b.bool;",
            "and_end_0:",
            "ret.bool t0.bool;",
        ]
    );
}

#[test]
fn test_or_layout() {
    let f = returning(Expression::binary(
        BinaryOperator::Or,
        Expression::var("a"),
        Expression::var("b"),
    ));
    let lines = ir_lines(program(vec![], vec![f]), CompileOptions::default(), "f");
    assert_eq!(
        lines,
        vec![
            "if (a.bool) goto or_true_0;",
            "t0.bool :=.bool b.bool;",
            "goto or_end_0;",
            "or_true_0:",
            "t0.bool :=.bool 1.bool;",
            "or_end_0:",
            "ret.bool t0.bool;",
        ]
    );
}

// =============================================================================
// VARARGS TESTS
// =============================================================================

#[test]
fn test_varargs_packs_trailing_arguments() {
    let sum = MethodDecl::new("f", Type::Int)
        .with_param(Param::varargs("xs", Type::Int))
        .with_body(vec![Statement::ret(Expression::int(0))]);
    let caller = MethodDecl::new("h", Type::Int).with_body(vec![Statement::ret(Expression::call(
        Expression::This,
        "f",
        vec![Expression::int(1), Expression::int(2), Expression::int(3)],
    ))]);

    let lines = ir_lines(program(vec![], vec![sum, caller]), CompileOptions::default(), "h");
    assert_eq!(
        lines,
        vec![
            "t0.array.i32 :=.array.i32 new(array, 3.i32).array.i32;",
            "t0.array.i32[0.i32].i32 :=.i32 1.i32;",
            "t0.array.i32[1.i32].i32 :=.i32 2.i32;",
            "t0.array.i32[2.i32].i32 :=.i32 3.i32;",
            "t1.i32 :=.i32 invokevirtual(this.Foo, \"f\", t0.array.i32).i32;",
            "ret.i32 t1.i32;",
        ]
    );
}

#[test]
fn test_varargs_keeps_fixed_parameters() {
    let f = MethodDecl::new("f", Type::Void)
        .with_param(Param::new("n", Type::Int))
        .with_param(Param::varargs("rest", Type::Boolean));
    let caller = MethodDecl::new("h", Type::Void).with_body(vec![Statement::Expr(Expression::call(
        Expression::This,
        "f",
        vec![Expression::int(7), Expression::bool(true)],
    ))]);

    let lines = ir_lines(program(vec![], vec![f, caller]), CompileOptions::default(), "h");
    assert_eq!(
        lines,
        vec![
            "t0.array.bool :=.array.bool new(array, 1.i32).array.bool;",
            "t0.array.bool[0.i32].bool :=.bool 1.bool;",
            "invokevirtual(this.Foo, \"f\", 7.i32, t0.array.bool).V;",
            "ret.V;",
        ]
    );
}

// =============================================================================
// CONTROL FLOW TESTS
// =============================================================================

#[test]
fn test_while_layout() {
    let f = MethodDecl::new("f", Type::Int)
        .with_local("i", Type::Int)
        .with_body(vec![
            Statement::assign("i", Expression::int(0)),
            Statement::while_loop(
                Expression::binary(BinaryOperator::Lt, Expression::var("i"), Expression::int(10)),
                Statement::assign(
                    "i",
                    Expression::binary(BinaryOperator::Add, Expression::var("i"), Expression::int(1)),
                ),
            ),
            Statement::ret(Expression::var("i")),
        ]);

    let lines = ir_lines(program(vec![], vec![f]), CompileOptions::default(), "f");
    assert_eq!(
        lines,
        vec![
            "i.i32 :=.i32 0.i32;",
            "goto whilecond_0;",
            "whilebody_0:",
            "t0.i32 :=.i32 i.i32 +.i32 1.i32;",
            "i.i32 :=.i32 t0.i32;",
            "whilecond_0:",
            "if (i.i32 <.bool 10.i32) goto whilebody_0;",
            "ret.i32 i.i32;",
        ]
    );
}

#[test]
fn test_nested_labels_are_unique() {
    let inner = Statement::if_else(
        Expression::var("a"),
        Statement::Block(vec![]),
        Statement::Block(vec![]),
    );
    let f = MethodDecl::new("f", Type::Void)
        .with_param(Param::new("a", Type::Boolean))
        .with_body(vec![Statement::if_else(
            Expression::var("a"),
            inner.clone(),
            inner,
        )]);

    let module = lower(program(vec![], vec![f]), CompileOptions::default());
    let method = module.classes[0].method("f").unwrap();
    assert_eq!(method.labels.len(), 6);
    assert!(method.validate().is_ok());
}

#[test]
fn test_main_gets_implicit_return() {
    let main = MethodDecl::main("args").with_body(vec![Statement::Expr(Expression::call(
        Expression::var("io"),
        "println",
        vec![Expression::int(1)],
    ))]);
    let lines = ir_lines(program(vec![], vec![main]), CompileOptions::default(), "main");
    assert_eq!(
        lines,
        vec!["invokestatic(io, \"println\", 1.i32).V;", "ret.V;"]
    );
}

// =============================================================================
// LISTING AND ERRORS
// =============================================================================

#[test]
fn test_ir_listing() {
    let getter = MethodDecl::new("get", Type::Int).with_body(vec![Statement::ret(Expression::var("x"))]);
    let semantics = SemanticsResult::new(program(vec![FieldDecl::new("x", Type::Int)], vec![getter])).unwrap();
    let listing = Compiler::default().emit_ir(semantics).unwrap();

    assert!(listing.starts_with("import io;\n\nFoo {\n"));
    assert!(listing.contains("    .field public x.i32;\n"));
    assert!(listing.contains("    .method public get().i32 {\n"));
    assert!(listing.contains("        t0.i32 :=.i32 getfield(this.Foo, x.i32).i32;\n"));
    assert_eq!(
        lower(program(vec![], vec![]), CompileOptions::default()).pretty_print(),
        "import io;\n\nFoo {\n    .construct Foo().V {\n        invokespecial(this, \"<init>\").V;\n    }\n}\n"
    );
}

#[test]
fn test_unresolved_name_is_fatal() {
    let f = MethodDecl::new("f", Type::Int).with_body(vec![Statement::ret(Expression::var("nope"))]);
    let result = Compiler::default().compile_program(program(vec![], vec![f]));
    assert!(matches!(result, Err(CompileError::UnresolvedName { .. })));
}
