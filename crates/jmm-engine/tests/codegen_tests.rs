//! Integration tests for Jasmin emission
//!
//! Tests cover:
//! - Literal push forms at every boundary
//! - `.limit locals` and `.limit stack` against the emitted code
//! - Field access, object creation and calls end to end

mod common;

use common::{jasmin, limits, method_lines, program, replay_peak};
use jmm_engine::ast::{
    BinaryOperator, ClassDecl, Expression, FieldDecl, ImportDecl, MethodDecl, Param, Program,
    Statement, Type,
};
use jmm_engine::{CompileOptions, StackLimitPolicy};
use pretty_assertions::assert_eq;

fn returning_int(value: i32) -> Program {
    program(
        vec![],
        vec![MethodDecl::new("f", Type::Int).with_body(vec![Statement::ret(Expression::int(value))])],
    )
}

fn exact() -> CompileOptions {
    CompileOptions {
        stack_limit: StackLimitPolicy::Exact,
        ..CompileOptions::default()
    }
}

/// A method with nested expressions, a condition, an array store and a call
fn busy_program() -> Program {
    let g = MethodDecl::new("g", Type::Int)
        .with_param(Param::new("p", Type::Int))
        .with_param(Param::new("q", Type::Int))
        .with_param(Param::new("r", Type::Int))
        .with_body(vec![Statement::ret(Expression::var("p"))]);
    let f = MethodDecl::new("f", Type::Int)
        .with_param(Param::new("a", Type::Int))
        .with_param(Param::new("xs", Type::int_array()))
        .with_local("r", Type::Int)
        .with_body(vec![
            Statement::assign(
                "r",
                Expression::binary(
                    BinaryOperator::Add,
                    Expression::binary(BinaryOperator::Mul, Expression::var("a"), Expression::int(2)),
                    Expression::index(Expression::var("xs"), Expression::int(0)),
                ),
            ),
            Statement::if_else(
                Expression::binary(
                    BinaryOperator::And,
                    Expression::binary(BinaryOperator::Lt, Expression::var("a"), Expression::int(3)),
                    Expression::not(Expression::paren(Expression::binary(
                        BinaryOperator::Lt,
                        Expression::var("r"),
                        Expression::int(1),
                    ))),
                ),
                Statement::array_assign(
                    "xs",
                    Expression::int(1),
                    Expression::call(
                        Expression::This,
                        "g",
                        vec![
                            Expression::var("a"),
                            Expression::var("r"),
                            Expression::length(Expression::var("xs")),
                        ],
                    ),
                ),
                Statement::Block(vec![]),
            ),
            Statement::ret(Expression::var("r")),
        ]);
    program(vec![], vec![g, f])
}

// =============================================================================
// LITERAL PUSH FORMS
// =============================================================================

#[test]
fn test_push_table_boundaries() {
    let cases = [
        (-1, "iconst_m1"),
        (0, "iconst_0"),
        (5, "iconst_5"),
        (6, "bipush 6"),
        (-2, "bipush -2"),
        (127, "bipush 127"),
        (-128, "bipush -128"),
        (128, "sipush 128"),
        (-129, "sipush -129"),
        (32767, "sipush 32767"),
        (-32768, "sipush -32768"),
        (32768, "ldc 32768"),
        (-32769, "ldc -32769"),
    ];
    for (value, expected) in cases {
        let code = jasmin(returning_int(value), CompileOptions::default());
        assert_eq!(method_lines(&code, "f")[0], expected, "pushing {value}");
    }
}

#[test]
fn test_boolean_literals_push_zero_and_one() {
    let f = MethodDecl::new("f", Type::Boolean).with_body(vec![Statement::ret(Expression::bool(false))]);
    let code = jasmin(program(vec![], vec![f]), CompileOptions::default());
    assert_eq!(method_lines(&code, "f"), vec!["iconst_0", "ireturn"]);
}

// =============================================================================
// LIMITS
// =============================================================================

#[test]
fn test_locals_limit_covers_every_register() {
    let code = jasmin(busy_program(), CompileOptions::default());
    let (_, locals) = limits(&code, "f");
    let highest = method_lines(&code, "f")
        .iter()
        .filter_map(|l| {
            let (op, rest) = l.split_once(|c: char| c == '_' || c == ' ')?;
            let is_var = matches!(op, "iload" | "aload" | "istore" | "astore");
            is_var.then(|| rest.trim().parse::<u32>().ok()).flatten()
        })
        .max()
        .unwrap();
    assert!(locals >= highest + 1, "locals {locals}, highest register {highest}");
}

#[test]
fn test_static_main_locals() {
    let main = MethodDecl::main("args");
    let code = jasmin(program(vec![], vec![main]), CompileOptions::default());
    assert!(code.contains(".method public static main([Ljava/lang/String;)V"));
    assert_eq!(limits(&code, "main"), (0, 1));
    assert_eq!(method_lines(&code, "main"), vec!["return"]);
}

#[test]
fn test_exact_stack_limit_matches_replayed_peak() {
    let code = jasmin(busy_program(), exact());
    for method in ["f", "g"] {
        let (stack, _) = limits(&code, method);
        assert_eq!(stack, replay_peak(&method_lines(&code, method)), "method {method}");
    }
}

#[test]
fn test_conservative_stack_limit_not_below_peak() {
    let code = jasmin(busy_program(), CompileOptions::default());
    for method in ["f", "g"] {
        let (stack, _) = limits(&code, method);
        let peak = replay_peak(&method_lines(&code, method));
        assert!(stack >= peak, "method {method}: limit {stack} < peak {peak}");
    }
}

// =============================================================================
// END TO END
// =============================================================================

#[test]
fn test_field_getter() {
    let get = MethodDecl::new("get", Type::Int).with_body(vec![Statement::ret(Expression::var("x"))]);
    let code = jasmin(
        program(vec![FieldDecl::new("x", Type::Int)], vec![get]),
        CompileOptions::default(),
    );
    assert!(code.contains(".field public x I\n"));
    assert_eq!(
        method_lines(&code, "get"),
        vec!["aload_0", "getfield Foo/x I", "istore_1", "iload_1", "ireturn"]
    );
}

#[test]
fn test_whole_class_text() {
    let mut x = FieldDecl::new("x", Type::Int);
    x.initializer = Some(Expression::int(3));
    let set = MethodDecl::new("set", Type::Void)
        .with_param(Param::new("v", Type::Int))
        .with_body(vec![Statement::assign("x", Expression::var("v"))]);

    let code = jasmin(program(vec![x], vec![set]), CompileOptions::default());
    assert_eq!(
        code,
        "\
.class public Foo
.super java/lang/Object

.field public x I = 3

.method public <init>()V
    aload_0
    invokespecial java/lang/Object/<init>()V
    return
.end method

.method public set(I)V
    .limit stack 2
    .limit locals 2
    aload_0
    iload_1
    putfield Foo/x I
    return
.end method
"
    );
}

#[test]
fn test_object_creation_and_virtual_call() {
    let get = MethodDecl::new("get", Type::Int).with_body(vec![Statement::ret(Expression::int(1))]);
    let make = MethodDecl::new("make", Type::Int)
        .with_local("o", Type::class("Foo"))
        .with_body(vec![
            Statement::assign("o", Expression::new_object("Foo")),
            Statement::ret(Expression::call(Expression::var("o"), "get", vec![])),
        ]);
    let code = jasmin(program(vec![], vec![get, make]), CompileOptions::default());
    assert_eq!(
        method_lines(&code, "make"),
        vec![
            "new Foo",
            "dup",
            "astore_2",
            "invokespecial Foo/<init>()V",
            "aload_2",
            "astore_1",
            "aload_1",
            "invokevirtual Foo/get()I",
            "istore_3",
            "iload_3",
            "ireturn",
        ]
    );
}

#[test]
fn test_imported_classes_resolve_to_internal_names() {
    let program = Program {
        imports: vec![ImportDecl::parse("io"), ImportDecl::parse("a.b.Base")],
        class: ClassDecl {
            name: "Foo".to_string(),
            superclass: Some("Base".to_string()),
            fields: vec![FieldDecl::new("b", Type::class("Base"))],
            methods: vec![MethodDecl::main("args").with_body(vec![Statement::Expr(
                Expression::call(Expression::var("io"), "println", vec![Expression::int(42)]),
            )])],
        },
    };
    let code = jasmin(program, CompileOptions::default());
    assert!(code.contains(".super a/b/Base\n"));
    assert!(code.contains("invokespecial a/b/Base/<init>()V"));
    assert!(code.contains(".field public b La/b/Base;\n"));
    assert_eq!(
        method_lines(&code, "main"),
        vec!["bipush 42", "invokestatic io/println(I)V", "return"]
    );
}

#[test]
fn test_non_void_statement_call_is_popped() {
    let get = MethodDecl::new("get", Type::Int).with_body(vec![Statement::ret(Expression::int(1))]);
    let run = MethodDecl::new("run", Type::Void)
        .with_body(vec![Statement::Expr(Expression::call(Expression::This, "get", vec![]))]);
    let code = jasmin(program(vec![], vec![get, run]), CompileOptions::default());
    assert_eq!(
        method_lines(&code, "run"),
        vec!["aload_0", "invokevirtual Foo/get()I", "pop", "return"]
    );
}

#[test]
fn test_parenthesized_statement_call_is_void() {
    let run = MethodDecl::new("run", Type::Void)
        .with_param(Param::new("a", Type::Int))
        .with_body(vec![Statement::Expr(Expression::paren(Expression::call(
            Expression::var("io"),
            "println",
            vec![Expression::var("a")],
        )))]);
    let code = jasmin(program(vec![], vec![run]), CompileOptions::default());
    assert_eq!(
        method_lines(&code, "run"),
        vec!["iload_1", "invokestatic io/println(I)V", "return"]
    );
    assert_eq!(limits(&code, "run").1, 2);
}

#[test]
fn test_returning_branches_do_not_end_on_label() {
    let pick = MethodDecl::new("pick", Type::Int)
        .with_param(Param::new("c", Type::Boolean))
        .with_body(vec![Statement::if_else(
            Expression::var("c"),
            Statement::ret(Expression::int(1)),
            Statement::ret(Expression::int(2)),
        )]);
    let stop = MethodDecl::new("stop", Type::Void)
        .with_param(Param::new("c", Type::Boolean))
        .with_body(vec![Statement::if_else(
            Expression::var("c"),
            Statement::Return(None),
            Statement::Return(None),
        )]);
    let code = jasmin(program(vec![], vec![pick, stop]), CompileOptions::default());

    assert_eq!(
        method_lines(&code, "pick"),
        vec!["iload_1", "ifne then_0", "iconst_2", "ireturn", "then_0:", "iconst_1", "ireturn"]
    );
    for method in ["pick", "stop"] {
        let lines = method_lines(&code, method);
        let last = lines.last().unwrap();
        assert!(!last.ends_with(':'), "{method} ends on label {last}");
        assert!(!lines.iter().any(|l| l.starts_with("endif_")));
    }
}

#[test]
fn test_units_are_deterministic() {
    let first = jasmin(busy_program(), CompileOptions::default());
    let second = jasmin(busy_program(), CompileOptions::default());
    assert_eq!(first, second);
}
