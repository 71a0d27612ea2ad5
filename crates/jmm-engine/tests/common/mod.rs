//! Shared builders for the integration tests

#![allow(dead_code)]

use std::collections::HashMap;

use jmm_engine::ast::{ClassDecl, FieldDecl, ImportDecl, MethodDecl, Program};
use jmm_engine::compiler::ir::IrModule;
use jmm_engine::{CompileOptions, Compiler, SemanticsResult};

/// `import io; class Foo { fields; methods }`
pub fn program(fields: Vec<FieldDecl>, methods: Vec<MethodDecl>) -> Program {
    Program {
        imports: vec![ImportDecl::parse("io")],
        class: ClassDecl {
            name: "Foo".to_string(),
            superclass: None,
            fields,
            methods,
        },
    }
}

pub fn lower(program: Program, options: CompileOptions) -> IrModule {
    Compiler::new(options)
        .lower(SemanticsResult::new(program).unwrap())
        .unwrap()
}

/// IR instructions of one method, one `Display` string each
pub fn ir_lines(program: Program, options: CompileOptions, method: &str) -> Vec<String> {
    let module = lower(program, options);
    module.classes[0]
        .method(method)
        .unwrap()
        .instructions
        .iter()
        .map(ToString::to_string)
        .collect()
}

/// Jasmin text of the single class
pub fn jasmin(program: Program, options: CompileOptions) -> String {
    let mut units = Compiler::new(options).compile_program(program).unwrap();
    assert_eq!(units.len(), 1);
    units.remove(0).code
}

/// Instruction lines of a method, without the `.limit` directives
pub fn method_lines(code: &str, method: &str) -> Vec<String> {
    let needle = format!(" {}(", method);
    let start = code
        .lines()
        .position(|l| l.starts_with(".method") && l.contains(&needle))
        .unwrap_or_else(|| panic!("method {method} not found in:\n{code}"));
    code.lines()
        .skip(start + 1)
        .take_while(|l| *l != ".end method")
        .filter(|l| !l.trim_start().starts_with(".limit"))
        .map(|l| l.trim().to_string())
        .collect()
}

/// `(stack, locals)` limits of a method
pub fn limits(code: &str, method: &str) -> (u32, u32) {
    let needle = format!(" {}(", method);
    let lines: Vec<&str> = code
        .lines()
        .skip_while(|l| !(l.starts_with(".method") && l.contains(&needle)))
        .take_while(|l| *l != ".end method")
        .collect();
    let read = |directive: &str| -> u32 {
        lines
            .iter()
            .find_map(|l| l.trim().strip_prefix(directive))
            .unwrap_or_else(|| panic!("missing {directive}"))
            .trim()
            .parse()
            .unwrap()
    };
    (read(".limit stack"), read(".limit locals"))
}

/// Exact operand stack peak, replayed from the emitted instructions.
/// A label takes the depth recorded at the first jump to it.
pub fn replay_peak(lines: &[String]) -> u32 {
    let mut at_label: HashMap<String, i64> = HashMap::new();
    let mut depth: i64 = 0;
    let mut peak: i64 = 0;
    for line in lines {
        let mut parts = line.split_whitespace();
        let op = parts.next().unwrap_or("");
        if let Some(label) = op.strip_suffix(':') {
            if let Some(recorded) = at_label.get(label) {
                depth = *recorded;
            }
            continue;
        }
        let (pops, pushes): (i64, i64) = match op {
            "iconst_m1" | "iconst_0" | "iconst_1" | "iconst_2" | "iconst_3" | "iconst_4"
            | "iconst_5" | "bipush" | "sipush" | "ldc" | "new" | "dup" => (0, 1),
            _ if op.starts_with("iload") || op.starts_with("aload") => (0, 1),
            _ if op.starts_with("istore") || op.starts_with("astore") => (1, 0),
            "iadd" | "isub" | "imul" | "idiv" | "iand" | "ixor" => (2, 1),
            "iaload" | "baload" | "aaload" => (2, 1),
            "iastore" | "bastore" | "aastore" => (3, 0),
            "newarray" | "anewarray" | "arraylength" | "getfield" => (1, 1),
            "putfield" | "if_icmplt" => (2, 0),
            "ifne" | "pop" | "ireturn" | "areturn" => (1, 0),
            "invokestatic" | "invokevirtual" | "invokespecial" => {
                let (args, returns) = call_effect(line);
                let receiver = i64::from(op != "invokestatic");
                (args + receiver, i64::from(returns))
            }
            _ => (0, 0),
        };
        depth -= pops;
        if matches!(op, "if_icmplt" | "ifne" | "goto") {
            if let Some(target) = parts.next() {
                at_label.entry(target.to_string()).or_insert(depth);
            }
        }
        depth += pushes;
        peak = peak.max(depth);
    }
    peak as u32
}

/// Argument count and whether a value is returned, from a call descriptor
fn call_effect(line: &str) -> (i64, bool) {
    let open = line.find('(').unwrap();
    let close = line.find(')').unwrap();
    let mut params = line[open + 1..close].chars().peekable();
    let mut count = 0;
    while let Some(c) = params.next() {
        match c {
            '[' => continue,
            'L' => {
                for c in params.by_ref() {
                    if c == ';' {
                        break;
                    }
                }
            }
            _ => {}
        }
        count += 1;
    }
    (count, !line[close + 1..].starts_with('V'))
}
