//! Pretty-printing for IR
//!
//! Renders the IR as OLLIR-style text for debugging and `--emit ir`.

use super::method::IrMethod;
use super::module::{ClassUnit, IrModule};
use super::instr::IrInstr;
use std::fmt::Write;

/// Trait for pretty-printing IR constructs
pub trait PrettyPrint {
    fn pretty_print(&self) -> String;
}

impl PrettyPrint for IrModule {
    fn pretty_print(&self) -> String {
        self.classes
            .iter()
            .map(PrettyPrint::pretty_print)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl PrettyPrint for ClassUnit {
    fn pretty_print(&self) -> String {
        let mut output = String::new();
        for import in &self.imports {
            let _ = writeln!(output, "import {};", import);
        }
        if !self.imports.is_empty() {
            output.push('\n');
        }

        let _ = write!(output, "{}", self.name);
        if let Some(superclass) = &self.superclass {
            let _ = write!(output, " extends {}", superclass);
        }
        output.push_str(" {\n");

        for field in &self.fields {
            let mut modifiers = String::new();
            if let Some(access) = field.access.keyword() {
                modifiers.push_str(access);
                modifiers.push(' ');
            }
            if field.is_static {
                modifiers.push_str("static ");
            }
            if field.is_final {
                modifiers.push_str("final ");
            }
            let _ = write!(output, "    .field {}{}.{}", modifiers, field.name, field.ty);
            if let Some(init) = &field.initial_value {
                let _ = write!(output, " = {}", init);
            }
            output.push_str(";\n");
        }
        if !self.fields.is_empty() {
            output.push('\n');
        }

        let _ = writeln!(output, "    .construct {}().V {{", self.name);
        let _ = writeln!(output, "        invokespecial(this, \"<init>\").V;");
        output.push_str("    }\n");

        for method in &self.methods {
            output.push('\n');
            output.push_str(&method.pretty_print());
        }

        output.push_str("}\n");
        output
    }
}

impl PrettyPrint for IrMethod {
    fn pretty_print(&self) -> String {
        let mut output = String::new();

        let mut modifiers = String::new();
        if let Some(access) = self.access.keyword() {
            modifiers.push_str(access);
            modifiers.push(' ');
        }
        if self.is_static {
            modifiers.push_str("static ");
        }
        if self.is_final {
            modifiers.push_str("final ");
        }
        let params: Vec<String> = self
            .params
            .iter()
            .map(|p| format!("{}.{}", p.name, p.ty))
            .collect();
        let _ = writeln!(
            output,
            "    .method {}{}({}).{} {{",
            modifiers,
            self.name,
            params.join(", "),
            self.return_type
        );

        for instr in &self.instructions {
            match instr {
                IrInstr::Label(_) => {
                    let _ = writeln!(output, "    {}", instr);
                }
                _ => {
                    let _ = writeln!(output, "        {}", instr);
                }
            }
        }

        output.push_str("    }\n");
        output
    }
}
