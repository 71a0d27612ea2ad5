//! Intermediate Representation (IR)
//!
//! Three-address code produced by lowering and consumed by the Jasmin
//! emitter. Methods are flat instruction lists with labels and jumps; every
//! operand carries a type tag.
//!
//! # Structure
//!
//! - `IrModule` - the lowered classes of one compilation
//! - `ClassUnit` - fields, imports and methods of one class
//! - `IrMethod` - var table, instructions and label map
//! - `IrInstr` - a single three-address instruction
//! - `Operand` - literal, named variable, temporary, receiver or class name

pub mod instr;
pub mod method;
pub mod module;
pub mod pretty;
pub mod value;

pub use instr::{BinaryOp, Call, CallKind, IrInstr, IrValue, Place, UnaryOp, ARRAY_TARGET};
pub use method::{IrMethod, IrVar, VarDescriptor, VarKey};
pub use module::{ClassUnit, IrField, IrModule};
pub use pretty::PrettyPrint;
pub use value::{IrType, Literal, Operand};
