//! Typed syntax tree of the Java-- language
//!
//! The tree is produced upstream (parser and semantic passes) and is read-only
//! to the backend, except for the optimizer which rewrites it into a new tree.
//! All nodes are closed enums and structs that serialize through serde, so a
//! driver can hand a checked tree over as JSON.
//!
//! # Structure
//!
//! - `Program` - imports plus exactly one class
//! - `ClassDecl` - fields and methods
//! - `MethodDecl` - parameters, declared locals and a statement body
//! - `Statement` / `Expression` - executable code

pub mod expression;
pub mod statement;
pub mod types;

pub use expression::{BinaryOperator, Expression};
pub use statement::Statement;
pub use types::Type;

use serde::{Deserialize, Serialize};

/// Access modifier of a class member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    /// `public`
    #[default]
    Public,
    /// `private`
    Private,
    /// `protected`
    Protected,
    /// No modifier
    Default,
}

impl Access {
    /// Modifier keyword, or `None` for package-private access
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            Access::Public => Some("public"),
            Access::Private => Some("private"),
            Access::Protected => Some("protected"),
            Access::Default => None,
        }
    }
}

/// A compilation unit: imports followed by one class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    /// Import declarations in source order
    #[serde(default)]
    pub imports: Vec<ImportDecl>,
    /// The declared class
    pub class: ClassDecl,
}

/// `import a.b.C;`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportDecl {
    /// Dotted path segments
    pub path: Vec<String>,
}

impl ImportDecl {
    /// Build an import from a dotted name such as `java.util.List`
    pub fn parse(dotted: &str) -> Self {
        Self {
            path: dotted.split('.').map(str::to_string).collect(),
        }
    }

    /// Full dotted name
    pub fn dotted(&self) -> String {
        self.path.join(".")
    }

    /// Last path segment, the name the import makes visible
    pub fn simple_name(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or_default()
    }
}

/// Class declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDecl {
    /// Class name
    pub name: String,
    /// Optional `extends` clause
    #[serde(default)]
    pub superclass: Option<String>,
    /// Field declarations
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
    /// Method declarations in source order
    #[serde(default)]
    pub methods: Vec<MethodDecl>,
}

/// Field declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDecl {
    /// Field name
    pub name: String,
    /// Field type
    pub ty: Type,
    /// Access modifier
    #[serde(default)]
    pub access: Access,
    /// `static`
    #[serde(default)]
    pub is_static: bool,
    /// `final`
    #[serde(default)]
    pub is_final: bool,
    /// Set by the parser when the type was written `T...`
    #[serde(default)]
    pub is_varargs: bool,
    /// Constant initializer (must be a literal)
    #[serde(default)]
    pub initializer: Option<Expression>,
}

impl FieldDecl {
    /// Public instance field without initializer
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            access: Access::Public,
            is_static: false,
            is_final: false,
            is_varargs: false,
            initializer: None,
        }
    }
}

/// Local variable declaration (`int x;`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarDecl {
    /// Variable name
    pub name: String,
    /// Declared type
    pub ty: Type,
}

impl VarDecl {
    /// Create a declaration
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Method parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    /// Parameter name
    pub name: String,
    /// Parameter type (an array type for varargs)
    pub ty: Type,
    /// `T... name`
    #[serde(default)]
    pub is_varargs: bool,
}

impl Param {
    /// Ordinary parameter
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            is_varargs: false,
        }
    }

    /// Varargs parameter `element... name`
    pub fn varargs(name: impl Into<String>, element: Type) -> Self {
        Self {
            name: name.into(),
            ty: Type::array_of(element),
            is_varargs: true,
        }
    }
}

/// Method declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDecl {
    /// Method name
    pub name: String,
    /// Access modifier
    #[serde(default)]
    pub access: Access,
    /// `static`
    #[serde(default)]
    pub is_static: bool,
    /// `final`
    #[serde(default)]
    pub is_final: bool,
    /// Return type
    pub return_type: Type,
    /// Set by the parser when the return type was written `T...`
    #[serde(default)]
    pub returns_varargs: bool,
    /// Parameters in order
    #[serde(default)]
    pub params: Vec<Param>,
    /// Declared locals in order
    #[serde(default)]
    pub locals: Vec<VarDecl>,
    /// Body statements
    #[serde(default)]
    pub body: Vec<Statement>,
}

impl MethodDecl {
    /// Public instance method with an empty body
    pub fn new(name: impl Into<String>, return_type: Type) -> Self {
        Self {
            name: name.into(),
            access: Access::Public,
            is_static: false,
            is_final: false,
            return_type,
            returns_varargs: false,
            params: Vec::new(),
            locals: Vec::new(),
            body: Vec::new(),
        }
    }

    /// `public static void main(String[] args)`
    pub fn main(args: impl Into<String>) -> Self {
        let mut method = Self::new("main", Type::Void);
        method.is_static = true;
        method.params.push(Param::new(args, Type::array_of(Type::String)));
        method
    }

    /// Builder: add a parameter
    pub fn with_param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    /// Builder: declare a local
    pub fn with_local(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.locals.push(VarDecl::new(name, ty));
        self
    }

    /// Builder: set the body
    pub fn with_body(mut self, body: Vec<Statement>) -> Self {
        self.body = body;
        self
    }

    /// Check if `name` is a declared local or parameter of this method
    pub fn declares(&self, name: &str) -> bool {
        self.locals.iter().any(|l| l.name == name) || self.params.iter().any(|p| p.name == name)
    }
}
