//! Statement definitions for the AST

use super::*;

/// Statement
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Expression statement
    Expression(Node<Expr>),

    /// Variable declaration: let/mut name: ty = init;
    Let {
        name: Node<Ident>,
        ty: Option<Node<TypeExpr>>,
        init: Option<Node<Expr>>,
        mutable: bool,
        visibility: Visibility,
    },

    /// Block: { stmts }
    Block(Vec<Node<Stmt>>),

    /// If statement; branches are always blocks
    If {
        condition: Node<Expr>,
        then_branch: Box<Node<Stmt>>,
        else_branch: Option<Box<Node<Stmt>>>,
    },

    /// While loop
    While {
        condition: Node<Expr>,
        body: Box<Node<Stmt>>,
    },

    /// C-style for loop
    For {
        init: Option<Box<Node<Stmt>>>,
        condition: Option<Node<Expr>>,
        step: Option<Node<Expr>>,
        body: Box<Node<Stmt>>,
    },

    /// Function declaration
    Function(FunctionDecl),

    /// Return statement
    Return(Option<Node<Expr>>),

    /// Struct declaration (fields only; methods come from impls)
    Struct(StructDecl),

    /// Trait declaration (method signatures only)
    Trait(TraitDecl),

    /// Impl block: `impl Trait for Struct { ... }` or `impl Struct { ... }`
    Impl(ImplDecl),

    /// Enum declaration
    Enum(EnumDecl),

    /// Switch statement
    Switch {
        scrutinee: Node<Expr>,
        cases: Vec<SwitchCase>,
        default: Option<Vec<Node<Stmt>>>,
    },

    /// Break out of a loop or switch
    Break,

    /// Fall through to the next switch case
    Fallthrough,

    /// Import of a standard module or a source file
    Import(ImportPath),
}

/// A single `case value: { body }` arm of a switch statement.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    pub value: Node<Expr>,
    pub body: Vec<Node<Stmt>>,
}

/// Import target: `import math;` names a standard module, while
/// `import "lib.mica";` names another source file.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportPath {
    Module(Ident),
    File(String),
}
