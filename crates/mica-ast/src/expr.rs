//! Expression definitions for the AST

use super::*;
use std::fmt;

/// Expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal values
    Literal(Literal),

    /// Identifier reference
    Variable(Ident),

    /// `self` inside a method body
    SelfExpr,

    /// Unary operation: op expr
    Unary {
        op: UnaryOp,
        operand: Box<Node<Expr>>,
    },

    /// Binary operation: left op right
    Binary {
        left: Box<Node<Expr>>,
        op: BinaryOp,
        right: Box<Node<Expr>>,
    },

    /// Assignment to a named binding: name = value
    Assign {
        name: Node<Ident>,
        value: Box<Node<Expr>>,
    },

    /// Borrow: &expr or &mut expr
    Borrow {
        expr: Box<Node<Expr>>,
        mutable: bool,
    },

    /// Field access: object.field
    Get {
        object: Box<Node<Expr>>,
        field: Node<Ident>,
    },

    /// Field assignment: object.field = value
    Set {
        object: Box<Node<Expr>>,
        field: Node<Ident>,
        value: Box<Node<Expr>>,
    },

    /// Function call: callee<generic_args>(args)
    Call {
        callee: Box<Node<Expr>>,
        generic_args: Vec<Node<TypeExpr>>,
        args: Vec<Node<Expr>>,
    },

    /// Lambda: |params| -> ret { body }
    Lambda {
        params: Vec<Param>,
        return_type: Option<Box<Node<TypeExpr>>>,
        body: Vec<Node<Stmt>>,
    },

    /// Struct literal: Name{field: value, ...}
    StructInit {
        name: Node<Ident>,
        fields: Vec<FieldInit>,
    },

    /// Array literal: [elem1, elem2, ...]
    Array(Vec<Node<Expr>>),
}

/// A single `field: value` entry in a struct literal.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldInit {
    pub name: Node<Ident>,
    pub value: Node<Expr>,
}

/// Literal values
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Str(String),
    Char(char),
    Bool(bool),
    /// The empty Option value, `none`
    None,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Rem,

    // Comparison
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Logical
    And,
    Or,
}

impl BinaryOp {
    /// Canonical method name used for operator overloading on struct
    /// operands, e.g. `+` dispatches to an impl method named `add`.
    pub fn overload_method(&self) -> Option<&'static str> {
        match self {
            BinaryOp::Add => Some("add"),
            BinaryOp::Sub => Some("sub"),
            BinaryOp::Mul => Some("mul"),
            BinaryOp::Div => Some("div"),
            BinaryOp::Rem => Some("rem"),
            BinaryOp::Eq => Some("eq"),
            BinaryOp::NotEq => Some("ne"),
            _ => None,
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Not,
    Deref,
}

// Display implementations

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
            UnaryOp::Deref => "*",
        };
        write!(f, "{}", s)
    }
}
