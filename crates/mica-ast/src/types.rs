//! Syntactic type annotations as they appear in source.
//!
//! These are what the parser produces; the resolver converts them to its
//! internal semantic `Type` representation.

use super::*;

/// Type expression
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    /// A named type: a primitive (`int`, `str`, ...), a struct, an enum,
    /// or a generic parameter in scope.
    Named(Ident),

    /// A named type applied to type arguments: `Wrapper<int>`
    Generic {
        base: Node<Ident>,
        args: Vec<Node<TypeExpr>>,
    },

    /// Array type: `[T]` or `[T; N]`
    Array {
        elem: Box<Node<TypeExpr>>,
        size: Option<u64>,
    },

    /// Function type: `func(T1, T2) -> R`
    Function {
        params: Vec<Node<TypeExpr>>,
        return_type: Box<Node<TypeExpr>>,
    },

    /// `Option<T>`
    Option(Box<Node<TypeExpr>>),

    /// `Result<T, E>`
    Result {
        ok: Box<Node<TypeExpr>>,
        err: Box<Node<TypeExpr>>,
    },

    /// Borrow type: `&T` or `&mut T`
    Borrow {
        inner: Box<Node<TypeExpr>>,
        mutable: bool,
    },
}
