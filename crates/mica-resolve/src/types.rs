//! Semantic type model
//!
//! Immutable value objects with structural equality. Struct and enum types
//! carry only their name; field and member details live in the declaration
//! registry, which enforces unique names, so name equality coincides with
//! structural equality.

use std::fmt;

/// A resolved type.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Int,
    Float,
    Bool,
    Str,
    Char,
    Void,
    /// Best-effort sentinel used after an error so sibling nodes keep
    /// resolving, and for unconstrained generic parameters.
    Unknown,
    Struct(String),
    Enum(String),
    Function {
        params: Vec<Type>,
        ret: Box<Type>,
    },
    Array {
        elem: Box<Type>,
        size: Option<u64>,
    },
    Option(Box<Type>),
    Result {
        ok: Box<Type>,
        err: Box<Type>,
    },
    Borrow {
        inner: Box<Type>,
        mutable: bool,
    },
}

impl Type {
    /// Whether values of this type copy on use instead of moving.
    /// Primitives, enums, borrows, and function values copy; `str`,
    /// structs, arrays, `Option` and `Result` move.
    pub fn is_copy(&self) -> bool {
        match self {
            Type::Int
            | Type::Float
            | Type::Bool
            | Type::Char
            | Type::Void
            | Type::Unknown
            | Type::Enum(_)
            | Type::Function { .. }
            | Type::Borrow { .. } => true,
            Type::Str
            | Type::Struct(_)
            | Type::Array { .. }
            | Type::Option(_)
            | Type::Result { .. } => false,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Int | Type::Float)
    }

    /// Whether a value of type `actual` is acceptable where `self` is
    /// expected. Structural equality with two widenings: `Unknown` matches
    /// anything (error recovery and unconstrained generics), and
    /// `Option<T>` accepts a bare `T` or the `none` literal, never the
    /// reverse. Immutable borrows accept mutable ones.
    pub fn accepts(&self, actual: &Type) -> bool {
        match (self, actual) {
            (Type::Unknown, _) | (_, Type::Unknown) => true,
            (Type::Option(inner), Type::Option(actual_inner)) => inner.accepts(actual_inner),
            (Type::Option(inner), other) => inner.accepts(other),
            (
                Type::Borrow { inner, mutable },
                Type::Borrow {
                    inner: actual_inner,
                    mutable: actual_mutable,
                },
            ) => (!mutable || *actual_mutable) && inner.accepts(actual_inner),
            (
                Type::Function { params, ret },
                Type::Function {
                    params: actual_params,
                    ret: actual_ret,
                },
            ) => {
                params.len() == actual_params.len()
                    && params
                        .iter()
                        .zip(actual_params)
                        .all(|(p, a)| p.accepts(a))
                    && ret.accepts(actual_ret)
            }
            (
                Type::Array { elem, size },
                Type::Array {
                    elem: actual_elem,
                    size: actual_size,
                },
            ) => elem.accepts(actual_elem) && (size.is_none() || size == actual_size),
            (
                Type::Result { ok, err },
                Type::Result {
                    ok: actual_ok,
                    err: actual_err,
                },
            ) => ok.accepts(actual_ok) && err.accepts(actual_err),
            _ => self == actual,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Float => write!(f, "float"),
            Type::Bool => write!(f, "bool"),
            Type::Str => write!(f, "str"),
            Type::Char => write!(f, "char"),
            Type::Void => write!(f, "void"),
            Type::Unknown => write!(f, "<unknown>"),
            Type::Struct(name) | Type::Enum(name) => write!(f, "{}", name),
            Type::Function { params, ret } => {
                write!(f, "func(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", p)?;
                }
                write!(f, ") -> {}", ret)
            }
            Type::Array { elem, size: None } => write!(f, "[{}]", elem),
            Type::Array {
                elem,
                size: Some(n),
            } => write!(f, "[{}; {}]", elem, n),
            Type::Option(inner) => write!(f, "Option<{}>", inner),
            Type::Result { ok, err } => write!(f, "Result<{}, {}>", ok, err),
            Type::Borrow { inner, mutable } => {
                if *mutable {
                    write!(f, "&mut {}", inner)
                } else {
                    write!(f, "&{}", inner)
                }
            }
        }
    }
}
