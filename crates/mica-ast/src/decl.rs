//! Declaration definitions for the AST

use super::*;

/// Function parameter: `name: type`
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Node<Ident>,
    pub ty: Node<TypeExpr>,
}

/// Function declaration. Also used for impl methods, where `self` is an
/// implicit binding rather than a declared parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: Node<Ident>,
    pub generics: Vec<Node<Ident>>,
    pub params: Vec<Param>,
    pub return_type: Option<Node<TypeExpr>>,
    pub body: Vec<Node<Stmt>>,
}

/// Struct field: `name: type` with an optional visibility marker.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name: Node<Ident>,
    pub ty: Node<TypeExpr>,
    pub visibility: Visibility,
}

/// Struct declaration
#[derive(Debug, Clone, PartialEq)]
pub struct StructDecl {
    pub name: Node<Ident>,
    pub generics: Vec<Node<Ident>>,
    pub fields: Vec<FieldDecl>,
}

/// Trait method signature (no body)
#[derive(Debug, Clone, PartialEq)]
pub struct TraitMethod {
    pub name: Node<Ident>,
    pub params: Vec<Param>,
    pub return_type: Option<Node<TypeExpr>>,
}

/// Trait declaration
#[derive(Debug, Clone, PartialEq)]
pub struct TraitDecl {
    pub name: Node<Ident>,
    pub generics: Vec<Node<Ident>>,
    pub methods: Vec<TraitMethod>,
}

/// Impl block. `trait_name` is absent for inherent impls.
#[derive(Debug, Clone, PartialEq)]
pub struct ImplDecl {
    pub struct_name: Node<Ident>,
    pub trait_name: Option<Node<Ident>>,
    pub generics: Vec<Node<Ident>>,
    pub methods: Vec<FunctionDecl>,
}

/// Enum declaration: a flat list of unit members.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDecl {
    pub name: Node<Ident>,
    pub members: Vec<Node<Ident>>,
}
