//! Resolution diagnostics
//!
//! Diagnostics are accumulated values, never exceptions; the resolver keeps
//! walking after reporting one so a single run surfaces every error.

use std::fmt;
use mica_ast::Span;

/// The closed set of semantic error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    DuplicateDeclaration,
    UndefinedVariable,
    SelfReferentialInitializer,
    AssignToImmutable,
    TypeMismatch,
    ConditionNotBoolean,
    CannotBorrowImmutably,
    CannotBorrowMutably,
    CannotBorrowMutablyFromImmutable,
    UseOfMovedValue,
    ReturnOutsideFunction,
    MisplacedControlFlow,
    SelfOutsideStruct,
    MissingTraitMethod,
    SignatureMismatch,
    UnknownType,
    CyclicTypeDefinition,
    WrongArgumentCount,
    WrongArgumentType,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::DuplicateDeclaration => "DuplicateDeclaration",
            DiagnosticKind::UndefinedVariable => "UndefinedVariable",
            DiagnosticKind::SelfReferentialInitializer => "SelfReferentialInitializer",
            DiagnosticKind::AssignToImmutable => "AssignToImmutable",
            DiagnosticKind::TypeMismatch => "TypeMismatch",
            DiagnosticKind::ConditionNotBoolean => "ConditionNotBoolean",
            DiagnosticKind::CannotBorrowImmutably => "CannotBorrowImmutably",
            DiagnosticKind::CannotBorrowMutably => "CannotBorrowMutably",
            DiagnosticKind::CannotBorrowMutablyFromImmutable => "CannotBorrowMutablyFromImmutable",
            DiagnosticKind::UseOfMovedValue => "UseOfMovedValue",
            DiagnosticKind::ReturnOutsideFunction => "ReturnOutsideFunction",
            DiagnosticKind::MisplacedControlFlow => "MisplacedControlFlow",
            DiagnosticKind::SelfOutsideStruct => "SelfOutsideStruct",
            DiagnosticKind::MissingTraitMethod => "MissingTraitMethod",
            DiagnosticKind::SignatureMismatch => "SignatureMismatch",
            DiagnosticKind::UnknownType => "UnknownType",
            DiagnosticKind::CyclicTypeDefinition => "CyclicTypeDefinition",
            DiagnosticKind::WrongArgumentCount => "WrongArgumentCount",
            DiagnosticKind::WrongArgumentType => "WrongArgumentType",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single reported semantic error.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub span: Span,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn new(span: Span, kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            span,
            kind,
            message: message.into(),
        }
    }

    /// 1-based source line of the diagnostic.
    pub fn line(&self) -> u32 {
        self.span.line
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}: {}", self.line(), self.kind, self.message)
    }
}
