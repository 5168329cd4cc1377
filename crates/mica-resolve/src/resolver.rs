//! The resolver driver
//!
//! A single synchronous tree walk that sequences scope management, type
//! inference, and ownership checks. One `Resolver` serves one `resolve`
//! call; independent instances share nothing.

use std::collections::HashMap;

use mica_ast::{NodeId, Program, Span};

use crate::collect::Registry;
use crate::error::{Diagnostic, DiagnosticKind};
use crate::scope::ScopeStack;
use crate::types::Type;

/// Recognized standard modules for `import`.
pub const STD_MODULES: &[&str] = &[
    "math", "string", "array", "os", "time", "random", "fs", "operator",
];

/// Per-node resolved types, keyed by the parser's node ids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeTable {
    map: HashMap<NodeId, Type>,
}

impl TypeTable {
    pub fn get(&self, id: NodeId) -> Option<&Type> {
        self.map.get(&id)
    }

    pub(crate) fn insert(&mut self, id: NodeId, ty: Type) {
        self.map.insert(id, ty);
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// The outcome of resolving one program: the type annotations and the
/// ordered diagnostic list. Code generation must refuse a resolution whose
/// diagnostic list is non-empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub types: TypeTable,
    pub diagnostics: Vec<Diagnostic>,
}

impl Resolution {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Ambient control-flow context for `break`/`fallthrough` gating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FlowCtx {
    None,
    Loop,
    Switch,
}

pub struct Resolver {
    pub(crate) scopes: ScopeStack,
    pub(crate) registry: Registry,
    pub(crate) diagnostics: Vec<Diagnostic>,
    pub(crate) types: TypeTable,
    /// Declared return type of the enclosing function, None at top level.
    pub(crate) fn_ret: Option<Type>,
    /// Name of the struct whose method body is being walked.
    pub(crate) struct_ctx: Option<String>,
    pub(crate) flow_ctx: FlowCtx,
}

impl Resolver {
    pub(crate) fn new(registry: Registry, diagnostics: Vec<Diagnostic>) -> Self {
        let mut resolver = Self {
            scopes: ScopeStack::new(),
            registry,
            diagnostics,
            types: TypeTable::default(),
            fn_ret: None,
            struct_ctx: None,
            flow_ctx: FlowCtx::None,
        };
        resolver.declare_builtins();
        resolver
    }

    /// Built-in bindings available in every program.
    fn declare_builtins(&mut self) {
        self.declare_global(
            "print",
            Type::Function {
                params: vec![Type::Unknown],
                ret: Box::new(Type::Void),
            },
        );
        self.declare_global(
            "input",
            Type::Function {
                params: vec![],
                ret: Box::new(Type::Str),
            },
        );
    }

    fn declare_global(&mut self, name: &str, ty: Type) {
        if let Ok(id) = self.scopes.declare(name, false) {
            self.scopes.set_type(id, ty);
            self.scopes.mark_defined(id);
        }
    }

    /// Binds every collected top-level function in the global scope, so a
    /// call can precede the definition in source order. The walk itself
    /// must not re-declare these.
    fn bind_collected_functions(&mut self, program: &Program) {
        for stmt in &program.stmts {
            if let mica_ast::Stmt::Function(decl) = &stmt.value {
                let name = &decl.name.value.name;
                if let Some(sig) = self.registry.function_sig(name) {
                    let ty = sig.as_type();
                    self.declare_global(name, ty);
                }
            }
        }
    }

    pub(crate) fn resolve(mut self, program: &Program) -> Resolution {
        self.bind_collected_functions(program);
        for stmt in &program.stmts {
            self.resolve_stmt(stmt);
        }
        Resolution {
            types: self.types,
            diagnostics: self.diagnostics,
        }
    }

    // =========================================================================
    // Shared helpers
    // =========================================================================

    pub(crate) fn diag(&mut self, span: Span, kind: DiagnosticKind, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::new(span, kind, message));
    }

    /// Runs `f` inside a fresh scope; the scope is popped (and its borrows
    /// rolled back) on every path out of `f`.
    pub(crate) fn in_scope<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.scopes.enter_scope();
        let result = f(self);
        self.scopes.exit_scope();
        result
    }

    pub(crate) fn with_flow<T>(&mut self, flow: FlowCtx, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = self.flow_ctx;
        self.flow_ctx = flow;
        let result = f(self);
        self.flow_ctx = saved;
        result
    }

    /// Lowers a type annotation, reporting `UnknownType` and falling back
    /// to the sentinel on failure.
    pub(crate) fn lower_type(&mut self, node: &mica_ast::Node<mica_ast::TypeExpr>) -> Type {
        match self.registry.lower_type(node, &[]) {
            Ok(ty) => ty,
            Err(name) => {
                self.diag(
                    node.span,
                    DiagnosticKind::UnknownType,
                    format!("Unknown type '{}'", name),
                );
                Type::Unknown
            }
        }
    }
}
