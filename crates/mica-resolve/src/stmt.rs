//! Statement resolution

use mica_ast::*;

use crate::error::DiagnosticKind;
use crate::resolver::{FlowCtx, Resolver, STD_MODULES};
use crate::types::Type;

impl Resolver {
    pub(crate) fn resolve_stmt(&mut self, stmt: &Node<Stmt>) {
        match &stmt.value {
            Stmt::Expression(expr) => {
                self.resolve_expr(expr);
            }
            Stmt::Let {
                name,
                ty,
                init,
                mutable,
                ..
            } => self.resolve_let(name, ty.as_ref(), init.as_ref(), *mutable),
            Stmt::Block(stmts) => self.in_scope(|r| {
                for stmt in stmts {
                    r.resolve_stmt(stmt);
                }
            }),
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.check_condition(condition);
                self.resolve_stmt(then_branch);
                if let Some(else_branch) = else_branch {
                    self.resolve_stmt(else_branch);
                }
            }
            Stmt::While { condition, body } => {
                self.check_condition(condition);
                self.with_flow(FlowCtx::Loop, |r| r.resolve_stmt(body));
            }
            Stmt::For {
                init,
                condition,
                step,
                body,
            } => self.in_scope(|r| {
                if let Some(init) = init {
                    r.resolve_stmt(init);
                }
                if let Some(condition) = condition {
                    r.check_condition(condition);
                }
                if let Some(step) = step {
                    r.resolve_expr(step);
                }
                r.with_flow(FlowCtx::Loop, |r| r.resolve_stmt(body));
            }),
            Stmt::Function(decl) => self.resolve_function(decl),
            Stmt::Return(value) => self.resolve_return(stmt.span, value.as_ref()),
            // Registered by the declaration collector; nothing to walk.
            Stmt::Struct(_) | Stmt::Trait(_) | Stmt::Enum(_) => {}
            Stmt::Impl(decl) => self.resolve_impl(decl),
            Stmt::Switch {
                scrutinee,
                cases,
                default,
            } => self.resolve_switch(scrutinee, cases, default.as_deref()),
            Stmt::Break => {
                if self.flow_ctx == FlowCtx::None {
                    self.diag(
                        stmt.span,
                        DiagnosticKind::MisplacedControlFlow,
                        "'break' outside of a loop or switch",
                    );
                }
            }
            Stmt::Fallthrough => {
                if self.flow_ctx != FlowCtx::Switch {
                    self.diag(
                        stmt.span,
                        DiagnosticKind::MisplacedControlFlow,
                        "'fallthrough' outside of a switch case",
                    );
                }
            }
            Stmt::Import(path) => self.resolve_import(stmt.span, path),
        }
    }

    fn resolve_let(
        &mut self,
        name: &Node<Ident>,
        ty: Option<&Node<TypeExpr>>,
        init: Option<&Node<Expr>>,
        mutable: bool,
    ) {
        // On redeclaration, report and keep resolving against the existing
        // binding; one bad statement must not take down the walk.
        let id = match self.scopes.declare(&name.value.name, mutable) {
            Ok(id) => id,
            Err(existing) => {
                self.diag(
                    name.span,
                    DiagnosticKind::DuplicateDeclaration,
                    format!(
                        "The name '{}' is already declared in this scope",
                        name.value.name
                    ),
                );
                existing
            }
        };

        let declared = ty.map(|ty| self.lower_type(ty));

        // The binding is not yet defined while its initializer resolves, so
        // `let a = a;` is caught as a self-referential read.
        let init_ty = init.map(|expr| {
            let ty = self.resolve_expr(expr);
            self.consume_value(expr, &ty);
            ty
        });

        let binding_ty = match (declared, init_ty) {
            (Some(declared), Some(actual)) => {
                if !declared.accepts(&actual) {
                    let span = init.map(|e| e.span).unwrap_or(name.span);
                    self.diag(
                        span,
                        DiagnosticKind::TypeMismatch,
                        format!("Expected '{}', found '{}'", declared, actual),
                    );
                }
                declared
            }
            (Some(declared), None) => declared,
            (None, Some(actual)) => actual,
            (None, None) => Type::Unknown,
        };

        self.scopes.set_type(id, binding_ty);
        self.scopes.mark_defined(id);
    }

    fn check_condition(&mut self, condition: &Node<Expr>) {
        let ty = self.resolve_expr(condition);
        if !matches!(ty, Type::Bool | Type::Unknown) {
            self.diag(
                condition.span,
                DiagnosticKind::ConditionNotBoolean,
                format!("Condition must be 'bool', found '{}'", ty),
            );
        }
    }

    fn resolve_function(&mut self, decl: &FunctionDecl) {
        let name = &decl.name.value.name;
        let generics: Vec<String> = decl.generics.iter().map(|g| g.value.name.clone()).collect();

        // Top-level functions are already declared by the collector; only
        // nested ones are declared here, in the enclosing scope.
        let sig = if self.scopes.depth() == 1 {
            self.registry.function_sig(name).cloned()
        } else {
            None
        };
        let sig = match sig {
            Some(sig) => sig,
            None => {
                let params = decl
                    .params
                    .iter()
                    .map(|p| self.lower_generic_type(&p.ty, &generics))
                    .collect();
                let ret = decl
                    .return_type
                    .as_ref()
                    .map(|ty| self.lower_generic_type(ty, &generics))
                    .unwrap_or(Type::Void);
                let sig = crate::collect::FnSig { params, ret };
                match self.scopes.declare(name, false) {
                    Ok(id) => {
                        self.scopes.set_type(id, sig.as_type());
                        self.scopes.mark_defined(id);
                    }
                    Err(_) => {
                        self.diag(
                            decl.name.span,
                            DiagnosticKind::DuplicateDeclaration,
                            format!(
                                "The name '{}' is already declared in this scope",
                                name
                            ),
                        );
                    }
                }
                sig
            }
        };

        self.resolve_function_body(&decl.params, &sig.params, sig.ret, None, &decl.body);
    }

    /// Walks a function or method body with its own parameter scope and
    /// ambient contexts; loop/switch context never crosses the boundary.
    pub(crate) fn resolve_function_body(
        &mut self,
        params: &[Param],
        param_tys: &[Type],
        ret: Type,
        self_struct: Option<String>,
        body: &[Node<Stmt>],
    ) {
        let saved_ret = self.fn_ret.take();
        let saved_struct = self.struct_ctx.take();
        self.fn_ret = Some(ret);
        self.struct_ctx = self_struct;

        self.with_flow(FlowCtx::None, |r| {
            r.in_scope(|r| {
                for (param, ty) in params.iter().zip(param_tys) {
                    match r.scopes.declare(&param.name.value.name, false) {
                        Ok(id) => {
                            r.scopes.set_type(id, ty.clone());
                            r.scopes.mark_defined(id);
                        }
                        Err(_) => r.diag(
                            param.name.span,
                            DiagnosticKind::DuplicateDeclaration,
                            format!(
                                "Parameter '{}' is declared twice",
                                param.name.value.name
                            ),
                        ),
                    }
                }
                for stmt in body {
                    r.resolve_stmt(stmt);
                }
            })
        });

        self.fn_ret = saved_ret;
        self.struct_ctx = saved_struct;
    }

    fn resolve_return(&mut self, span: Span, value: Option<&Node<Expr>>) {
        let expected = match self.fn_ret.clone() {
            Some(expected) => expected,
            None => {
                self.diag(
                    span,
                    DiagnosticKind::ReturnOutsideFunction,
                    "'return' outside of a function",
                );
                // Still resolve the value so its own errors surface.
                if let Some(value) = value {
                    self.resolve_expr(value);
                }
                return;
            }
        };

        let actual = match value {
            Some(value) => {
                let ty = self.resolve_expr(value);
                self.consume_value(value, &ty);
                ty
            }
            None => Type::Void,
        };

        if !expected.accepts(&actual) {
            let span = value.map(|v| v.span).unwrap_or(span);
            self.diag(
                span,
                DiagnosticKind::TypeMismatch,
                format!("Expected return type '{}', found '{}'", expected, actual),
            );
        }
    }

    fn resolve_impl(&mut self, decl: &ImplDecl) {
        let struct_name = decl.struct_name.value.name.clone();
        if !self.registry.is_struct(&struct_name) {
            // The collector already reported the unknown struct.
            return;
        }

        if let Some(trait_name) = &decl.trait_name {
            self.check_trait_conformance(&struct_name, trait_name, decl);
        }

        for method in &decl.methods {
            let sig = self
                .registry
                .method(&struct_name, &method.name.value.name)
                .map(|m| m.sig.clone());
            let Some(sig) = sig else { continue };
            self.resolve_function_body(
                &method.params,
                &sig.params,
                sig.ret,
                Some(struct_name.clone()),
                &method.body,
            );
        }
    }

    fn check_trait_conformance(
        &mut self,
        struct_name: &str,
        trait_name: &Node<Ident>,
        decl: &ImplDecl,
    ) {
        let Some(trait_info) = self.registry.trait_info(&trait_name.value.name).cloned() else {
            self.diag(
                trait_name.span,
                DiagnosticKind::UnknownType,
                format!("Unknown trait '{}'", trait_name.value.name),
            );
            return;
        };

        for (method_name, expected_sig) in &trait_info.methods {
            let found = self
                .registry
                .method(struct_name, method_name)
                .map(|m| m.sig.clone());
            match found {
                None => self.diag(
                    decl.struct_name.span,
                    DiagnosticKind::MissingTraitMethod,
                    format!(
                        "Impl of trait '{}' for '{}' is missing method '{}'",
                        trait_name.value.name, struct_name, method_name
                    ),
                ),
                Some(sig) => {
                    if &sig != expected_sig {
                        let span = decl
                            .methods
                            .iter()
                            .find(|m| &m.name.value.name == method_name)
                            .map(|m| m.name.span)
                            .unwrap_or(decl.struct_name.span);
                        self.diag(
                            span,
                            DiagnosticKind::SignatureMismatch,
                            format!(
                                "Method '{}' does not match the signature declared by trait '{}'",
                                method_name, trait_name.value.name
                            ),
                        );
                    }
                }
            }
        }
    }

    fn resolve_switch(
        &mut self,
        scrutinee: &Node<Expr>,
        cases: &[SwitchCase],
        default: Option<&[Node<Stmt>]>,
    ) {
        let scrutinee_ty = self.resolve_expr(scrutinee);

        for case in cases {
            let value_ty = self.resolve_expr(&case.value);
            if !scrutinee_ty.accepts(&value_ty) {
                self.diag(
                    case.value.span,
                    DiagnosticKind::TypeMismatch,
                    format!(
                        "Case value of type '{}' is not comparable to scrutinee type '{}'",
                        value_ty, scrutinee_ty
                    ),
                );
            }
            self.with_flow(FlowCtx::Switch, |r| {
                r.in_scope(|r| {
                    for stmt in &case.body {
                        r.resolve_stmt(stmt);
                    }
                })
            });
        }

        if let Some(default) = default {
            self.with_flow(FlowCtx::Switch, |r| {
                r.in_scope(|r| {
                    for stmt in default {
                        r.resolve_stmt(stmt);
                    }
                })
            });
        }
    }

    fn resolve_import(&mut self, span: Span, path: &ImportPath) {
        match path {
            ImportPath::Module(name) => {
                if STD_MODULES.contains(&name.name.as_str()) {
                    // The module name becomes a defined immutable global;
                    // member lookup on it is deferred to code generation.
                    if let Ok(id) = self.scopes.declare(&name.name, false) {
                        self.scopes.set_type(id, Type::Unknown);
                        self.scopes.mark_defined(id);
                    }
                } else {
                    self.diag(
                        span,
                        DiagnosticKind::UnknownType,
                        format!("Unknown standard module '{}'", name.name),
                    );
                }
            }
            // File imports are resolved per module by the driver; a single
            // module resolution accepts and skips them.
            ImportPath::File(_) => {}
        }
    }

    fn lower_generic_type(
        &mut self,
        node: &Node<TypeExpr>,
        generics: &[String],
    ) -> Type {
        match self.registry.lower_type(node, generics) {
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
