//! Expression resolution
//!
//! Every expression node gets a best-effort type annotation; errors fall
//! back to the `Unknown` sentinel so sibling nodes keep resolving instead
//! of cascading.

use mica_ast::*;

use crate::error::DiagnosticKind;
use crate::resolver::Resolver;
use crate::types::Type;

impl Resolver {
    pub(crate) fn resolve_expr(&mut self, node: &Node<Expr>) -> Type {
        let ty = self.resolve_expr_inner(node);
        self.types.insert(node.id, ty.clone());
        ty
    }

    /// Consumes the value of `node` by a non-borrowing use. Only a plain
    /// variable of a non-copy type actually moves; everything else either
    /// copies or is a temporary that owns no binding.
    pub(crate) fn consume_value(&mut self, node: &Node<Expr>, ty: &Type) {
        if ty.is_copy() {
            return;
        }
        if let Expr::Variable(ident) = &node.value {
            if let Some(id) = self.scopes.lookup(&ident.name) {
                self.scopes.record_move(id);
            }
        }
    }

    fn resolve_expr_inner(&mut self, node: &Node<Expr>) -> Type {
        match &node.value {
            Expr::Literal(lit) => match lit {
                Literal::Int(_) => Type::Int,
                Literal::Float(_) => Type::Float,
                Literal::Str(_) => Type::Str,
                Literal::Char(_) => Type::Char,
                Literal::Bool(_) => Type::Bool,
                // `none` is an Option of a yet-unknown payload; assignment
                // compatibility widens it into any Option<T>.
                Literal::None => Type::Option(Box::new(Type::Unknown)),
            },
            Expr::Variable(ident) => self.resolve_variable(node.span, ident),
            Expr::SelfExpr => match self.struct_ctx.clone() {
                Some(name) => Type::Struct(name),
                None => {
                    self.diag(
                        node.span,
                        DiagnosticKind::SelfOutsideStruct,
                        "'self' outside of a struct method",
                    );
                    Type::Unknown
                }
            },
            Expr::Unary { op, operand } => self.resolve_unary(*op, operand),
            Expr::Binary { left, op, right } => self.resolve_binary(node.span, left, *op, right),
            Expr::Assign { name, value } => self.resolve_assign(name, value),
            Expr::Borrow { expr, mutable } => self.resolve_borrow(node.span, expr, *mutable),
            Expr::Get { object, field } => self.resolve_get(object, field),
            Expr::Set {
                object,
                field,
                value,
            } => self.resolve_set(object, field, value),
            Expr::Call {
                callee,
                generic_args,
                args,
            } => self.resolve_call(node.span, callee, generic_args, args),
            Expr::Lambda {
                params,
                return_type,
                body,
            } => self.resolve_lambda(params, return_type.as_deref(), body),
            Expr::StructInit { name, fields } => self.resolve_struct_init(name, fields),
            Expr::Array(elements) => self.resolve_array(elements),
        }
    }

    fn resolve_variable(&mut self, span: Span, ident: &Ident) -> Type {
        let Some(id) = self.scopes.lookup(&ident.name) else {
            self.diag(
                span,
                DiagnosticKind::UndefinedVariable,
                format!("Undefined variable '{}'", ident.name),
            );
            return Type::Unknown;
        };

        if let Err(kind) = self.scopes.record_read(id) {
            let message = match kind {
                DiagnosticKind::SelfReferentialInitializer => format!(
                    "'{}' is read inside its own initializer",
                    ident.name
                ),
                _ => format!(
                    "'{}' was moved and cannot be read until it is reassigned",
                    ident.name
                ),
            };
            self.diag(span, kind, message);
        }

        self.scopes
            .binding(id)
            .declared_type
            .clone()
            .unwrap_or(Type::Unknown)
    }

    fn resolve_unary(&mut self, op: UnaryOp, operand: &Node<Expr>) -> Type {
        let ty = self.resolve_expr(operand);
        match op {
            UnaryOp::Neg => {
                if ty.is_numeric() || ty == Type::Unknown {
                    ty
                } else {
                    self.diag(
                        operand.span,
                        DiagnosticKind::TypeMismatch,
                        format!("Cannot negate a value of type '{}'", ty),
                    );
                    Type::Unknown
                }
            }
            UnaryOp::Not => {
                if !matches!(ty, Type::Bool | Type::Unknown) {
                    self.diag(
                        operand.span,
                        DiagnosticKind::TypeMismatch,
                        format!("Operator '!' requires 'bool', found '{}'", ty),
                    );
                }
                Type::Bool
            }
            UnaryOp::Deref => match ty {
                Type::Borrow { inner, .. } => *inner,
                Type::Unknown => Type::Unknown,
                other => {
                    self.diag(
                        operand.span,
                        DiagnosticKind::TypeMismatch,
                        format!("Cannot dereference a value of type '{}'", other),
                    );
                    Type::Unknown
                }
            },
        }
    }

    fn resolve_binary(
        &mut self,
        span: Span,
        left: &Node<Expr>,
        op: BinaryOp,
        right: &Node<Expr>,
    ) -> Type {
        let left_ty = self.resolve_expr(left);
        let right_ty = self.resolve_expr(right);

        if matches!(op, BinaryOp::And | BinaryOp::Or) {
            for (ty, node) in [(&left_ty, left), (&right_ty, right)] {
                if !matches!(ty, Type::Bool | Type::Unknown) {
                    self.diag(
                        node.span,
                        DiagnosticKind::TypeMismatch,
                        format!("Operator '{}' requires 'bool', found '{}'", op, ty),
                    );
                }
            }
            return Type::Bool;
        }

        // Operator overloading: a struct left operand dispatches to the
        // canonical impl method when one exists (`+` to `add`, and so on).
        if let Type::Struct(struct_name) = &left_ty {
            if let Some(method_name) = op.overload_method() {
                if let Some(info) = self.registry.method(struct_name, method_name).cloned() {
                    if let Some(param) = info.sig.params.first() {
                        if !dispatch_compatible(param, &right_ty) {
                            self.diag(
                                right.span,
                                DiagnosticKind::TypeMismatch,
                                format!(
                                    "Operator '{}' on '{}' expects '{}', found '{}'",
                                    op, struct_name, param, right_ty
                                ),
                            );
                        }
                    }
                    return info.sig.ret;
                }
            }
        }

        if left_ty == Type::Unknown || right_ty == Type::Unknown {
            return match op {
                BinaryOp::Eq
                | BinaryOp::NotEq
                | BinaryOp::Lt
                | BinaryOp::LtEq
                | BinaryOp::Gt
                | BinaryOp::GtEq => Type::Bool,
                _ => Type::Unknown,
            };
        }

        if left_ty != right_ty {
            self.diag(
                span,
                DiagnosticKind::TypeMismatch,
                format!(
                    "Operands of '{}' have mismatched types '{}' and '{}'",
                    op, left_ty, right_ty
                ),
            );
            return match op {
                BinaryOp::Eq
                | BinaryOp::NotEq
                | BinaryOp::Lt
                | BinaryOp::LtEq
                | BinaryOp::Gt
                | BinaryOp::GtEq => Type::Bool,
                _ => Type::Unknown,
            };
        }

        match op {
            BinaryOp::Add => {
                if left_ty.is_numeric() || left_ty == Type::Str {
                    left_ty
                } else {
                    self.diag(
                        span,
                        DiagnosticKind::TypeMismatch,
                        format!("Operator '+' is not defined for '{}'", left_ty),
                    );
                    Type::Unknown
                }
            }
            BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
                if left_ty.is_numeric() {
                    left_ty
                } else {
                    self.diag(
                        span,
                        DiagnosticKind::TypeMismatch,
                        format!("Operator '{}' is not defined for '{}'", op, left_ty),
                    );
                    Type::Unknown
                }
            }
            BinaryOp::Rem => {
                if left_ty == Type::Int {
                    Type::Int
                } else {
                    self.diag(
                        span,
                        DiagnosticKind::TypeMismatch,
                        format!("Operator '%' is not defined for '{}'", left_ty),
                    );
                    Type::Unknown
                }
            }
            BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
                if !(left_ty.is_numeric() || matches!(left_ty, Type::Str | Type::Char)) {
                    self.diag(
                        span,
                        DiagnosticKind::TypeMismatch,
                        format!("Values of type '{}' are not ordered", left_ty),
                    );
                }
                Type::Bool
            }
            BinaryOp::Eq | BinaryOp::NotEq => Type::Bool,
            BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
        }
    }

    fn resolve_assign(&mut self, name: &Node<Ident>, value: &Node<Expr>) -> Type {
        let value_ty = self.resolve_expr(value);
        self.consume_value(value, &value_ty);

        match self.scopes.lookup(&name.value.name) {
            None => {
                self.diag(
                    name.span,
                    DiagnosticKind::UndefinedVariable,
                    format!("Undefined variable '{}'", name.value.name),
                );
            }
            Some(id) => {
                if self.scopes.record_write(id).is_err() {
                    self.diag(
                        name.span,
                        DiagnosticKind::AssignToImmutable,
                        format!(
                            "Cannot assign to immutable binding '{}'",
                            name.value.name
                        ),
                    );
                }
                if let Some(declared) = self.scopes.binding(id).declared_type.clone() {
                    if !declared.accepts(&value_ty) {
                        self.diag(
                            value.span,
                            DiagnosticKind::TypeMismatch,
                            format!("Expected '{}', found '{}'", declared, value_ty),
                        );
                    }
                }
            }
        }

        value_ty
    }

    fn resolve_borrow(&mut self, span: Span, expr: &Node<Expr>, mutable: bool) -> Type {
        let inner = self.resolve_expr(expr);

        if let Expr::Variable(ident) = &expr.value {
            if let Some(id) = self.scopes.lookup(&ident.name) {
                let result = if mutable {
                    self.scopes.record_mutable_borrow(id)
                } else {
                    self.scopes.record_immutable_borrow(id)
                };
                if let Err(kind) = result {
                    let message = match kind {
                        DiagnosticKind::CannotBorrowImmutably => format!(
                            "Cannot borrow '{}' immutably while it is mutably borrowed",
                            ident.name
                        ),
                        DiagnosticKind::CannotBorrowMutably => format!(
                            "Cannot borrow '{}' mutably while it is already borrowed",
                            ident.name
                        ),
                        _ => format!(
                            "Cannot borrow immutable binding '{}' mutably",
                            ident.name
                        ),
                    };
                    self.diag(span, kind, message);
                }
            }
        }

        Type::Borrow {
            inner: Box::new(inner),
            mutable,
        }
    }

    fn resolve_get(&mut self, object: &Node<Expr>, field: &Node<Ident>) -> Type {
        // `Color::Red` parses as a field access whose object is the enum
        // name; enum names are types, not value bindings.
        if let Expr::Variable(ident) = &object.value {
            if let Some(info) = self.registry.enum_info(&ident.name).cloned() {
                let enum_ty = Type::Enum(ident.name.clone());
                self.types.insert(object.id, enum_ty.clone());
                if !info.members.iter().any(|m| m == &field.value.name) {
                    self.diag(
                        field.span,
                        DiagnosticKind::TypeMismatch,
                        format!(
                            "Enum '{}' has no member '{}'",
                            ident.name, field.value.name
                        ),
                    );
                }
                return enum_ty;
            }
        }

        let object_ty = self.resolve_expr(object);
        self.field_or_method_type(&object_ty, field)
    }

    /// Looks up `field` on `object_ty`, auto-dereferencing one borrow
    /// level; falls back to impl methods when no field matches.
    fn field_or_method_type(&mut self, object_ty: &Type, field: &Node<Ident>) -> Type {
        let target = match object_ty {
            Type::Borrow { inner, .. } => inner.as_ref(),
            other => other,
        };

        let struct_name = match target {
            Type::Struct(name) => name.clone(),
            Type::Unknown => return Type::Unknown,
            other => {
                self.diag(
                    field.span,
                    DiagnosticKind::TypeMismatch,
                    format!("Cannot access field '{}' on '{}'", field.value.name, other),
                );
                return Type::Unknown;
            }
        };

        let field_hit = self
            .registry
            .struct_info(&struct_name)
            .and_then(|info| info.field(&field.value.name).cloned());
        if let Some((_, field_ty, visibility)) = field_hit {
            if visibility == Visibility::Private
                && self.struct_ctx.as_deref() != Some(struct_name.as_str())
            {
                self.diag(
                    field.span,
                    DiagnosticKind::TypeMismatch,
                    format!(
                        "Field '{}' of struct '{}' is private",
                        field.value.name, struct_name
                    ),
                );
            }
            return field_ty;
        }

        let method_hit = self
            .registry
            .method(&struct_name, &field.value.name)
            .map(|m| m.sig.as_type());
        if let Some(method_ty) = method_hit {
            return method_ty;
        }

        self.diag(
            field.span,
            DiagnosticKind::TypeMismatch,
            format!(
                "Struct '{}' has no field or method '{}'",
                struct_name, field.value.name
            ),
        );
        Type::Unknown
    }

    fn resolve_set(
        &mut self,
        object: &Node<Expr>,
        field: &Node<Ident>,
        value: &Node<Expr>,
    ) -> Type {
        let object_ty = self.resolve_expr(object);
        let value_ty = self.resolve_expr(value);
        self.consume_value(value, &value_ty);

        // Field writes require a mutable place: a mutable binding, `self`,
        // or a mutable borrow.
        match (&object.value, &object_ty) {
            (_, Type::Borrow { mutable: false, .. }) => {
                self.diag(
                    field.span,
                    DiagnosticKind::AssignToImmutable,
                    "Cannot assign to a field through an immutable borrow",
                );
            }
            (Expr::Variable(ident), _) => {
                if let Some(id) = self.scopes.lookup(&ident.name) {
                    if !self.scopes.binding(id).mutable {
                        self.diag(
                            field.span,
                            DiagnosticKind::AssignToImmutable,
                            format!(
                                "Cannot assign to a field of immutable binding '{}'",
                                ident.name
                            ),
                        );
                    }
                }
            }
            _ => {}
        }

        let field_ty = self.field_or_method_type(&object_ty, field);
        if !field_ty.accepts(&value_ty) {
            self.diag(
                value.span,
                DiagnosticKind::TypeMismatch,
                format!("Expected '{}', found '{}'", field_ty, value_ty),
            );
        }

        value_ty
    }

    fn resolve_call(
        &mut self,
        span: Span,
        callee: &Node<Expr>,
        generic_args: &[Node<TypeExpr>],
        args: &[Node<Expr>],
    ) -> Type {
        // Type arguments are validated for existence only.
        for arg in generic_args {
            self.lower_type(arg);
        }

        // A struct name called with zero arguments is default construction.
        if let Expr::Variable(ident) = &callee.value {
            if self.registry.is_struct(&ident.name) && self.scopes.lookup(&ident.name).is_none() {
                let result = Type::Struct(ident.name.clone());
                self.types.insert(
                    callee.id,
                    Type::Function {
                        params: vec![],
                        ret: Box::new(result.clone()),
                    },
                );
                if !args.is_empty() {
                    self.diag(
                        span,
                        DiagnosticKind::WrongArgumentCount,
                        format!(
                            "Default construction of '{}' takes 0 arguments, found {}",
                            ident.name,
                            args.len()
                        ),
                    );
                    for arg in args {
                        self.resolve_expr(arg);
                    }
                }
                return result;
            }
        }

        let callee_ty = self.resolve_expr(callee);

        match callee_ty {
            Type::Function { params, ret } => {
                if params.len() != args.len() {
                    self.diag(
                        span,
                        DiagnosticKind::WrongArgumentCount,
                        format!(
                            "Expected {} argument(s), found {}",
                            params.len(),
                            args.len()
                        ),
                    );
                }
                for (i, arg) in args.iter().enumerate() {
                    let arg_ty = self.resolve_expr(arg);
                    self.consume_value(arg, &arg_ty);
                    if let Some(param) = params.get(i) {
                        if !param.accepts(&arg_ty) {
                            self.diag(
                                arg.span,
                                DiagnosticKind::WrongArgumentType,
                                format!(
                                    "Argument {} expects '{}', found '{}'",
                                    i + 1,
                                    param,
                                    arg_ty
                                ),
                            );
                        }
                    }
                }
                *ret
            }
            Type::Unknown => {
                for arg in args {
                    let arg_ty = self.resolve_expr(arg);
                    self.consume_value(arg, &arg_ty);
                }
                Type::Unknown
            }
            other => {
                self.diag(
                    callee.span,
                    DiagnosticKind::TypeMismatch,
                    format!("Cannot call a value of type '{}'", other),
                );
                for arg in args {
                    self.resolve_expr(arg);
                }
                Type::Unknown
            }
        }
    }

    fn resolve_lambda(
        &mut self,
        params: &[Param],
        return_type: Option<&Node<TypeExpr>>,
        body: &[Node<Stmt>],
    ) -> Type {
        let param_tys: Vec<Type> = params.iter().map(|p| self.lower_type(&p.ty)).collect();
        let ret = return_type
            .map(|ty| self.lower_type(ty))
            .unwrap_or(Type::Unknown);

        let self_struct = self.struct_ctx.clone();
        self.resolve_function_body(params, &param_tys, ret.clone(), self_struct, body);

        Type::Function {
            params: param_tys,
            ret: Box::new(ret),
        }
    }

    fn resolve_struct_init(&mut self, name: &Node<Ident>, fields: &[FieldInit]) -> Type {
        let Some(info) = self.registry.struct_info(&name.value.name).cloned() else {
            self.diag(
                name.span,
                DiagnosticKind::UnknownType,
                format!("Unknown struct '{}'", name.value.name),
            );
            for init in fields {
                self.resolve_expr(&init.value);
            }
            return Type::Unknown;
        };

        let mut seen: Vec<&str> = Vec::new();
        for init in fields {
            let value_ty = self.resolve_expr(&init.value);
            self.consume_value(&init.value, &value_ty);

            let field_name = init.name.value.name.as_str();
            if seen.contains(&field_name) {
                self.diag(
                    init.name.span,
                    DiagnosticKind::DuplicateDeclaration,
                    format!("Field '{}' is initialized twice", field_name),
                );
                continue;
            }
            seen.push(field_name);

            match info.field(field_name) {
                None => self.diag(
                    init.name.span,
                    DiagnosticKind::TypeMismatch,
                    format!(
                        "Struct '{}' has no field '{}'",
                        name.value.name, field_name
                    ),
                ),
                Some((_, field_ty, _)) => {
                    if !field_ty.accepts(&value_ty) {
                        self.diag(
                            init.value.span,
                            DiagnosticKind::TypeMismatch,
                            format!("Expected '{}', found '{}'", field_ty, value_ty),
                        );
                    }
                }
            }
        }

        for (field_name, _, _) in &info.fields {
            if !seen.contains(&field_name.as_str()) {
                self.diag(
                    name.span,
                    DiagnosticKind::TypeMismatch,
                    format!(
                        "Missing field '{}' in literal of struct '{}'",
                        field_name, name.value.name
                    ),
                );
            }
        }

        Type::Struct(name.value.name.clone())
    }

    fn resolve_array(&mut self, elements: &[Node<Expr>]) -> Type {
        let mut elem_ty = Type::Unknown;
        for element in elements {
            let ty = self.resolve_expr(element);
            self.consume_value(element, &ty);
            if elem_ty == Type::Unknown {
                elem_ty = ty;
            } else if !elem_ty.accepts(&ty) {
                self.diag(
                    element.span,
                    DiagnosticKind::TypeMismatch,
                    format!(
                        "Array element of type '{}' does not match element type '{}'",
                        ty, elem_ty
                    ),
                );
            }
        }
        Type::Array {
            elem: Box::new(elem_ty),
            size: Some(elements.len() as u64),
        }
    }
}

/// Argument compatibility for operator-method dispatch: borrow wrappers
/// compare by their inner type.
fn dispatch_compatible(param: &Type, actual: &Type) -> bool {
    let strip = |ty: &Type| match ty {
        Type::Borrow { inner, .. } => (**inner).clone(),
        other => other.clone(),
    };
    strip(param).accepts(&strip(actual))
}
