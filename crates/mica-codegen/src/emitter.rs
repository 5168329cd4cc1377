//! C++ source emitter
//!
//! A structural rewrite of the resolved program. Every typing and
//! ownership question was already answered by the resolver; this walk only
//! spells the answers in C++17: `let` becomes `const`, consuming uses of
//! movable bindings become `std::move`, traits become abstract structs,
//! and borrows become pointers.

use std::collections::HashMap;

use mica_ast::*;
use mica_resolve::{Resolution, Type};

use crate::error::CodegenError;
use crate::runtime;
use crate::stdlib::StdModule;

pub(crate) struct Emitter<'a> {
    resolution: &'a Resolution,
    struct_decls: HashMap<String, &'a StructDecl>,
    indent: usize,

    // Include and shim flags, set while emitting and assembled last.
    use_string: bool,
    use_vector: bool,
    use_array: bool,
    use_optional: bool,
    use_functional: bool,
    use_utility: bool,
    use_iostream: bool,
    use_cmath: bool,
    use_cstdlib: bool,
    use_ctime: bool,
    use_print: bool,
    use_input: bool,
    use_result: bool,
    use_time_shim: bool,
}

impl<'a> Emitter<'a> {
    pub(crate) fn new(resolution: &'a Resolution) -> Self {
        Self {
            resolution,
            struct_decls: HashMap::new(),
            indent: 0,
            use_string: false,
            use_vector: false,
            use_array: false,
            use_optional: false,
            use_functional: false,
            use_utility: false,
            use_iostream: false,
            use_cmath: false,
            use_cstdlib: false,
            use_ctime: false,
            use_print: false,
            use_input: false,
            use_result: false,
            use_time_shim: false,
        }
    }

    pub(crate) fn emit_program(&mut self, program: &'a Program) -> Result<String, CodegenError> {
        let mut enums = Vec::new();
        let mut traits = Vec::new();
        let mut structs = Vec::new();
        let mut impls: Vec<&ImplDecl> = Vec::new();
        let mut funcs = Vec::new();
        let mut main_fn = None;
        let mut loose = Vec::new();

        for stmt in &program.stmts {
            match &stmt.value {
                Stmt::Enum(decl) => enums.push(decl),
                Stmt::Trait(decl) => traits.push(decl),
                Stmt::Struct(decl) => {
                    self.struct_decls.insert(decl.name.value.name.clone(), decl);
                    structs.push(decl);
                }
                Stmt::Impl(decl) => impls.push(decl),
                Stmt::Function(decl) if decl.name.value.name == "main" => main_fn = Some(decl),
                Stmt::Function(decl) => funcs.push(decl),
                Stmt::Import(_) => {}
                _ => loose.push(stmt),
            }
        }

        let mut body = String::new();

        for decl in &enums {
            self.emit_enum(decl, &mut body);
        }
        for decl in &traits {
            self.emit_trait(decl, &mut body)?;
        }
        if structs.len() > 1 {
            for decl in &structs {
                body.push_str(&format!("struct {};\n", decl.name.value.name));
            }
            body.push('\n');
        }
        for decl in &structs {
            let decl_impls: Vec<&ImplDecl> = impls
                .iter()
                .copied()
                .filter(|i| i.struct_name.value.name == decl.name.value.name)
                .collect();
            self.emit_struct(decl, &decl_impls, &mut body)?;
        }
        for decl in &funcs {
            body.push_str(&self.function_signature(decl)?);
            body.push_str(";\n");
        }
        if !funcs.is_empty() {
            body.push('\n');
        }
        for decl in &funcs {
            self.emit_function(decl, &mut body)?;
        }

        body.push_str("int main() {\n");
        self.indent = 1;
        for stmt in &loose {
            self.emit_stmt(stmt, &mut body)?;
        }
        if let Some(decl) = main_fn {
            for stmt in &decl.body {
                self.emit_stmt(stmt, &mut body)?;
            }
        }
        self.push_line("return 0;", &mut body);
        self.indent = 0;
        body.push_str("}\n");

        Ok(self.assemble(body))
    }

    fn assemble(&self, body: String) -> String {
        let mut out = String::from("// Generated by the Mica compiler. Do not edit.\n");

        let mut includes = Vec::new();
        if self.use_array {
            includes.push("<array>");
        }
        if self.use_cmath {
            includes.push("<cmath>");
        }
        if self.use_cstdlib {
            includes.push("<cstdlib>");
        }
        if self.use_ctime || self.use_time_shim {
            includes.push("<ctime>");
        }
        if self.use_functional {
            includes.push("<functional>");
        }
        if self.use_iostream || self.use_print || self.use_input {
            includes.push("<iostream>");
        }
        if self.use_optional {
            includes.push("<optional>");
        }
        if self.use_string || self.use_input {
            includes.push("<string>");
        }
        if self.use_utility {
            includes.push("<utility>");
        }
        if self.use_vector {
            includes.push("<vector>");
        }
        for include in includes {
            out.push_str(&format!("#include {}\n", include));
        }
        out.push('\n');

        if self.use_print {
            out.push_str(runtime::PRINT_SHIM);
            out.push('\n');
        }
        if self.use_input {
            out.push_str(runtime::INPUT_SHIM);
            out.push('\n');
        }
        if self.use_time_shim {
            out.push_str(runtime::TIME_SHIM);
            out.push('\n');
        }
        if self.use_result {
            out.push_str(runtime::RESULT_SHIM);
            out.push('\n');
        }

        out.push_str(&body);
        out
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn emit_enum(&mut self, decl: &EnumDecl, out: &mut String) {
        out.push_str(&format!("enum class {} {{\n", decl.name.value.name));
        for member in &decl.members {
            out.push_str(&format!("    {},\n", member.value.name));
        }
        out.push_str("};\n\n");
    }

    fn emit_trait(&mut self, decl: &TraitDecl, out: &mut String) -> Result<(), CodegenError> {
        out.push_str(&format!("struct {} {{\n", decl.name.value.name));
        for method in &decl.methods {
            let ret = method
                .return_type
                .as_ref()
                .map(|ty| self.type_expr_cpp(ty))
                .unwrap_or_else(|| "void".to_string());
            let params = self.param_list(&method.params);
            out.push_str(&format!(
                "    virtual {} {}({}) = 0;\n",
                ret, method.name.value.name, params
            ));
        }
        out.push_str(&format!(
            "    virtual ~{}() = default;\n}};\n\n",
            decl.name.value.name
        ));
        Ok(())
    }

    fn emit_struct(
        &mut self,
        decl: &StructDecl,
        impls: &[&ImplDecl],
        out: &mut String,
    ) -> Result<(), CodegenError> {
        let name = &decl.name.value.name;

        let bases: Vec<String> = impls
            .iter()
            .filter_map(|i| i.trait_name.as_ref())
            .map(|t| format!("public {}", t.value.name))
            .collect();
        if bases.is_empty() {
            out.push_str(&format!("struct {} {{\n", name));
        } else {
            out.push_str(&format!("struct {} : {} {{\n", name, bases.join(", ")));
        }

        for field in &decl.fields {
            let ty = self.type_expr_cpp(&field.ty);
            out.push_str(&format!("    {} {};\n", ty, field.name.value.name));
        }

        // Constructors stand in for struct literals, which keeps literal
        // construction working for structs with trait bases.
        out.push_str(&format!("\n    {}() = default;\n", name));
        if !decl.fields.is_empty() {
            self.use_utility = true;
            let params: Vec<String> = decl
                .fields
                .iter()
                .map(|f| format!("{} {}", self.type_expr_cpp(&f.ty), f.name.value.name))
                .collect();
            let inits: Vec<String> = decl
                .fields
                .iter()
                .map(|f| {
                    format!(
                        "{0}(std::move({0}))",
                        f.name.value.name
                    )
                })
                .collect();
            out.push_str(&format!(
                "    {}({}) : {} {{}}\n",
                name,
                params.join(", "),
                inits.join(", ")
            ));
        }

        for impl_decl in impls {
            for method in &impl_decl.methods {
                out.push('\n');
                self.emit_method(method, impl_decl.trait_name.is_some(), out)?;
            }
        }

        out.push_str("};\n\n");
        Ok(())
    }

    fn emit_method(
        &mut self,
        decl: &FunctionDecl,
        is_override: bool,
        out: &mut String,
    ) -> Result<(), CodegenError> {
        let ret = decl
            .return_type
            .as_ref()
            .map(|ty| self.type_expr_cpp(ty))
            .unwrap_or_else(|| "void".to_string());
        let params = self.param_list(&decl.params);
        let marker = if is_override { " override" } else { "" };
        out.push_str(&format!(
            "    {} {}({}){} {{\n",
            ret, decl.name.value.name, params, marker
        ));
        self.indent = 2;
        for stmt in &decl.body {
            self.emit_stmt(stmt, out)?;
        }
        self.indent = 0;
        out.push_str("    }\n");
        Ok(())
    }

    fn function_signature(&mut self, decl: &FunctionDecl) -> Result<String, CodegenError> {
        let ret = decl
            .return_type
            .as_ref()
            .map(|ty| self.type_expr_cpp(ty))
            .unwrap_or_else(|| "void".to_string());
        let params = self.param_list(&decl.params);
        Ok(format!("{} {}({})", ret, decl.name.value.name, params))
    }

    fn emit_function(&mut self, decl: &FunctionDecl, out: &mut String) -> Result<(), CodegenError> {
        let signature = self.function_signature(decl)?;
        out.push_str(&signature);
        out.push_str(" {\n");
        self.indent = 1;
        for stmt in &decl.body {
            self.emit_stmt(stmt, out)?;
        }
        self.indent = 0;
        out.push_str("}\n\n");
        Ok(())
    }

    fn param_list(&mut self, params: &[Param]) -> String {
        params
            .iter()
            .map(|p| format!("{} {}", self.type_expr_cpp(&p.ty), p.name.value.name))
            .collect::<Vec<_>>()
            .join(", ")
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn push_line(&self, line: &str, out: &mut String) {
        for _ in 0..self.indent {
            out.push_str("    ");
        }
        out.push_str(line);
        out.push('\n');
    }

    fn emit_stmt(&mut self, stmt: &Node<Stmt>, out: &mut String) -> Result<(), CodegenError> {
        match &stmt.value {
            Stmt::Expression(expr) => {
                let code = self.emit_expr(expr)?;
                self.push_line(&format!("{};", code), out);
            }
            Stmt::Let {
                name,
                ty,
                init,
                mutable,
                ..
            } => self.emit_let(name, ty.as_ref(), init.as_ref(), *mutable, out)?,
            Stmt::Block(stmts) => {
                self.push_line("{", out);
                self.indent += 1;
                for stmt in stmts {
                    self.emit_stmt(stmt, out)?;
                }
                self.indent -= 1;
                self.push_line("}", out);
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => self.emit_if(condition, then_branch, else_branch.as_deref(), out)?,
            Stmt::While { condition, body } => {
                let cond = self.emit_expr(condition)?;
                self.push_line(&format!("while ({}) {{", cond), out);
                self.emit_branch(body, out)?;
                self.push_line("}", out);
            }
            // C-style for lowers to a scoped while; Mica has no `continue`,
            // so the step always runs at the end of the body.
            Stmt::For {
                init,
                condition,
                step,
                body,
            } => {
                self.push_line("{", out);
                self.indent += 1;
                if let Some(init) = init {
                    self.emit_stmt(init, out)?;
                }
                let cond = match condition {
                    Some(condition) => self.emit_expr(condition)?,
                    None => "true".to_string(),
                };
                self.push_line(&format!("while ({}) {{", cond), out);
                self.emit_branch(body, out)?;
                if let Some(step) = step {
                    self.indent += 1;
                    let code = self.emit_expr(step)?;
                    self.push_line(&format!("{};", code), out);
                    self.indent -= 1;
                }
                self.push_line("}", out);
                self.indent -= 1;
                self.push_line("}", out);
            }
            // A nested function becomes a capturing lambda.
            Stmt::Function(decl) => {
                let lambda = self.lambda_code(&decl.params, decl.return_type.as_ref(), &decl.body)?;
                self.push_line(
                    &format!("const auto {} = {};", decl.name.value.name, lambda),
                    out,
                );
            }
            Stmt::Return(value) => match value {
                Some(value) => {
                    let code = self.emit_consumed(value)?;
                    self.push_line(&format!("return {};", code), out);
                }
                None => self.push_line("return;", out),
            },
            Stmt::Switch {
                scrutinee,
                cases,
                default,
            } => self.emit_switch(scrutinee, cases, default.as_deref(), out)?,
            Stmt::Break => self.push_line("break;", out),
            // Fallthrough is consumed by switch emission as a terminator.
            Stmt::Fallthrough => {}
            // Type declarations and imports are emitted at file scope.
            Stmt::Struct(_) | Stmt::Trait(_) | Stmt::Impl(_) | Stmt::Enum(_) | Stmt::Import(_) => {}
        }
        Ok(())
    }

    fn emit_let(
        &mut self,
        name: &Node<Ident>,
        ty: Option<&Node<TypeExpr>>,
        init: Option<&Node<Expr>>,
        mutable: bool,
        out: &mut String,
    ) -> Result<(), CodegenError> {
        let cpp_ty = match (ty, init) {
            (Some(ty), _) => self.type_expr_cpp(ty),
            (None, Some(init)) => match self.resolution.types.get(init.id) {
                Some(ty) => self.type_cpp(ty),
                None => "auto".to_string(),
            },
            (None, None) => "auto".to_string(),
        };

        match init {
            Some(init) => {
                let value = self.emit_consumed(init)?;
                // Pointer-typed bindings skip the const prefix; binding
                // immutability was already enforced by the resolver.
                let prefix = if mutable || cpp_ty.ends_with('*') {
                    cpp_ty
                } else {
                    format!("const {}", cpp_ty)
                };
                self.push_line(
                    &format!("{} {} = {};", prefix, name.value.name, value),
                    out,
                );
            }
            None => {
                // No initializer: leave the binding non-const so the later
                // first assignment compiles.
                self.push_line(&format!("{} {};", cpp_ty, name.value.name), out);
            }
        }
        Ok(())
    }

    fn emit_if(
        &mut self,
        condition: &Node<Expr>,
        then_branch: &Node<Stmt>,
        else_branch: Option<&Node<Stmt>>,
        out: &mut String,
    ) -> Result<(), CodegenError> {
        let cond = self.emit_expr(condition)?;
        self.push_line(&format!("if ({}) {{", cond), out);
        self.emit_branch(then_branch, out)?;
        match else_branch {
            None => self.push_line("}", out),
            Some(else_branch) => {
                if let Stmt::If {
                    condition,
                    then_branch,
                    else_branch,
                } = &else_branch.value
                {
                    // else-if chain: fold into the same ladder
                    let cond = self.emit_expr(condition)?;
                    self.push_line(&format!("}} else if ({}) {{", cond), out);
                    self.emit_branch(then_branch, out)?;
                    match else_branch {
                        None => self.push_line("}", out),
                        Some(nested) => {
                            self.push_line("} else {", out);
                            self.emit_branch(nested, out)?;
                            self.push_line("}", out);
                        }
                    }
                } else {
                    self.push_line("} else {", out);
                    self.emit_branch(else_branch, out)?;
                    self.push_line("}", out);
                }
            }
        }
        Ok(())
    }

    /// Emits a branch body at one extra indent level; a block's statements
    /// are inlined rather than double-braced.
    fn emit_branch(&mut self, branch: &Node<Stmt>, out: &mut String) -> Result<(), CodegenError> {
        self.indent += 1;
        match &branch.value {
            Stmt::Block(stmts) => {
                for stmt in stmts {
                    self.emit_stmt(stmt, out)?;
                }
            }
            _ => self.emit_stmt(branch, out)?,
        }
        self.indent -= 1;
        Ok(())
    }

    fn emit_switch(
        &mut self,
        scrutinee: &Node<Expr>,
        cases: &[SwitchCase],
        default: Option<&[Node<Stmt>]>,
        out: &mut String,
    ) -> Result<(), CodegenError> {
        // A braced case body parses as one Block statement; unwrap it so
        // fallthrough detection sees the actual statement list.
        fn case_stmts(body: &[Node<Stmt>]) -> &[Node<Stmt>] {
            match body {
                [single] => match &single.value {
                    Stmt::Block(stmts) => stmts,
                    _ => body,
                },
                _ => body,
            }
        }

        let scrutinee_ty = self.resolution.types.get(scrutinee.id);
        let scrut = self.emit_expr(scrutinee)?;

        // C++ switch only takes integral scrutinees; string switches lower
        // to an equality ladder (without fallthrough).
        if scrutinee_ty == Some(&Type::Str) {
            self.push_line("{", out);
            self.indent += 1;
            self.push_line(&format!("const auto& mica_scrut = {};", scrut), out);
            for (i, case) in cases.iter().enumerate() {
                let value = self.emit_expr(&case.value)?;
                let keyword = if i == 0 { "if" } else { "} else if" };
                self.push_line(
                    &format!("{} (mica_scrut == {}) {{", keyword, value),
                    out,
                );
                self.indent += 1;
                for stmt in case_stmts(&case.body) {
                    self.emit_stmt(stmt, out)?;
                }
                self.indent -= 1;
            }
            if let Some(default) = default {
                let keyword = if cases.is_empty() { "if (true) {" } else { "} else {" };
                self.push_line(keyword, out);
                self.indent += 1;
                for stmt in case_stmts(default) {
                    self.emit_stmt(stmt, out)?;
                }
                self.indent -= 1;
            }
            if !cases.is_empty() || default.is_some() {
                self.push_line("}", out);
            }
            self.indent -= 1;
            self.push_line("}", out);
            return Ok(());
        }

        self.push_line(&format!("switch ({}) {{", scrut), out);
        for case in cases {
            let value = self.emit_expr(&case.value)?;
            self.push_line(&format!("case {}: {{", value), out);
            self.indent += 1;
            let stmts = case_stmts(&case.body);
            let falls_through =
                matches!(stmts.last().map(|s| &s.value), Some(Stmt::Fallthrough));
            for stmt in stmts {
                self.emit_stmt(stmt, out)?;
            }
            if !falls_through {
                self.push_line("break;", out);
            }
            self.indent -= 1;
            self.push_line("}", out);
        }
        if let Some(default) = default {
            self.push_line("default: {", out);
            self.indent += 1;
            for stmt in case_stmts(default) {
                self.emit_stmt(stmt, out)?;
            }
            self.push_line("break;", out);
            self.indent -= 1;
            self.push_line("}", out);
        }
        self.push_line("}", out);
        Ok(())
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    /// Emits an expression in consuming position: a plain variable of a
    /// movable type is wrapped in `std::move`, mirroring the move the
    /// resolver recorded.
    fn emit_consumed(&mut self, node: &Node<Expr>) -> Result<String, CodegenError> {
        if let Expr::Variable(ident) = &node.value {
            if let Some(ty) = self.resolution.types.get(node.id) {
                if !ty.is_copy() {
                    self.use_utility = true;
                    return Ok(format!("std::move({})", ident.name));
                }
            }
        }
        self.emit_expr(node)
    }

    fn emit_expr(&mut self, node: &Node<Expr>) -> Result<String, CodegenError> {
        match &node.value {
            Expr::Literal(lit) => Ok(self.literal_cpp(lit)),
            Expr::Variable(ident) => Ok(self.variable_cpp(&ident.name)),
            Expr::SelfExpr => Ok("(*this)".to_string()),
            Expr::Unary { op, operand } => {
                let inner = self.emit_expr(operand)?;
                Ok(match op {
                    UnaryOp::Neg => format!("-({})", inner),
                    UnaryOp::Not => format!("!({})", inner),
                    UnaryOp::Deref => format!("*({})", inner),
                })
            }
            Expr::Binary { left, op, right } => self.emit_binary(left, *op, right),
            Expr::Assign { name, value } => {
                let value = self.emit_consumed(value)?;
                Ok(format!("{} = {}", name.value.name, value))
            }
            Expr::Borrow { expr, .. } => {
                let inner = self.emit_expr(expr)?;
                Ok(format!("&({})", inner))
            }
            Expr::Get { object, field } => self.emit_get(object, field),
            Expr::Set {
                object,
                field,
                value,
            } => {
                let target = self.emit_get(object, field)?;
                let value = self.emit_consumed(value)?;
                Ok(format!("{} = {}", target, value))
            }
            Expr::Call { callee, args, .. } => self.emit_call(callee, args),
            Expr::Lambda {
                params,
                return_type,
                body,
            } => self.lambda_code(params, return_type.as_deref(), body),
            Expr::StructInit { name, fields } => self.emit_struct_init(name, fields),
            Expr::Array(elements) => {
                let mut parts = Vec::with_capacity(elements.len());
                for element in elements {
                    parts.push(self.emit_consumed(element)?);
                }
                Ok(format!("{{{}}}", parts.join(", ")))
            }
        }
    }

    fn literal_cpp(&mut self, lit: &Literal) -> String {
        match lit {
            Literal::Int(v) => v.to_string(),
            Literal::Float(v) => format!("{:?}", v),
            Literal::Str(s) => {
                self.use_string = true;
                format!("std::string(\"{}\")", escape(s))
            }
            Literal::Char(c) => format!("'{}'", escape(&c.to_string())),
            Literal::Bool(v) => v.to_string(),
            Literal::None => {
                self.use_optional = true;
                "std::nullopt".to_string()
            }
        }
    }

    fn variable_cpp(&mut self, name: &str) -> String {
        match name {
            "print" => {
                self.use_print = true;
                "mica_print".to_string()
            }
            "input" => {
                self.use_input = true;
                "mica_input".to_string()
            }
            _ => name.to_string(),
        }
    }

    fn emit_binary(
        &mut self,
        left: &Node<Expr>,
        op: BinaryOp,
        right: &Node<Expr>,
    ) -> Result<String, CodegenError> {
        // A struct left operand means the resolver dispatched the operator
        // to its canonical impl method.
        if let Some(Type::Struct(_)) = self.resolution.types.get(left.id) {
            if let Some(method) = op.overload_method() {
                let left = self.emit_expr(left)?;
                let right = self.emit_expr(right)?;
                return Ok(format!("{}.{}({})", left, method, right));
            }
        }

        let left = self.emit_expr(left)?;
        let right = self.emit_expr(right)?;
        Ok(format!("({} {} {})", left, op, right))
    }

    fn emit_get(&mut self, object: &Node<Expr>, field: &Node<Ident>) -> Result<String, CodegenError> {
        if let Expr::Variable(ident) = &object.value {
            // Enum member: the object annotation is the enum type itself.
            if let Some(Type::Enum(enum_name)) = self.resolution.types.get(object.id) {
                if enum_name == &ident.name {
                    return Ok(format!("{}::{}", enum_name, field.value.name));
                }
            }
            if let Some(module) = StdModule::from_name(&ident.name) {
                return self.std_member(module, &field.value.name);
            }
        }

        if matches!(object.value, Expr::SelfExpr) {
            return Ok(format!("this->{}", field.value.name));
        }

        let object_code = self.emit_expr(object)?;
        if let Some(Type::Borrow { .. }) = self.resolution.types.get(object.id) {
            Ok(format!("{}->{}", object_code, field.value.name))
        } else {
            Ok(format!("{}.{}", object_code, field.value.name))
        }
    }

    fn emit_call(
        &mut self,
        callee: &Node<Expr>,
        args: &[Node<Expr>],
    ) -> Result<String, CodegenError> {
        let callee_code = self.emit_expr(callee)?;
        let mut parts = Vec::with_capacity(args.len());
        for arg in args {
            parts.push(self.emit_consumed(arg)?);
        }
        Ok(format!("{}({})", callee_code, parts.join(", ")))
    }

    fn lambda_code(
        &mut self,
        params: &[Param],
        return_type: Option<&Node<TypeExpr>>,
        body: &[Node<Stmt>],
    ) -> Result<String, CodegenError> {
        let param_list = self.param_list(params);
        let ret = return_type
            .map(|ty| format!(" -> {}", self.type_expr_cpp(ty)))
            .unwrap_or_default();

        let mut inner = String::new();
        let saved = self.indent;
        self.indent += 1;
        for stmt in body {
            self.emit_stmt(stmt, &mut inner)?;
        }
        self.indent = saved;

        let mut closing = String::new();
        for _ in 0..self.indent {
            closing.push_str("    ");
        }
        closing.push('}');

        Ok(format!("[&]({}){} {{\n{}{}", param_list, ret, inner, closing))
    }

    fn emit_struct_init(
        &mut self,
        name: &Node<Ident>,
        fields: &[FieldInit],
    ) -> Result<String, CodegenError> {
        let decl = self
            .struct_decls
            .get(name.value.name.as_str())
            .copied()
            .ok_or_else(|| {
                CodegenError::new(format!("Unknown struct '{}' in literal", name.value.name))
            })?;

        // Arguments follow the declared field order, not the literal's.
        let mut parts = Vec::with_capacity(decl.fields.len());
        for field in &decl.fields {
            let init = fields
                .iter()
                .find(|f| f.name.value.name == field.name.value.name)
                .ok_or_else(|| {
                    CodegenError::new(format!(
                        "Literal of '{}' is missing field '{}'",
                        name.value.name, field.name.value.name
                    ))
                })?;
            parts.push(self.emit_consumed(&init.value)?);
        }

        Ok(format!("{}({})", name.value.name, parts.join(", ")))
    }

    fn std_member(&mut self, module: StdModule, member: &str) -> Result<String, CodegenError> {
        let mapped = match (module, member) {
            (StdModule::Math, "sqrt") => "std::sqrt",
            (StdModule::Math, "abs") => "std::abs",
            (StdModule::Math, "floor") => "std::floor",
            (StdModule::Math, "ceil") => "std::ceil",
            (StdModule::Math, "pow") => "std::pow",
            (StdModule::Math, "sin") => "std::sin",
            (StdModule::Math, "cos") => "std::cos",
            (StdModule::Math, "tan") => "std::tan",
            (StdModule::Math, "log") => "std::log",
            (StdModule::Math, "pi") => "M_PI",
            (StdModule::Time, "now") => {
                self.use_time_shim = true;
                return Ok("mica_time_now".to_string());
            }
            (StdModule::Random, "rand") => {
                self.use_cstdlib = true;
                return Ok("std::rand".to_string());
            }
            (StdModule::Random, "seed") => {
                self.use_cstdlib = true;
                return Ok("std::srand".to_string());
            }
            (StdModule::Os, "exit") => {
                self.use_cstdlib = true;
                return Ok("std::exit".to_string());
            }
            _ => {
                return Err(CodegenError::new(format!(
                    "Member '{}' of module '{}' has no native mapping",
                    member,
                    module.name()
                )))
            }
        };
        self.use_cmath = true;
        Ok(mapped.to_string())
    }

    // =========================================================================
    // Types
    // =========================================================================

    fn type_cpp(&mut self, ty: &Type) -> String {
        match ty {
            Type::Int => "int".to_string(),
            Type::Float => "double".to_string(),
            Type::Bool => "bool".to_string(),
            Type::Str => {
                self.use_string = true;
                "std::string".to_string()
            }
            Type::Char => "char".to_string(),
            Type::Void => "void".to_string(),
            Type::Unknown => "auto".to_string(),
            Type::Struct(name) | Type::Enum(name) => name.clone(),
            Type::Function { params, ret } => {
                self.use_functional = true;
                let params: Vec<String> = params.iter().map(|p| self.type_cpp(p)).collect();
                let ret = self.type_cpp(ret);
                format!("std::function<{}({})>", ret, params.join(", "))
            }
            Type::Array { elem, size: None } => {
                self.use_vector = true;
                format!("std::vector<{}>", self.type_cpp(elem))
            }
            Type::Array {
                elem,
                size: Some(n),
            } => {
                self.use_array = true;
                format!("std::array<{}, {}>", self.type_cpp(elem), n)
            }
            Type::Option(inner) => {
                self.use_optional = true;
                format!("std::optional<{}>", self.type_cpp(inner))
            }
            Type::Result { ok, err } => {
                self.use_result = true;
                format!("MicaResult<{}, {}>", self.type_cpp(ok), self.type_cpp(err))
            }
            Type::Borrow { inner, mutable } => {
                if *mutable {
                    format!("{}*", self.type_cpp(inner))
                } else {
                    format!("const {}*", self.type_cpp(inner))
                }
            }
        }
    }

    fn type_expr_cpp(&mut self, node: &Node<TypeExpr>) -> String {
        match &node.value {
            TypeExpr::Named(ident) => match ident.name.as_str() {
                "int" => "int".to_string(),
                "float" => "double".to_string(),
                "str" => {
                    self.use_string = true;
                    "std::string".to_string()
                }
                "bool" => "bool".to_string(),
                "char" => "char".to_string(),
                "void" => "void".to_string(),
                other => other.to_string(),
            },
            // Generic applications were erased by the resolver.
            TypeExpr::Generic { base, .. } => base.value.name.clone(),
            TypeExpr::Array { elem, size: None } => {
                self.use_vector = true;
                format!("std::vector<{}>", self.type_expr_cpp(elem))
            }
            TypeExpr::Array {
                elem,
                size: Some(n),
            } => {
                self.use_array = true;
                format!("std::array<{}, {}>", self.type_expr_cpp(elem), n)
            }
            TypeExpr::Function {
                params,
                return_type,
            } => {
                self.use_functional = true;
                let params: Vec<String> =
                    params.iter().map(|p| self.type_expr_cpp(p)).collect();
                format!(
                    "std::function<{}({})>",
                    self.type_expr_cpp(return_type),
                    params.join(", ")
                )
            }
            TypeExpr::Option(inner) => {
                self.use_optional = true;
                format!("std::optional<{}>", self.type_expr_cpp(inner))
            }
            TypeExpr::Result { ok, err } => {
                self.use_result = true;
                format!(
                    "MicaResult<{}, {}>",
                    self.type_expr_cpp(ok),
                    self.type_expr_cpp(err)
                )
            }
            TypeExpr::Borrow { inner, mutable } => {
                if *mutable {
                    format!("{}*", self.type_expr_cpp(inner))
                } else {
                    format!("const {}*", self.type_expr_cpp(inner))
                }
            }
        }
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            other => out.push(other),
        }
    }
    out
}
