//! # Mica Resolver
//!
//! The semantic resolution pass: one tree walk that builds lexical scopes,
//! infers and checks types, and enforces move/borrow discipline. Code
//! generation refuses to run on a program whose resolution carries
//! diagnostics.

mod error;
mod types;
mod scope;
mod ownership;
mod collect;
mod resolver;
mod stmt;
mod expr;

// Re-export public API
pub use collect::{EnumInfo, FnSig, MethodInfo, Registry, StructInfo, TraitInfo};
pub use error::{Diagnostic, DiagnosticKind};
pub use ownership::{BorrowKind, OwnershipState};
pub use resolver::{Resolution, TypeTable, STD_MODULES};
pub use scope::{Binding, BindingId, ScopeStack};
pub use types::Type;

use mica_ast::Program;
use resolver::Resolver;

// =============================================================================
// Public API
// =============================================================================

/// Resolves a program: declaration collection first, then the body walk.
/// A fresh resolver serves each call, so resolving the same program twice
/// produces identical results.
pub fn resolve_program(program: &Program) -> Resolution {
    let outcome = collect::collect(program);
    if outcome.fatal {
        // A cyclic type definition cannot be bounded; report what we have
        // and skip body resolution entirely.
        return Resolution {
            types: TypeTable::default(),
            diagnostics: outcome.diagnostics,
        };
    }
    Resolver::new(outcome.registry, outcome.diagnostics).resolve(program)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use mica_ast::*;

    /// Hand-built AST helper; every node gets a fresh id and a span whose
    /// line is the one given, so line-targeted assertions work.
    struct B {
        next: u32,
    }

    impl B {
        fn new() -> Self {
            Self { next: 0 }
        }

        fn node<T>(&mut self, value: T, line: u32) -> Node<T> {
            let id = NodeId(self.next);
            self.next += 1;
            Node::new(value, Span::new(0, 0, line), id)
        }

        fn ident(&mut self, name: &str, line: u32) -> Node<Ident> {
            self.node(Ident::new(name), line)
        }

        fn int(&mut self, v: i64, line: u32) -> Node<Expr> {
            self.node(Expr::Literal(Literal::Int(v)), line)
        }

        fn string(&mut self, s: &str, line: u32) -> Node<Expr> {
            self.node(Expr::Literal(Literal::Str(s.to_string())), line)
        }

        fn boolean(&mut self, v: bool, line: u32) -> Node<Expr> {
            self.node(Expr::Literal(Literal::Bool(v)), line)
        }

        fn none(&mut self, line: u32) -> Node<Expr> {
            self.node(Expr::Literal(Literal::None), line)
        }

        fn var(&mut self, name: &str, line: u32) -> Node<Expr> {
            let ident = Ident::new(name);
            self.node(Expr::Variable(ident), line)
        }

        fn borrow(&mut self, name: &str, mutable: bool, line: u32) -> Node<Expr> {
            let expr = Box::new(self.var(name, line));
            self.node(Expr::Borrow { expr, mutable }, line)
        }

        fn assign(&mut self, name: &str, value: Node<Expr>, line: u32) -> Node<Expr> {
            let name = self.ident(name, line);
            self.node(
                Expr::Assign {
                    name,
                    value: Box::new(value),
                },
                line,
            )
        }

        fn call(&mut self, name: &str, args: Vec<Node<Expr>>, line: u32) -> Node<Expr> {
            let callee = Box::new(self.var(name, line));
            self.node(
                Expr::Call {
                    callee,
                    generic_args: vec![],
                    args,
                },
                line,
            )
        }

        fn named_ty(&mut self, name: &str, line: u32) -> Node<TypeExpr> {
            self.node(TypeExpr::Named(Ident::new(name)), line)
        }

        fn let_stmt(
            &mut self,
            name: &str,
            ty: Option<Node<TypeExpr>>,
            init: Option<Node<Expr>>,
            mutable: bool,
            line: u32,
        ) -> Node<Stmt> {
            let name = self.ident(name, line);
            self.node(
                Stmt::Let {
                    name,
                    ty,
                    init,
                    mutable,
                    visibility: Visibility::Private,
                },
                line,
            )
        }

        fn expr_stmt(&mut self, expr: Node<Expr>, line: u32) -> Node<Stmt> {
            self.node(Stmt::Expression(expr), line)
        }

        fn block(&mut self, stmts: Vec<Node<Stmt>>, line: u32) -> Node<Stmt> {
            self.node(Stmt::Block(stmts), line)
        }

        fn func(
            &mut self,
            name: &str,
            params: Vec<(&str, &str)>,
            return_type: Option<&str>,
            body: Vec<Node<Stmt>>,
            line: u32,
        ) -> Node<Stmt> {
            let name = self.ident(name, line);
            let params = params
                .into_iter()
                .map(|(pname, pty)| Param {
                    name: self.ident(pname, line),
                    ty: self.named_ty(pty, line),
                })
                .collect();
            let return_type = return_type.map(|r| self.named_ty(r, line));
            self.node(
                Stmt::Function(FunctionDecl {
                    name,
                    generics: vec![],
                    params,
                    return_type,
                    body,
                }),
                line,
            )
        }

        fn struct_decl(&mut self, name: &str, fields: Vec<(&str, &str, Visibility)>, line: u32) -> Node<Stmt> {
            let name = self.ident(name, line);
            let fields = fields
                .into_iter()
                .map(|(fname, fty, visibility)| FieldDecl {
                    name: self.ident(fname, line),
                    ty: self.named_ty(fty, line),
                    visibility,
                })
                .collect();
            self.node(
                Stmt::Struct(StructDecl {
                    name,
                    generics: vec![],
                    fields,
                }),
                line,
            )
        }

        fn struct_init(&mut self, name: &str, fields: Vec<(&str, Node<Expr>)>, line: u32) -> Node<Expr> {
            let name = self.ident(name, line);
            let fields = fields
                .into_iter()
                .map(|(fname, value)| FieldInit {
                    name: self.ident(fname, line),
                    value,
                })
                .collect();
            self.node(Expr::StructInit { name, fields }, line)
        }

        fn program(stmts: Vec<Node<Stmt>>) -> Program {
            Program {
                stmts,
                span: Span::new(0, 0, 1),
            }
        }
    }

    fn kinds(resolution: &Resolution) -> Vec<DiagnosticKind> {
        resolution.diagnostics.iter().map(|d| d.kind).collect()
    }

    // -------------------------------------------------------------------------
    // No false positives
    // -------------------------------------------------------------------------

    #[test]
    fn test_clean_program_has_no_diagnostics() {
        let mut b = B::new();
        let one = b.int(1, 1);
        let let_a = b.let_stmt("a", None, Some(one), false, 1);
        let two = b.int(2, 2);
        let let_b = b.let_stmt("b", None, Some(two), true, 2);
        let three = b.int(3, 3);
        let reassign = b.assign("b", three, 3);
        let reassign_stmt = b.expr_stmt(reassign, 3);
        let a_read = b.var("a", 4);
        let print_stmt = b.call("print", vec![a_read], 4);
        let print_stmt = b.expr_stmt(print_stmt, 4);

        let program = B::program(vec![let_a, let_b, reassign_stmt, print_stmt]);
        let resolution = resolve_program(&program);
        assert!(resolution.is_clean(), "{:?}", resolution.diagnostics);
    }

    #[test]
    fn test_resolution_annotates_expression_types() {
        let mut b = B::new();
        let init = b.int(42, 1);
        let init_id = init.id;
        let let_a = b.let_stmt("a", None, Some(init), false, 1);
        let read = b.var("a", 2);
        let read_id = read.id;
        let stmt = b.expr_stmt(read, 2);

        let program = B::program(vec![let_a, stmt]);
        let resolution = resolve_program(&program);
        assert!(resolution.is_clean());
        assert_eq!(resolution.types.get(init_id), Some(&Type::Int));
        assert_eq!(resolution.types.get(read_id), Some(&Type::Int));
    }

    // -------------------------------------------------------------------------
    // Declaration and shadowing
    // -------------------------------------------------------------------------

    #[test]
    fn test_redeclaration_in_same_scope() {
        let mut b = B::new();
        let one = b.int(1, 1);
        let first = b.let_stmt("a", None, Some(one), false, 1);
        let two = b.int(2, 2);
        let second = b.let_stmt("a", None, Some(two), false, 2);

        let program = B::program(vec![first, second]);
        let resolution = resolve_program(&program);
        assert_eq!(kinds(&resolution), vec![DiagnosticKind::DuplicateDeclaration]);
    }

    #[test]
    fn test_shadowing_in_inner_scope_is_legal() {
        let mut b = B::new();
        let one = b.int(1, 1);
        let outer = b.let_stmt("a", None, Some(one), false, 1);
        let two = b.int(2, 2);
        let inner = b.let_stmt("a", None, Some(two), false, 2);
        let block = b.block(vec![inner], 2);

        let program = B::program(vec![outer, block]);
        let resolution = resolve_program(&program);
        assert!(resolution.is_clean(), "{:?}", resolution.diagnostics);
    }

    #[test]
    fn test_self_referential_initializer() {
        let mut b = B::new();
        let read = b.var("a", 1);
        let stmt = b.let_stmt("a", None, Some(read), false, 1);

        let program = B::program(vec![stmt]);
        let resolution = resolve_program(&program);
        assert_eq!(
            kinds(&resolution),
            vec![DiagnosticKind::SelfReferentialInitializer]
        );
    }

    #[test]
    fn test_undefined_variable() {
        let mut b = B::new();
        let read = b.var("ghost", 1);
        let stmt = b.expr_stmt(read, 1);

        let program = B::program(vec![stmt]);
        let resolution = resolve_program(&program);
        assert_eq!(kinds(&resolution), vec![DiagnosticKind::UndefinedVariable]);
    }

    #[test]
    fn test_both_initializers_resolve_after_redeclaration() {
        // The second initializer still reports its own error.
        let mut b = B::new();
        let one = b.int(1, 1);
        let first = b.let_stmt("a", None, Some(one), false, 1);
        let ghost = b.var("ghost", 2);
        let second = b.let_stmt("a", None, Some(ghost), false, 2);

        let program = B::program(vec![first, second]);
        let resolution = resolve_program(&program);
        assert_eq!(
            kinds(&resolution),
            vec![
                DiagnosticKind::DuplicateDeclaration,
                DiagnosticKind::UndefinedVariable
            ]
        );
    }

    // -------------------------------------------------------------------------
    // Borrows
    // -------------------------------------------------------------------------

    #[test]
    fn test_mutable_borrow_conflicts_with_immutable() {
        let mut b = B::new();
        let init = b.string("x", 1);
        let let_s = b.let_stmt("s", None, Some(init), true, 1);
        let r1 = b.borrow("s", false, 2);
        let let_r1 = b.let_stmt("r1", None, Some(r1), false, 2);
        let r2 = b.borrow("s", true, 3);
        let let_r2 = b.let_stmt("r2", None, Some(r2), false, 3);

        let program = B::program(vec![let_s, let_r1, let_r2]);
        let resolution = resolve_program(&program);
        assert_eq!(kinds(&resolution), vec![DiagnosticKind::CannotBorrowMutably]);
        assert_eq!(resolution.diagnostics[0].line(), 3);
    }

    #[test]
    fn test_immutable_borrow_conflicts_with_mutable() {
        let mut b = B::new();
        let init = b.string("x", 1);
        let let_s = b.let_stmt("s", None, Some(init), true, 1);
        let r1 = b.borrow("s", true, 2);
        let let_r1 = b.let_stmt("r1", None, Some(r1), false, 2);
        let r2 = b.borrow("s", false, 3);
        let let_r2 = b.let_stmt("r2", None, Some(r2), false, 3);

        let program = B::program(vec![let_s, let_r1, let_r2]);
        let resolution = resolve_program(&program);
        assert_eq!(
            kinds(&resolution),
            vec![DiagnosticKind::CannotBorrowImmutably]
        );
        assert_eq!(resolution.diagnostics[0].line(), 3);
    }

    #[test]
    fn test_mutable_borrow_of_immutable_binding() {
        let mut b = B::new();
        let init = b.string("x", 1);
        let let_s = b.let_stmt("s", None, Some(init), false, 1);
        let r = b.borrow("s", true, 2);
        let let_r = b.let_stmt("r", None, Some(r), false, 2);

        let program = B::program(vec![let_s, let_r]);
        let resolution = resolve_program(&program);
        assert_eq!(
            kinds(&resolution),
            vec![DiagnosticKind::CannotBorrowMutablyFromImmutable]
        );
    }

    #[test]
    fn test_borrow_scope_ends_at_block() {
        // let s = "x"; let r1 = &s; { let r2 = &s; } print(r1);
        let mut b = B::new();
        let init = b.string("x", 1);
        let let_s = b.let_stmt("s", None, Some(init), false, 1);
        let r1 = b.borrow("s", false, 2);
        let let_r1 = b.let_stmt("r1", None, Some(r1), false, 2);
        let r2 = b.borrow("s", false, 3);
        let let_r2 = b.let_stmt("r2", None, Some(r2), false, 3);
        let block = b.block(vec![let_r2], 3);
        let r1_read = b.var("r1", 4);
        let print_call = b.call("print", vec![r1_read], 4);
        let print_stmt = b.expr_stmt(print_call, 4);

        let program = B::program(vec![let_s, let_r1, block, print_stmt]);
        let resolution = resolve_program(&program);
        assert!(resolution.is_clean(), "{:?}", resolution.diagnostics);
    }

    #[test]
    fn test_borrow_rollback_allows_later_mutable_borrow() {
        // mut s = "x"; { let r = &s; } let m = &mut s;
        let mut b = B::new();
        let init = b.string("x", 1);
        let let_s = b.let_stmt("s", None, Some(init), true, 1);
        let r = b.borrow("s", false, 2);
        let let_r = b.let_stmt("r", None, Some(r), false, 2);
        let block = b.block(vec![let_r], 2);
        let m = b.borrow("s", true, 3);
        let let_m = b.let_stmt("m", None, Some(m), false, 3);

        let program = B::program(vec![let_s, block, let_m]);
        let resolution = resolve_program(&program);
        assert!(resolution.is_clean(), "{:?}", resolution.diagnostics);
    }

    // -------------------------------------------------------------------------
    // Mutability and moves
    // -------------------------------------------------------------------------

    #[test]
    fn test_assign_to_immutable() {
        let mut b = B::new();
        let one = b.int(1, 1);
        let let_a = b.let_stmt("a", None, Some(one), false, 1);
        let two = b.int(2, 2);
        let assign = b.assign("a", two, 2);
        let assign_stmt = b.expr_stmt(assign, 2);

        let program = B::program(vec![let_a, assign_stmt]);
        let resolution = resolve_program(&program);
        assert_eq!(kinds(&resolution), vec![DiagnosticKind::AssignToImmutable]);
    }

    #[test]
    fn test_assign_to_mutable_is_legal() {
        let mut b = B::new();
        let one = b.int(1, 1);
        let let_a = b.let_stmt("a", None, Some(one), true, 1);
        let two = b.int(2, 2);
        let assign = b.assign("a", two, 2);
        let assign_stmt = b.expr_stmt(assign, 2);

        let program = B::program(vec![let_a, assign_stmt]);
        let resolution = resolve_program(&program);
        assert!(resolution.is_clean());
    }

    #[test]
    fn test_move_then_use() {
        // Pass an owned struct by value, then read the original binding.
        let mut b = B::new();
        let decl = b.struct_decl("Point", vec![("x", "int", Visibility::Public)], 1);
        let eat = b.func("eat", vec![("p", "Point")], None, vec![], 2);
        let one = b.int(1, 3);
        let init = b.struct_init("Point", vec![("x", one)], 3);
        let let_p = b.let_stmt("p", None, Some(init), false, 3);
        let p_arg = b.var("p", 4);
        let eat_call = b.call("eat", vec![p_arg], 4);
        let eat_stmt = b.expr_stmt(eat_call, 4);
        let p_read = b.var("p", 5);
        let print_call = b.call("print", vec![p_read], 5);
        let print_stmt = b.expr_stmt(print_call, 5);

        let program = B::program(vec![decl, eat, let_p, eat_stmt, print_stmt]);
        let resolution = resolve_program(&program);
        assert_eq!(kinds(&resolution), vec![DiagnosticKind::UseOfMovedValue]);
        assert_eq!(resolution.diagnostics[0].line(), 5);
    }

    #[test]
    fn test_reassignment_clears_move() {
        let mut b = B::new();
        let decl = b.struct_decl("Point", vec![("x", "int", Visibility::Public)], 1);
        let eat = b.func("eat", vec![("p", "Point")], None, vec![], 2);
        let one = b.int(1, 3);
        let init = b.struct_init("Point", vec![("x", one)], 3);
        let let_p = b.let_stmt("p", None, Some(init), true, 3);
        let p_arg = b.var("p", 4);
        let eat_call = b.call("eat", vec![p_arg], 4);
        let eat_stmt = b.expr_stmt(eat_call, 4);
        let two = b.int(2, 5);
        let fresh = b.struct_init("Point", vec![("x", two)], 5);
        let reassign = b.assign("p", fresh, 5);
        let reassign_stmt = b.expr_stmt(reassign, 5);
        let p_read = b.var("p", 6);
        let print_call = b.call("print", vec![p_read], 6);
        let print_stmt = b.expr_stmt(print_call, 6);

        let program = B::program(vec![decl, eat, let_p, eat_stmt, reassign_stmt, print_stmt]);
        let resolution = resolve_program(&program);
        assert!(resolution.is_clean(), "{:?}", resolution.diagnostics);
    }

    #[test]
    fn test_str_moves_on_let_initializer() {
        let mut b = B::new();
        let init = b.string("x", 1);
        let let_s = b.let_stmt("s", None, Some(init), false, 1);
        let s_read = b.var("s", 2);
        let let_t = b.let_stmt("t", None, Some(s_read), false, 2);
        let s_again = b.var("s", 3);
        let print_call = b.call("print", vec![s_again], 3);
        let print_stmt = b.expr_stmt(print_call, 3);

        let program = B::program(vec![let_s, let_t, print_stmt]);
        let resolution = resolve_program(&program);
        assert_eq!(kinds(&resolution), vec![DiagnosticKind::UseOfMovedValue]);
    }

    #[test]
    fn test_primitives_copy_instead_of_moving() {
        let mut b = B::new();
        let init = b.int(1, 1);
        let let_a = b.let_stmt("a", None, Some(init), false, 1);
        let a_read = b.var("a", 2);
        let let_b = b.let_stmt("b", None, Some(a_read), false, 2);
        let a_again = b.var("a", 3);
        let print_call = b.call("print", vec![a_again], 3);
        let print_stmt = b.expr_stmt(print_call, 3);

        let program = B::program(vec![let_a, let_b, print_stmt]);
        let resolution = resolve_program(&program);
        assert!(resolution.is_clean());
    }

    // -------------------------------------------------------------------------
    // Context gating
    // -------------------------------------------------------------------------

    #[test]
    fn test_return_outside_function() {
        let mut b = B::new();
        let one = b.int(1, 1);
        let ret = b.node(Stmt::Return(Some(one)), 1);

        let program = B::program(vec![ret]);
        let resolution = resolve_program(&program);
        assert_eq!(
            kinds(&resolution),
            vec![DiagnosticKind::ReturnOutsideFunction]
        );
    }

    #[test]
    fn test_return_inside_function() {
        let mut b = B::new();
        let one = b.int(1, 1);
        let ret = b.node(Stmt::Return(Some(one)), 1);
        let func = b.func("f", vec![], Some("int"), vec![ret], 1);

        let program = B::program(vec![func]);
        let resolution = resolve_program(&program);
        assert!(resolution.is_clean(), "{:?}", resolution.diagnostics);
    }

    #[test]
    fn test_return_type_mismatch() {
        let mut b = B::new();
        let value = b.string("x", 1);
        let ret = b.node(Stmt::Return(Some(value)), 1);
        let func = b.func("f", vec![], Some("int"), vec![ret], 1);

        let program = B::program(vec![func]);
        let resolution = resolve_program(&program);
        assert_eq!(kinds(&resolution), vec![DiagnosticKind::TypeMismatch]);
    }

    #[test]
    fn test_break_outside_loop_or_switch() {
        let mut b = B::new();
        let brk = b.node(Stmt::Break, 1);

        let program = B::program(vec![brk]);
        let resolution = resolve_program(&program);
        assert_eq!(
            kinds(&resolution),
            vec![DiagnosticKind::MisplacedControlFlow]
        );
    }

    #[test]
    fn test_fallthrough_requires_switch_not_loop() {
        let mut b = B::new();
        let fall = b.node(Stmt::Fallthrough, 2);
        let body = b.block(vec![fall], 2);
        let cond = b.boolean(true, 1);
        let while_stmt = b.node(
            Stmt::While {
                condition: cond,
                body: Box::new(body),
            },
            1,
        );

        let program = B::program(vec![while_stmt]);
        let resolution = resolve_program(&program);
        assert_eq!(
            kinds(&resolution),
            vec![DiagnosticKind::MisplacedControlFlow]
        );
    }

    #[test]
    fn test_break_and_fallthrough_inside_switch() {
        let mut b = B::new();
        let scrutinee = b.int(1, 1);
        let case_value = b.int(1, 2);
        let fall = b.node(Stmt::Fallthrough, 2);
        let case_two = b.int(2, 3);
        let brk = b.node(Stmt::Break, 3);
        let switch = b.node(
            Stmt::Switch {
                scrutinee,
                cases: vec![
                    SwitchCase {
                        value: case_value,
                        body: vec![fall],
                    },
                    SwitchCase {
                        value: case_two,
                        body: vec![brk],
                    },
                ],
                default: None,
            },
            1,
        );

        let program = B::program(vec![switch]);
        let resolution = resolve_program(&program);
        assert!(resolution.is_clean(), "{:?}", resolution.diagnostics);
    }

    #[test]
    fn test_self_outside_struct() {
        let mut b = B::new();
        let self_expr = b.node(Expr::SelfExpr, 1);
        let stmt = b.expr_stmt(self_expr, 1);

        let program = B::program(vec![stmt]);
        let resolution = resolve_program(&program);
        assert_eq!(kinds(&resolution), vec![DiagnosticKind::SelfOutsideStruct]);
    }

    // -------------------------------------------------------------------------
    // Types
    // -------------------------------------------------------------------------

    #[test]
    fn test_condition_must_be_boolean() {
        let mut b = B::new();
        let cond = b.int(1, 1);
        let body = b.block(vec![], 1);
        let if_stmt = b.node(
            Stmt::If {
                condition: cond,
                then_branch: Box::new(body),
                else_branch: None,
            },
            1,
        );

        let program = B::program(vec![if_stmt]);
        let resolution = resolve_program(&program);
        assert_eq!(kinds(&resolution), vec![DiagnosticKind::ConditionNotBoolean]);
    }

    #[test]
    fn test_declared_type_mismatch() {
        let mut b = B::new();
        let ty = b.named_ty("int", 1);
        let init = b.string("x", 1);
        let stmt = b.let_stmt("a", Some(ty), Some(init), false, 1);

        let program = B::program(vec![stmt]);
        let resolution = resolve_program(&program);
        assert_eq!(kinds(&resolution), vec![DiagnosticKind::TypeMismatch]);
    }

    #[test]
    fn test_option_widening() {
        let mut b = B::new();
        let inner = b.named_ty("int", 1);
        let ty = b.node(TypeExpr::Option(Box::new(inner)), 1);
        let init = b.none(1);
        let none_ok = b.let_stmt("a", Some(ty), Some(init), false, 1);

        let inner2 = b.named_ty("int", 2);
        let ty2 = b.node(TypeExpr::Option(Box::new(inner2)), 2);
        let five = b.int(5, 2);
        let value_ok = b.let_stmt("b", Some(ty2), Some(five), false, 2);

        // The reverse direction never widens.
        let int_ty = b.named_ty("int", 3);
        let none_bad = b.none(3);
        let bad = b.let_stmt("c", Some(int_ty), Some(none_bad), false, 3);

        let program = B::program(vec![none_ok, value_ok, bad]);
        let resolution = resolve_program(&program);
        assert_eq!(kinds(&resolution), vec![DiagnosticKind::TypeMismatch]);
        assert_eq!(resolution.diagnostics[0].line(), 3);
    }

    #[test]
    fn test_unknown_type_annotation() {
        let mut b = B::new();
        let ty = b.named_ty("Ghost", 1);
        let one = b.int(1, 1);
        let stmt = b.let_stmt("a", Some(ty), Some(one), false, 1);

        let program = B::program(vec![stmt]);
        let resolution = resolve_program(&program);
        assert_eq!(kinds(&resolution), vec![DiagnosticKind::UnknownType]);
    }

    #[test]
    fn test_binary_operand_mismatch() {
        let mut b = B::new();
        let left = b.int(1, 1);
        let right = b.string("x", 1);
        let sum = b.node(
            Expr::Binary {
                left: Box::new(left),
                op: BinaryOp::Add,
                right: Box::new(right),
            },
            1,
        );
        let stmt = b.expr_stmt(sum, 1);

        let program = B::program(vec![stmt]);
        let resolution = resolve_program(&program);
        assert_eq!(kinds(&resolution), vec![DiagnosticKind::TypeMismatch]);
    }

    // -------------------------------------------------------------------------
    // Calls
    // -------------------------------------------------------------------------

    #[test]
    fn test_wrong_argument_count() {
        let mut b = B::new();
        let func = b.func("f", vec![("a", "int")], Some("int"), vec![], 1);
        let one = b.int(1, 2);
        let two = b.int(2, 2);
        let call = b.call("f", vec![one, two], 2);
        let stmt = b.expr_stmt(call, 2);

        let program = B::program(vec![func, stmt]);
        let resolution = resolve_program(&program);
        assert_eq!(kinds(&resolution), vec![DiagnosticKind::WrongArgumentCount]);
    }

    #[test]
    fn test_wrong_argument_type() {
        let mut b = B::new();
        let func = b.func("f", vec![("a", "int")], Some("int"), vec![], 1);
        let arg = b.string("x", 2);
        let call = b.call("f", vec![arg], 2);
        let stmt = b.expr_stmt(call, 2);

        let program = B::program(vec![func, stmt]);
        let resolution = resolve_program(&program);
        assert_eq!(kinds(&resolution), vec![DiagnosticKind::WrongArgumentType]);
    }

    #[test]
    fn test_forward_reference_to_function() {
        let mut b = B::new();
        let one = b.int(1, 1);
        let call = b.call("later", vec![one], 1);
        let stmt = b.expr_stmt(call, 1);
        let func = b.func("later", vec![("a", "int")], None, vec![], 2);

        let program = B::program(vec![stmt, func]);
        let resolution = resolve_program(&program);
        assert!(resolution.is_clean(), "{:?}", resolution.diagnostics);
    }

    #[test]
    fn test_struct_default_construction() {
        let mut b = B::new();
        let decl = b.struct_decl("Point", vec![("x", "int", Visibility::Public)], 1);
        let call = b.call("Point", vec![], 2);
        let stmt = b.let_stmt("p", None, Some(call), false, 2);

        let program = B::program(vec![decl, stmt]);
        let resolution = resolve_program(&program);
        assert!(resolution.is_clean(), "{:?}", resolution.diagnostics);
    }

    // -------------------------------------------------------------------------
    // Structs, enums, traits
    // -------------------------------------------------------------------------

    #[test]
    fn test_private_field_access_rejected_outside_struct() {
        let mut b = B::new();
        let decl = b.struct_decl("Point", vec![("x", "int", Visibility::Private)], 1);
        let ctor = b.call("Point", vec![], 2);
        let let_p = b.let_stmt("p", None, Some(ctor), false, 2);
        let object = b.var("p", 3);
        let field = b.ident("x", 3);
        let get = b.node(
            Expr::Get {
                object: Box::new(object),
                field,
            },
            3,
        );
        let stmt = b.expr_stmt(get, 3);

        let program = B::program(vec![decl, let_p, stmt]);
        let resolution = resolve_program(&program);
        assert_eq!(kinds(&resolution), vec![DiagnosticKind::TypeMismatch]);
    }

    #[test]
    fn test_public_field_access_is_legal() {
        let mut b = B::new();
        let decl = b.struct_decl("Point", vec![("x", "int", Visibility::Public)], 1);
        let ctor = b.call("Point", vec![], 2);
        let let_p = b.let_stmt("p", None, Some(ctor), false, 2);
        let object = b.var("p", 3);
        let field = b.ident("x", 3);
        let get = b.node(
            Expr::Get {
                object: Box::new(object),
                field,
            },
            3,
        );
        let stmt = b.expr_stmt(get, 3);

        let program = B::program(vec![decl, let_p, stmt]);
        let resolution = resolve_program(&program);
        assert!(resolution.is_clean(), "{:?}", resolution.diagnostics);
    }

    #[test]
    fn test_enum_member_access() {
        let mut b = B::new();
        let red = b.ident("Red", 1);
        let name = b.ident("Color", 1);
        let decl = b.node(
            Stmt::Enum(EnumDecl {
                name,
                members: vec![red],
            }),
            1,
        );
        let object = b.var("Color", 2);
        let member = b.ident("Red", 2);
        let get = b.node(
            Expr::Get {
                object: Box::new(object),
                field: member,
            },
            2,
        );
        let ok = b.let_stmt("c", None, Some(get), false, 2);

        let object2 = b.var("Color", 3);
        let missing = b.ident("Purple", 3);
        let get2 = b.node(
            Expr::Get {
                object: Box::new(object2),
                field: missing,
            },
            3,
        );
        let bad = b.let_stmt("d", None, Some(get2), false, 3);

        let program = B::program(vec![decl, ok, bad]);
        let resolution = resolve_program(&program);
        assert_eq!(kinds(&resolution), vec![DiagnosticKind::TypeMismatch]);
        assert_eq!(resolution.diagnostics[0].line(), 3);
    }

    #[test]
    fn test_missing_trait_method() {
        let mut b = B::new();
        let decl = b.struct_decl("Point", vec![("x", "int", Visibility::Public)], 1);
        let method_name = b.ident("show", 2);
        let ret = b.named_ty("str", 2);
        let trait_name = b.ident("Show", 2);
        let trait_decl = b.node(
            Stmt::Trait(TraitDecl {
                name: trait_name,
                generics: vec![],
                methods: vec![TraitMethod {
                    name: method_name,
                    params: vec![],
                    return_type: Some(ret),
                }],
            }),
            2,
        );
        let impl_struct = b.ident("Point", 3);
        let impl_trait = b.ident("Show", 3);
        let impl_decl = b.node(
            Stmt::Impl(ImplDecl {
                struct_name: impl_struct,
                trait_name: Some(impl_trait),
                generics: vec![],
                methods: vec![],
            }),
            3,
        );

        let program = B::program(vec![decl, trait_decl, impl_decl]);
        let resolution = resolve_program(&program);
        assert_eq!(kinds(&resolution), vec![DiagnosticKind::MissingTraitMethod]);
    }

    #[test]
    fn test_trait_method_signature_mismatch() {
        let mut b = B::new();
        let decl = b.struct_decl("Point", vec![("x", "int", Visibility::Public)], 1);
        let sig_name = b.ident("show", 2);
        let sig_ret = b.named_ty("str", 2);
        let trait_name = b.ident("Show", 2);
        let trait_decl = b.node(
            Stmt::Trait(TraitDecl {
                name: trait_name,
                generics: vec![],
                methods: vec![TraitMethod {
                    name: sig_name,
                    params: vec![],
                    return_type: Some(sig_ret),
                }],
            }),
            2,
        );
        // Implemented with `-> int` instead of `-> str`.
        let method_name = b.ident("show", 3);
        let wrong_ret = b.named_ty("int", 3);
        let zero = b.int(0, 3);
        let ret_stmt = b.node(Stmt::Return(Some(zero)), 3);
        let impl_struct = b.ident("Point", 3);
        let impl_trait = b.ident("Show", 3);
        let impl_decl = b.node(
            Stmt::Impl(ImplDecl {
                struct_name: impl_struct,
                trait_name: Some(impl_trait),
                generics: vec![],
                methods: vec![FunctionDecl {
                    name: method_name,
                    generics: vec![],
                    params: vec![],
                    return_type: Some(wrong_ret),
                    body: vec![ret_stmt],
                }],
            }),
            3,
        );

        let program = B::program(vec![decl, trait_decl, impl_decl]);
        let resolution = resolve_program(&program);
        assert_eq!(kinds(&resolution), vec![DiagnosticKind::SignatureMismatch]);
    }

    #[test]
    fn test_operator_overload_via_impl_method() {
        let mut b = B::new();
        let decl = b.struct_decl("Vec2", vec![("x", "int", Visibility::Public)], 1);

        let method_name = b.ident("add", 2);
        let other = b.ident("other", 2);
        let other_ty = b.named_ty("Vec2", 2);
        let ret_ty = b.named_ty("Vec2", 2);
        let ctor = b.call("Vec2", vec![], 2);
        let body_ret = b.node(Stmt::Return(Some(ctor)), 2);
        let impl_struct = b.ident("Vec2", 2);
        let impl_decl = b.node(
            Stmt::Impl(ImplDecl {
                struct_name: impl_struct,
                trait_name: None,
                generics: vec![],
                methods: vec![FunctionDecl {
                    name: method_name,
                    generics: vec![],
                    params: vec![Param {
                        name: other,
                        ty: other_ty,
                    }],
                    return_type: Some(ret_ty),
                    body: vec![body_ret],
                }],
            }),
            2,
        );

        let a_ctor = b.call("Vec2", vec![], 3);
        let let_a = b.let_stmt("a", None, Some(a_ctor), false, 3);
        let b_ctor = b.call("Vec2", vec![], 4);
        let let_b = b.let_stmt("b", None, Some(b_ctor), false, 4);
        let a_read = b.var("a", 5);
        let b_read = b.var("b", 5);
        let sum = b.node(
            Expr::Binary {
                left: Box::new(a_read),
                op: BinaryOp::Add,
                right: Box::new(b_read),
            },
            5,
        );
        let sum_id = sum.id;
        let let_c = b.let_stmt("c", None, Some(sum), false, 5);

        let program = B::program(vec![decl, impl_decl, let_a, let_b, let_c]);
        let resolution = resolve_program(&program);
        assert!(resolution.is_clean(), "{:?}", resolution.diagnostics);
        assert_eq!(
            resolution.types.get(sum_id),
            Some(&Type::Struct("Vec2".to_string()))
        );
    }

    #[test]
    fn test_cyclic_struct_definition_aborts_early() {
        let mut b = B::new();
        let a = b.struct_decl("A", vec![("b", "B", Visibility::Public)], 1);
        let bee = b.struct_decl("B", vec![("a", "A", Visibility::Public)], 2);

        let program = B::program(vec![a, bee]);
        let resolution = resolve_program(&program);
        assert_eq!(
            kinds(&resolution),
            vec![DiagnosticKind::CyclicTypeDefinition]
        );
        // Body resolution never ran.
        assert!(resolution.types.is_empty());
    }

    #[test]
    fn test_struct_cycle_broken_by_borrow_is_legal() {
        let mut b = B::new();
        let inner = b.named_ty("A", 1);
        let borrow_ty = b.node(
            TypeExpr::Borrow {
                inner: Box::new(inner),
                mutable: false,
            },
            1,
        );
        let field_name = b.ident("parent", 1);
        let name = b.ident("A", 1);
        let decl = b.node(
            Stmt::Struct(StructDecl {
                name,
                generics: vec![],
                fields: vec![FieldDecl {
                    name: field_name,
                    ty: borrow_ty,
                    visibility: Visibility::Public,
                }],
            }),
            1,
        );

        let program = B::program(vec![decl]);
        let resolution = resolve_program(&program);
        assert!(resolution.is_clean(), "{:?}", resolution.diagnostics);
    }

    // -------------------------------------------------------------------------
    // Switch typing and imports
    // -------------------------------------------------------------------------

    #[test]
    fn test_switch_case_type_mismatch() {
        let mut b = B::new();
        let scrutinee = b.int(1, 1);
        let case_value = b.string("x", 2);
        let switch = b.node(
            Stmt::Switch {
                scrutinee,
                cases: vec![SwitchCase {
                    value: case_value,
                    body: vec![],
                }],
                default: None,
            },
            1,
        );

        let program = B::program(vec![switch]);
        let resolution = resolve_program(&program);
        assert_eq!(kinds(&resolution), vec![DiagnosticKind::TypeMismatch]);
    }

    #[test]
    fn test_known_and_unknown_module_imports() {
        let mut b = B::new();
        let ok = b.node(Stmt::Import(ImportPath::Module(Ident::new("math"))), 1);
        let bad = b.node(Stmt::Import(ImportPath::Module(Ident::new("warp"))), 2);

        let program = B::program(vec![ok, bad]);
        let resolution = resolve_program(&program);
        assert_eq!(kinds(&resolution), vec![DiagnosticKind::UnknownType]);
        assert_eq!(resolution.diagnostics[0].line(), 2);
    }

    // -------------------------------------------------------------------------
    // Idempotence
    // -------------------------------------------------------------------------

    #[test]
    fn test_resolution_is_idempotent() {
        let mut b = B::new();
        let init = b.string("x", 1);
        let let_s = b.let_stmt("s", None, Some(init), false, 1);
        let s_read = b.var("s", 2);
        let let_t = b.let_stmt("t", None, Some(s_read), false, 2);
        let s_again = b.var("s", 3);
        let print_call = b.call("print", vec![s_again], 3);
        let print_stmt = b.expr_stmt(print_call, 3);

        let program = B::program(vec![let_s, let_t, print_stmt]);
        let first = resolve_program(&program);
        let second = resolve_program(&program);
        assert_eq!(first, second);
    }
}
