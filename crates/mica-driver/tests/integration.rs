//! Integration tests for the Mica compiler pipeline.
//!
//! These drive the full source-to-C++ path through the library API.

use mica_driver::{check_source, compile_source, PipelineError};
use mica_resolve::DiagnosticKind;

fn diagnostics_of(source: &str) -> Vec<DiagnosticKind> {
    let (_, resolution) = check_source(source).expect("pipeline failed before resolution");
    resolution.diagnostics.iter().map(|d| d.kind).collect()
}

// ============================================================================
// Happy path
// ============================================================================

#[test]
fn test_hello_world_compiles() {
    let cpp = compile_source(r#"print("Hello, World!");"#).unwrap();
    assert!(cpp.contains("int main() {"));
    assert!(cpp.contains(r#"mica_print(std::string("Hello, World!"));"#));
}

#[test]
fn test_full_program_compiles() {
    let cpp = compile_source(
        r#"
        struct Point {
            public x: int;
            public y: int;
        }

        trait Show {
            show() -> int;
        }

        impl Show for Point {
            show() -> int { return self.x + self.y; }
        }

        func scale(p: Point, factor: int) -> int {
            return p.show() * factor;
        }

        func main() {
            let p = Point{x: 3, y: 4};
            mut total = 0;
            for (mut i = 0; i < 3; i = i + 1) {
                total = total + i;
            }
            print(scale(p, total));
        }
        "#,
    )
    .unwrap();

    assert!(cpp.contains("struct Point : public Show {"));
    assert!(cpp.contains("int scale(Point p, int factor)"));
    assert!(cpp.contains("int main() {"));
    // `p` is consumed by value, so the call site moves it.
    assert!(cpp.contains("scale(std::move(p), total)"));
}

#[test]
fn test_borrows_survive_the_whole_pipeline() {
    let cpp = compile_source(
        r#"
        mut s = "hello";
        {
            let r = &s;
            print(*r);
        }
        let m = &mut s;
        "#,
    )
    .unwrap();
    assert!(cpp.contains("const std::string* r = &(s);"));
    assert!(cpp.contains("std::string* m = &(s);"));
}

#[test]
fn test_check_reports_clean_resolution() {
    let (_, resolution) = check_source("let a = 1; print(a);").unwrap();
    assert!(resolution.is_clean());
    assert!(!resolution.types.is_empty());
}

// ============================================================================
// Stage failures
// ============================================================================

#[test]
fn test_lex_stage_failure() {
    let result = compile_source("let a = #;");
    assert!(matches!(result, Err(PipelineError::Lex(_))));
}

#[test]
fn test_parse_stage_failure() {
    let result = compile_source("let = 1;");
    match result {
        Err(PipelineError::Parse(errors)) => assert!(!errors.is_empty()),
        other => panic!("expected parse failure, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_resolution_failure_blocks_codegen() {
    let result = compile_source("let a = 1; a = 2;");
    match result {
        Err(PipelineError::Resolve(diagnostics)) => {
            assert_eq!(diagnostics.len(), 1);
            assert_eq!(diagnostics[0].kind, DiagnosticKind::AssignToImmutable);
        }
        other => panic!("expected resolve failure, got {:?}", other.map(|_| ())),
    }
}

// ============================================================================
// End-to-end semantic checks
// ============================================================================

#[test]
fn test_move_then_use_detected_end_to_end() {
    let kinds = diagnostics_of(
        r#"
        struct Token { public text: str; }
        func consume(t: Token) {}

        let t = Token{text: "if"};
        consume(t);
        print(t);
        "#,
    );
    assert_eq!(kinds, vec![DiagnosticKind::UseOfMovedValue]);
}

#[test]
fn test_borrow_conflict_detected_end_to_end() {
    let kinds = diagnostics_of(
        r#"
        mut s = "x";
        let r1 = &s;
        let r2 = &mut s;
        "#,
    );
    assert_eq!(kinds, vec![DiagnosticKind::CannotBorrowMutably]);
}

#[test]
fn test_multiple_errors_reported_in_one_run() {
    let kinds = diagnostics_of(
        r#"
        let a = 1;
        a = 2;
        print(ghost);
        return 3;
        "#,
    );
    assert_eq!(
        kinds,
        vec![
            DiagnosticKind::AssignToImmutable,
            DiagnosticKind::UndefinedVariable,
            DiagnosticKind::ReturnOutsideFunction,
        ]
    );
}

#[test]
fn test_diagnostics_are_in_source_order() {
    let (_, resolution) = check_source(
        r#"
        let a = 1;
        a = 2;
        let b: Ghost = 3;
        b = 4;
        "#,
    )
    .unwrap();
    let lines: Vec<u32> = resolution.diagnostics.iter().map(|d| d.line()).collect();
    let mut sorted = lines.clone();
    sorted.sort_unstable();
    assert_eq!(lines, sorted);
    assert!(lines.len() >= 3);
}

#[test]
fn test_shadowing_compiles_cleanly() {
    let cpp = compile_source(
        r#"
        let a = 1;
        {
            let a = "inner";
            print(a);
        }
        print(a);
        "#,
    )
    .unwrap();
    assert!(cpp.contains("const int a = 1;"));
    assert!(cpp.contains(r#"const std::string a = std::string("inner");"#));
}

#[test]
fn test_switch_with_enum_scrutinee() {
    let cpp = compile_source(
        r#"
        enum Color { Red, Green, Blue }

        func main() {
            let c = Color::Green;
            switch (c) {
                case Color::Red: { print(0); }
                case Color::Green: { print(1); }
                default: { print(2); }
            }
        }
        "#,
    )
    .unwrap();
    assert!(cpp.contains("enum class Color {"));
    assert!(cpp.contains("case Color::Green: {"));
}

#[test]
fn test_cyclic_struct_fails_before_codegen() {
    let result = compile_source(
        r#"
        struct A { b: B; }
        struct B { a: A; }
        "#,
    );
    match result {
        Err(PipelineError::Resolve(diagnostics)) => {
            assert_eq!(diagnostics.len(), 1);
            assert_eq!(diagnostics[0].kind, DiagnosticKind::CyclicTypeDefinition);
        }
        other => panic!("expected resolve failure, got {:?}", other.map(|_| ())),
    }
}
