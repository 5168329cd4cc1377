//! # Mica Driver
//!
//! Pipeline glue over the compiler stages, exposed as a library so the
//! full source-to-C++ path is testable without spawning the binary.

use mica_ast::{Program, Span};
use mica_codegen::CodegenError;
use mica_lexer::{Lexer, Token, TokenKind};
use mica_parser::{ParseError, Parser};
use mica_resolve::{Diagnostic, Resolution};

/// A lexical error extracted from the token stream.
#[derive(Debug, Clone)]
pub struct LexError {
    pub span: Span,
    pub message: String,
}

/// Failure of one pipeline stage, carrying everything needed to report it.
#[derive(Debug)]
pub enum PipelineError {
    Lex(Vec<LexError>),
    Parse(Vec<ParseError>),
    Resolve(Vec<Diagnostic>),
    Codegen(CodegenError),
}

/// Tokenizes a source file; lexical errors fail the stage.
pub fn lex_source(source: &str) -> Result<Vec<Token>, PipelineError> {
    let tokens = Lexer::new(source).tokenize();
    let errors: Vec<LexError> = tokens
        .iter()
        .filter(|t| t.kind == TokenKind::Error)
        .map(|t| LexError {
            span: t.span,
            message: t.value.clone(),
        })
        .collect();
    if errors.is_empty() {
        Ok(tokens)
    } else {
        Err(PipelineError::Lex(errors))
    }
}

/// Lexes and parses a source file.
pub fn parse_source(source: &str) -> Result<Program, PipelineError> {
    let tokens = lex_source(source)?;
    Parser::new(tokens)
        .parse_program()
        .map_err(PipelineError::Parse)
}

/// Lexes, parses, and resolves. The returned resolution may still carry
/// diagnostics; the caller decides whether that fails its command.
pub fn check_source(source: &str) -> Result<(Program, Resolution), PipelineError> {
    let program = parse_source(source)?;
    let resolution = mica_resolve::resolve_program(&program);
    Ok((program, resolution))
}

/// The full pipeline: source text to C++ text. Outstanding resolution
/// diagnostics fail the compile before code generation runs.
pub fn compile_source(source: &str) -> Result<String, PipelineError> {
    let (program, resolution) = check_source(source)?;
    if !resolution.is_clean() {
        return Err(PipelineError::Resolve(resolution.diagnostics));
    }
    mica_codegen::generate(&program, &resolution).map_err(PipelineError::Codegen)
}
