//! # Mica Parser
//!
//! Recursive descent parser for Mica with precedence climbing for
//! expressions. Recovers at statement boundaries so one syntax error does
//! not hide the rest of the program.

use mica_ast::*;
use mica_lexer::{Token, TokenKind};

// Module declarations
mod error;
mod parser;
mod expr;
mod stmt;
mod types;
mod decl;

// Re-export public types
pub use error::{ParseError, ParseResult};
pub use parser::Parser;

// =============================================================================
// Tests
// =============================================================================
