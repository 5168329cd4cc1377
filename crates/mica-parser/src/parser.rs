//! Core Parser struct and main parsing methods

use super::*;

/// Recursive descent parser for Mica
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) current: usize,
    next_id: u32,
    /// False inside `if`/`while`/`for`/`switch` headers, where `Name {`
    /// must not be read as a struct literal.
    pub(crate) struct_literal_ok: bool,
}

impl Parser {
    /// Creates a new parser from a token stream
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            current: 0,
            next_id: 0,
            struct_literal_ok: true,
        }
    }

    /// Parses a complete program
    pub fn parse_program(&mut self) -> Result<Program, Vec<ParseError>> {
        let start_span = self.current_token().span;
        let mut stmts = Vec::new();
        let mut errors = Vec::new();

        while !self.is_at_end() {
            match self.parse_statement() {
                Ok(stmt) => stmts.push(stmt),
                Err(err) => {
                    errors.push(err);
                    self.synchronize();
                }
            }
        }

        if errors.is_empty() {
            let end_span = if stmts.is_empty() {
                start_span
            } else {
                stmts.last().unwrap().span
            };
            Ok(Program {
                stmts,
                span: start_span.merge(&end_span),
            })
        } else {
            Err(errors)
        }
    }

    // =========================================================================
    // Node construction
    // =========================================================================

    /// Wraps a value in a [`Node`], allocating a fresh id for it.
    pub(crate) fn node<T>(&mut self, value: T, span: Span) -> Node<T> {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        Node::new(value, span, id)
    }

    // =========================================================================
    // Token helpers
    // =========================================================================

    pub(crate) fn current_token(&self) -> &Token {
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    pub(crate) fn previous_token(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    pub(crate) fn peek_kind(&self, n: usize) -> Option<&TokenKind> {
        self.tokens.get(self.current + n).map(|t| &t.kind)
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        &self.current_token().kind == kind
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.current_token().kind == TokenKind::Eof
    }

    pub(crate) fn advance(&mut self) -> Token {
        let token = self.current_token().clone();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    pub(crate) fn consume(&mut self, kind: TokenKind) -> ParseResult<Token> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            let token = self.current_token();
            Err(ParseError::new(
                format!("Expected {:?}, found '{}'", kind, token.value),
                token.span,
            ))
        }
    }

    pub(crate) fn parse_identifier(&mut self) -> ParseResult<Node<Ident>> {
        if self.check(&TokenKind::Identifier) {
            let token = self.advance();
            let ident = Ident::new(token.value);
            Ok(self.node(ident, token.span))
        } else {
            let token = self.current_token();
            Err(ParseError::new(
                format!("Expected identifier, found '{}'", token.value),
                token.span,
            ))
        }
    }

    /// Skips tokens until a likely statement boundary, so one syntax error
    /// does not cascade into the rest of the program.
    pub(crate) fn synchronize(&mut self) {
        while !self.is_at_end() {
            if self.previous_token().kind == TokenKind::Semicolon {
                return;
            }
            match self.current_token().kind {
                TokenKind::Struct
                | TokenKind::Func
                | TokenKind::Let
                | TokenKind::Mut
                | TokenKind::If
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Switch
                | TokenKind::Return
                | TokenKind::Trait
                | TokenKind::Impl
                | TokenKind::Enum
                | TokenKind::Import => return,
                _ => {
                    self.advance();
                }
            }
        }
    }
}
