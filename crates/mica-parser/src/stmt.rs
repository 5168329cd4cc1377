//! Statement parsing

use super::*;

impl Parser {
    pub(crate) fn parse_statement(&mut self) -> ParseResult<Node<Stmt>> {
        let start = self.current_token().span;

        let stmt = match self.current_token().kind {
            TokenKind::LBrace => Stmt::Block(self.parse_block_stmts()?),
            TokenKind::Let | TokenKind::Mut => self.parse_let_statement(Visibility::Private)?,
            TokenKind::Public | TokenKind::Private => {
                let visibility = if self.current_token().kind == TokenKind::Public {
                    Visibility::Public
                } else {
                    Visibility::Private
                };
                self.advance();
                match self.current_token().kind {
                    TokenKind::Let | TokenKind::Mut => self.parse_let_statement(visibility)?,
                    TokenKind::Func => Stmt::Function(self.parse_function_decl()?),
                    _ => {
                        let token = self.current_token();
                        return Err(ParseError::new(
                            format!(
                                "Expected declaration after visibility marker, found '{}'",
                                token.value
                            ),
                            token.span,
                        ));
                    }
                }
            }
            TokenKind::If => self.parse_if_statement()?,
            TokenKind::While => self.parse_while_statement()?,
            TokenKind::For => self.parse_for_statement()?,
            TokenKind::Switch => self.parse_switch_statement()?,
            TokenKind::Return => self.parse_return_statement()?,
            TokenKind::Break => {
                self.advance();
                self.consume(TokenKind::Semicolon)?;
                Stmt::Break
            }
            TokenKind::Fallthrough => {
                self.advance();
                self.consume(TokenKind::Semicolon)?;
                Stmt::Fallthrough
            }
            TokenKind::Func => Stmt::Function(self.parse_function_decl()?),
            TokenKind::Struct => Stmt::Struct(self.parse_struct_decl()?),
            TokenKind::Trait => Stmt::Trait(self.parse_trait_decl()?),
            TokenKind::Impl => Stmt::Impl(self.parse_impl_decl()?),
            TokenKind::Enum => Stmt::Enum(self.parse_enum_decl()?),
            TokenKind::Import => self.parse_import_statement()?,
            _ => {
                let expr = self.parse_expression()?;
                self.consume(TokenKind::Semicolon)?;
                Stmt::Expression(expr)
            }
        };

        let span = start.merge(&self.previous_token().span);
        Ok(self.node(stmt, span))
    }

    /// Parses a brace-delimited statement list.
    pub(crate) fn parse_block_stmts(&mut self) -> ParseResult<Vec<Node<Stmt>>> {
        self.consume(TokenKind::LBrace)?;
        let saved = self.struct_literal_ok;
        self.struct_literal_ok = true;

        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            match self.parse_statement() {
                Ok(stmt) => stmts.push(stmt),
                Err(e) => {
                    self.struct_literal_ok = saved;
                    return Err(e);
                }
            }
        }

        self.struct_literal_ok = saved;
        self.consume(TokenKind::RBrace)?;
        Ok(stmts)
    }

    fn parse_block_as_stmt(&mut self) -> ParseResult<Node<Stmt>> {
        let start = self.current_token().span;
        let stmts = self.parse_block_stmts()?;
        let span = start.merge(&self.previous_token().span);
        Ok(self.node(Stmt::Block(stmts), span))
    }

    fn parse_let_statement(&mut self, visibility: Visibility) -> ParseResult<Stmt> {
        let mutable = match self.current_token().kind {
            TokenKind::Let => false,
            TokenKind::Mut => true,
            _ => unreachable!("caller checked for let/mut"),
        };
        self.advance();

        let name = self.parse_identifier()?;

        let ty = if self.check(&TokenKind::Colon) {
            self.advance();
            Some(self.parse_type()?)
        } else {
            None
        };

        let init = if self.check(&TokenKind::Eq) {
            self.advance();
            Some(self.parse_expression()?)
        } else {
            None
        };

        self.consume(TokenKind::Semicolon)?;

        Ok(Stmt::Let {
            name,
            ty,
            init,
            mutable,
            visibility,
        })
    }

    fn parse_if_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::If)?;
        self.consume(TokenKind::LParen)?;
        let condition = self.parse_condition()?;
        self.consume(TokenKind::RParen)?;

        let then_branch = Box::new(self.parse_block_as_stmt()?);

        let else_branch = if self.check(&TokenKind::Else) {
            self.advance();
            if self.check(&TokenKind::If) {
                let start = self.current_token().span;
                let nested = self.parse_if_statement()?;
                let span = start.merge(&self.previous_token().span);
                Some(Box::new(self.node(nested, span)))
            } else {
                Some(Box::new(self.parse_block_as_stmt()?))
            }
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn parse_while_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::While)?;
        self.consume(TokenKind::LParen)?;
        let condition = self.parse_condition()?;
        self.consume(TokenKind::RParen)?;
        let body = Box::new(self.parse_block_as_stmt()?);

        Ok(Stmt::While { condition, body })
    }

    fn parse_for_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::For)?;
        self.consume(TokenKind::LParen)?;

        let init = if self.check(&TokenKind::Semicolon) {
            self.advance();
            None
        } else if matches!(self.current_token().kind, TokenKind::Let | TokenKind::Mut) {
            let start = self.current_token().span;
            let stmt = self.parse_let_statement(Visibility::Private)?;
            let span = start.merge(&self.previous_token().span);
            Some(Box::new(self.node(stmt, span)))
        } else {
            let start = self.current_token().span;
            let expr = self.parse_condition()?;
            self.consume(TokenKind::Semicolon)?;
            let span = start.merge(&self.previous_token().span);
            Some(Box::new(self.node(Stmt::Expression(expr), span)))
        };

        let condition = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_condition()?)
        };
        self.consume(TokenKind::Semicolon)?;

        let step = if self.check(&TokenKind::RParen) {
            None
        } else {
            Some(self.parse_condition()?)
        };
        self.consume(TokenKind::RParen)?;

        let body = Box::new(self.parse_block_as_stmt()?);

        Ok(Stmt::For {
            init,
            condition,
            step,
            body,
        })
    }

    fn parse_switch_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::Switch)?;
        self.consume(TokenKind::LParen)?;
        let scrutinee = self.parse_condition()?;
        self.consume(TokenKind::RParen)?;

        self.consume(TokenKind::LBrace)?;
        let mut cases = Vec::new();
        let mut default = None;

        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            if self.check(&TokenKind::Case) {
                self.advance();
                let value = self.parse_expression()?;
                self.consume(TokenKind::Colon)?;
                let body = self.parse_case_body()?;
                cases.push(SwitchCase { value, body });
            } else if self.check(&TokenKind::Default) {
                let token = self.advance();
                self.consume(TokenKind::Colon)?;
                if default.is_some() {
                    return Err(ParseError::new(
                        "Switch statement has more than one default case",
                        token.span,
                    ));
                }
                default = Some(self.parse_case_body()?);
            } else {
                let token = self.current_token();
                return Err(ParseError::new(
                    format!("Expected 'case' or 'default', found '{}'", token.value),
                    token.span,
                ));
            }
        }

        self.consume(TokenKind::RBrace)?;

        Ok(Stmt::Switch {
            scrutinee,
            cases,
            default,
        })
    }

    fn parse_case_body(&mut self) -> ParseResult<Vec<Node<Stmt>>> {
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::Case)
            && !self.check(&TokenKind::Default)
            && !self.check(&TokenKind::RBrace)
            && !self.is_at_end()
        {
            stmts.push(self.parse_statement()?);
        }
        Ok(stmts)
    }

    fn parse_return_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::Return)?;

        let value = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };

        self.consume(TokenKind::Semicolon)?;
        Ok(Stmt::Return(value))
    }

    fn parse_import_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::Import)?;

        let path = if self.check(&TokenKind::StringLiteral) {
            let token = self.advance();
            ImportPath::File(token.value)
        } else {
            let name = self.parse_identifier()?;
            ImportPath::Module(name.value)
        };

        self.consume(TokenKind::Semicolon)?;
        Ok(Stmt::Import(path))
    }
}
