//! Expression parsing
//!
//! Precedence climbing, lowest first: assignment, logical or, logical and,
//! equality, comparison, term, factor, unary, postfix, primary.

use super::*;

impl Parser {
    pub(crate) fn parse_expression(&mut self) -> ParseResult<Node<Expr>> {
        self.parse_assignment()
    }

    /// Parses an expression with struct literals disabled, for positions
    /// where `ident {` must start a block instead (`if`, `while`, `switch`
    /// and `for` headers).
    pub(crate) fn parse_condition(&mut self) -> ParseResult<Node<Expr>> {
        let saved = self.struct_literal_ok;
        self.struct_literal_ok = false;
        let result = self.parse_expression();
        self.struct_literal_ok = saved;
        result
    }

    fn parse_assignment(&mut self) -> ParseResult<Node<Expr>> {
        let left = self.parse_or()?;

        if !self.check(&TokenKind::Eq) {
            return Ok(left);
        }
        let eq_span = self.advance().span;
        // Right-associative
        let value = Box::new(self.parse_assignment()?);
        let span = left.span.merge(&value.span);

        match left.value {
            Expr::Variable(ident) => {
                let name = self.node(ident, left.span);
                Ok(self.node(Expr::Assign { name, value }, span))
            }
            Expr::Get { object, field } => {
                Ok(self.node(Expr::Set { object, field, value }, span))
            }
            _ => Err(ParseError::new("Invalid assignment target", eq_span)),
        }
    }

    fn parse_or(&mut self) -> ParseResult<Node<Expr>> {
        let mut left = self.parse_and()?;
        while self.check(&TokenKind::PipePipe) {
            self.advance();
            let right = self.parse_and()?;
            left = self.binary(left, BinaryOp::Or, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> ParseResult<Node<Expr>> {
        let mut left = self.parse_equality()?;
        while self.check(&TokenKind::AmpAmp) {
            self.advance();
            let right = self.parse_equality()?;
            left = self.binary(left, BinaryOp::And, right);
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> ParseResult<Node<Expr>> {
        let mut left = self.parse_comparison()?;
        loop {
            let op = match self.current_token().kind {
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::BangEq => BinaryOp::NotEq,
                _ => break,
            };
            self.advance();
            let right = self.parse_comparison()?;
            left = self.binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> ParseResult<Node<Expr>> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.current_token().kind {
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::LtEq => BinaryOp::LtEq,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::GtEq => BinaryOp::GtEq,
                _ => break,
            };
            self.advance();
            let right = self.parse_term()?;
            left = self.binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> ParseResult<Node<Expr>> {
        let mut left = self.parse_factor()?;
        loop {
            let op = match self.current_token().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_factor()?;
            left = self.binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_factor(&mut self) -> ParseResult<Node<Expr>> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.current_token().kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Rem,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = self.binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> ParseResult<Node<Expr>> {
        let start = self.current_token().span;

        let op = match self.current_token().kind {
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Star => Some(UnaryOp::Deref),
            TokenKind::Amp => {
                self.advance();
                let mutable = if self.check(&TokenKind::Mut) {
                    self.advance();
                    true
                } else {
                    false
                };
                let expr = Box::new(self.parse_unary()?);
                let span = start.merge(&self.previous_token().span);
                return Ok(self.node(Expr::Borrow { expr, mutable }, span));
            }
            _ => None,
        };

        if let Some(op) = op {
            self.advance();
            let operand = Box::new(self.parse_unary()?);
            let span = start.merge(&self.previous_token().span);
            return Ok(self.node(Expr::Unary { op, operand }, span));
        }

        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> ParseResult<Node<Expr>> {
        let mut expr = self.parse_primary()?;

        loop {
            match self.current_token().kind {
                TokenKind::LParen => {
                    expr = self.finish_call(expr, Vec::new())?;
                }
                TokenKind::Dot => {
                    self.advance();
                    let field = self.parse_identifier()?;
                    let span = expr.span.merge(&field.span);
                    expr = self.node(
                        Expr::Get {
                            object: Box::new(expr),
                            field,
                        },
                        span,
                    );
                }
                TokenKind::ColonColon => {
                    self.advance();
                    if self.check(&TokenKind::Lt) {
                        // Turbofish: callee::<T, ...>(args)
                        self.advance();
                        let mut generic_args = Vec::new();
                        loop {
                            generic_args.push(self.parse_type()?);
                            if !self.check(&TokenKind::Comma) {
                                break;
                            }
                            self.advance();
                        }
                        self.consume(TokenKind::Gt)?;
                        expr = self.finish_call(expr, generic_args)?;
                    } else {
                        // Enum member access, e.g. Color::Red
                        let field = self.parse_identifier()?;
                        let span = expr.span.merge(&field.span);
                        expr = self.node(
                            Expr::Get {
                                object: Box::new(expr),
                                field,
                            },
                            span,
                        );
                    }
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    fn finish_call(
        &mut self,
        callee: Node<Expr>,
        generic_args: Vec<Node<TypeExpr>>,
    ) -> ParseResult<Node<Expr>> {
        self.consume(TokenKind::LParen)?;
        let mut args = Vec::new();
        // Arguments may themselves contain struct literals even when the
        // call appears in a condition header.
        let saved = self.struct_literal_ok;
        self.struct_literal_ok = true;
        while !self.check(&TokenKind::RParen) {
            match self.parse_expression() {
                Ok(arg) => args.push(arg),
                Err(e) => {
                    self.struct_literal_ok = saved;
                    return Err(e);
                }
            }
            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }
        self.struct_literal_ok = saved;
        self.consume(TokenKind::RParen)?;

        let span = callee.span.merge(&self.previous_token().span);
        Ok(self.node(
            Expr::Call {
                callee: Box::new(callee),
                generic_args,
                args,
            },
            span,
        ))
    }

    fn parse_primary(&mut self) -> ParseResult<Node<Expr>> {
        let start = self.current_token().span;

        match self.current_token().kind {
            TokenKind::IntLiteral => {
                let token = self.advance();
                let n = token.value.parse::<i64>().map_err(|_| {
                    ParseError::new(
                        format!("Integer literal '{}' out of range", token.value),
                        token.span,
                    )
                })?;
                Ok(self.node(Expr::Literal(Literal::Int(n)), token.span))
            }
            TokenKind::FloatLiteral => {
                let token = self.advance();
                let f = token.value.parse::<f64>().map_err(|_| {
                    ParseError::new(
                        format!("Invalid float literal '{}'", token.value),
                        token.span,
                    )
                })?;
                Ok(self.node(Expr::Literal(Literal::Float(f)), token.span))
            }
            TokenKind::StringLiteral => {
                let token = self.advance();
                Ok(self.node(Expr::Literal(Literal::Str(token.value)), token.span))
            }
            TokenKind::CharLiteral => {
                let token = self.advance();
                let ch = token.value.chars().next().unwrap_or('\0');
                Ok(self.node(Expr::Literal(Literal::Char(ch)), token.span))
            }
            TokenKind::True => {
                let token = self.advance();
                Ok(self.node(Expr::Literal(Literal::Bool(true)), token.span))
            }
            TokenKind::False => {
                let token = self.advance();
                Ok(self.node(Expr::Literal(Literal::Bool(false)), token.span))
            }
            TokenKind::None => {
                let token = self.advance();
                Ok(self.node(Expr::Literal(Literal::None), token.span))
            }
            TokenKind::SelfKw => {
                let token = self.advance();
                Ok(self.node(Expr::SelfExpr, token.span))
            }
            TokenKind::Identifier => {
                let name = self.parse_identifier()?;
                if self.struct_literal_ok && self.check(&TokenKind::LBrace) {
                    self.parse_struct_init(name)
                } else {
                    let span = name.span;
                    Ok(self.node(Expr::Variable(name.value), span))
                }
            }
            TokenKind::LParen => {
                self.advance();
                let saved = self.struct_literal_ok;
                self.struct_literal_ok = true;
                let expr = self.parse_expression();
                self.struct_literal_ok = saved;
                let expr = expr?;
                self.consume(TokenKind::RParen)?;
                Ok(expr)
            }
            TokenKind::LBracket => {
                self.advance();
                let mut elements = Vec::new();
                while !self.check(&TokenKind::RBracket) {
                    elements.push(self.parse_expression()?);
                    if !self.check(&TokenKind::Comma) {
                        break;
                    }
                    self.advance();
                }
                self.consume(TokenKind::RBracket)?;
                let span = start.merge(&self.previous_token().span);
                Ok(self.node(Expr::Array(elements), span))
            }
            TokenKind::Pipe | TokenKind::PipePipe => self.parse_lambda(),
            _ => {
                let token = self.current_token();
                Err(ParseError::new(
                    format!("Expected expression, found '{}'", token.value),
                    token.span,
                ))
            }
        }
    }

    fn parse_struct_init(&mut self, name: Node<Ident>) -> ParseResult<Node<Expr>> {
        let start = name.span;
        self.consume(TokenKind::LBrace)?;

        let mut fields = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            let field_name = self.parse_identifier()?;
            self.consume(TokenKind::Colon)?;
            let value = self.parse_expression()?;
            fields.push(FieldInit {
                name: field_name,
                value,
            });
            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }
        self.consume(TokenKind::RBrace)?;

        let span = start.merge(&self.previous_token().span);
        Ok(self.node(Expr::StructInit { name, fields }, span))
    }

    fn parse_lambda(&mut self) -> ParseResult<Node<Expr>> {
        let start = self.current_token().span;

        let params = if self.check(&TokenKind::PipePipe) {
            // `||` lexes as a single token when the parameter list is empty
            self.advance();
            Vec::new()
        } else {
            self.consume(TokenKind::Pipe)?;
            let mut params = Vec::new();
            while !self.check(&TokenKind::Pipe) {
                let name = self.parse_identifier()?;
                self.consume(TokenKind::Colon)?;
                let ty = self.parse_type()?;
                params.push(Param { name, ty });
                if !self.check(&TokenKind::Comma) {
                    break;
                }
                self.advance();
            }
            self.consume(TokenKind::Pipe)?;
            params
        };

        let return_type = if self.check(&TokenKind::Arrow) {
            self.advance();
            Some(Box::new(self.parse_type()?))
        } else {
            None
        };

        let body = self.parse_block_stmts()?;
        let span = start.merge(&self.previous_token().span);
        Ok(self.node(
            Expr::Lambda {
                params,
                return_type,
                body,
            },
            span,
        ))
    }

    fn binary(&mut self, left: Node<Expr>, op: BinaryOp, right: Node<Expr>) -> Node<Expr> {
        let span = left.span.merge(&right.span);
        self.node(
            Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            },
            span,
        )
    }
}
