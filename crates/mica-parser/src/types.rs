//! Type annotation parsing

use super::*;

impl Parser {
    pub(crate) fn parse_type(&mut self) -> ParseResult<Node<TypeExpr>> {
        let start = self.current_token().span;

        let ty = match self.current_token().kind {
            TokenKind::Amp => {
                self.advance();
                let mutable = if self.check(&TokenKind::Mut) {
                    self.advance();
                    true
                } else {
                    false
                };
                let inner = Box::new(self.parse_type()?);
                TypeExpr::Borrow { inner, mutable }
            }
            TokenKind::LBracket => {
                self.advance();
                let elem = Box::new(self.parse_type()?);
                let size = if self.check(&TokenKind::Semicolon) {
                    self.advance();
                    let token = self.consume(TokenKind::IntLiteral)?;
                    let n = token.value.parse::<u64>().map_err(|_| {
                        ParseError::new(
                            format!("Invalid array size '{}'", token.value),
                            token.span,
                        )
                    })?;
                    Some(n)
                } else {
                    None
                };
                self.consume(TokenKind::RBracket)?;
                TypeExpr::Array { elem, size }
            }
            TokenKind::Func => {
                self.advance();
                self.consume(TokenKind::LParen)?;
                let mut params = Vec::new();
                while !self.check(&TokenKind::RParen) {
                    params.push(self.parse_type()?);
                    if !self.check(&TokenKind::Comma) {
                        break;
                    }
                    self.advance();
                }
                self.consume(TokenKind::RParen)?;
                self.consume(TokenKind::Arrow)?;
                let return_type = Box::new(self.parse_type()?);
                TypeExpr::Function {
                    params,
                    return_type,
                }
            }
            TokenKind::Identifier => {
                let name = self.parse_identifier()?;
                if self.check(&TokenKind::Lt) {
                    self.advance();
                    let mut args = Vec::new();
                    loop {
                        args.push(self.parse_type()?);
                        if !self.check(&TokenKind::Comma) {
                            break;
                        }
                        self.advance();
                    }
                    self.consume(TokenKind::Gt)?;

                    // Option and Result have dedicated shapes; everything
                    // else stays a generic application.
                    match (name.value.name.as_str(), args.len()) {
                        ("Option", 1) => {
                            let inner = args.into_iter().next().unwrap();
                            TypeExpr::Option(Box::new(inner))
                        }
                        ("Result", 2) => {
                            let mut it = args.into_iter();
                            let ok = Box::new(it.next().unwrap());
                            let err = Box::new(it.next().unwrap());
                            TypeExpr::Result { ok, err }
                        }
                        _ => TypeExpr::Generic { base: name, args },
                    }
                } else {
                    TypeExpr::Named(name.value)
                }
            }
            _ => {
                let token = self.current_token();
                return Err(ParseError::new(
                    format!("Expected type, found '{}'", token.value),
                    token.span,
                ));
            }
        };

        let span = start.merge(&self.previous_token().span);
        Ok(self.node(ty, span))
    }
}
