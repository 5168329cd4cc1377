//! Declaration parsing: functions, structs, traits, impls, enums

use super::*;

impl Parser {
    pub(crate) fn parse_function_decl(&mut self) -> ParseResult<FunctionDecl> {
        self.consume(TokenKind::Func)?;
        let name = self.parse_identifier()?;
        let generics = self.parse_generics()?;
        let params = self.parse_params()?;

        let return_type = if self.check(&TokenKind::Arrow) {
            self.advance();
            Some(self.parse_type()?)
        } else {
            None
        };

        let body = self.parse_block_stmts()?;

        Ok(FunctionDecl {
            name,
            generics,
            params,
            return_type,
            body,
        })
    }

    pub(crate) fn parse_struct_decl(&mut self) -> ParseResult<StructDecl> {
        self.consume(TokenKind::Struct)?;
        let name = self.parse_identifier()?;
        let generics = self.parse_generics()?;
        self.consume(TokenKind::LBrace)?;

        let mut fields = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            let visibility = match self.current_token().kind {
                TokenKind::Public => {
                    self.advance();
                    Visibility::Public
                }
                TokenKind::Private => {
                    self.advance();
                    Visibility::Private
                }
                _ => Visibility::Private,
            };
            let field_name = self.parse_identifier()?;
            self.consume(TokenKind::Colon)?;
            let ty = self.parse_type()?;
            self.consume(TokenKind::Semicolon)?;
            fields.push(FieldDecl {
                name: field_name,
                ty,
                visibility,
            });
        }

        self.consume(TokenKind::RBrace)?;

        Ok(StructDecl {
            name,
            generics,
            fields,
        })
    }

    pub(crate) fn parse_trait_decl(&mut self) -> ParseResult<TraitDecl> {
        self.consume(TokenKind::Trait)?;
        let name = self.parse_identifier()?;
        let generics = self.parse_generics()?;
        self.consume(TokenKind::LBrace)?;

        let mut methods = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            let method_name = self.parse_identifier()?;
            let params = self.parse_params()?;
            let return_type = if self.check(&TokenKind::Arrow) {
                self.advance();
                Some(self.parse_type()?)
            } else {
                None
            };
            self.consume(TokenKind::Semicolon)?;
            methods.push(TraitMethod {
                name: method_name,
                params,
                return_type,
            });
        }

        self.consume(TokenKind::RBrace)?;

        Ok(TraitDecl {
            name,
            generics,
            methods,
        })
    }

    pub(crate) fn parse_impl_decl(&mut self) -> ParseResult<ImplDecl> {
        self.consume(TokenKind::Impl)?;
        let generics = self.parse_generics()?;

        // Either `impl Trait for Struct { ... }` or `impl Struct { ... }`
        let first = self.parse_identifier()?;
        let (struct_name, trait_name) = if self.check(&TokenKind::For) {
            self.advance();
            let struct_name = self.parse_identifier()?;
            (struct_name, Some(first))
        } else {
            (first, None)
        };

        self.consume(TokenKind::LBrace)?;

        let mut methods = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            let method_name = self.parse_identifier()?;
            let params = self.parse_params()?;
            let return_type = if self.check(&TokenKind::Arrow) {
                self.advance();
                Some(self.parse_type()?)
            } else {
                None
            };
            let body = self.parse_block_stmts()?;
            methods.push(FunctionDecl {
                name: method_name,
                generics: Vec::new(),
                params,
                return_type,
                body,
            });
        }

        self.consume(TokenKind::RBrace)?;

        Ok(ImplDecl {
            struct_name,
            trait_name,
            generics,
            methods,
        })
    }

    pub(crate) fn parse_enum_decl(&mut self) -> ParseResult<EnumDecl> {
        self.consume(TokenKind::Enum)?;
        let name = self.parse_identifier()?;
        self.consume(TokenKind::LBrace)?;

        let mut members = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            members.push(self.parse_identifier()?);
            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }

        self.consume(TokenKind::RBrace)?;

        Ok(EnumDecl { name, members })
    }

    // =========================================================================
    // Shared pieces
    // =========================================================================

    fn parse_generics(&mut self) -> ParseResult<Vec<Node<Ident>>> {
        if !self.check(&TokenKind::Lt) {
            return Ok(Vec::new());
        }
        self.advance();

        let mut generics = Vec::new();
        loop {
            generics.push(self.parse_identifier()?);
            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }
        self.consume(TokenKind::Gt)?;
        Ok(generics)
    }

    fn parse_params(&mut self) -> ParseResult<Vec<Param>> {
        self.consume(TokenKind::LParen)?;
        let mut params = Vec::new();
        while !self.check(&TokenKind::RParen) {
            let name = self.parse_identifier()?;
            self.consume(TokenKind::Colon)?;
            let ty = self.parse_type()?;
            params.push(Param { name, ty });
            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }
        self.consume(TokenKind::RParen)?;
        Ok(params)
    }
}
