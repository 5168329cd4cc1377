use crate::token::{Token, TokenKind};
use mica_ast::Span;

/// The lexer/tokenizer for Mica.
pub struct Lexer<'a> {
    source: &'a str,
    chars: std::str::CharIndices<'a>,
    current_pos: usize,
    current_char: Option<char>,
    line: u32,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer from source code.
    pub fn new(source: &'a str) -> Self {
        let mut chars = source.char_indices();
        let current_char = chars.next().map(|(_, c)| c);
        Self {
            source,
            chars,
            current_pos: 0,
            current_char,
            line: 1,
        }
    }

    /// Tokenizes the entire source code and returns all tokens.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }

    /// Gets the next token from the source.
    pub fn next_token(&mut self) -> Token {
        if let Some(error_token) = self.skip_whitespace_and_comments() {
            return error_token;
        }

        let start = self.current_pos;
        let line = self.line;

        match self.current_char {
            None => Token::new(TokenKind::Eof, Span::new(start, start, line), String::new()),
            Some(ch) => match ch {
                '"' => self.read_string_literal(),
                '\'' => self.read_char_literal(),
                '0'..='9' => self.read_number(),
                'a'..='z' | 'A'..='Z' | '_' => self.read_identifier_or_keyword(),

                '+' => self.single(TokenKind::Plus, "+"),
                '-' => {
                    self.advance();
                    if self.current_char == Some('>') {
                        self.advance();
                        self.token_at(start, line, TokenKind::Arrow, "->")
                    } else {
                        self.token_at(start, line, TokenKind::Minus, "-")
                    }
                }
                '*' => self.single(TokenKind::Star, "*"),
                '/' => self.single(TokenKind::Slash, "/"),
                '%' => self.single(TokenKind::Percent, "%"),
                '=' => {
                    self.advance();
                    if self.current_char == Some('=') {
                        self.advance();
                        self.token_at(start, line, TokenKind::EqEq, "==")
                    } else {
                        self.token_at(start, line, TokenKind::Eq, "=")
                    }
                }
                '!' => {
                    self.advance();
                    if self.current_char == Some('=') {
                        self.advance();
                        self.token_at(start, line, TokenKind::BangEq, "!=")
                    } else {
                        self.token_at(start, line, TokenKind::Bang, "!")
                    }
                }
                '<' => {
                    self.advance();
                    if self.current_char == Some('=') {
                        self.advance();
                        self.token_at(start, line, TokenKind::LtEq, "<=")
                    } else {
                        self.token_at(start, line, TokenKind::Lt, "<")
                    }
                }
                '>' => {
                    self.advance();
                    if self.current_char == Some('=') {
                        self.advance();
                        self.token_at(start, line, TokenKind::GtEq, ">=")
                    } else {
                        self.token_at(start, line, TokenKind::Gt, ">")
                    }
                }
                '&' => {
                    self.advance();
                    if self.current_char == Some('&') {
                        self.advance();
                        self.token_at(start, line, TokenKind::AmpAmp, "&&")
                    } else {
                        self.token_at(start, line, TokenKind::Amp, "&")
                    }
                }
                '|' => {
                    self.advance();
                    if self.current_char == Some('|') {
                        self.advance();
                        self.token_at(start, line, TokenKind::PipePipe, "||")
                    } else {
                        self.token_at(start, line, TokenKind::Pipe, "|")
                    }
                }
                ':' => {
                    self.advance();
                    if self.current_char == Some(':') {
                        self.advance();
                        self.token_at(start, line, TokenKind::ColonColon, "::")
                    } else {
                        self.token_at(start, line, TokenKind::Colon, ":")
                    }
                }

                '(' => self.single(TokenKind::LParen, "("),
                ')' => self.single(TokenKind::RParen, ")"),
                '{' => self.single(TokenKind::LBrace, "{"),
                '}' => self.single(TokenKind::RBrace, "}"),
                '[' => self.single(TokenKind::LBracket, "["),
                ']' => self.single(TokenKind::RBracket, "]"),
                ';' => self.single(TokenKind::Semicolon, ";"),
                ',' => self.single(TokenKind::Comma, ","),
                '.' => self.single(TokenKind::Dot, "."),

                _ => {
                    self.advance();
                    Token::new(
                        TokenKind::Error,
                        Span::new(start, self.current_pos, line),
                        format!("Unexpected character: {}", ch),
                    )
                }
            },
        }
    }

    // Helper methods

    fn advance(&mut self) {
        if self.current_char == Some('\n') {
            self.line += 1;
        }
        if let Some((pos, ch)) = self.chars.next() {
            self.current_pos = pos;
            self.current_char = Some(ch);
        } else {
            self.current_pos = self.source.len();
            self.current_char = None;
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.clone().next().map(|(_, c)| c)
    }

    fn single(&mut self, kind: TokenKind, text: &str) -> Token {
        let start = self.current_pos;
        let line = self.line;
        self.advance();
        self.token_at(start, line, kind, text)
    }

    fn token_at(&self, start: usize, line: u32, kind: TokenKind, text: &str) -> Token {
        Token::new(kind, Span::new(start, self.current_pos, line), text.to_string())
    }

    fn skip_whitespace_and_comments(&mut self) -> Option<Token> {
        loop {
            match self.current_char {
                Some(ch) if ch.is_whitespace() => {
                    self.advance();
                }
                Some('/') => {
                    if self.peek() == Some('/') {
                        self.skip_single_line_comment();
                    } else if self.peek() == Some('*') {
                        let start = self.current_pos;
                        let line = self.line;
                        if !self.skip_multi_line_comment() {
                            return Some(Token::new(
                                TokenKind::Error,
                                Span::new(start, self.current_pos, line),
                                "Unterminated multi-line comment".to_string(),
                            ));
                        }
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
        None
    }

    fn skip_single_line_comment(&mut self) {
        // Skip //
        self.advance();
        self.advance();

        while let Some(ch) = self.current_char {
            if ch == '\n' {
                self.advance();
                break;
            }
            self.advance();
        }
    }

    fn skip_multi_line_comment(&mut self) -> bool {
        // Skip /*
        self.advance();
        self.advance();

        while let Some(ch) = self.current_char {
            if ch == '*' && self.peek() == Some('/') {
                self.advance(); // *
                self.advance(); // /
                return true;
            }
            self.advance();
        }
        false // Unterminated
    }

    fn read_string_literal(&mut self) -> Token {
        let start = self.current_pos;
        let line = self.line;
        self.advance(); // Skip opening quote

        let mut value = String::new();

        while let Some(ch) = self.current_char {
            if ch == '"' {
                self.advance(); // Skip closing quote
                return Token::new(
                    TokenKind::StringLiteral,
                    Span::new(start, self.current_pos, line),
                    value,
                );
            } else if ch == '\\' {
                self.advance();
                if let Some(escaped) = self.current_char {
                    value.push(Self::unescape(escaped));
                    self.advance();
                }
            } else {
                value.push(ch);
                self.advance();
            }
        }

        Token::new(
            TokenKind::Error,
            Span::new(start, self.current_pos, line),
            "Unterminated string literal".to_string(),
        )
    }

    fn read_char_literal(&mut self) -> Token {
        let start = self.current_pos;
        let line = self.line;
        self.advance(); // Skip opening quote

        let ch = match self.current_char {
            Some('\\') => {
                self.advance();
                match self.current_char {
                    Some(escaped) => {
                        self.advance();
                        Self::unescape(escaped)
                    }
                    None => {
                        return Token::new(
                            TokenKind::Error,
                            Span::new(start, self.current_pos, line),
                            "Unterminated character literal".to_string(),
                        );
                    }
                }
            }
            Some(c) if c != '\'' => {
                self.advance();
                c
            }
            _ => {
                return Token::new(
                    TokenKind::Error,
                    Span::new(start, self.current_pos, line),
                    "Empty character literal".to_string(),
                );
            }
        };

        if self.current_char != Some('\'') {
            return Token::new(
                TokenKind::Error,
                Span::new(start, self.current_pos, line),
                "Unterminated character literal".to_string(),
            );
        }
        self.advance(); // Skip closing quote

        Token::new(
            TokenKind::CharLiteral,
            Span::new(start, self.current_pos, line),
            ch.to_string(),
        )
    }

    fn unescape(ch: char) -> char {
        match ch {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '0' => '\0',
            other => other,
        }
    }

    fn read_number(&mut self) -> Token {
        let start = self.current_pos;
        let line = self.line;

        while matches!(self.current_char, Some('0'..='9')) {
            self.advance();
        }

        // A '.' only belongs to the number if a digit follows; otherwise it
        // is a field access on an integer-valued expression.
        let mut is_float = false;
        if self.current_char == Some('.') && matches!(self.peek(), Some('0'..='9')) {
            is_float = true;
            self.advance(); // .
            while matches!(self.current_char, Some('0'..='9')) {
                self.advance();
            }
        }

        let text = &self.source[start..self.current_pos];
        let kind = if is_float {
            TokenKind::FloatLiteral
        } else {
            TokenKind::IntLiteral
        };
        Token::new(kind, Span::new(start, self.current_pos, line), text.to_string())
    }

    fn read_identifier_or_keyword(&mut self) -> Token {
        let start = self.current_pos;
        let line = self.line;

        while matches!(self.current_char, Some(c) if c.is_alphanumeric() || c == '_') {
            self.advance();
        }

        let text = &self.source[start..self.current_pos];
        let kind = Self::keyword_kind(text).unwrap_or(TokenKind::Identifier);
        Token::new(kind, Span::new(start, self.current_pos, line), text.to_string())
    }

    fn keyword_kind(text: &str) -> Option<TokenKind> {
        let kind = match text {
            "struct" => TokenKind::Struct,
            "func" => TokenKind::Func,
            "let" => TokenKind::Let,
            "mut" => TokenKind::Mut,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "switch" => TokenKind::Switch,
            "case" => TokenKind::Case,
            "default" => TokenKind::Default,
            "break" => TokenKind::Break,
            "fallthrough" => TokenKind::Fallthrough,
            "return" => TokenKind::Return,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "none" => TokenKind::None,
            "enum" => TokenKind::Enum,
            "import" => TokenKind::Import,
            "public" => TokenKind::Public,
            "private" => TokenKind::Private,
            "self" => TokenKind::SelfKw,
            "trait" => TokenKind::Trait,
            "impl" => TokenKind::Impl,
            "while" => TokenKind::While,
            "for" => TokenKind::For,
            _ => return None,
        };
        Some(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source).tokenize().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            kinds("let mut x"),
            vec![TokenKind::Let, TokenKind::Mut, TokenKind::Identifier, TokenKind::Eof]
        );
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("== != <= >= && || -> ::"),
            vec![
                TokenKind::EqEq,
                TokenKind::BangEq,
                TokenKind::LtEq,
                TokenKind::GtEq,
                TokenKind::AmpAmp,
                TokenKind::PipePipe,
                TokenKind::Arrow,
                TokenKind::ColonColon,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_borrow_tokens() {
        assert_eq!(
            kinds("&a &mut a"),
            vec![
                TokenKind::Amp,
                TokenKind::Identifier,
                TokenKind::Amp,
                TokenKind::Mut,
                TokenKind::Identifier,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_number_literals() {
        let tokens = Lexer::new("42 3.25").tokenize();
        assert_eq!(tokens[0].kind, TokenKind::IntLiteral);
        assert_eq!(tokens[0].value, "42");
        assert_eq!(tokens[1].kind, TokenKind::FloatLiteral);
        assert_eq!(tokens[1].value, "3.25");
    }

    #[test]
    fn test_int_followed_by_dot_is_not_float() {
        let tokens = Lexer::new("1.x").tokenize();
        assert_eq!(tokens[0].kind, TokenKind::IntLiteral);
        assert_eq!(tokens[1].kind, TokenKind::Dot);
        assert_eq!(tokens[2].kind, TokenKind::Identifier);
    }

    #[test]
    fn test_string_literal_with_escapes() {
        let tokens = Lexer::new(r#""a\nb""#).tokenize();
        assert_eq!(tokens[0].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[0].value, "a\nb");
    }

    #[test]
    fn test_char_literal() {
        let tokens = Lexer::new("'x' '\\n'").tokenize();
        assert_eq!(tokens[0].kind, TokenKind::CharLiteral);
        assert_eq!(tokens[0].value, "x");
        assert_eq!(tokens[1].kind, TokenKind::CharLiteral);
        assert_eq!(tokens[1].value, "\n");
    }

    #[test]
    fn test_line_tracking() {
        let tokens = Lexer::new("let a = 1;\nlet b = 2;").tokenize();
        let b_token = tokens.iter().find(|t| t.value == "b").unwrap();
        assert_eq!(b_token.span.line, 2);
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            kinds("// comment\nlet /* block */ x"),
            vec![TokenKind::Let, TokenKind::Identifier, TokenKind::Eof]
        );
    }

    #[test]
    fn test_unterminated_block_comment() {
        let tokens = Lexer::new("/* nope").tokenize();
        assert_eq!(tokens[0].kind, TokenKind::Error);
    }

    #[test]
    fn test_unexpected_character() {
        let tokens = Lexer::new("let #").tokenize();
        assert_eq!(tokens[1].kind, TokenKind::Error);
    }
}
