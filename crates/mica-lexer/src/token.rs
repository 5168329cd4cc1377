use mica_ast::Span;

/// The different kinds of tokens in Mica.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    // Keywords
    Struct,
    Func,
    Let,
    Mut,
    If,
    Else,
    Switch,
    Case,
    Default,
    Break,
    Fallthrough,
    Return,
    True,
    False,
    None,
    Enum,
    Import,
    Public,
    Private,
    SelfKw,
    Trait,
    Impl,
    While,
    For,

    // Literals
    IntLiteral,
    FloatLiteral,
    StringLiteral,
    CharLiteral,

    // Identifier
    Identifier,

    // Operators
    Plus,       // +
    Minus,      // -
    Star,       // *
    Slash,      // /
    Percent,    // %
    Eq,         // =
    EqEq,       // ==
    BangEq,     // !=
    Lt,         // <
    Gt,         // >
    LtEq,       // <=
    GtEq,       // >=
    AmpAmp,     // &&
    PipePipe,   // ||
    Bang,       // !
    Amp,        // &
    Pipe,       // |
    Arrow,      // ->
    ColonColon, // ::

    // Delimiters
    LParen,    // (
    RParen,    // )
    LBrace,    // {
    RBrace,    // }
    LBracket,  // [
    RBracket,  // ]
    Semicolon, // ;
    Comma,     // ,
    Dot,       // .
    Colon,     // :

    // Special
    Eof,
    Error,
}

/// A token with its kind, span, and source value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub value: String,
}

impl Token {
    pub(crate) fn new(kind: TokenKind, span: Span, value: String) -> Self {
        Self { kind, span, value }
    }
}
