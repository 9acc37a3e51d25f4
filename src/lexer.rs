use logos::Logos;
use std::fmt;

use crate::Span;

#[derive(Logos, Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\n\r]+")] // Skip whitespace
pub enum TokenKind {
    // Synthesised by `Lexer`, never matched directly
    Illegal,
    Eof,

    #[regex(r"[\p{L}_]+")]
    Ident,
    #[regex(r"[0-9]+")]
    Int,
    // No escapes; an unterminated string runs to the end of input
    #[regex(r#""[^"]*"?"#)]
    String,

    #[token("=")]
    Assign,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("!")]
    Bang,
    #[token("*")]
    Asterisk,
    #[token("/")]
    Slash,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("==")]
    Eq,
    #[token("!=")]
    NotEq,

    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,

    #[token("fn")]
    Function,
    #[token("let")]
    Let,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("return")]
    Return,
}

impl TokenKind {
    pub const KEYWORDS: [&'static str; 7] = ["fn", "let", "true", "false", "if", "else", "return"];
}

// These names show up verbatim in parser error messages
impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Illegal => "ILLEGAL",
            TokenKind::Eof => "EOF",
            TokenKind::Ident => "IDENT",
            TokenKind::Int => "INT",
            TokenKind::String => "STRING",
            TokenKind::Assign => "=",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Bang => "!",
            TokenKind::Asterisk => "*",
            TokenKind::Slash => "/",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::Eq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::Colon => ":",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Function => "FUNCTION",
            TokenKind::Let => "LET",
            TokenKind::True => "TRUE",
            TokenKind::False => "FALSE",
            TokenKind::If => "IF",
            TokenKind::Else => "ELSE",
            TokenKind::Return => "RETURN",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>, span: Span) -> Self {
        Token {
            kind,
            literal: literal.into(),
            span,
        }
    }
}

/// Lazy token source over a piece of program text.
///
/// Once the input is exhausted every call to [`Lexer::next_token`] yields an
/// `Eof` token.
pub struct Lexer<'src> {
    inner: logos::Lexer<'src, TokenKind>,
    finished: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(input: &'src str) -> Self {
        Lexer {
            inner: TokenKind::lexer(input),
            finished: false,
        }
    }

    pub fn next_token(&mut self) -> Token {
        if self.finished {
            return self.eof();
        }
        match self.inner.next() {
            Some(Ok(kind)) => {
                let slice = self.inner.slice();
                let literal = match kind {
                    TokenKind::String => string_contents(slice),
                    _ => slice,
                };
                Token::new(kind, literal, self.inner.span().into())
            }
            Some(Err(())) => Token::new(
                TokenKind::Illegal,
                self.illegal_literal(),
                self.inner.span().into(),
            ),
            None => {
                self.finished = true;
                self.eof()
            }
        }
    }

    fn eof(&self) -> Token {
        let end = self.inner.source().len();
        Token::new(TokenKind::Eof, "", Span::new(end, end))
    }

    fn illegal_literal(&self) -> String {
        let source = self.inner.source();
        let span = self.inner.span();
        match source.get(span.clone()) {
            Some(slice) => slice.to_string(),
            None => source[span.start..]
                .chars()
                .next()
                .map(String::from)
                .unwrap_or_default(),
        }
    }
}

// Iterating stops in front of `Eof` instead of repeating it.
impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let token = self.next_token();
        (token.kind != TokenKind::Eof).then_some(token)
    }
}

fn string_contents(slice: &str) -> &str {
    let inner = slice.strip_prefix('"').unwrap_or(slice);
    inner.strip_suffix('"').unwrap_or(inner)
}

// Helper function to tokenize a string directly (useful for tests, benches and the REPL)
pub fn tokenize(input: &str) -> Vec<Token> {
    Lexer::new(input).collect()
}
