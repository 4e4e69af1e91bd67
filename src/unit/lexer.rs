//! Lexer for unit expressions
//!
//! Tokenizes strings such as `erg/(cm**2*s)` using the Logos library.

use std::ops::Range;

use logos::Logos;

use crate::error::{Result, UnitError};

/// Token kinds recognized in unit expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Logos)]
#[logos(skip r"[ \t\r\n]+")]
pub enum UnitToken {
    // Operators
    #[token("**")]
    #[token("^")]
    Pow,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,

    // Delimiters
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,

    // Literals: 2, 0.5, 1.
    #[regex(r"[0-9]+(\.[0-9]*)?")]
    Number,

    // Atomic unit symbols
    #[regex(r"[a-zA-Z_µμ][a-zA-Z0-9_µμ]*")]
    Symbol,
}

impl UnitToken {
    /// Human-readable description for diagnostics
    pub fn describe(self) -> &'static str {
        match self {
            UnitToken::Pow => "`**`",
            UnitToken::Star => "`*`",
            UnitToken::Slash => "`/`",
            UnitToken::Plus => "`+`",
            UnitToken::Minus => "`-`",
            UnitToken::LParen => "`(`",
            UnitToken::RParen => "`)`",
            UnitToken::Number => "number",
            UnitToken::Symbol => "unit symbol",
        }
    }
}

/// A token with its byte span in the source expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: UnitToken,
    pub span: Range<usize>,
}

/// Lex a unit expression into tokens
pub fn lex(source: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut lexer = UnitToken::lexer(source);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(kind) => tokens.push(Token { kind, span }),
            Err(_) => {
                return Err(UnitError::parse(
                    source,
                    format!("unexpected character {:?}", &source[span.clone()]),
                    span,
                ));
            }
        }
    }

    Ok(tokens)
}
