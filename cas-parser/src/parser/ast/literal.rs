use crate::{
    parser::{
        error::{kind, Error},
        token::{Float, Int, Name, Quote},
        Parse,
        Parser,
    },
    tokenizer::TokenKind,
};
use std::{fmt, ops::Range};

/// An integer literal, represented as a [`String`] so that arbitrarily large values survive
/// parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LitInt {
    /// The decimal digits of the integer literal.
    pub value: String,

    /// The region of the source code that this literal was parsed from.
    pub span: Range<usize>,
}

impl<'source> Parse<'source> for LitInt {
    fn parse(input: &mut Parser<'source>) -> Result<Self, Error> {
        let int = input.try_parse::<Int>()?;
        Ok(Self { value: int.lexeme.to_owned(), span: int.span })
    }
}

impl fmt::Display for LitInt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// A decimal literal, such as `3.14` or `1e-9`. The lexeme is kept as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LitFloat {
    /// The text of the literal.
    pub value: String,

    /// The region of the source code that this literal was parsed from.
    pub span: Range<usize>,
}

impl<'source> Parse<'source> for LitFloat {
    fn parse(input: &mut Parser<'source>) -> Result<Self, Error> {
        let float = input.try_parse::<Float>()?;
        Ok(Self { value: float.lexeme.to_owned(), span: float.span })
    }
}

impl fmt::Display for LitFloat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// A symbol / identifier literal, such as `x`, `pi`, or `arctan`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LitSym {
    /// The name of the symbol.
    pub name: String,

    /// The region of the source code that this literal was parsed from.
    pub span: Range<usize>,
}

impl<'source> Parse<'source> for LitSym {
    fn parse(input: &mut Parser<'source>) -> Result<Self, Error> {
        let name = input.try_parse::<Name>()?;
        Ok(Self { name: name.lexeme.to_owned(), span: name.span })
    }
}

impl fmt::Display for LitSym {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A string literal, such as `"hello"`. The quotes are not part of the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LitStr {
    /// The contents of the string.
    pub value: String,

    /// The region of the source code that this literal was parsed from.
    pub span: Range<usize>,
}

impl<'source> Parse<'source> for LitStr {
    fn parse(input: &mut Parser<'source>) -> Result<Self, Error> {
        let quote = input.try_parse::<Quote>()?;
        let value = quote.lexeme[1..quote.lexeme.len() - 1].to_owned();
        Ok(Self { value, span: quote.span })
    }
}

impl fmt::Display for LitStr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "\"{}\"", self.value)
    }
}

/// Represents a literal value.
///
/// A literal is any value that is written directly into the source code, such as the number `1`
/// or the symbol `x`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    /// An integer literal, such as `2` or `123456789012345678901234567890`.
    Integer(LitInt),

    /// A decimal literal, such as `2.5`.
    Float(LitFloat),

    /// A symbol, such as `x`.
    Symbol(LitSym),

    /// A string, such as `"abc"`.
    Str(LitStr),
}

impl Literal {
    /// Returns the span of the literal.
    pub fn span(&self) -> Range<usize> {
        match self {
            Literal::Integer(int) => int.span.clone(),
            Literal::Float(float) => float.span.clone(),
            Literal::Symbol(sym) => sym.span.clone(),
            Literal::Str(s) => s.span.clone(),
        }
    }
}

impl<'source> Parse<'source> for Literal {
    fn parse(input: &mut Parser<'source>) -> Result<Self, Error> {
        match input.peek_kind() {
            Some(TokenKind::Int) => input.try_parse().map(Literal::Integer),
            Some(TokenKind::Float) => input.try_parse().map(Literal::Float),
            Some(TokenKind::Quote) => input.try_parse().map(Literal::Str),
            Some(TokenKind::Name) => input.try_parse().map(Literal::Symbol),
            _ => {
                let token = input.next_token()?;
                Err(Error::new(vec![token.span], kind::UnexpectedToken {
                    expected: &[TokenKind::Int, TokenKind::Float, TokenKind::Quote, TokenKind::Name],
                    found: token.kind,
                }))
            },
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Literal::Integer(int) => int.fmt(f),
            Literal::Float(float) => float.fmt(f),
            Literal::Symbol(sym) => sym.fmt(f),
            Literal::Str(s) => s.fmt(f),
        }
    }
}
