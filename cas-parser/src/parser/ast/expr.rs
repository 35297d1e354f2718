use crate::{
    parser::{
        ast::{
            assign::Assign,
            binary::Binary,
            call::Call,
            index::Index,
            literal::Literal,
            paren::{Paren, Tensor},
            unary::Unary,
        },
        error::{kind, Error},
        token::op::{UnaryOp, UnaryOpKind},
        Parse,
        Parser,
        Precedence,
    },
    tokenizer::TokenKind,
};
use std::{fmt, ops::Range};

/// Represents any kind of expression.
///
/// An expression is any valid piece of code that can be evaluated to produce a value. A statement
/// is a single expression, possibly an assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// A literal value.
    Literal(Literal),

    /// A parenthesized expression, such as `(1 + 2)`.
    Paren(Paren),

    /// A tensor written as a parenthesized, comma-separated list, such as `(1, 2, 3)`.
    Tensor(Tensor),

    /// A function call, such as `sin(x)`.
    Call(Call),

    /// Tensor component access, such as `A[1, 2]`.
    Index(Index),

    /// A unary operation, such as `-x` or `n!`.
    Unary(Unary),

    /// A binary operation, such as `1 + 2`.
    Binary(Binary),

    /// An assignment of a symbol or function, such as `x = 1` or `f(x) = x^2`.
    Assign(Assign),
}

impl Expr {
    /// Returns the span of the expression.
    pub fn span(&self) -> Range<usize> {
        match self {
            Expr::Literal(literal) => literal.span(),
            Expr::Paren(paren) => paren.span(),
            Expr::Tensor(tensor) => tensor.span(),
            Expr::Call(call) => call.span(),
            Expr::Index(index) => index.span(),
            Expr::Unary(unary) => unary.span(),
            Expr::Binary(binary) => binary.span(),
            Expr::Assign(assign) => assign.span(),
        }
    }

    /// If this expression is a [`Expr::Paren`], returns the innermost expression in the
    /// parenthesized expression. Otherwise, returns `self`.
    pub fn innermost(&self) -> &Expr {
        let mut inner = self;
        while let Expr::Paren(paren) = inner {
            inner = &paren.expr;
        }
        inner
    }
}

/// Parses a primary expression: a literal, a call, or a parenthesized expression or tensor,
/// followed by any number of postfix operators (indexing and factorial).
pub(crate) fn parse_primary(input: &mut Parser<'_>) -> Result<Expr, Error> {
    let mut expr = match input.peek_kind() {
        Some(TokenKind::OpenParen) => Paren::parse_or_tensor(input)?,
        Some(TokenKind::CloseParen) => {
            let token = input.next_token()?;
            return Err(Error::new(vec![token.span], kind::UnclosedParenthesis { opening: false }));
        },
        Some(TokenKind::Name) if input.peek_kinds().nth(1) == Some(TokenKind::OpenParen) => {
            Expr::Call(Call::parse(input)?)
        },
        _ => Expr::Literal(Literal::parse(input)?),
    };

    loop {
        match input.peek_kind() {
            Some(TokenKind::OpenSquare) => {
                expr = Expr::Index(Index::parse_postfix(input, expr)?);
            },
            Some(TokenKind::Factorial) => {
                let op = UnaryOp::parse(input)?;
                let span = expr.span().start..op.span.end;
                expr = Expr::Unary(Unary { operand: Box::new(expr), op, span });
            },
            _ => return Ok(expr),
        }
    }
}

impl<'source> Parse<'source> for Expr {
    fn parse(input: &mut Parser<'source>) -> Result<Self, Error> {
        let lhs = Unary::parse_or_lower(input)?;
        let expr = Binary::parse_expr(input, lhs, Precedence::Compare)?;

        if input.peek_kind() == Some(TokenKind::Assign) {
            Ok(Expr::Assign(Assign::parse_with_target(input, expr)?))
        } else {
            Ok(expr)
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(literal) => literal.fmt(f),
            Expr::Paren(paren) => paren.fmt(f),
            Expr::Tensor(tensor) => tensor.fmt(f),
            Expr::Call(call) => call.fmt(f),
            Expr::Index(index) => index.fmt(f),
            Expr::Unary(unary) => match unary.op.kind {
                UnaryOpKind::Neg => write!(f, "-{}", unary.operand),
                UnaryOpKind::Factorial => write!(f, "{}!", unary.operand),
            },
            Expr::Binary(binary) => binary.fmt(f),
            Expr::Assign(assign) => assign.fmt(f),
        }
    }
}
