use crate::{
    parser::{
        ast::{binary::Binary, expr::{parse_primary, Expr}},
        error::Error,
        token::op::UnaryOp,
        Parse,
        Parser,
        Precedence,
    },
    tokenizer::TokenKind,
};
use std::ops::Range;

/// A unary expression, such as `-x` or `n!`. Unary expressions can include nested expressions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unary {
    /// The operand of the unary expression (left or right, depending on the associativity).
    pub operand: Box<Expr>,

    /// The operator of the unary expression.
    pub op: UnaryOp,

    /// The region of the source code that this unary expression was parsed from.
    pub span: Range<usize>,
}

impl Unary {
    /// Returns the span of the unary expression.
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// Parses a prefix unary expression, or a primary expression if there is no prefix operator.
    ///
    /// The operand of a negation absorbs any exponentiation that follows it, so `-x^2` is parsed
    /// as `-(x^2)`. A leading `+` is accepted and dropped.
    pub fn parse_or_lower(input: &mut Parser<'_>) -> Result<Expr, Error> {
        match input.peek_kind() {
            Some(TokenKind::Sub) => {
                let op = UnaryOp::parse(input)?;
                let operand = Self::parse_or_lower(input)?;
                let operand = Binary::parse_expr(input, operand, op.precedence().next())?;
                let span = op.span.start..operand.span().end;
                Ok(Expr::Unary(Self { operand: Box::new(operand), op, span }))
            },
            Some(TokenKind::Add) => {
                input.next_token()?;
                let operand = Self::parse_or_lower(input)?;
                Binary::parse_expr(input, operand, Precedence::Neg.next())
            },
            _ => parse_primary(input),
        }
    }
}
