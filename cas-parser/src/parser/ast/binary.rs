use crate::parser::{
    ast::{expr::Expr, unary::Unary},
    error::Error,
    token::op::{BinOp, BinOpKind},
    Associativity,
    Parser,
    Precedence,
};
use std::{fmt, ops::Range};

/// A binary expression, such as `1 + 2`. Binary expressions can include nested expressions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binary {
    /// The left-hand side of the binary expression.
    pub lhs: Box<Expr>,

    /// The operator of the binary expression.
    pub op: BinOp,

    /// The right-hand side of the binary expression.
    pub rhs: Box<Expr>,

    /// The region of the source code that this binary expression was parsed from.
    pub span: Range<usize>,
}

impl Binary {
    /// Returns the span of the binary expression.
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// Looks ahead for the operator following `lhs`, without consuming it.
    ///
    /// If there is no explicit operator, but the next token can begin a primary expression, the
    /// operator is an implicit multiplication, as in `2x` or `2 (x + 1)`.
    fn peek_op(input: &Parser<'_>, lhs: &Expr) -> Option<BinOp> {
        let token = input.peek_token()?;
        match BinOpKind::from_token(token.kind) {
            Some(kind) => Some(BinOp { kind, implicit: false, span: token.span.clone() }),
            None if token.kind.starts_primary() => Some(BinOp {
                kind: BinOpKind::Mul,
                implicit: true,
                span: lhs.span().end..token.span.start,
            }),
            None => None,
        }
    }

    /// Parses the rest of a binary expression whose left-hand side has already been parsed,
    /// consuming every operator whose precedence is at least `min`.
    ///
    /// This is precedence climbing: the right-hand side of each operator is itself extended with
    /// any operators that bind more tightly, so `1 + 2 * 3` becomes `1 + (2 * 3)`, while
    /// left-associative operators of equal precedence are left to the enclosing loop, so `1 - 2 -
    /// 3` becomes `(1 - 2) - 3`.
    pub fn parse_expr(input: &mut Parser<'_>, mut lhs: Expr, min: Precedence) -> Result<Expr, Error> {
        while let Some(op) = Self::peek_op(input, &lhs) {
            if op.precedence() < min {
                break;
            }
            if !op.implicit {
                input.next_token()?;
            }

            let rhs_min = match op.associativity() {
                Associativity::Left => op.precedence().next(),
                Associativity::Right => op.precedence(),
            };
            let rhs = Unary::parse_or_lower(input)?;
            let rhs = Self::parse_expr(input, rhs, rhs_min)?;

            let span = lhs.span().start..rhs.span().end;
            lhs = Expr::Binary(Binary {
                lhs: Box::new(lhs),
                op,
                rhs: Box::new(rhs),
                span,
            });
        }

        Ok(lhs)
    }
}

impl fmt::Display for Binary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.op.implicit {
            write!(f, "{} {}", self.lhs, self.rhs)
        } else {
            write!(f, "{} {} {}", self.lhs, self.op.kind, self.rhs)
        }
    }
}
