use crate::{
    parser::{
        ast::expr::Expr,
        error::{kind, Error},
        token::{CloseParen, OpenParen},
        Parser,
    },
    tokenizer::TokenKind,
};
use std::{fmt, ops::Range};

/// A parenthesized expression. A [`Paren`] can only contain a single expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paren {
    /// The inner expression.
    pub expr: Box<Expr>,

    /// The region of the source code that this [`Paren`] was parsed from.
    pub span: Range<usize>,
}

impl Paren {
    /// Returns the span of the parenthesized expression.
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// Returns the innermost expression in the parenthesized expression, consuming the [`Paren`].
    pub fn into_innermost(self) -> Expr {
        let mut inner = self.expr;
        while let Expr::Paren(paren) = *inner {
            inner = paren.expr;
        }
        *inner
    }

    /// Parses a parenthesized, comma-separated list. A list with a single element is a
    /// parenthesized expression; a longer list is a [`Tensor`].
    pub fn parse_or_tensor(input: &mut Parser<'_>) -> Result<Expr, Error> {
        let open = input.try_parse::<OpenParen>()?;
        if input.peek_kind() == Some(TokenKind::CloseParen) {
            let close = input.try_parse::<CloseParen>()?;
            return Err(Error::new(vec![open.span.start..close.span.end], kind::EmptyParenthesis));
        }

        let mut elements = input.parse_delimited::<Expr>(TokenKind::CloseParen)?;
        let close = input.try_parse::<CloseParen>()
            .map_err(|_| Error::new(vec![open.span.clone()], kind::UnclosedParenthesis { opening: true }))?;

        let span = open.span.start..close.span.end;
        if elements.len() == 1 {
            Ok(Expr::Paren(Paren { expr: Box::new(elements.remove(0)), span }))
        } else {
            Ok(Expr::Tensor(Tensor { elements, span }))
        }
    }
}

impl fmt::Display for Paren {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.expr)
    }
}

/// A tensor literal, such as `(1, 2)` or `((a, b), (c, d))`. Nested literals become tensors of
/// higher rank when evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tensor {
    /// The elements of the outermost axis.
    pub elements: Vec<Expr>,

    /// The region of the source code that this literal was parsed from.
    pub span: Range<usize>,
}

impl Tensor {
    /// Returns the span of the tensor literal.
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }
}

impl fmt::Display for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, element) in self.elements.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", element)?;
        }
        write!(f, ")")
    }
}
