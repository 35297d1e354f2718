use crate::{
    parser::{
        ast::expr::Expr,
        error::{kind, Error},
        token::{CloseSquare, OpenSquare},
        Parser,
    },
    tokenizer::TokenKind,
};
use std::{fmt, ops::Range};

/// Access to a component of a tensor, such as `A[1, 2]`. Indices start at one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    /// The expression being indexed.
    pub target: Box<Expr>,

    /// The index along each axis, outermost first.
    pub indices: Vec<Expr>,

    /// The region of the source code that this expression was parsed from.
    pub span: Range<usize>,
}

impl Index {
    /// Returns the span of the index expression.
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// Parses the bracketed indices following an already-parsed target.
    pub fn parse_postfix(input: &mut Parser<'_>, target: Expr) -> Result<Self, Error> {
        let open = input.try_parse::<OpenSquare>()?;
        let indices = input.parse_delimited::<Expr>(TokenKind::CloseSquare)?;
        let close = input.try_parse::<CloseSquare>()
            .map_err(|_| Error::new(vec![open.span.clone()], kind::UnclosedBracket))?;

        if indices.is_empty() {
            return Err(Error::new(vec![open.span.start..close.span.end], kind::EmptyParenthesis));
        }

        let span = target.span().start..close.span.end;
        Ok(Self { target: Box::new(target), indices, span })
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[", self.target)?;
        for (i, index) in self.indices.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", index)?;
        }
        write!(f, "]")
    }
}
