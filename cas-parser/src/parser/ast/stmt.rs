use crate::parser::{ast::expr::Expr, error::Error, Parse, Parser};
use std::{fmt, ops::Range};

/// Represents a single top-level statement.
///
/// Statements are evaluated one at a time; an error in one statement does not prevent the
/// following statements from being evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stmt {
    /// The expression of the statement.
    pub expr: Expr,

    /// The region of the source code that this statement was parsed from.
    pub span: Range<usize>,
}

impl Stmt {
    /// Returns the span of the statement.
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }
}

impl<'source> Parse<'source> for Stmt {
    fn parse(input: &mut Parser<'source>) -> Result<Self, Error> {
        let expr = Expr::parse(input)?;
        let span = expr.span();
        Ok(Stmt { expr, span })
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.expr.fmt(f)
    }
}
