use crate::parser::{
    ast::{expr::Expr, index::Index, literal::{Literal, LitSym}},
    error::{kind, Error},
    token::Assign as AssignToken,
    Parse,
    Parser,
};
use std::{fmt, ops::Range};

/// The maximum number of parameters a user-defined function can take.
pub const MAX_PARAMS: usize = 9;

/// A function header, **not including the body**, such as `f(x, y)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncHeader {
    /// The name of the function.
    pub name: LitSym,

    /// The parameters of the function, in order.
    pub params: Vec<LitSym>,

    /// The region of the source code that this function header was parsed from.
    pub span: Range<usize>,
}

impl FuncHeader {
    /// Returns the span of the function header.
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }
}

impl fmt::Display for FuncHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", param)?;
        }
        write!(f, ")")
    }
}

/// The target of an assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignTarget {
    /// A symbol, as in `x = 1`.
    Symbol(LitSym),

    /// A function definition, as in `f(x) = x^2`.
    Func(FuncHeader),

    /// A single component of a tensor bound to a symbol, as in `A[1, 2] = 0`.
    Index(Index),
}

impl AssignTarget {
    /// Returns the span of the assignment target.
    pub fn span(&self) -> Range<usize> {
        match self {
            AssignTarget::Symbol(symbol) => symbol.span.clone(),
            AssignTarget::Func(header) => header.span(),
            AssignTarget::Index(index) => index.span(),
        }
    }
}

impl TryFrom<Expr> for AssignTarget {
    type Error = Error;

    fn try_from(expr: Expr) -> Result<Self, Self::Error> {
        match expr {
            Expr::Literal(Literal::Symbol(symbol)) => Ok(AssignTarget::Symbol(symbol)),
            Expr::Call(call) => {
                if call.args.len() > MAX_PARAMS {
                    return Err(Error::new(
                        vec![call.span.clone()],
                        kind::TooManyParameters { count: call.args.len() },
                    ));
                }

                let params = call.args
                    .into_iter()
                    .map(|arg| match arg {
                        Expr::Literal(Literal::Symbol(symbol)) => Ok(symbol),
                        other => Err(Error::new(vec![other.span()], kind::InvalidParameter)),
                    })
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(AssignTarget::Func(FuncHeader { name: call.name, params, span: call.span }))
            },
            Expr::Index(index) if matches!(*index.target, Expr::Literal(Literal::Symbol(_))) => {
                Ok(AssignTarget::Index(index))
            },
            other => Err(Error::new(vec![other.span()], kind::InvalidAssignmentLhs)),
        }
    }
}

impl fmt::Display for AssignTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignTarget::Symbol(symbol) => write!(f, "{}", symbol),
            AssignTarget::Func(header) => write!(f, "{}", header),
            AssignTarget::Index(index) => write!(f, "{}", index),
        }
    }
}

/// An assignment of a symbol, function, or tensor component, such as `x = 1`, `f(x) = x^2`, or
/// `A[1, 2] = 0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assign {
    /// The target to assign to.
    pub target: AssignTarget,

    /// The expression to assign to the target.
    pub value: Box<Expr>,

    /// The region of the source code that this assignment expression was parsed from.
    pub span: Range<usize>,
}

impl Assign {
    /// Returns the span of the assignment expression.
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// Parses the `=` and right-hand side of an assignment whose left-hand side has already been
    /// parsed as an expression.
    pub fn parse_with_target(input: &mut Parser<'_>, lhs: Expr) -> Result<Self, Error> {
        input.try_parse::<AssignToken>()?;
        let target = AssignTarget::try_from(lhs)?;
        let value = Expr::parse(input)?;
        let span = target.span().start..value.span().end;
        Ok(Self { target, value: Box::new(value), span })
    }
}

impl fmt::Display for Assign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.target, self.value)
    }
}
