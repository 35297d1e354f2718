use ariadne::Fmt;
use cas_attrs::ErrorKind;
use cas_error::EXPR;
use crate::tokenizer::TokenKind;

/// The end of the source code was reached unexpectedly.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "unexpected end of file",
    labels = [format!("you might need to add another {} here", "expression".fg(EXPR))],
)]
pub struct UnexpectedEof;

/// The end of the source code was expected, but something else was found.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "expected end of file",
    labels = [format!("I could not understand the remaining {} here", "expression".fg(EXPR))],
)]
pub struct ExpectedEof;

/// A statement was followed by something other than a newline, a semicolon, or the end of the
/// source code.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "expected end of statement",
    labels = ["this should start on a new line"],
    help = format!("separate statements with a newline or {}", "`;`".fg(EXPR)),
)]
pub struct ExpectedEndOfStatement;

/// An unexpected token was encountered.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "unexpected token",
    labels = [format!("expected one of: {}", expected.iter().map(|t| format!("{:?}", t)).collect::<Vec<_>>().join(", "))],
    help = format!("found {:?}", found),
)]
pub struct UnexpectedToken {
    /// The token(s) that were expected.
    pub expected: &'static [TokenKind],

    /// The token that was found.
    pub found: TokenKind,
}

/// A parenthesis was not closed.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "unclosed parenthesis",
    labels = ["this parenthesis is not closed"],
    help = if *opening {
        "add a closing parenthesis `)` somewhere after this"
    } else {
        "add an opening parenthesis `(` somewhere before this"
    },
)]
pub struct UnclosedParenthesis {
    /// Whether the parenthesis was an opening parenthesis `(`. Otherwise, the parenthesis was a
    /// closing parenthesis `)`.
    pub opening: bool,
}

/// An index bracket was not closed.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "unclosed bracket",
    labels = ["this bracket is not closed"],
    help = "add a closing bracket `]` after the last index",
)]
pub struct UnclosedBracket;

/// There was no expression inside a pair of parentheses.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "missing expression inside parenthesis",
    labels = ["add an expression here"],
)]
pub struct EmptyParenthesis;

/// The left-hand side of an assignment was not a symbol, a function header, or an indexed symbol.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "invalid left-hand side of assignment",
    labels = ["this expression cannot be assigned to"],
    help = format!(
        "assign to a symbol ({}), define a function ({}), or set a component ({})",
        "x = 1".fg(EXPR),
        "f(x) = x^2".fg(EXPR),
        "A[1, 2] = 0".fg(EXPR),
    ),
)]
pub struct InvalidAssignmentLhs;

/// A parameter in a function header was not a plain symbol.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "invalid function parameter",
    labels = ["expected a symbol here"],
    help = "function parameters must be plain symbols, like `x` or `t`",
)]
pub struct InvalidParameter;

/// A function was defined with more parameters than can be passed.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "too many parameters",
    labels = [format!("this function has {} parameters", count)],
    help = "functions can take at most 9 parameters",
)]
pub struct TooManyParameters {
    /// The number of parameters in the header.
    pub count: usize,
}
