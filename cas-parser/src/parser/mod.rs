pub mod ast;
pub mod error;
pub mod token;

use ast::stmt::Stmt;
use cas_error::ErrorKind;
use error::{Error, kind};
use super::tokenizer::{tokenize_complete, Token, TokenKind};
use std::ops::Range;

/// A high-level parser for the language. This is the type to use to parse an arbitrary piece of
/// code into an abstract syntax tree.
#[derive(Debug, Clone)]
pub struct Parser<'source> {
    /// The tokens that this parser is currently parsing.
    tokens: Box<[Token<'source>]>,

    /// The index of the **next** token to be parsed.
    cursor: usize,
}

impl<'source> Parser<'source> {
    /// Create a new parser for the given source.
    pub fn new(source: &'source str) -> Self {
        Self {
            tokens: tokenize_complete(source),
            cursor: 0,
        }
    }

    /// Creates an error that points at the current token, or the end of the source code if the
    /// cursor is at the end of the stream.
    pub fn error(&self, kind: impl ErrorKind + 'static) -> Error {
        Error::new(vec![self.span()], kind)
    }

    /// Returns a span pointing at the end of the source code.
    pub fn eof_span(&self) -> Range<usize> {
        self.tokens.last().map_or(0..0, |token| token.span.end..token.span.end)
    }

    /// Returns the span of the current token, or the end of the source code if the cursor is at
    /// the end of the stream.
    pub fn span(&self) -> Range<usize> {
        self.tokens
            .get(self.cursor)
            .map_or(self.eof_span(), |token| token.span.clone())
    }

    /// Returns the previous token. The cursor is not moved. Returns [`None`] if the cursor is at
    /// the beginning of the stream.
    pub fn prev_token(&self) -> Option<&Token<'source>> {
        self.tokens.get(self.cursor.checked_sub(1)?)
    }

    /// Returns the next significant token without moving the cursor. Whitespace and comments are
    /// skipped. Returns [`None`] at the end of the stream.
    pub fn peek_token(&self) -> Option<&Token<'source>> {
        self.tokens[self.cursor.min(self.tokens.len())..]
            .iter()
            .find(|token| !token.is_whitespace())
    }

    /// Returns the kind of the next significant token without moving the cursor.
    pub fn peek_kind(&self) -> Option<TokenKind> {
        self.peek_token().map(|token| token.kind)
    }

    /// Returns the kinds of all upcoming significant tokens, without moving the cursor.
    pub fn peek_kinds(&self) -> impl Iterator<Item = TokenKind> + '_ {
        self.tokens[self.cursor.min(self.tokens.len())..]
            .iter()
            .filter(|token| !token.is_whitespace())
            .map(|token| token.kind)
    }

    /// Returns the next token to be parsed, then advances the cursor. Whitespace and comment
    /// tokens are skipped; newlines are not, since they separate statements.
    ///
    /// Returns an EOF error if there are no more tokens.
    pub fn next_token(&mut self) -> Result<Token<'source>, Error> {
        while self.cursor < self.tokens.len() {
            let token = &self.tokens[self.cursor];
            self.cursor += 1;
            if token.is_whitespace() {
                continue;
            } else {
                // cloning is cheap: only Range<_> is cloned
                return Ok(token.clone());
            }
        }

        Err(self.error(kind::UnexpectedEof))
    }

    /// Returns true if only whitespace and comments remain.
    pub fn at_end(&self) -> bool {
        self.peek_token().is_none()
    }

    /// Speculatively parses a value from the given stream of tokens. This function can be used
    /// in the [`Parse::parse`] implementation of a type with the given [`Parser`], as it will
    /// automatically backtrack the cursor position if parsing fails.
    ///
    /// If parsing is successful, the stream is advanced past the consumed tokens and the parsed
    /// value is returned. Otherwise, the stream is left unchanged and an error is returned.
    pub fn try_parse<T: Parse<'source>>(&mut self) -> Result<T, Error> {
        self.try_parse_with_fn(T::parse)
    }

    /// Speculatively parses a value from the given stream of tokens, using a custom parsing
    /// function to parse the value.
    ///
    /// If parsing is successful, the stream is advanced past the consumed tokens and the parsed
    /// value is returned. Otherwise, the stream is left unchanged and an error is returned.
    pub fn try_parse_with_fn<T, F>(&mut self, f: F) -> Result<T, Error>
    where
        F: FnOnce(&mut Parser<'source>) -> Result<T, Error>,
    {
        let start = self.cursor;
        match f(self) {
            Ok(value) => Ok(value),
            err => {
                self.cursor = start;
                err
            },
        }
    }

    /// Parses zero or more values separated by commas, stopping before the given closing token.
    /// The closing token itself is not consumed.
    pub fn parse_delimited<T: Parse<'source>>(&mut self, close: TokenKind) -> Result<Vec<T>, Error> {
        let mut values = Vec::new();
        if self.peek_kind() == Some(close) {
            return Ok(values);
        }

        loop {
            values.push(T::parse(self)?);
            if self.peek_kind() == Some(TokenKind::Comma) {
                self.next_token()?;
            } else {
                return Ok(values);
            }
        }
    }

    /// Attempts to parse a value from the given stream of tokens. All the tokens must be consumed
    /// by the parser; if not, an error is returned.
    pub fn try_parse_full<T: Parse<'source>>(&mut self) -> Result<T, Error> {
        let value = T::parse(self)?;
        if self.at_end() {
            Ok(value)
        } else {
            self.skip_whitespace();
            Err(self.error(kind::ExpectedEof))
        }
    }

    /// Advances the cursor past any whitespace and comments.
    fn skip_whitespace(&mut self) {
        while self.tokens.get(self.cursor).is_some_and(|token| token.is_whitespace()) {
            self.cursor += 1;
        }
    }

    /// Parses every statement in the source code. Statements are separated by newlines or
    /// semicolons; blank statements are skipped.
    pub fn parse_statements(&mut self) -> Result<Vec<Stmt>, Error> {
        let mut stmts = Vec::new();
        loop {
            while self.peek_kind().is_some_and(TokenKind::is_separator) {
                self.next_token()?;
            }
            if self.at_end() {
                return Ok(stmts);
            }

            stmts.push(Stmt::parse(self)?);

            match self.peek_kind() {
                None => return Ok(stmts),
                Some(kind) if kind.is_separator() => continue,
                Some(_) => {
                    self.skip_whitespace();
                    return Err(self.error(kind::ExpectedEndOfStatement));
                },
            }
        }
    }
}

/// Any type that can be parsed from a source of tokens.
pub trait Parse<'source>: Sized {
    /// Parses a value from the given stream of tokens, advancing the stream past the consumed
    /// tokens if parsing is successful.
    ///
    /// This function should be used by consumers of the library.
    fn parse(input: &mut Parser<'source>) -> Result<Self, Error>;
}

/// The associativity of a binary or unary operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Associativity {
    /// The binary / unary operation is left-associative.
    ///
    /// For binary operations, this means `a op b op c` is evaluated as `(a op b) op c`. For unary
    /// operations, this means `a op op` is evaluated as `(a op) op` (the operators appear to the
    /// right of the operand).
    Left,

    /// The binary / unary operation is right-associative.
    ///
    /// For binary operations, this means `a op b op c` is evaluated as `a op (b op c)`. For unary
    /// operations, this means `op op a` is evaluated as `op (op a)` (the operators appear to the
    /// left of the operand).
    Right,
}

/// The precedence of an operation, in order from lowest precedence (evaluated last) to highest
/// precedence (evaluated first).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Precedence {
    /// Any precedence.
    Any,

    /// Precedence of comparisons (`>`, `>=`, `<`, `<=`, and `==`).
    Compare,

    /// Precedence of addition (`+`) and subtraction (`-`), which separate terms.
    Term,

    /// Precedence of multiplication (`*`) and division (`/`), explicit or implicit, which separate
    /// factors.
    Factor,

    /// Precedence of unary subtraction (`-`).
    Neg,

    /// Precedence of exponentiation (`^`).
    Exp,

    /// Precedence of factorial (`!`).
    Factorial,
}

impl Precedence {
    /// The precedence one level above this one, used to parse the right-hand side of
    /// left-associative operators.
    pub fn next(self) -> Precedence {
        match self {
            Self::Any => Self::Compare,
            Self::Compare => Self::Term,
            Self::Term => Self::Factor,
            Self::Factor => Self::Neg,
            Self::Neg => Self::Exp,
            Self::Exp | Self::Factorial => Self::Factorial,
        }
    }
}

impl PartialOrd for Precedence {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        let left = *self as u8;
        let right = *other as u8;
        left.partial_cmp(&right)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    use ast::{
        assign::{Assign, AssignTarget},
        binary::Binary,
        call::Call,
        expr::Expr,
        index::Index,
        literal::{Literal, LitFloat, LitInt, LitStr, LitSym},
        paren::{Paren, Tensor},
        unary::Unary,
    };
    use error::kind::{
        EmptyParenthesis,
        ExpectedEndOfStatement,
        InvalidAssignmentLhs,
        TooManyParameters,
        UnclosedParenthesis,
        UnexpectedEof,
    };
    use token::op::{BinOp, BinOpKind, UnaryOp, UnaryOpKind};

    fn int(value: &str, span: Range<usize>) -> Expr {
        Expr::Literal(Literal::Integer(LitInt { value: value.to_string(), span }))
    }

    fn sym(name: &str, span: Range<usize>) -> Expr {
        Expr::Literal(Literal::Symbol(LitSym { name: name.to_string(), span }))
    }

    fn bin(lhs: Expr, kind: BinOpKind, op_span: Range<usize>, rhs: Expr) -> Expr {
        let span = lhs.span().start..rhs.span().end;
        Expr::Binary(Binary {
            lhs: Box::new(lhs),
            op: BinOp { kind, implicit: false, span: op_span },
            rhs: Box::new(rhs),
            span,
        })
    }

    fn parse(source: &str) -> Expr {
        Parser::new(source).try_parse_full::<Expr>().unwrap()
    }

    #[test]
    fn literal_int() {
        assert_eq!(parse("16"), int("16", 0..2));
    }

    #[test]
    fn literal_float() {
        assert_eq!(parse("3.14"), Expr::Literal(Literal::Float(LitFloat {
            value: "3.14".to_string(),
            span: 0..4,
        })));
    }

    #[test]
    fn literal_string() {
        assert_eq!(parse("\"hello\""), Expr::Literal(Literal::Str(LitStr {
            value: "hello".to_string(),
            span: 0..7,
        })));
    }

    #[test]
    fn binary_precedence() {
        assert_eq!(
            parse("1 + 2 * 3"),
            bin(
                int("1", 0..1),
                BinOpKind::Add,
                2..3,
                bin(int("2", 4..5), BinOpKind::Mul, 6..7, int("3", 8..9)),
            ),
        );
    }

    #[test]
    fn binary_left_associativity() {
        assert_eq!(
            parse("1 - 2 - 3"),
            bin(
                bin(int("1", 0..1), BinOpKind::Sub, 2..3, int("2", 4..5)),
                BinOpKind::Sub,
                6..7,
                int("3", 8..9),
            ),
        );
    }

    #[test]
    fn exponent_right_associativity() {
        assert_eq!(
            parse("2^3^4"),
            bin(
                int("2", 0..1),
                BinOpKind::Exp,
                1..2,
                bin(int("3", 2..3), BinOpKind::Exp, 3..4, int("4", 4..5)),
            ),
        );
    }

    #[test]
    fn negative_exponent() {
        assert_eq!(
            parse("x^-1"),
            bin(
                sym("x", 0..1),
                BinOpKind::Exp,
                1..2,
                Expr::Unary(Unary {
                    operand: Box::new(int("1", 3..4)),
                    op: UnaryOp { kind: UnaryOpKind::Neg, span: 2..3 },
                    span: 2..4,
                }),
            ),
        );
    }

    #[test]
    fn negation_binds_looser_than_power() {
        assert_eq!(
            parse("-x^2"),
            Expr::Unary(Unary {
                operand: Box::new(bin(sym("x", 1..2), BinOpKind::Exp, 2..3, int("2", 3..4))),
                op: UnaryOp { kind: UnaryOpKind::Neg, span: 0..1 },
                span: 0..4,
            }),
        );
    }

    #[test]
    fn implicit_multiplication() {
        assert_eq!(
            parse("2x^2"),
            Expr::Binary(Binary {
                lhs: Box::new(int("2", 0..1)),
                op: BinOp { kind: BinOpKind::Mul, implicit: true, span: 1..1 },
                rhs: Box::new(bin(sym("x", 1..2), BinOpKind::Exp, 2..3, int("2", 3..4))),
                span: 0..4,
            }),
        );
    }

    #[test]
    fn factorial_binds_tightest() {
        assert_eq!(
            parse("n!^2"),
            bin(
                Expr::Unary(Unary {
                    operand: Box::new(sym("n", 0..1)),
                    op: UnaryOp { kind: UnaryOpKind::Factorial, span: 1..2 },
                    span: 0..2,
                }),
                BinOpKind::Exp,
                2..3,
                int("2", 3..4),
            ),
        );
    }

    #[test]
    fn function_call() {
        assert_eq!(
            parse("d(f, x)"),
            Expr::Call(Call {
                name: LitSym { name: "d".to_string(), span: 0..1 },
                args: vec![sym("f", 2..3), sym("x", 5..6)],
                span: 0..7,
                paren_span: 1..7,
            }),
        );
    }

    #[test]
    fn tensor_literal() {
        assert_eq!(
            parse("((1, 2), (3, 4))"),
            Expr::Tensor(Tensor {
                elements: vec![
                    Expr::Tensor(Tensor { elements: vec![int("1", 2..3), int("2", 5..6)], span: 1..7 }),
                    Expr::Tensor(Tensor { elements: vec![int("3", 10..11), int("4", 13..14)], span: 9..15 }),
                ],
                span: 0..16,
            }),
        );
    }

    #[test]
    fn parenthesized() {
        assert_eq!(
            parse("(x)"),
            Expr::Paren(Paren { expr: Box::new(sym("x", 1..2)), span: 0..3 }),
        );
    }

    #[test]
    fn indexing() {
        assert_eq!(
            parse("A[1, j]"),
            Expr::Index(Index {
                target: Box::new(sym("A", 0..1)),
                indices: vec![int("1", 2..3), sym("j", 5..6)],
                span: 0..7,
            }),
        );
    }

    #[test]
    fn comparison() {
        assert_eq!(
            parse("x + 1 == 2"),
            bin(
                bin(sym("x", 0..1), BinOpKind::Add, 2..3, int("1", 4..5)),
                BinOpKind::Eq,
                6..8,
                int("2", 9..10),
            ),
        );
    }

    #[test]
    fn assign_symbol() {
        assert_eq!(
            parse("y = x + 1"),
            Expr::Assign(Assign {
                target: AssignTarget::Symbol(LitSym { name: "y".to_string(), span: 0..1 }),
                value: Box::new(bin(sym("x", 4..5), BinOpKind::Add, 6..7, int("1", 8..9))),
                span: 0..9,
            }),
        );
    }

    #[test]
    fn assign_function() {
        let expr = parse("f(x, y) = x y");
        let Expr::Assign(Assign { target: AssignTarget::Func(header), .. }) = expr else {
            panic!("expected a function definition");
        };
        assert_eq!(header.name.name, "f");
        assert_eq!(
            header.params.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
            vec!["x", "y"],
        );
    }

    #[test]
    fn assign_component() {
        let expr = parse("A[1, 2] = 0");
        assert!(matches!(expr, Expr::Assign(Assign { target: AssignTarget::Index(_), .. })));
    }

    #[test]
    fn statements() {
        let mut parser = Parser::new("x = 1; y = 2\n\n-- comment\nx + y\n");
        let stmts = parser.parse_statements().unwrap();
        assert_eq!(stmts.len(), 3);
        assert_eq!(stmts[2].span, 25..30);
    }

    #[test]
    fn errors() {
        let err = Parser::new("1 +").try_parse_full::<Expr>().unwrap_err();
        assert!(err.is::<UnexpectedEof>());

        let err = Parser::new("(1 + 2").try_parse_full::<Expr>().unwrap_err();
        assert!(err.is::<UnclosedParenthesis>());

        let err = Parser::new("()").try_parse_full::<Expr>().unwrap_err();
        assert!(err.is::<EmptyParenthesis>());

        let err = Parser::new("1 + 2 = 3").try_parse_full::<Expr>().unwrap_err();
        assert!(err.is::<InvalidAssignmentLhs>());

        let err = Parser::new("f(a,b,c,d,e,g,h,i,j,k) = 0").try_parse_full::<Expr>().unwrap_err();
        assert!(err.is::<TooManyParameters>());

        let err = Parser::new("x = 1 )").parse_statements().unwrap_err();
        assert!(err.is::<ExpectedEndOfStatement>());
    }
}
