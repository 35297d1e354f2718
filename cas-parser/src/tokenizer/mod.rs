pub mod token;

use logos::{Lexer, Logos};
pub use token::{Token, TokenKind};

/// Returns an iterator over the token kinds produced by the tokenizer.
pub fn tokenize(input: &str) -> Lexer<TokenKind> {
    TokenKind::lexer(input)
}

/// Returns an owned array containing all of the tokens produced by the tokenizer. This allows us
/// to backtrack in case of an error.
pub fn tokenize_complete(input: &str) -> Box<[Token]> {
    let mut lexer = tokenize(input);
    let mut tokens = Vec::new();

    while let Some(Ok(kind)) = lexer.next() {
        tokens.push(Token {
            span: lexer.span(),
            kind,
            lexeme: lexer.slice(),
        });
    }

    tokens.into_boxed_slice()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Compares the tokens produced by the tokenizer to the raw expected tokens.
    fn compare_tokens<'source, const N: usize>(input: &'source str, expected: [(TokenKind, &'source str); N]) {
        let mut lexer = tokenize(input);

        for (expected_kind, expected_lexeme) in expected.into_iter() {
            assert_eq!(lexer.next(), Some(Ok(expected_kind)));
            assert_eq!(lexer.slice(), expected_lexeme);
        }

        assert_eq!(lexer.next(), None);
    }

    #[test]
    fn basic_expr() {
        compare_tokens(
            "1 + 2",
            [
                (TokenKind::Int, "1"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Add, "+"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Int, "2"),
            ],
        );
    }

    #[test]
    fn numbers_and_names() {
        compare_tokens(
            "3.25 x1 1e-3 .5 2x",
            [
                (TokenKind::Float, "3.25"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Name, "x1"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Float, "1e-3"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Float, ".5"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Int, "2"),
                (TokenKind::Name, "x"),
            ],
        );
    }

    #[test]
    fn statements_and_comments() {
        compare_tokens(
            "f(x)=x^2 -- square\ny==\"hi\";A[1]",
            [
                (TokenKind::Name, "f"),
                (TokenKind::OpenParen, "("),
                (TokenKind::Name, "x"),
                (TokenKind::CloseParen, ")"),
                (TokenKind::Assign, "="),
                (TokenKind::Name, "x"),
                (TokenKind::Exp, "^"),
                (TokenKind::Int, "2"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Comment, "-- square"),
                (TokenKind::NewLine, "\n"),
                (TokenKind::Name, "y"),
                (TokenKind::Eq, "=="),
                (TokenKind::Quote, "\"hi\""),
                (TokenKind::Semicolon, ";"),
                (TokenKind::Name, "A"),
                (TokenKind::OpenSquare, "["),
                (TokenKind::Int, "1"),
                (TokenKind::CloseSquare, "]"),
            ],
        );
    }

    #[test]
    fn unknown_character() {
        compare_tokens(
            "a @ b",
            [
                (TokenKind::Name, "a"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Symbol, "@"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Name, "b"),
            ],
        );
    }
}
