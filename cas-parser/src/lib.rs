//! Tokenizer and parser for the input language of the symbolic evaluator.
//!
//! Source text is split into tokens by [`tokenizer::tokenize_complete`], then turned into a list
//! of statements by [`parser::Parser`]. Each statement holds a single [`parser::ast::Expr`] tree
//! annotated with the spans of the source it came from, which the evaluator uses to point at the
//! failing statement when reporting errors.
//!
//! ```
//! use cas_parser::parser::{ast::Expr, Parser};
//!
//! let mut parser = Parser::new("x = 2\nx^2 + 1");
//! let stmts = parser.parse_statements().unwrap();
//! assert_eq!(stmts.len(), 2);
//! assert!(matches!(stmts[0].expr, Expr::Assign(_)));
//! ```

pub mod parser;
pub mod tokenizer;
