//! The abstract syntax tree produced by the parser.
//!
//! Every node records the region of the source code it was parsed from, so errors raised while
//! evaluating a statement can point back at it.

pub mod assign;
pub mod binary;
pub mod call;
pub mod expr;
pub mod index;
pub mod literal;
pub mod paren;
pub mod stmt;
pub mod unary;

pub use assign::{Assign, AssignTarget, FuncHeader};
pub use binary::Binary;
pub use call::Call;
pub use expr::Expr;
pub use index::Index;
pub use literal::{Literal, LitFloat, LitInt, LitStr, LitSym};
pub use paren::{Paren, Tensor};
pub use stmt::Stmt;
pub use unary::Unary;
