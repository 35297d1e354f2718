//! A symbolic algebra evaluator.
//!
//! Statements are parsed by [`cas_parser`], scanned into [`Node`] trees in the interpreter's
//! arena and evaluated into canonical form: sums and products flattened and sorted, like terms
//! merged, rational coefficients reduced. On top of that canonical form sit the built-in
//! functions, among them derivatives and integrals, tensors and matrices, and polynomial roots.
//!
//! ```
//! use cas_core::Interpreter;
//!
//! let mut interp = Interpreter::new();
//! assert_eq!(interp.eval_str("d(x^3 + 2*x)").unwrap(), "3*x^2 + 2");
//! assert_eq!(interp.eval_str("A = ((1, 2), (3, 4))\ndet(A)").unwrap(), "-2");
//! ```

mod arith;
mod calculus;
pub mod config;
pub mod error;
mod eval;
pub mod fmt;
pub mod interp;
pub mod keyword;
pub mod node;
mod order;
mod polynomial;
mod rules;
pub mod symbol;
mod tensor;

pub use config::{Config, ConfigBuilder};
pub use error::{Error, Result};
pub use interp::Interpreter;
pub use keyword::Keyword;
pub use node::{Node, NodeRef};

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::Interpreter;

    fn run(source: &str) -> String {
        Interpreter::new().eval_str(source).unwrap()
    }

    #[test]
    fn recursive_factorial() {
        assert_eq!(run(include_str!("../../demos/factorial.txt")), "3628800");
    }

    #[test]
    fn series_for_e() {
        assert_eq!(run(include_str!("../../demos/series.txt")), "163/60");
    }

    #[test]
    fn matrix_inverse() {
        assert_eq!(run(include_str!("../../demos/matrix.txt")), "1");
    }

    #[test]
    fn derivative_and_integral() {
        assert_eq!(run(include_str!("../../demos/calculus.txt")), "x^3 + x^2");
    }

    #[test]
    fn roots_are_zeros() {
        assert_eq!(run(include_str!("../../demos/roots.txt")), "0");
    }

    #[test]
    fn state_persists_between_runs() {
        let mut interp = Interpreter::new();
        assert_eq!(interp.eval_str("a = 3").unwrap(), "");
        assert_eq!(interp.eval_str("a^2").unwrap(), "9");
        assert_eq!(interp.eval_str("last + 1").unwrap(), "10");
    }

    #[test]
    fn failed_statement_rolls_back() {
        let mut interp = Interpreter::new();
        assert!(interp.eval_str("b = 2\nb = 1/0").is_err());
        assert_eq!(interp.eval_str("b").unwrap(), "2");
    }
}
