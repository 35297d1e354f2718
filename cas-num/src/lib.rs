//! Exact arithmetic for the symbolic evaluator.
//!
//! The numeric bedrock is [`Magnitude`], an arbitrary-precision unsigned integer stored as a
//! little-endian vector of 32-bit digits. [`Rational`] builds a signed, always-reduced fraction
//! on top of two magnitudes.
//!
//! Every arithmetic routine returns a freshly owned value; no buffer is ever shared between two
//! numbers.
//!
//! ```
//! use cas_num::Rational;
//!
//! let a = Rational::new_i64(1, 3).unwrap();
//! let b = Rational::new_i64(1, 6).unwrap();
//! assert_eq!(a.add(&b), Rational::new_i64(1, 2).unwrap());
//! ```

pub mod approx;
pub mod error;
pub mod magnitude;
pub mod prime;
pub mod rational;

pub use error::DivideByZero;
pub use magnitude::Magnitude;
pub use rational::{Rational, Sign};
