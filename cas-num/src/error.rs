use std::fmt;

/// A division (or remainder, or reciprocal) by a zero magnitude was attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DivideByZero;

impl fmt::Display for DivideByZero {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "divide by zero")
    }
}

impl std::error::Error for DivideByZero {}
