//! The canonicalizing combinators of addition, multiplication and exponentiation.
//!
//! Each combinator pops its operands from the stack and pushes one canonical result. Sums and
//! products are flattened, tensor operands are folded together, like terms or factors are
//! merged, and the operands of the result are sorted into the canonical order.

mod add;
mod multiply;
mod power;

use cas_num::Rational;
use crate::{error::Result, interp::Interpreter, node::NodeRef};

impl Interpreter {
    /// Returns `a + b`.
    pub(crate) fn add_nodes(&mut self, a: NodeRef, b: NodeRef) -> Result<NodeRef> {
        self.push(a)?;
        self.push(b)?;
        self.add()?;
        self.pop()
    }

    /// Returns `a - b`.
    pub(crate) fn sub_nodes(&mut self, a: NodeRef, b: NodeRef) -> Result<NodeRef> {
        self.push(a)?;
        self.push(b)?;
        self.subtract()?;
        self.pop()
    }

    /// Returns `a * b`.
    pub(crate) fn mul_nodes(&mut self, a: NodeRef, b: NodeRef) -> Result<NodeRef> {
        self.push(a)?;
        self.push(b)?;
        self.multiply()?;
        self.pop()
    }

    /// Returns `a / b`.
    pub(crate) fn div_nodes(&mut self, a: NodeRef, b: NodeRef) -> Result<NodeRef> {
        self.push(a)?;
        self.push(b)?;
        self.divide()?;
        self.pop()
    }

    /// Returns `a^b`.
    pub(crate) fn pow_nodes(&mut self, a: NodeRef, b: NodeRef) -> Result<NodeRef> {
        self.push(a)?;
        self.push(b)?;
        self.power()?;
        self.pop()
    }

    /// Returns `-a`.
    pub(crate) fn neg_node(&mut self, a: NodeRef) -> Result<NodeRef> {
        self.push(a)?;
        self.negate()?;
        self.pop()
    }

    /// Returns the sum of two numbers. Doubles are contagious.
    pub(crate) fn add_numbers(&mut self, a: NodeRef, b: NodeRef) -> Result<NodeRef> {
        let exact = match (self.rational(a), self.rational(b)) {
            (Some(x), Some(y)) => Some(x.add(y)),
            _ => None,
        };
        match exact {
            Some(r) => self.rational_node(r),
            None => {
                let d = self.to_f64(a).unwrap_or(0.0) + self.to_f64(b).unwrap_or(0.0);
                self.double_node(d)
            },
        }
    }

    /// Returns the product of two numbers. Doubles are contagious.
    pub(crate) fn multiply_numbers(&mut self, a: NodeRef, b: NodeRef) -> Result<NodeRef> {
        let exact = match (self.rational(a), self.rational(b)) {
            (Some(x), Some(y)) => Some(x.mul(y)),
            _ => None,
        };
        match exact {
            Some(r) => self.rational_node(r),
            None => {
                let d = self.to_f64(a).unwrap_or(0.0) * self.to_f64(b).unwrap_or(0.0);
                self.double_node(d)
            },
        }
    }

    /// Returns the rational value of `p`, which the caller knows to be rational.
    pub(crate) fn rational_value(&self, p: NodeRef) -> Rational {
        self.rational(p).cloned().unwrap_or_else(Rational::zero)
    }
}
