//! Conditions and comparisons.
//!
//! A condition is true when its value is anything other than zero. Comparisons and the logical
//! operators evaluate to `1` or `0`.

use std::cmp::Ordering;
use crate::{
    error::{kind, Error, Result},
    interp::Interpreter,
    keyword::Keyword,
    node::{Node, NodeRef},
};

impl Interpreter {
    /// Evaluates a condition.
    pub(crate) fn eval_condition(&mut self, p: NodeRef) -> Result<bool> {
        let q = self.eval_value(p)?;
        Ok(!self.is_zero_value(q))
    }

    /// Returns `true` for a zero number, or a tensor of zeros.
    pub(crate) fn is_zero_value(&self, p: NodeRef) -> bool {
        match self.node(p) {
            Node::Tensor(t) => t.elems.iter().all(|&e| self.is_zero_value(e)),
            _ => self.is_zero(p),
        }
    }

    /// `test(a1, b1, a2, b2, ..., default)`
    ///
    /// Evaluates to the `b` of the first true condition `a`. An odd final argument is the value
    /// if no condition holds, otherwise the result is `nil`.
    pub(crate) fn eval_test(&mut self, p1: NodeRef) -> Result<()> {
        let args = self.args(p1);
        for pair in args.chunks(2) {
            match *pair {
                [cond, value] => {
                    if self.eval_condition(cond)? {
                        let q = self.eval_value(value)?;
                        return self.push(q);
                    }
                },
                [default] => {
                    let q = self.eval_value(default)?;
                    return self.push(q);
                },
                _ => {},
            }
        }
        self.push(self.consts.nil)
    }

    /// `testeq(a, b)`, written `a == b`.
    ///
    /// Equal if the difference simplifies to zero, or to a number that is zero when converted
    /// to a double.
    pub(crate) fn eval_testeq(&mut self, p1: NodeRef) -> Result<()> {
        let a = self.eval_arg(p1, 1)?;
        let b = self.eval_arg(p1, 2)?;
        if self.equal(a, b) {
            return self.push_bool(true);
        }

        let diff = self.sub_nodes(a, b)?;
        if self.is_zero_value(diff) {
            return self.push_bool(true);
        }
        let diff = self.call1(Self::float, diff)?;
        let equal = self.is_zero_value(diff);
        self.push_bool(equal)
    }

    /// `a < b`, `a <= b`, `a > b` and `a >= b`.
    ///
    /// The operands are compared numerically. A difference that does not reduce to a real
    /// number cannot be decided.
    pub(crate) fn eval_relational(&mut self, p1: NodeRef, keyword: Keyword) -> Result<()> {
        let a = self.eval_arg(p1, 1)?;
        let b = self.eval_arg(p1, 2)?;
        let ordering = self.compare_numerically(a, b)?;
        let result = match keyword {
            Keyword::Testlt => ordering == Ordering::Less,
            Keyword::Testle => ordering != Ordering::Greater,
            Keyword::Testgt => ordering == Ordering::Greater,
            Keyword::Testge => ordering != Ordering::Less,
            _ => return Err(Error::new(kind::InternalError { message: "not a relational operator" })),
        };
        self.push_bool(result)
    }

    fn compare_numerically(&mut self, a: NodeRef, b: NodeRef) -> Result<Ordering> {
        if let (Some(x), Some(y)) = (self.rational(a), self.rational(b)) {
            return Ok(x.cmp(y));
        }
        let diff = self.sub_nodes(a, b)?;
        let diff = self.call1(Self::float, diff)?;
        match self.to_f64(diff) {
            Some(d) if !d.is_nan() => Ok(d.partial_cmp(&0.0).unwrap_or(Ordering::Equal)),
            _ => Err(Error::new(kind::UndecidableCondition)),
        }
    }

    /// `and(a, b, ...)` is true if every argument is true. Stops at the first false argument.
    pub(crate) fn eval_and(&mut self, p1: NodeRef) -> Result<()> {
        for arg in self.args(p1) {
            if !self.eval_condition(arg)? {
                return self.push_bool(false);
            }
        }
        self.push_bool(true)
    }

    /// `or(a, b, ...)` is true if any argument is true. Stops at the first true argument.
    pub(crate) fn eval_or(&mut self, p1: NodeRef) -> Result<()> {
        for arg in self.args(p1) {
            if self.eval_condition(arg)? {
                return self.push_bool(true);
            }
        }
        self.push_bool(false)
    }

    pub(crate) fn eval_not(&mut self, p1: NodeRef) -> Result<()> {
        let arg = self.cadr(p1);
        let value = self.eval_condition(arg)?;
        self.push_bool(!value)
    }

    /// `check(a)` stops the statement if `a` is false.
    pub(crate) fn eval_check(&mut self, p1: NodeRef) -> Result<()> {
        let arg = self.cadr(p1);
        if !self.eval_condition(arg)? {
            return Err(Error::new(kind::CheckFailed));
        }
        self.push(self.consts.nil)
    }
}

#[cfg(test)]
mod tests {
    use crate::{error::kind, Interpreter};

    fn eval(source: &str) -> String {
        Interpreter::new().eval_str(source).unwrap()
    }

    #[test]
    fn equality() {
        assert_eq!(eval("x + 1 == 1 + x"), "1");
        assert_eq!(eval("(x + 1)^2 == x^2 + 2*x + 1"), "1");
        assert_eq!(eval("sqrt(2) == 2^(1/2)"), "1");
        assert_eq!(eval("x == y"), "0");
        assert_eq!(eval("0.5 == 1/2"), "1");
    }

    #[test]
    fn relational() {
        assert_eq!(eval("1/3 < 1/2"), "1");
        assert_eq!(eval("pi > 3"), "1");
        assert_eq!(eval("2 >= 2"), "1");
        assert_eq!(eval("sqrt(2) <= 1"), "0");
    }

    #[test]
    fn undecidable() {
        let err = Interpreter::new().eval_str("x < 1").unwrap_err();
        assert!(err.is::<kind::UndecidableCondition>());
    }

    #[test]
    fn test_chooses_first_true_branch() {
        assert_eq!(eval("test(1 > 2, a, 2 > 1, b)"), "b");
        assert_eq!(eval("test(0, a, c)"), "c");
        assert_eq!(eval("f(n) = test(n < 1, 1, n*f(n - 1))\nf(5)"), "120");
    }

    #[test]
    fn logical_operators() {
        assert_eq!(eval("and(1, 2 > 1)"), "1");
        assert_eq!(eval("and(1, 0)"), "0");
        assert_eq!(eval("or(0, 1 == 1)"), "1");
        assert_eq!(eval("not(0)"), "1");
        // short-circuits before the undecidable comparison
        assert_eq!(eval("and(0, x < 1)"), "0");
    }

    #[test]
    fn check() {
        let mut interp = Interpreter::new();
        assert!(interp.run("check(1 == 1)")[0].as_ref().unwrap().is_none());
        let err = interp.eval_str("check(1 == 2)").unwrap_err();
        assert!(err.is::<kind::CheckFailed>());
    }
}
