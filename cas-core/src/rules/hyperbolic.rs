//! Hyperbolic functions and their inverses.

use crate::{
    error::Result,
    interp::Interpreter,
    keyword::Keyword,
    node::NodeRef,
};

impl Interpreter {
    /// Applies a function of doubles to a double argument.
    fn of_double(&mut self, p: NodeRef, f: fn(f64) -> f64) -> Result<Option<NodeRef>> {
        match self.double(p) {
            Some(d) => self.double_node(f(d)).map(Some),
            None => Ok(None),
        }
    }

    /// Returns `x` if `p` is `(keyword x)`.
    fn inverse_arg(&self, p: NodeRef, keyword: Keyword) -> Option<NodeRef> {
        (self.is_head(p, keyword) && self.length(p) == 2).then(|| self.cadr(p))
    }

    /// Applies an odd function: `f(-x) = -f(x)`.
    fn odd(&mut self, p: NodeRef, f: fn(&mut Self) -> Result<()>) -> Result<Option<NodeRef>> {
        if !self.is_negative(p) {
            return Ok(None);
        }
        let q = self.neg_node(p)?;
        let q = self.call1(f, q)?;
        self.neg_node(q).map(Some)
    }

    /// Pops `x` and pushes `sinh(x)`.
    pub(crate) fn sinh(&mut self) -> Result<()> {
        self.unary_rules(Keyword::Sinh, &[
            |interp, p| interp.of_double(p, f64::sinh),
            |interp, p| Ok(interp.is_zero(p).then_some(interp.consts.zero)),
            |interp, p| interp.odd(p, Self::sinh),
            |interp, p| Ok(interp.inverse_arg(p, Keyword::Arcsinh)),
        ])
    }

    /// Pops `x` and pushes `cosh(x)`.
    pub(crate) fn cosh(&mut self) -> Result<()> {
        self.unary_rules(Keyword::Cosh, &[
            |interp, p| interp.of_double(p, f64::cosh),
            |interp, p| Ok(interp.is_zero(p).then_some(interp.consts.one)),
            // cosh(-x) = cosh(x)
            |interp, p| {
                if !interp.is_negative(p) {
                    return Ok(None);
                }
                let q = interp.neg_node(p)?;
                interp.call1(Self::cosh, q).map(Some)
            },
            |interp, p| Ok(interp.inverse_arg(p, Keyword::Arccosh)),
        ])
    }

    /// Pops `x` and pushes `tanh(x)`.
    pub(crate) fn tanh(&mut self) -> Result<()> {
        self.unary_rules(Keyword::Tanh, &[
            |interp, p| interp.of_double(p, f64::tanh),
            |interp, p| Ok(interp.is_zero(p).then_some(interp.consts.zero)),
            |interp, p| interp.odd(p, Self::tanh),
            |interp, p| Ok(interp.inverse_arg(p, Keyword::Arctanh)),
        ])
    }

    /// Pops `x` and pushes `arcsinh(x)`.
    pub(crate) fn arcsinh(&mut self) -> Result<()> {
        self.unary_rules(Keyword::Arcsinh, &[
            |interp, p| interp.of_double(p, f64::asinh),
            |interp, p| Ok(interp.is_zero(p).then_some(interp.consts.zero)),
            |interp, p| interp.odd(p, Self::arcsinh),
            |interp, p| Ok(interp.inverse_arg(p, Keyword::Sinh)),
        ])
    }

    /// Pops `x` and pushes `arccosh(x)`.
    pub(crate) fn arccosh(&mut self) -> Result<()> {
        self.unary_rules(Keyword::Arccosh, &[
            |interp, p| match interp.double(p) {
                Some(d) if d >= 1.0 => interp.double_node(d.acosh()).map(Some),
                _ => Ok(None),
            },
            |interp, p| {
                let one = interp.is_one(p) && interp.is_rational(p);
                Ok(one.then_some(interp.consts.zero))
            },
            |interp, p| Ok(interp.inverse_arg(p, Keyword::Cosh)),
        ])
    }

    /// Pops `x` and pushes `arctanh(x)`.
    pub(crate) fn arctanh(&mut self) -> Result<()> {
        self.unary_rules(Keyword::Arctanh, &[
            |interp, p| match interp.double(p) {
                Some(d) if d.abs() < 1.0 => interp.double_node(d.atanh()).map(Some),
                _ => Ok(None),
            },
            |interp, p| Ok(interp.is_zero(p).then_some(interp.consts.zero)),
            |interp, p| interp.odd(p, Self::arctanh),
            |interp, p| Ok(interp.inverse_arg(p, Keyword::Tanh)),
        ])
    }
}

#[cfg(test)]
mod tests {
    use crate::Interpreter;

    fn eval(source: &str) -> String {
        Interpreter::new().eval_str(source).unwrap()
    }

    #[test]
    fn special_values() {
        assert_eq!(eval("sinh(0)"), "0");
        assert_eq!(eval("cosh(0)"), "1");
        assert_eq!(eval("arccosh(1)"), "0");
        assert_eq!(eval("tanh(0.0)"), "0.0");
    }

    #[test]
    fn symmetry_and_inverses() {
        assert_eq!(eval("sinh(-x)"), "-sinh(x)");
        assert_eq!(eval("cosh(-x)"), "cosh(x)");
        assert_eq!(eval("arctanh(-x)"), "-arctanh(x)");
        assert_eq!(eval("sinh(arcsinh(x))"), "x");
        assert_eq!(eval("arccosh(cosh(x))"), "x");
    }

    #[test]
    fn doubles() {
        assert_eq!(eval("cosh(1.0)"), "1.54308");
        assert_eq!(eval("arcsinh(1.0)"), "0.881374");
    }
}
