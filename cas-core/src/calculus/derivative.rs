use crate::{
    error::{kind, Error, Result},
    interp::Interpreter,
    keyword::Keyword,
    node::NodeRef,
};

impl Interpreter {
    /// `d(f, x, ...)`
    ///
    /// With no variable, differentiates with respect to `x`. Each further argument is a
    /// variable, an integer repeating the previous variable, or a tensor of variables giving a
    /// gradient.
    pub(crate) fn eval_derivative(&mut self, p1: NodeRef) -> Result<()> {
        let args = self.args(p1);
        let mut f = self.eval_arg(p1, 1)?;
        let mut variable = self.consts.x;

        if args.len() == 1 {
            f = self.derivative(f, variable)?;
            return self.push(f);
        }

        // whether `f` has been differentiated by the current variable
        let mut differentiated = false;
        for &arg in &args[1..] {
            let arg = self.eval_value(arg)?;
            if let Some(n) = self.small_integer(arg) {
                // d(f, x, n) differentiates n times in total, d(f, n) differentiates by x
                let times = if differentiated { n - 1 } else { n };
                for _ in 0..times.max(0) {
                    f = self.derivative(f, variable)?;
                }
            } else if let Some((dims, vars)) = self.tensor_parts(arg) {
                let mut elems = Vec::with_capacity(vars.len());
                for v in vars {
                    elems.push(self.derivative(f, v)?);
                }
                let gradient = self.tensor_node(dims, elems)?;
                // the gradient of a tensor gains an axis
                f = self.eval_value(gradient)?;
            } else {
                variable = arg;
                f = self.derivative(f, variable)?;
            }
            differentiated = true;
        }
        self.push(f)
    }

    /// Returns the derivative of `p` with respect to the symbol `x`.
    pub(crate) fn derivative(&mut self, p: NodeRef, x: NodeRef) -> Result<NodeRef> {
        self.check_interrupt()?;
        if !self.is_symbol(x) {
            return Err(Error::new(kind::InvalidArgument {
                function: "d",
                expected: "a symbol to differentiate by",
            }));
        }
        if self.equal(p, x) {
            return Ok(self.consts.one);
        }
        if let Some((dims, elems)) = self.tensor_parts(p) {
            let mut derived = Vec::with_capacity(elems.len());
            for e in elems {
                derived.push(self.derivative(e, x)?);
            }
            return self.tensor_node(dims, derived);
        }
        if !self.contains(p, x) {
            return Ok(self.consts.zero);
        }

        let Some(head) = self.head(p) else {
            return self.apply(Keyword::Derivative, &[p, x]);
        };
        match head {
            Keyword::Add => {
                let terms = self.args(p);
                let n = terms.len();
                for term in terms {
                    let q = self.derivative(term, x)?;
                    self.push(q)?;
                }
                self.add_terms(n)?;
                self.pop()
            },
            Keyword::Multiply => self.d_product(p, x),
            Keyword::Power => self.d_power(p, x),
            _ if self.length(p) == 2 => self.d_function(head, p, x),
            _ => self.apply(Keyword::Derivative, &[p, x]),
        }
    }

    /// `d(u*v) = d(u)*v + u*d(v)`, for any number of factors.
    fn d_product(&mut self, p: NodeRef, x: NodeRef) -> Result<NodeRef> {
        let factors = self.args(p);
        let n = factors.len();
        let mut terms = 0;
        for i in 0..n {
            let du = self.derivative(factors[i], x)?;
            if self.is_zero(du) {
                continue;
            }
            self.push(du)?;
            for (j, &factor) in factors.iter().enumerate() {
                if j != i {
                    self.push(factor)?;
                }
            }
            self.multiply_factors(n)?;
            terms += 1;
        }
        self.add_terms(terms)?;
        self.pop()
    }

    /// `d(u^v)`
    fn d_power(&mut self, p: NodeRef, x: NodeRef) -> Result<NodeRef> {
        let base = self.cadr(p);
        let expo = self.caddr(p);
        let du = self.derivative(base, x)?;

        // d(u^n) = n*u^(n-1)*d(u)
        if !self.contains(expo, x) {
            let one = self.consts.one;
            let expo_less_one = self.sub_nodes(expo, one)?;
            let q = self.pow_nodes(base, expo_less_one)?;
            let q = self.mul_nodes(expo, q)?;
            return self.mul_nodes(q, du);
        }

        // d(exp(v)) = exp(v)*d(v)
        let dv = self.derivative(expo, x)?;
        if self.is_keyword(base, Keyword::Exp1) {
            return self.mul_nodes(p, dv);
        }

        // d(u^v) = u^v*(d(v)*log(u) + v*d(u)/u)
        let log = self.call1(Self::log, base)?;
        let a = self.mul_nodes(dv, log)?;
        let b = self.mul_nodes(expo, du)?;
        let b = self.div_nodes(b, base)?;
        let sum = self.add_nodes(a, b)?;
        self.mul_nodes(p, sum)
    }

    /// Derivatives of functions of one argument, by the chain rule.
    fn d_function(&mut self, head: Keyword, p: NodeRef, x: NodeRef) -> Result<NodeRef> {
        let u = self.cadr(p);
        let du = self.derivative(u, x)?;
        let outer = match head {
            Keyword::Log => self.call1(Self::reciprocate, u)?,
            Keyword::Sin => self.call1(Self::cos, u)?,
            Keyword::Cos => {
                let sin = self.call1(Self::sin, u)?;
                self.neg_node(sin)?
            },
            Keyword::Tan => {
                let cos = self.call1(Self::cos, u)?;
                let minus_two = self.integer(-2)?;
                self.pow_nodes(cos, minus_two)?
            },
            Keyword::Sinh => self.call1(Self::cosh, u)?,
            Keyword::Cosh => self.call1(Self::sinh, u)?,
            Keyword::Tanh => {
                let cosh = self.call1(Self::cosh, u)?;
                let minus_two = self.integer(-2)?;
                self.pow_nodes(cosh, minus_two)?
            },
            Keyword::Arcsin | Keyword::Arccos => {
                // 1/sqrt(1 - u^2)
                let u2 = self.mul_nodes(u, u)?;
                let one = self.consts.one;
                let q = self.sub_nodes(one, u2)?;
                let minus_half = self.fraction(-1, 2)?;
                let q = self.pow_nodes(q, minus_half)?;
                if head == Keyword::Arccos { self.neg_node(q)? } else { q }
            },
            Keyword::Arctan => {
                let u2 = self.mul_nodes(u, u)?;
                let one = self.consts.one;
                let q = self.add_nodes(one, u2)?;
                self.call1(Self::reciprocate, q)?
            },
            Keyword::Arcsinh | Keyword::Arccosh => {
                // 1/sqrt(u^2 + 1) and 1/sqrt(u^2 - 1)
                let u2 = self.mul_nodes(u, u)?;
                let one = if head == Keyword::Arcsinh { self.consts.one } else { self.consts.minus_one };
                let q = self.add_nodes(u2, one)?;
                let minus_half = self.fraction(-1, 2)?;
                self.pow_nodes(q, minus_half)?
            },
            Keyword::Arctanh => {
                let u2 = self.mul_nodes(u, u)?;
                let one = self.consts.one;
                let q = self.sub_nodes(one, u2)?;
                self.call1(Self::reciprocate, q)?
            },
            Keyword::Erf | Keyword::Erfc => {
                // 2/sqrt(pi)*exp(-u^2)
                let u2 = self.mul_nodes(u, u)?;
                let u2 = self.neg_node(u2)?;
                let exp = self.call1(Self::exp, u2)?;
                let pi = self.keyword(Keyword::Pi);
                let minus_half = self.fraction(-1, 2)?;
                let scale = self.pow_nodes(pi, minus_half)?;
                let two = self.integer(if head == Keyword::Erf { 2 } else { -2 })?;
                let scale = self.mul_nodes(two, scale)?;
                self.mul_nodes(scale, exp)?
            },
            // u/abs(u)
            Keyword::Abs => self.div_nodes(u, p)?,
            _ => return self.apply(Keyword::Derivative, &[p, x]),
        };
        self.mul_nodes(outer, du)
    }
}

#[cfg(test)]
mod tests {
    use crate::Interpreter;

    fn eval(source: &str) -> String {
        Interpreter::new().eval_str(source).unwrap()
    }

    #[test]
    fn polynomials() {
        assert_eq!(eval("d(x^3)"), "3*x^2");
        assert_eq!(eval("d(x^2 + 5*x + 1, x)"), "2*x + 5");
        assert_eq!(eval("d(a*y^2, y)"), "2*a*y");
        assert_eq!(eval("d(7)"), "0");
    }

    #[test]
    fn products_and_quotients() {
        assert_eq!(eval("d(x*sin(x)) == x*cos(x) + sin(x)"), "1");
        assert_eq!(eval("d(1/x)"), "-1/x^2");
    }

    #[test]
    fn chain_rule() {
        assert_eq!(eval("d(sin(2*x))"), "2*cos(2*x)");
        assert_eq!(eval("d(exp(x^2))"), "2*x*exp(x^2)");
        assert_eq!(eval("d(log(x))"), "1/x");
        assert_eq!(eval("d(cos(x))"), "-sin(x)");
        assert_eq!(eval("d(arctan(x))"), "1/(x^2 + 1)");
    }

    #[test]
    fn repeated_and_mixed() {
        assert_eq!(eval("d(x^4, x, 2)"), "12*x^2");
        assert_eq!(eval("d(x^2*y^3, x, y)"), "6*x*y^2");
        assert_eq!(eval("d(x^2 + y^2, (x, y))"), "(2*x,2*y)");
    }

    #[test]
    fn unknown_functions_stay_unevaluated() {
        assert_eq!(eval("d(f(x))"), "d(f(x),x)");
    }
}
