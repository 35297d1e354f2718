//! Symbolic integration.
//!
//! Integrals are linear: sums are integrated term by term and factors free of the variable are
//! pulled out. What remains is matched against a table of forms written in the variable `x`
//! and the parameters `a` and `b`. A parameter matches any subexpression free of the variable.
//! The antiderivative of the first matching form is evaluated with the parameters bound, and
//! if that fails (dividing by a zero parameter, for example) the next form is tried.
//!
//! Forms are kept in canonical form, so a form like `log(a*x)` would be split into a sum of
//! logarithms by evaluation. Such forms are written without the parameter.

use cas_parser::parser::{ast::Expr, Parser};
use crate::{
    error::{kind, Error, Result},
    interp::Interpreter,
    keyword::Keyword,
    node::NodeRef,
};

/// The integral table: a form, its antiderivative, and a condition on the parameters that must
/// hold for the antiderivative to be valid (empty if there is none).
const TABLE: &[(&str, &str, &str)] = &[
    ("x", "x^2/2", ""),
    ("x^(-1)", "log(x)", ""),
    ("x^a", "x^(a + 1)/(a + 1)", ""),
    ("exp(a*x)", "exp(a*x)/a", ""),
    ("exp(a*x + b)", "exp(a*x + b)/a", ""),
    ("x*exp(a*x)", "exp(a*x)*(a*x - 1)/a^2", ""),
    ("x*exp(a*x^2)", "exp(a*x^2)/(2*a)", ""),
    ("log(x)", "x*log(x) - x", ""),
    ("x*log(x)", "x^2*log(x)/2 - x^2/4", ""),
    ("x^(-1)*log(x)", "log(x)^2/2", ""),
    ("sin(a*x)", "-cos(a*x)/a", ""),
    ("cos(a*x)", "sin(a*x)/a", ""),
    ("tan(a*x)", "-log(cos(a*x))/a", ""),
    ("sin(a*x)^2", "x/2 - sin(2*a*x)/(4*a)", ""),
    ("cos(a*x)^2", "x/2 + sin(2*a*x)/(4*a)", ""),
    ("cos(a*x)^(-2)", "tan(a*x)/a", ""),
    ("sin(a*x)*cos(a*x)", "sin(a*x)^2/(2*a)", ""),
    ("x*sin(a*x)", "sin(a*x)/a^2 - x*cos(a*x)/a", ""),
    ("x*cos(a*x)", "cos(a*x)/a^2 + x*sin(a*x)/a", ""),
    ("exp(a*x)*sin(b*x)", "exp(a*x)*(a*sin(b*x) - b*cos(b*x))/(a^2 + b^2)", ""),
    ("exp(a*x)*cos(b*x)", "exp(a*x)*(a*cos(b*x) + b*sin(b*x))/(a^2 + b^2)", ""),
    ("sinh(a*x)", "cosh(a*x)/a", ""),
    ("cosh(a*x)", "sinh(a*x)/a", ""),
    ("tanh(a*x)", "log(cosh(a*x))/a", ""),
    ("arctan(a*x)", "x*arctan(a*x) - log(a^2*x^2 + 1)/(2*a)", ""),
    ("erf(a*x)", "x*erf(a*x) + exp(-a^2*x^2)/(a*pi^(1/2))", ""),
    ("(a + b*x)^(-1)", "log(a + b*x)/b", ""),
    ("(a + b*x)^(-2)", "-1/(b*(a + b*x))", ""),
    ("x*(a + b*x)^(-1)", "x/b - a*log(a + b*x)/b^2", ""),
    ("(a + b*x^2)^(-1)", "arctanh(x*(-b/a)^(1/2))/(-a*b)^(1/2)", "b < 0"),
    ("(a + b*x^2)^(-1)", "arctan(x*(b/a)^(1/2))/(a*b)^(1/2)", ""),
    ("x*(a + b*x^2)^(-1)", "log(a + b*x^2)/(2*b)", ""),
    ("(a + b*x^2)^(-1/2)", "arcsin(x*(-b/a)^(1/2))/(-b)^(1/2)", "b < 0"),
    ("(a + b*x^2)^(-1/2)", "arcsinh(x*(b/a)^(1/2))/b^(1/2)", ""),
    ("(a + b*x)^(1/2)", "2*(a + b*x)^(3/2)/(3*b)", ""),
];

/// The values bound to the parameters `a` and `b` while matching a form.
#[derive(Debug, Clone, Copy, Default)]
struct Bindings {
    a: Option<NodeRef>,
    b: Option<NodeRef>,
}

impl Interpreter {
    /// `integral(f, x, ...)`, integrating with respect to `x` by default. Further variables
    /// integrate again.
    pub(crate) fn eval_integral(&mut self, p1: NodeRef) -> Result<()> {
        let mut f = self.eval_arg(p1, 1)?;
        let args = self.args(p1);
        if args.len() == 1 {
            let x = self.consts.x;
            f = self.integral(f, x)?;
            return self.push(f);
        }
        for &arg in &args[1..] {
            let x = self.eval_value(arg)?;
            self.expect_symbol(x, "integral")?;
            f = self.integral(f, x)?;
        }
        self.push(f)
    }

    /// Returns an antiderivative of `f` with respect to the symbol `x`.
    pub(crate) fn integral(&mut self, f: NodeRef, x: NodeRef) -> Result<NodeRef> {
        self.check_interrupt()?;
        if let Some((dims, elems)) = self.tensor_parts(f) {
            let mut integrated = Vec::with_capacity(elems.len());
            for e in elems {
                integrated.push(self.integral(e, x)?);
            }
            return self.tensor_node(dims, integrated);
        }
        if !self.contains(f, x) {
            return self.mul_nodes(f, x);
        }

        if self.is_head(f, Keyword::Add) {
            let terms = self.args(f);
            let n = terms.len();
            for term in terms {
                let q = self.integral(term, x)?;
                self.push(q)?;
            }
            self.add_terms(n)?;
            return self.pop();
        }

        if self.is_head(f, Keyword::Multiply) {
            let (constant, varying): (Vec<_>, Vec<_>) = self.args(f)
                .into_iter()
                .partition(|&factor| !self.contains(factor, x));
            if !constant.is_empty() {
                let c = self.product_of(&constant)?;
                let g = self.product_of(&varying)?;
                let q = self.integral(g, x)?;
                return self.mul_nodes(c, q);
            }
        }

        match self.integral_of_form(f, x)? {
            Some(q) => Ok(q),
            None => {
                log::debug!("no integral found for `{}`", self.display(f));
                Err(Error::new(kind::NoIntegralFound))
            },
        }
    }

    /// Returns the product of the given factors.
    fn product_of(&mut self, factors: &[NodeRef]) -> Result<NodeRef> {
        for &factor in factors {
            self.push(factor)?;
        }
        self.multiply_factors(factors.len())?;
        self.pop()
    }

    /// Loads the integral table on first use.
    fn load_integrals(&mut self) -> Result<()> {
        if !self.integrals.is_empty() {
            return Ok(());
        }
        let a = self.intern("a")?;
        let b = self.intern("b")?;
        let x = self.intern("x")?;
        let (pattern_a, pattern_b, pattern_x) = (self.consts.pattern_a, self.consts.pattern_b, self.consts.pattern_x);

        let mut integrals = Vec::with_capacity(TABLE.len());
        for &(form, result, condition) in TABLE {
            let mut template = [self.consts.nil; 3];
            for (slot, source) in template.iter_mut().zip([form, result, condition]) {
                if source.is_empty() {
                    continue;
                }
                let expr = Parser::new(source)
                    .try_parse_full::<Expr>()
                    .map_err(|_| Error::new(kind::InternalError { message: "malformed integral template" }))?;
                let mut p = self.scan(&expr)?;
                p = self.subst(p, a, pattern_a)?;
                p = self.subst(p, b, pattern_b)?;
                *slot = self.subst(p, x, pattern_x)?;
            }
            // forms are compared in canonical form
            template[0] = self.eval_value(template[0])?;
            integrals.push(template);
        }
        log::debug!("loaded {} integral forms", integrals.len());
        self.integrals = integrals;
        Ok(())
    }

    /// Looks `f` up in the integral table.
    fn integral_of_form(&mut self, f: NodeRef, x: NodeRef) -> Result<Option<NodeRef>> {
        self.load_integrals()?;
        for k in 0..self.integrals.len() {
            let [form, result, condition] = self.integrals[k];
            let mut bindings = Bindings::default();
            if !self.match_form(form, f, x, &mut bindings)? {
                continue;
            }
            let outcome = self.speculate(|interp| interp.instantiate(result, condition, x, bindings))?;
            if let Some(Some(q)) = outcome {
                return Ok(Some(q));
            }
        }
        Ok(None)
    }

    /// Evaluates an antiderivative with the parameters and the variable bound. Returns `None`
    /// if the condition of the form does not hold.
    fn instantiate(&mut self, result: NodeRef, condition: NodeRef, x: NodeRef, bindings: Bindings) -> Result<Option<NodeRef>> {
        let params = [
            (self.consts.pattern_a, bindings.a),
            (self.consts.pattern_b, bindings.b),
            (self.consts.pattern_x, Some(x)),
        ];
        for (param, value) in params {
            self.save_symbol(param)?;
            let nil = self.consts.nil;
            self.set_symbol(param, value.unwrap_or(nil), nil)?;
        }

        let holds = self.is_nil(condition) || self.eval_condition(condition)?;
        let q = if holds { Some(self.eval_value(result)?) } else { None };

        for _ in 0..params.len() {
            self.restore_symbol()?;
        }
        Ok(q)
    }

    /// Binds a parameter to `value`, or checks that it is already bound to an equal value.
    fn bind_param(&self, param: NodeRef, value: NodeRef, bindings: &mut Bindings) -> bool {
        let slot = if param == self.consts.pattern_a { &mut bindings.a } else { &mut bindings.b };
        match *slot {
            Some(bound) => self.equal(bound, value),
            None => {
                *slot = Some(value);
                true
            },
        }
    }

    fn is_param(&self, p: NodeRef) -> bool {
        p == self.consts.pattern_a || p == self.consts.pattern_b
    }

    /// Matches the canonical form `pattern` against `p`.
    ///
    /// A product pattern matches the factors of `p` that contain `x` one to one, and its
    /// parameter absorbs the remaining factors. A sum pattern does the same with terms. So
    /// `a*x` matches `x` with `a = 1`, and `a + b*x` matches `x` with `a = 0`.
    fn match_form(&mut self, pattern: NodeRef, p: NodeRef, x: NodeRef, bindings: &mut Bindings) -> Result<bool> {
        if pattern == self.consts.pattern_x {
            return Ok(self.equal(p, x));
        }
        if self.is_param(pattern) {
            return Ok(!self.contains(p, x) && self.bind_param(pattern, p, bindings));
        }

        for keyword in [Keyword::Multiply, Keyword::Add] {
            if self.is_head(pattern, keyword) {
                return self.match_operands(keyword, pattern, p, x, bindings);
            }
        }

        if !self.is_cons(pattern) {
            return Ok(self.equal(pattern, p));
        }
        if !self.is_cons(p) || self.length(p) != self.length(pattern) {
            return Ok(false);
        }
        for (sub_pattern, q) in self.items(pattern).into_iter().zip(self.items(p)) {
            if !self.match_form(sub_pattern, q, x, bindings)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Matches the operands of a product or sum pattern.
    fn match_operands(
        &mut self,
        keyword: Keyword,
        pattern: NodeRef,
        p: NodeRef,
        x: NodeRef,
        bindings: &mut Bindings,
    ) -> Result<bool> {
        let operands = if self.is_head(p, keyword) { self.args(p) } else { vec![p] };
        let (constant, varying): (Vec<_>, Vec<_>) = operands
            .into_iter()
            .partition(|&q| !self.contains(q, x));
        let (pattern_constant, pattern_varying): (Vec<_>, Vec<_>) = self.args(pattern)
            .into_iter()
            .partition(|&q| !self.contains(q, self.consts.pattern_x));

        if varying.len() != pattern_varying.len() {
            return Ok(false);
        }
        for (sub_pattern, q) in pattern_varying.into_iter().zip(varying) {
            if !self.match_form(sub_pattern, q, x, bindings)? {
                return Ok(false);
            }
        }

        // the constant part of `p`, divided by the numbers of the pattern
        let combine = if keyword == Keyword::Multiply { Self::mul_nodes } else { Self::add_nodes };
        let uncombine = if keyword == Keyword::Multiply { Self::div_nodes } else { Self::sub_nodes };
        let identity = if keyword == Keyword::Multiply { self.consts.one } else { self.consts.zero };
        let mut value = identity;
        for q in constant {
            value = combine(self, value, q)?;
        }

        let (params, numbers): (Vec<_>, Vec<_>) = pattern_constant
            .into_iter()
            .partition(|&q| self.is_param(q));
        if numbers.iter().any(|&q| !self.is_num(q)) {
            return Ok(false);
        }
        for q in numbers {
            value = uncombine(self, value, q)?;
        }

        match params[..] {
            [] => Ok(self.equal(value, identity)),
            [param] => Ok(self.bind_param(param, value, bindings)),
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{error::kind, Interpreter};

    fn eval(source: &str) -> String {
        Interpreter::new().eval_str(source).unwrap()
    }

    #[test]
    fn polynomials() {
        assert_eq!(eval("integral(x^2)"), "x^3/3");
        assert_eq!(eval("integral(3*x^2 + 1)"), "x^3 + x");
        assert_eq!(eval("integral(x)"), "x^2/2");
        assert_eq!(eval("integral(1/x)"), "log(x)");
        assert_eq!(eval("integral(y, x)"), "x*y");
    }

    #[test]
    fn table_forms() {
        assert_eq!(eval("integral(exp(2*x))"), "exp(2*x)/2");
        assert_eq!(eval("integral(cos(x))"), "sin(x)");
        assert_eq!(eval("integral(sin(3*x))"), "-cos(3*x)/3");
        assert_eq!(eval("integral(1/(x + 1))"), "log(x + 1)");
        assert_eq!(eval("integral(1/(1 + x^2))"), "arctan(x)");
        assert_eq!(eval("integral(1/(1 - x^2))"), "arctanh(x)");
    }

    #[test]
    fn derivative_undoes_integral() {
        assert_eq!(eval("f = x*exp(3*x)\nd(integral(f)) == f"), "1");
        assert_eq!(eval("f = log(2*x)\nd(integral(f)) == f"), "1");
    }

    #[test]
    fn integration_variable() {
        assert_eq!(eval("integral(t^3, t)"), "t^4/4");
        assert_eq!(eval("integral(x*y, x, y)"), "x^2*y^2/4");
    }

    #[test]
    fn unknown_forms_fail() {
        let err = Interpreter::new().eval_str("integral(exp(x^3))").unwrap_err();
        assert!(err.is::<kind::NoIntegralFound>());
    }

    #[test]
    fn failed_matches_leave_no_bindings() {
        let mut interp = Interpreter::new();
        interp.eval_str("integral(1/(1 + x^2))").unwrap();
        assert_eq!(interp.eval_str("a + b").unwrap(), "a + b");
    }
}
