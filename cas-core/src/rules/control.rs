//! Loops, substitution and symbol management.

use crate::{
    error::{kind, Error, Result},
    interp::Interpreter,
    node::{Node, NodeRef},
};

/// How the values of a loop body are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Accumulate {
    Discard,
    Sum,
    Product,
}

impl Interpreter {
    /// Evaluates a loop limit to a machine integer.
    fn loop_limit(&mut self, p: NodeRef, function: &'static str) -> Result<i64> {
        let q = self.eval_value(p)?;
        self.small_integer(q)
            .ok_or_else(|| Error::new(kind::InvalidArgument { function, expected: "integer limits" }))
    }

    /// Runs `body` for `k` from `a` through `b`, with the loop variable `k` saved and restored
    /// around the loop.
    fn run_loop(&mut self, p1: NodeRef, function: &'static str, accumulate: Accumulate) -> Result<NodeRef> {
        let args = self.args(p1);
        let [k, a, b, body @ ..] = args.as_slice() else {
            return Err(Error::new(kind::InvalidArgument {
                function,
                expected: "a variable, two limits and a body",
            }));
        };
        if body.is_empty() {
            return Err(Error::new(kind::InvalidArgument { function, expected: "a body" }));
        }
        self.expect_symbol(*k, function)?;
        let a = self.loop_limit(*a, function)?;
        let b = self.loop_limit(*b, function)?;

        let mut result = match accumulate {
            Accumulate::Product => self.consts.one,
            Accumulate::Sum => self.consts.zero,
            Accumulate::Discard => self.consts.nil,
        };

        self.save_symbol(*k)?;
        for j in a..=b {
            self.check_interrupt()?;
            let value = self.integer(j)?;
            self.set_binding(*k, value)?;
            for &expr in body {
                let value = self.eval_value(expr)?;
                result = match accumulate {
                    Accumulate::Sum => self.add_nodes(result, value)?,
                    Accumulate::Product => self.mul_nodes(result, value)?,
                    Accumulate::Discard => result,
                };
            }
        }
        self.restore_symbol()?;
        Ok(result)
    }

    /// Folds the elements of a tensor argument with `f`, or returns a scalar argument unchanged.
    fn fold_elements(&mut self, p1: NodeRef, f: fn(&mut Self, NodeRef, NodeRef) -> Result<NodeRef>) -> Result<()> {
        let p = self.eval_arg(p1, 1)?;
        let Some(t) = self.tensor(p) else {
            return self.push(p);
        };
        let elems = t.elems.clone();
        let Some((&first, rest)) = elems.split_first() else {
            return self.push(self.consts.zero);
        };
        let mut acc = first;
        for &e in rest {
            acc = f(self, acc, e)?;
        }
        self.push(acc)
    }

    /// `for(k, a, b, body...)`
    pub(crate) fn eval_for(&mut self, p1: NodeRef) -> Result<()> {
        self.run_loop(p1, "for", Accumulate::Discard)?;
        self.push(self.consts.nil)
    }

    /// `sum(k, a, b, f)`, or `sum(t)` for the sum of the elements of a tensor.
    pub(crate) fn eval_sum(&mut self, p1: NodeRef) -> Result<()> {
        if self.length(p1) == 2 {
            return self.fold_elements(p1, Self::add_nodes);
        }
        let q = self.run_loop(p1, "sum", Accumulate::Sum)?;
        self.push(q)
    }

    /// `product(k, a, b, f)`, or `product(t)` for the product of the elements of a tensor.
    pub(crate) fn eval_product(&mut self, p1: NodeRef) -> Result<()> {
        if self.length(p1) == 2 {
            return self.fold_elements(p1, Self::mul_nodes);
        }
        let q = self.run_loop(p1, "product", Accumulate::Product)?;
        self.push(q)
    }

    /// `do(a, b, ...)` evaluates every argument and results in the last.
    pub(crate) fn eval_do(&mut self, p1: NodeRef) -> Result<()> {
        let mut result = self.consts.nil;
        for arg in self.args(p1) {
            result = self.eval_value(arg)?;
        }
        self.push(result)
    }

    /// `eval(f, x, a, y, b, ...)` evaluates `f` with `a` substituted for `x`, `b` for `y` and so on.
    pub(crate) fn eval_eval(&mut self, p1: NodeRef) -> Result<()> {
        let args = self.args(p1);
        let Some((&f, pairs)) = args.split_first() else {
            return self.push(self.consts.nil);
        };
        if pairs.len() % 2 != 0 {
            return Err(Error::new(kind::InvalidArgument {
                function: "eval",
                expected: "pairs of a variable and a value",
            }));
        }

        let mut p = self.eval_value(f)?;
        for pair in pairs.chunks(2) {
            let old = self.eval_value(pair[0])?;
            let new = self.eval_value(pair[1])?;
            p = self.subst(p, old, new)?;
        }
        let q = self.eval_value(p)?;
        self.push(q)
    }

    /// `subst(new, old, expr)` replaces `old` with `new` in `expr`.
    pub(crate) fn eval_subst(&mut self, p1: NodeRef) -> Result<()> {
        let new = self.eval_arg(p1, 1)?;
        let old = self.eval_arg(p1, 2)?;
        let expr = self.eval_arg(p1, 3)?;
        let p = self.subst(expr, old, new)?;
        let q = self.eval_value(p)?;
        self.push(q)
    }

    /// Replaces every occurrence of `old` in `p` with `new`. The result is not evaluated.
    pub(crate) fn subst(&mut self, p: NodeRef, old: NodeRef, new: NodeRef) -> Result<NodeRef> {
        if self.equal(p, old) {
            return Ok(new);
        }
        match self.node(p) {
            Node::Cons { car, cdr } => {
                let (car, cdr) = (*car, *cdr);
                let car_new = self.subst(car, old, new)?;
                let cdr_new = self.subst(cdr, old, new)?;
                if car_new == car && cdr_new == cdr {
                    Ok(p)
                } else {
                    self.cons(car_new, cdr_new)
                }
            },
            Node::Tensor(t) => {
                let (dims, elems) = (t.dims.clone(), t.elems.clone());
                let mut replaced = Vec::with_capacity(elems.len());
                for e in elems {
                    replaced.push(self.subst(e, old, new)?);
                }
                self.tensor_node(dims, replaced)
            },
            _ => Ok(p),
        }
    }

    /// `binding(s)` is the value bound to `s`, without evaluating it.
    pub(crate) fn eval_binding(&mut self, p1: NodeRef) -> Result<()> {
        let s = self.cadr(p1);
        self.expect_symbol(s, "binding")?;
        let binding = self.binding(s);
        let q = if self.is_nil(binding) { s } else { binding };
        self.push(q)
    }

    /// `noexpand(x)` evaluates `x` without distributing products over sums.
    pub(crate) fn eval_noexpand(&mut self, p1: NodeRef) -> Result<()> {
        let arg = self.cadr(p1);
        let q = self.with_expanding(false, |interp| interp.eval_value(arg))?;
        self.push(q)
    }

    /// `clear` removes every binding and user function, then binds the constants again.
    pub(crate) fn eval_clear(&mut self) -> Result<()> {
        let nil = self.consts.nil;
        let ids = self.symbols.ids().collect::<Vec<_>>();
        for id in ids {
            self.symbols.set(id, nil, nil)?;
        }
        log::debug!("cleared all symbols");
        self.bind_constants()?;
        self.push(nil)
    }
}

#[cfg(test)]
mod tests {
    use crate::{error::kind, Interpreter};

    fn eval(source: &str) -> String {
        Interpreter::new().eval_str(source).unwrap()
    }

    #[test]
    fn sums_and_products() {
        assert_eq!(eval("sum(k, 1, 10, k)"), "55");
        assert_eq!(eval("sum(k, 1, 3, x^k)"), "x^3 + x^2 + x");
        assert_eq!(eval("product(k, 1, 5, k)"), "120");
        assert_eq!(eval("sum(k, 3, 1, k)"), "0");
        assert_eq!(eval("sum((1, 2, 3))"), "6");
        assert_eq!(eval("product((a, b, c))"), "a*b*c");
    }

    #[test]
    fn loop_variable_is_restored() {
        assert_eq!(eval("k = 7\nsum(k, 1, 2, k)\nk"), "7");
        assert_eq!(eval("s = 0\nfor(j, 1, 4, s = s + j)\ns"), "10");
    }

    #[test]
    fn loop_limits_must_be_integers() {
        let err = Interpreter::new().eval_str("sum(k, 1, n, k)").unwrap_err();
        assert!(err.is::<kind::InvalidArgument>());
    }

    #[test]
    fn substitution() {
        assert_eq!(eval("subst(y, x, x^2 + x)"), "y^2 + y");
        assert_eq!(eval("subst(2, x, x^2 + x)"), "6");
        assert_eq!(eval("eval(x^2 + y, x, 3, y, 1)"), "10");
        assert_eq!(eval("f = x^2\neval(f, x, a + 1)"), "a^2 + 2*a + 1");
    }

    #[test]
    fn sequencing_and_quoting() {
        assert_eq!(eval("do(a = 2, b = 3, a*b)"), "6");
        assert_eq!(eval("a = b\nb = 5\nbinding(a)"), "b");
        assert_eq!(eval("quote(1 + 1)"), "1 + 1");
    }

    #[test]
    fn clear_forgets_bindings() {
        let mut interp = Interpreter::new();
        assert_eq!(interp.eval_str("a = 3\nf(x) = x + 1\nclear\na").unwrap(), "a");
        assert_eq!(interp.eval_str("f(1)").unwrap(), "f(1)");
        assert_eq!(interp.eval_str("i^2").unwrap(), "-1");
    }
}
