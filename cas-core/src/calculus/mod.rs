//! Derivatives and integrals.

mod derivative;
mod integral;

use crate::{
    error::{kind, Error, Result},
    interp::Interpreter,
    node::NodeRef,
};

impl Interpreter {
    /// `defint(f, x, a, b, ...)`, the definite integral of `f` for `x` from `a` to `b`. Further
    /// triples of a variable and limits integrate the result again.
    pub(crate) fn eval_defint(&mut self, p1: NodeRef) -> Result<()> {
        let args = self.args(p1);
        let Some((&f, limits)) = args.split_first() else {
            return self.push(self.consts.nil);
        };
        if limits.is_empty() || limits.len() % 3 != 0 {
            return Err(Error::new(kind::InvalidArgument {
                function: "defint",
                expected: "a variable and two limits for each integration",
            }));
        }

        let mut f = self.eval_value(f)?;
        for triple in limits.chunks(3) {
            let x = self.eval_value(triple[0])?;
            self.expect_symbol(x, "defint")?;
            let lower = self.eval_value(triple[1])?;
            let upper = self.eval_value(triple[2])?;

            let antiderivative = self.integral(f, x)?;
            let at_upper = self.subst(antiderivative, x, upper)?;
            let at_upper = self.eval_value(at_upper)?;
            let at_lower = self.subst(antiderivative, x, lower)?;
            let at_lower = self.eval_value(at_lower)?;
            f = self.sub_nodes(at_upper, at_lower)?;
        }
        self.push(f)
    }
}

#[cfg(test)]
mod tests {
    use crate::Interpreter;

    fn eval(source: &str) -> String {
        Interpreter::new().eval_str(source).unwrap()
    }

    #[test]
    fn definite_integrals() {
        assert_eq!(eval("defint(x^2, x, 0, 3)"), "9");
        assert_eq!(eval("defint(sin(x), x, 0, pi)"), "2");
        assert_eq!(eval("defint(x*y, x, 0, 1, y, 0, 2)"), "1");
        assert_eq!(eval("defint(1/x, x, 1, exp(1))"), "1");
    }
}
