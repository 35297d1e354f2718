//! The evaluator: resolves the node on top of the stack to its canonical form.

use crate::{
    error::{kind, Error, Result},
    interp::Interpreter,
    keyword::Keyword,
    node::{Node, NodeRef},
};

impl Interpreter {
    /// Pops a node, evaluates it and pushes the result.
    pub fn eval(&mut self) -> Result<()> {
        self.check_interrupt()?;
        if self.depth >= self.config.max_depth {
            return Err(Error::new(kind::CircularDefinition));
        }

        self.depth += 1;
        let p1 = self.pop()?;
        let result = self.eval_node(p1);
        self.depth -= 1;
        result
    }

    /// Evaluates `p1` and pushes the result.
    ///
    /// Applications of keywords dispatch to the keyword's combinator, applications of user
    /// symbols call the user function, bound symbols evaluate their binding, tensors evaluate
    /// their elements, and everything else evaluates to itself.
    pub fn eval_node(&mut self, p1: NodeRef) -> Result<()> {
        match self.node(p1) {
            Node::Cons { car, .. } => {
                let car = *car;
                if let Some(keyword) = self.keyword_of(car) {
                    self.eval_keyword(keyword, p1)
                } else if self.is_symbol(car) {
                    self.eval_user_function(p1)
                } else {
                    self.push(p1)
                }
            },
            Node::Keyword(keyword) if !keyword.is_constant() => {
                // a bare function name applies to the last result
                let keyword = *keyword;
                let last = self.consts.last;
                let p1 = self.apply(keyword, &[last])?;
                self.eval_keyword(keyword, p1)
            },
            Node::Symbol(_) => self.eval_symbol(p1),
            Node::Tensor(_) => self.eval_tensor(p1),
            _ => self.push(p1),
        }
    }

    /// Evaluates a node and returns the result.
    pub(crate) fn eval_value(&mut self, p: NodeRef) -> Result<NodeRef> {
        self.push(p)?;
        self.eval()?;
        self.pop()
    }

    /// Evaluates the `n`th argument (counting from one) of an application.
    pub(crate) fn eval_arg(&mut self, p1: NodeRef, n: usize) -> Result<NodeRef> {
        let mut p = self.cdr(p1);
        for _ in 1..n {
            p = self.cdr(p);
        }
        let arg = self.car(p);
        self.eval_value(arg)
    }

    /// Evaluates the single argument of `p1` and applies the stack combinator `f` to it.
    fn eval_unary(&mut self, p1: NodeRef, f: fn(&mut Self) -> Result<()>) -> Result<()> {
        let arg = self.cadr(p1);
        self.push(arg)?;
        self.eval()?;
        f(self)
    }

    fn eval_symbol(&mut self, p1: NodeRef) -> Result<()> {
        let binding = self.binding(p1);
        if self.is_nil(binding) || binding == p1 {
            self.push(p1)
        } else {
            self.push(binding)?;
            self.eval()
        }
    }

    fn eval_keyword(&mut self, keyword: Keyword, p1: NodeRef) -> Result<()> {
        use Keyword::*;
        match keyword {
            Abs => self.eval_unary(p1, Self::abs),
            Add => self.eval_add(p1),
            Adj => self.eval_unary(p1, Self::adj),
            And => self.eval_and(p1),
            Arccos => self.eval_unary(p1, Self::arccos),
            Arccosh => self.eval_unary(p1, Self::arccosh),
            Arcsin => self.eval_unary(p1, Self::arcsin),
            Arcsinh => self.eval_unary(p1, Self::arcsinh),
            Arctan => self.eval_arctan(p1),
            Arctanh => self.eval_unary(p1, Self::arctanh),
            Arg => self.eval_unary(p1, Self::arg),
            Binding => self.eval_binding(p1),
            Ceiling => self.eval_unary(p1, Self::ceiling),
            Check => self.eval_check(p1),
            Choose => self.eval_choose(p1),
            Clear => self.eval_clear(),
            Clock => self.eval_unary(p1, Self::clock),
            Coeff => self.eval_coeff(p1),
            Cofactor => self.eval_cofactor(p1),
            Conj => self.eval_unary(p1, Self::conj),
            Contract => self.eval_contract(p1),
            Cos => self.eval_unary(p1, Self::cos),
            Cosh => self.eval_unary(p1, Self::cosh),
            Defint => self.eval_defint(p1),
            Deg => self.eval_deg(p1),
            Denominator => self.eval_unary(p1, Self::denominator),
            Derivative => self.eval_derivative(p1),
            Det => self.eval_unary(p1, Self::det),
            Dim => self.eval_dim(p1),
            Do => self.eval_do(p1),
            Erf => self.eval_unary(p1, Self::erf),
            Erfc => self.eval_unary(p1, Self::erfc),
            Eval => self.eval_eval(p1),
            Exp => self.eval_unary(p1, Self::exp),
            Factorial => self.eval_unary(p1, Self::factorial),
            Float => self.eval_unary(p1, Self::float),
            Floor => self.eval_unary(p1, Self::floor),
            For => self.eval_for(p1),
            Gcd => self.eval_gcd(p1),
            Hadamard => self.eval_hadamard(p1),
            Imag => self.eval_unary(p1, Self::imag),
            Index => self.eval_index(p1),
            Infixform | String => self.eval_unary(p1, Self::infixform),
            Inner => self.eval_inner(p1),
            Integral => self.eval_integral(p1),
            Inv => self.eval_unary(p1, Self::inv),
            Isprime => self.eval_unary(p1, Self::isprime),
            Kronecker => self.eval_kronecker(p1),
            Lcm => self.eval_lcm(p1),
            Log => self.eval_unary(p1, Self::log),
            Mag => self.eval_unary(p1, Self::mag),
            Minor => self.eval_minor(p1),
            Minormatrix => self.eval_minormatrix(p1),
            Mod => self.eval_mod(p1),
            Multiply => self.eval_multiply(p1),
            Noexpand => self.eval_noexpand(p1),
            Not => self.eval_not(p1),
            Nroots => self.eval_nroots(p1),
            Number => self.eval_unary(p1, Self::number),
            Numerator => self.eval_unary(p1, Self::numerator),
            Or => self.eval_or(p1),
            Outer => self.eval_outer(p1),
            Polar => self.eval_unary(p1, Self::polar),
            Power => self.eval_power(p1),
            Prefixform => self.eval_unary(p1, Self::prefixform),
            Product => self.eval_product(p1),
            Quote => self.push(self.cadr(p1)),
            Rank => self.eval_unary(p1, Self::rank),
            Real => self.eval_unary(p1, Self::real),
            Rect => self.eval_unary(p1, Self::rect),
            Roots => self.eval_roots(p1),
            Setq => self.eval_setq(p1),
            Sin => self.eval_unary(p1, Self::sin),
            Sinh => self.eval_unary(p1, Self::sinh),
            Sqrt => self.eval_unary(p1, Self::sqrt),
            Stop => Err(Error::new(kind::UserStop)),
            Subst => self.eval_subst(p1),
            Sum => self.eval_sum(p1),
            Tan => self.eval_unary(p1, Self::tan),
            Tanh => self.eval_unary(p1, Self::tanh),
            Test => self.eval_test(p1),
            Testeq => self.eval_testeq(p1),
            Testge | Testgt | Testle | Testlt => self.eval_relational(p1, keyword),
            Transpose => self.eval_transpose(p1),
            Unit => self.eval_unit(p1),
            Zero => self.eval_zero(p1),
            Nil | Pi | Exp1 => self.push(p1),
        }
    }

    /// Applies a user function. The arguments are evaluated and bound to the placeholders `$1`
    /// to `$9` while the body is evaluated. A symbol without a body applies to nothing, and the
    /// application evaluates to itself with evaluated arguments.
    fn eval_user_function(&mut self, p1: NodeRef) -> Result<()> {
        let f = self.car(p1);
        let body = self.usrfunc(f);

        let args = self.args(p1);
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval_value(arg)?);
        }

        if self.is_nil(body) {
            let mut items = vec![f];
            items.extend(values);
            let p = self.list(&items)?;
            return self.push(p);
        }

        if values.len() > self.consts.args.len() {
            return Err(Error::new(kind::InvalidArgument {
                function: "user function",
                expected: "at most 9 arguments",
            }));
        }

        let placeholders = self.consts.args;
        let nil = self.consts.nil;
        for (i, &placeholder) in placeholders.iter().enumerate() {
            self.save_symbol(placeholder)?;
            let value = values.get(i).copied().unwrap_or(nil);
            self.set_symbol(placeholder, value, nil)?;
        }

        self.push(body)?;
        self.eval()?;

        for _ in 0..placeholders.len() {
            self.restore_symbol()?;
        }
        Ok(())
    }

    /// Assignment. Binds a symbol to the evaluated right-hand side, defines a user function, or
    /// sets a tensor component. Pushes `nil`.
    fn eval_setq(&mut self, p1: NodeRef) -> Result<()> {
        let lhs = self.cadr(p1);
        let rhs = self.caddr(p1);

        if self.is_head(lhs, Keyword::Index) {
            return self.set_component(p1);
        }

        if self.is_cons(lhs) {
            let f = self.car(lhs);
            self.expect_symbol(f, "function definition")?;

            // the body refers to its parameters by placeholder
            let mut body = rhs;
            for (param, placeholder) in self.args(lhs).into_iter().zip(self.consts.args) {
                self.expect_symbol(param, "function definition")?;
                body = self.subst(body, param, placeholder)?;
            }

            let nil = self.consts.nil;
            self.set_symbol(f, nil, body)?;
            return self.push(nil);
        }

        self.expect_symbol(lhs, "setq")?;
        let value = self.eval_value(rhs)?;
        self.set_binding(lhs, value)?;
        self.push(self.consts.nil)
    }
}

#[cfg(test)]
mod tests {
    use crate::{error::kind, Interpreter};

    #[test]
    fn unbound_symbols_evaluate_to_themselves() {
        let mut interp = Interpreter::new();
        assert_eq!(interp.eval_str("y").unwrap(), "y");
    }

    #[test]
    fn bindings_are_reevaluated() {
        let mut interp = Interpreter::new();
        assert_eq!(interp.eval_str("a = b + 1\nb = 2\na").unwrap(), "3");
    }

    #[test]
    fn circular_definition() {
        let mut interp = Interpreter::new();
        let outputs = interp.run("y = z\nz = y\ny");
        let err = outputs.into_iter().last().unwrap().unwrap_err();
        assert!(err.is::<kind::CircularDefinition>());
    }

    #[test]
    fn user_functions() {
        let mut interp = Interpreter::new();
        assert_eq!(interp.eval_str("f(a, b) = a^2 + b\nf(3, 1)").unwrap(), "10");
        assert_eq!(interp.eval_str("f(y, 0)").unwrap(), "y^2");
        assert_eq!(interp.eval_str("g(2)").unwrap(), "g(2)");
    }

    #[test]
    fn parameters_do_not_leak() {
        let mut interp = Interpreter::new();
        assert_eq!(interp.eval_str("a = 5\nf(a) = a + 1\nf(1)\na").unwrap(), "5");
    }

    #[test]
    fn last_result_is_kept() {
        let mut interp = Interpreter::new();
        assert_eq!(interp.eval_str("2 + 3\nlast * 2").unwrap(), "10");
        assert_eq!(interp.eval_str("-4\nabs").unwrap(), "4");
    }

    #[test]
    fn assignment_prints_nothing() {
        let mut interp = Interpreter::new();
        let outputs = interp.run("y = 1");
        assert_eq!(outputs.len(), 1);
        assert!(matches!(outputs[0], Ok(None)));
    }
}
