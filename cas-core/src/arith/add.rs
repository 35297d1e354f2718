use crate::{
    error::{kind, Error, Result},
    interp::Interpreter,
    keyword::Keyword,
    node::NodeRef,
};

impl Interpreter {
    /// Evaluates every term of `(add a b ...)` and adds them.
    pub(crate) fn eval_add(&mut self, p1: NodeRef) -> Result<()> {
        let terms = self.args(p1);
        let n = terms.len();
        for term in terms {
            self.push(term)?;
            self.eval()?;
        }
        self.add_terms(n)
    }

    /// Pops two terms and pushes their sum.
    pub fn add(&mut self) -> Result<()> {
        self.add_terms(2)
    }

    /// Pops `b` then `a` and pushes `a - b`.
    pub fn subtract(&mut self) -> Result<()> {
        self.negate()?;
        self.add()
    }

    /// Pops `n` terms and pushes their sum.
    pub fn add_terms(&mut self, n: usize) -> Result<()> {
        let terms = self.pop_n(n)?;
        let mut terms = self.flatten_terms(terms);

        let mut tensor = None;
        let mut scalars = Vec::with_capacity(terms.len());
        for term in terms.drain(..) {
            if self.is_tensor(term) {
                tensor = Some(match tensor {
                    Some(t) => self.add_tensors(t, term)?,
                    None => term,
                });
            } else {
                scalars.push(term);
            }
        }

        let sum = self.sum_of_scalars(scalars)?;
        match tensor {
            None => self.push(sum),
            Some(t) if self.is_zero(sum) => self.push(t),
            Some(t) => Err(Error::new(kind::TensorDimensionMismatch {
                expected: self.tensor(t).map(|t| t.dims.clone()).unwrap_or_default(),
                found: Vec::new(),
            })),
        }
    }

    /// Splices the terms of nested sums into one list.
    fn flatten_terms(&self, terms: Vec<NodeRef>) -> Vec<NodeRef> {
        let mut flat = Vec::with_capacity(terms.len());
        for term in terms {
            if self.is_head(term, Keyword::Add) {
                flat.extend(self.args(term));
            } else {
                flat.push(term);
            }
        }
        flat
    }

    /// Combines like terms and builds the canonical sum.
    fn sum_of_scalars(&mut self, mut terms: Vec<NodeRef>) -> Result<NodeRef> {
        loop {
            terms = self.combine_terms(terms)?;

            // combining can multiply a coefficient into a product with a sum
            if terms.iter().any(|&t| self.is_head(t, Keyword::Add)) {
                terms = self.flatten_terms(terms);
            } else {
                break;
            }
        }

        match terms.len() {
            0 => Ok(self.consts.zero),
            1 => Ok(terms[0]),
            _ => self.apply(Keyword::Add, &terms),
        }
    }

    /// Sorts terms and merges adjacent terms that differ only in their numeric coefficient.
    /// Zero terms are dropped.
    fn combine_terms(&mut self, mut terms: Vec<NodeRef>) -> Result<Vec<NodeRef>> {
        terms.sort_by(|&a, &b| self.compare_terms(a, b));

        let mut out: Vec<NodeRef> = Vec::with_capacity(terms.len());
        for term in terms {
            if let Some(&prev) = out.last() {
                if let Some(combined) = self.combine_pair(prev, term)? {
                    out.pop();
                    if !self.is_zero(combined) {
                        out.push(combined);
                    }
                    continue;
                }
            }
            if !self.is_zero(term) {
                out.push(term);
            }
        }
        Ok(out)
    }

    /// Splits a term into its numeric coefficient and its remaining factors.
    pub(crate) fn split_term(&self, p: NodeRef) -> (NodeRef, Vec<NodeRef>) {
        if self.is_head(p, Keyword::Multiply) {
            let mut factors = self.args(p);
            if factors.first().map_or(false, |&f| self.is_num(f)) {
                let coeff = factors.remove(0);
                return (coeff, factors);
            }
            (self.consts.one, factors)
        } else if self.is_num(p) {
            (p, Vec::new())
        } else {
            (self.consts.one, vec![p])
        }
    }

    /// `a*x + b*x = (a+b)*x`
    /// `a + b = c` for numbers
    fn combine_pair(&mut self, p1: NodeRef, p2: NodeRef) -> Result<Option<NodeRef>> {
        if self.is_num(p1) && self.is_num(p2) {
            return self.add_numbers(p1, p2).map(Some);
        }

        let (c1, f1) = self.split_term(p1);
        let (c2, f2) = self.split_term(p2);
        if f1.is_empty()
            || f1.len() != f2.len()
            || f1.iter().zip(&f2).any(|(&a, &b)| !self.equal(a, b))
        {
            return Ok(None);
        }

        let coeff = self.add_numbers(c1, c2)?;
        if self.is_zero(coeff) {
            return Ok(Some(self.consts.zero));
        }

        self.push(coeff)?;
        for &factor in &f1 {
            self.push(factor)?;
        }
        self.multiply_factors(f1.len() + 1)?;
        self.pop().map(Some)
    }
}

#[cfg(test)]
mod tests {
    use crate::Interpreter;

    fn eval(source: &str) -> String {
        Interpreter::new().eval_str(source).unwrap()
    }

    #[test]
    fn numbers() {
        assert_eq!(eval("2 + 2"), "4");
        assert_eq!(eval("1/3 + 1/6"), "1/2");
        assert_eq!(eval("0.5 + 1/4"), "0.75");
    }

    #[test]
    fn like_terms() {
        assert_eq!(eval("x + x"), "2*x");
        assert_eq!(eval("2*x*y + 3*y*x"), "5*x*y");
        assert_eq!(eval("x - x"), "0");
    }

    #[test]
    fn canonical_order() {
        assert_eq!(eval("1 + x"), "x + 1");
        assert_eq!(eval("b + a"), "a + b");
        assert_eq!(eval("x + x^2"), "x^2 + x");
    }

    #[test]
    fn nested_sums_flatten() {
        assert_eq!(eval("a + (b + (c + a))"), "2*a + b + c");
    }
}
