use crate::{
    error::Result,
    interp::Interpreter,
    keyword::Keyword,
    node::NodeRef,
};

impl Interpreter {
    /// Evaluates every factor of `(multiply a b ...)` and multiplies them.
    pub(crate) fn eval_multiply(&mut self, p1: NodeRef) -> Result<()> {
        let factors = self.args(p1);
        let n = factors.len();
        for factor in factors {
            self.push(factor)?;
            self.eval()?;
        }
        self.multiply_factors(n)
    }

    /// Pops two factors and pushes their product.
    pub fn multiply(&mut self) -> Result<()> {
        self.multiply_factors(2)
    }

    /// Pops `b` then `a` and pushes `a / b`.
    pub fn divide(&mut self) -> Result<()> {
        self.reciprocate()?;
        self.multiply()
    }

    /// Pops `a` and pushes `-a`.
    pub fn negate(&mut self) -> Result<()> {
        let p = self.pop()?;
        if let Some(r) = self.rational(p) {
            let r = r.neg();
            let p = self.rational_node(r)?;
            return self.push(p);
        }
        if let Some(d) = self.double(p) {
            let p = self.double_node(-d)?;
            return self.push(p);
        }
        self.push(self.consts.minus_one)?;
        self.push(p)?;
        self.multiply()
    }

    /// Pops `a` and pushes `1 / a`.
    pub fn reciprocate(&mut self) -> Result<()> {
        self.push(self.consts.minus_one)?;
        self.power()
    }

    /// Pops `n` factors and pushes their product.
    pub fn multiply_factors(&mut self, n: usize) -> Result<()> {
        let factors = self.pop_n(n)?;
        let factors = self.flatten_factors(factors);

        let mut tensor = None;
        let mut scalars = Vec::with_capacity(factors.len());
        for factor in factors {
            if self.is_tensor(factor) {
                tensor = Some(match tensor {
                    Some(t) => self.hadamard_tensors(t, factor)?,
                    None => factor,
                });
            } else {
                scalars.push(factor);
            }
        }

        let product = self.product_of_scalars(scalars)?;
        match tensor {
            None => self.push(product),
            Some(t) => {
                let p = self.scale_tensor(t, product)?;
                self.push(p)
            },
        }
    }

    /// Splices the factors of nested products into one list.
    fn flatten_factors(&self, factors: Vec<NodeRef>) -> Vec<NodeRef> {
        let mut flat = Vec::with_capacity(factors.len());
        for factor in factors {
            if self.is_head(factor, Keyword::Multiply) {
                flat.extend(self.args(factor));
            } else {
                flat.push(factor);
            }
        }
        flat
    }

    /// Multiplies scalar factors into a canonical product.
    fn product_of_scalars(&mut self, factors: Vec<NodeRef>) -> Result<NodeRef> {
        let mut coeff = self.consts.one;
        let mut rest = Vec::with_capacity(factors.len());
        for factor in factors {
            if self.is_num(factor) {
                coeff = self.multiply_numbers(coeff, factor)?;
            } else {
                rest.push(factor);
            }
        }
        if self.is_zero(coeff) {
            return Ok(coeff);
        }

        loop {
            let merged_bases = self.combine_bases(&mut rest, &mut coeff)?;
            let merged_radicals = self.combine_radicals(&mut rest, &mut coeff)?;
            if !merged_bases && !merged_radicals {
                break;
            }
        }
        if self.is_zero(coeff) {
            return Ok(coeff);
        }
        self.reduce_radicals(&mut rest, &mut coeff)?;

        if self.expanding {
            if let Some(i) = rest.iter().position(|&f| self.is_head(f, Keyword::Add)) {
                let sum = rest.remove(i);
                return self.distribute(coeff, &rest, sum);
            }
        }

        rest.sort_by(|&a, &b| self.compare_factors(a, b));
        match (rest.len(), self.is_one(coeff) && self.is_rational(coeff)) {
            (0, _) => Ok(coeff),
            (1, true) => Ok(rest[0]),
            (_, true) => self.apply(Keyword::Multiply, &rest),
            _ => {
                rest.insert(0, coeff);
                self.apply(Keyword::Multiply, &rest)
            },
        }
    }

    /// Adds a factor produced by a merge, folding numbers into the coefficient and splicing
    /// products.
    fn absorb_factor(&mut self, p: NodeRef, rest: &mut Vec<NodeRef>, coeff: &mut NodeRef) -> Result<()> {
        if self.is_num(p) {
            *coeff = self.multiply_numbers(*coeff, p)?;
        } else if self.is_head(p, Keyword::Multiply) {
            for factor in self.args(p) {
                self.absorb_factor(factor, rest, coeff)?;
            }
        } else {
            rest.push(p);
        }
        Ok(())
    }

    /// `a^b * a^c = a^(b+c)`
    ///
    /// Returns `true` if any factors were merged.
    fn combine_bases(&mut self, rest: &mut Vec<NodeRef>, coeff: &mut NodeRef) -> Result<bool> {
        rest.sort_by(|&a, &b| self.compare_factors(a, b));

        let mut out: Vec<NodeRef> = Vec::with_capacity(rest.len());
        let mut merged = Vec::new();
        for &factor in rest.iter() {
            if let Some(&prev) = out.last() {
                let (base1, expo1) = self.base_and_exponent(prev);
                let (base2, expo2) = self.base_and_exponent(factor);
                if self.equal(base1, base2) {
                    out.pop();
                    let expo = self.add_nodes(expo1, expo2)?;
                    merged.push(self.pow_nodes(base1, expo)?);
                    continue;
                }
            }
            out.push(factor);
        }

        let changed = !merged.is_empty();
        for p in merged {
            self.absorb_factor(p, &mut out, coeff)?;
        }
        *rest = out;
        Ok(changed)
    }

    /// Returns `true` for a power of a positive integer to a fraction, such as `2^(1/2)`.
    fn is_radical(&self, p: NodeRef) -> bool {
        if !self.is_head(p, Keyword::Power) {
            return false;
        }
        let base = self.cadr(p);
        self.is_integer(base) && self.is_positive_number(base) && self.is_fraction(self.caddr(p))
    }

    /// `a^r * b^r = (a*b)^r` for radicals with the same exponent
    ///
    /// Returns `true` if any factors were merged.
    fn combine_radicals(&mut self, rest: &mut Vec<NodeRef>, coeff: &mut NodeRef) -> Result<bool> {
        let mut changed = false;
        let mut i = 0;
        while i < rest.len() {
            if !self.is_radical(rest[i]) {
                i += 1;
                continue;
            }
            let expo = self.caddr(rest[i]);
            let partner = (i + 1..rest.len())
                .find(|&j| self.is_radical(rest[j]) && self.equal(self.caddr(rest[j]), expo));
            let Some(j) = partner else {
                i += 1;
                continue;
            };

            let b = rest.remove(j);
            let a = rest.remove(i);
            let base = self.multiply_numbers(self.cadr(a), self.cadr(b))?;
            let p = self.pow_nodes(base, expo)?;
            self.absorb_factor(p, rest, coeff)?;
            changed = true;
        }
        Ok(changed)
    }

    /// `a^r / a = a^(r-1)` and `a * a^-r = a^(1-r)` for a radical and a rational coefficient
    ///
    /// Moves one power of a radical's base between the radical and the coefficient, so that
    /// `2^(1/2)/2` becomes `2^(-1/2)`.
    fn reduce_radicals(&mut self, rest: &mut [NodeRef], coeff: &mut NodeRef) -> Result<()> {
        for factor in rest.iter_mut() {
            if !self.is_radical(*factor) {
                continue;
            }
            let Some(c) = self.rational(*coeff).cloned() else {
                return Ok(());
            };

            let base = self.rational_value(self.cadr(*factor));
            let expo = self.rational_value(self.caddr(*factor));
            let (divides, shift) = if expo.is_positive() {
                (c.denom().rem(base.numer()).map_or(false, |r| r.is_zero()), -1)
            } else {
                (c.numer().rem(base.numer()).map_or(false, |r| r.is_zero()), 1)
            };
            if !divides {
                continue;
            }

            let new_coeff = if shift < 0 { c.mul(&base) } else { c.div(&base)? };
            let new_expo = expo.add(&cas_num::Rational::from_i64(shift));
            *coeff = self.rational_node(new_coeff)?;
            let base = self.cadr(*factor);
            let new_expo = self.rational_node(new_expo)?;
            *factor = self.apply(Keyword::Power, &[base, new_expo])?;
        }
        Ok(())
    }

    /// `c * a * (b1 + b2) = c*a*b1 + c*a*b2`
    fn distribute(&mut self, coeff: NodeRef, rest: &[NodeRef], sum: NodeRef) -> Result<NodeRef> {
        let terms = self.args(sum);
        let n = terms.len();
        for term in terms {
            self.push(coeff)?;
            for &factor in rest {
                self.push(factor)?;
            }
            self.push(term)?;
            self.multiply_factors(rest.len() + 2)?;
        }
        self.add_terms(n)?;
        self.pop()
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
        assert_eq!(eval("2*3"), "6");
        assert_eq!(eval("2/4"), "1/2");
        assert_eq!(eval("0.5*4"), "2.0");
    }

    #[test]
    fn zero_annihilates() {
        assert_eq!(eval("0*x"), "0");
        assert_eq!(eval("x*y*0"), "0");
    }

    #[test]
    fn like_bases() {
        assert_eq!(eval("x*x"), "x^2");
        assert_eq!(eval("x^2/x"), "x");
        assert_eq!(eval("x/x"), "1");
        assert_eq!(eval("y*x*y"), "x*y^2");
    }

    #[test]
    fn radicals() {
        assert_eq!(eval("sqrt(2)*sqrt(2)"), "2");
        assert_eq!(eval("sqrt(2)*sqrt(3)"), "6^(1/2)");
        assert_eq!(eval("sqrt(2)/2 - 1/sqrt(2)"), "0");
        assert_eq!(eval("sqrt(12)"), "2*3^(1/2)");
    }

    #[test]
    fn distributes_over_sums() {
        assert_eq!(eval("2*(x + 1)"), "2*x + 2");
        assert_eq!(eval("(a + b)*(a - b)"), "a^2 - b^2");
    }

    #[test]
    fn noexpand_keeps_products() {
        assert_eq!(eval("noexpand(2*(x + 1))"), "2*(x + 1)");
    }

    #[test]
    fn division() {
        assert_eq!(eval("x/(2*y)"), "x/(2*y)");
        assert_eq!(eval("6*x/(3*x)"), "2");
    }
}
