use cas_num::{prime::factor_small, Magnitude, Rational, Sign};
use crate::{
    error::{kind, Error, Result},
    interp::Interpreter,
    keyword::Keyword,
    node::NodeRef,
};

/// Integer powers whose result would need more bits than this are refused.
const MAX_POWER_BITS: u64 = 1 << 20;

/// Radicals `n^(p/q)` are only normalized when `n^p` needs at most this many bits.
const MAX_RADICAL_BITS: u64 = 1 << 14;

impl Interpreter {
    /// Evaluates `(power base exponent)`.
    ///
    /// The exponent is evaluated without expansion. So is the base when the exponent is a
    /// negative number, which keeps denominators such as `1/(x+1)^2` factored.
    pub(crate) fn eval_power(&mut self, p1: NodeRef) -> Result<()> {
        let expo = self.with_expanding(false, |interp| interp.eval_arg(p1, 2))?;
        let base = if self.is_negative_number(expo) {
            self.with_expanding(false, |interp| interp.eval_arg(p1, 1))?
        } else {
            self.eval_arg(p1, 1)?
        };
        self.push(base)?;
        self.push(expo)?;
        self.power()
    }

    /// Pops the exponent, then the base, and pushes the power.
    pub fn power(&mut self) -> Result<()> {
        let expo = self.pop()?;
        let base = self.pop()?;
        let p = self.power_of(base, expo)?;
        self.push(p)
    }

    fn power_of(&mut self, base: NodeRef, expo: NodeRef) -> Result<NodeRef> {
        if self.is_tensor(base) {
            return self.power_tensor(base, expo);
        }
        if self.is_tensor(expo) {
            return Err(Error::new(kind::InvalidArgument {
                function: "power",
                expected: "a scalar exponent",
            }));
        }

        if self.is_num(base) && self.is_num(expo) {
            return self.power_numbers(base, expo);
        }

        // x^0 = 1
        if self.is_zero(expo) {
            return if self.is_double(expo) { self.double_node(1.0) } else { Ok(self.consts.one) };
        }

        // x^1 = x
        if self.is_one(expo) && self.is_rational(expo) {
            return Ok(base);
        }

        // 1^x = 1
        if self.is_one(base) && self.is_rational(base) {
            return Ok(self.consts.one);
        }

        if self.is_zero(base) && self.is_rational(base) {
            if self.is_negative_number(expo) {
                return Err(Error::new(kind::DivideByZero));
            }
            if self.is_positive_number(expo) {
                return Ok(self.consts.zero);
            }
        }

        if self.is_keyword(base, Keyword::Exp1) {
            if let Some(p) = self.power_exp1(expo)? {
                return Ok(p);
            }
        }

        if self.is_rational(base) && self.is_head(expo, Keyword::Add) {
            if let Some(p) = self.power_split_sum(base, expo)? {
                return Ok(p);
            }
        }

        // (a*b)^n = a^n * b^n
        if self.is_head(base, Keyword::Multiply) && self.is_integer(expo) {
            let factors = self.args(base);
            let n = factors.len();
            for factor in factors {
                self.push(factor)?;
                self.push(expo)?;
                self.power()?;
            }
            self.multiply_factors(n)?;
            return self.pop();
        }

        // (a^b)^c = a^(b*c)
        if self.is_head(base, Keyword::Power) {
            let inner = self.cadr(base);
            if self.is_integer(expo)
                || self.is_minus_one(inner)
                || self.is_keyword(inner, Keyword::Exp1)
            {
                let b = self.caddr(base);
                let expo = self.mul_nodes(b, expo)?;
                return self.pow_nodes(inner, expo);
            }
        }

        // (a + b)^n is expanded by repeated multiplication
        if self.expanding && self.is_head(base, Keyword::Add) {
            if let Some(n) = self.small_integer(expo).filter(|&n| n > 1) {
                let mut result = base;
                for _ in 1..n {
                    self.check_interrupt()?;
                    result = self.multiply_termwise(result, base)?;
                }
                return Ok(result);
            }
        }

        if self.is_num(expo) {
            if let Some((re, im)) = self.complex_parts(base) {
                return self.power_complex(base, re, im, expo);
            }
        }

        self.apply(Keyword::Power, &[base, expo])
    }

    /// `(a1 + a2)*(b1 + b2) = a1*b1 + a1*b2 + a2*b1 + a2*b2`
    ///
    /// Multiplies term by term, so the product of two equal sums is never merged back into a
    /// power of the sum.
    fn multiply_termwise(&mut self, a: NodeRef, b: NodeRef) -> Result<NodeRef> {
        let left = self.terms(a);
        let right = self.terms(b);
        for &x in &left {
            for &y in &right {
                self.push(x)?;
                self.push(y)?;
                self.multiply()?;
            }
        }
        self.add_terms(left.len() * right.len())?;
        self.pop()
    }

    fn terms(&self, p: NodeRef) -> Vec<NodeRef> {
        if self.is_head(p, Keyword::Add) {
            self.args(p)
        } else {
            vec![p]
        }
    }

    /// `exp(log(x)) = x`
    /// `exp(n*log(x)) = x^n`
    /// `exp(r*i*pi) = (-1)^r`
    fn power_exp1(&mut self, expo: NodeRef) -> Result<Option<NodeRef>> {
        if self.is_head(expo, Keyword::Log) {
            return Ok(Some(self.cadr(expo)));
        }
        if let Some(d) = self.double(expo) {
            return self.double_node(d.exp()).map(Some);
        }

        if self.is_head(expo, Keyword::Multiply) {
            let factors = self.args(expo);
            if factors.len() == 2 && self.is_rational(factors[0]) && self.is_head(factors[1], Keyword::Log) {
                let x = self.cadr(factors[1]);
                return self.pow_nodes(x, factors[0]).map(Some);
            }
        }

        if let Some(r) = self.i_pi_multiple(expo) {
            let minus_one = self.consts.minus_one;
            return self.pow_nodes(minus_one, r).map(Some);
        }
        Ok(None)
    }

    /// Returns `r` if `p` is `r*i*pi` for a rational `r`.
    pub(crate) fn i_pi_multiple(&self, p: NodeRef) -> Option<NodeRef> {
        if !self.is_head(p, Keyword::Multiply) {
            return None;
        }
        let mut factors = self.args(p);
        let coeff = match factors.first() {
            Some(&c) if self.is_rational(c) => factors.remove(0),
            _ => self.consts.one,
        };
        match factors[..] {
            [a, b] if self.is_imaginary_unit(a) && self.is_keyword(b, Keyword::Pi) => Some(coeff),
            _ => None,
        }
    }

    /// `a^(b+n) = a^n * a^b` for a rational base and integer terms `n`
    fn power_split_sum(&mut self, base: NodeRef, expo: NodeRef) -> Result<Option<NodeRef>> {
        let terms = self.args(expo);
        let (numbers, symbolic): (Vec<_>, Vec<_>) = terms.into_iter().partition(|&t| self.is_integer(t));
        if numbers.is_empty() || symbolic.is_empty() {
            return Ok(None);
        }

        let mut n = self.consts.zero;
        for t in numbers {
            n = self.add_numbers(n, t)?;
        }
        let numeric = self.pow_nodes(base, n)?;
        let rest = match symbolic[..] {
            [t] => t,
            _ => self.apply(Keyword::Add, &symbolic)?,
        };
        let rest = self.apply(Keyword::Power, &[base, rest])?;
        self.mul_nodes(numeric, rest).map(Some)
    }

    /// Raises a number to a numeric power.
    fn power_numbers(&mut self, base: NodeRef, expo: NodeRef) -> Result<NodeRef> {
        if self.is_double(base) || self.is_double(expo) {
            return self.power_doubles(base, expo);
        }

        let b = self.rational_value(base);
        let e = self.rational_value(expo);

        if e.is_integer() {
            return self.power_integer(&b, &e);
        }
        if b.is_zero() {
            return if e.is_negative() {
                Err(Error::new(kind::DivideByZero))
            } else {
                Ok(self.consts.zero)
            };
        }
        if b.is_one() {
            return Ok(self.consts.one);
        }
        if b.is_minus_one() {
            return self.power_minus_one(expo);
        }

        // (-a)^r = (-1)^r * a^r
        if b.is_negative() {
            let sign = self.power_minus_one(expo)?;
            let abs = self.rational_node(b.abs())?;
            let magnitude = self.power_numbers(abs, expo)?;
            return self.mul_nodes(sign, magnitude);
        }

        // (a/b)^r = a^r * b^(-r)
        if !b.is_integer() {
            let num = self.rational_node(b.numerator())?;
            let den = self.rational_node(b.denominator())?;
            let neg = self.rational_node(e.neg())?;
            let num = self.power_numbers(num, expo)?;
            let den = self.power_numbers(den, neg)?;
            return self.mul_nodes(num, den);
        }

        // a^(n + r) = a^n * a^r
        let whole = if e.is_negative() { e.ceil() } else { e.floor() };
        if !whole.is_zero() {
            let frac = e.sub(&whole);
            let whole = self.power_integer(&b, &whole)?;
            let frac = self.rational_node(frac)?;
            let frac = self.power_numbers(base, frac)?;
            return self.mul_nodes(whole, frac);
        }

        self.power_radical(base, &b, &e)
    }

    /// `a^n` for an integer exponent.
    fn power_integer(&mut self, b: &Rational, e: &Rational) -> Result<NodeRef> {
        if b.is_zero() && e.is_negative() {
            return Err(Error::new(kind::DivideByZero));
        }
        if b.is_zero() || b.is_one() || e.is_zero() {
            return if b.is_zero() && !e.is_zero() {
                Ok(self.consts.zero)
            } else {
                Ok(self.consts.one)
            };
        }
        if b.is_minus_one() {
            return if e.is_even() { Ok(self.consts.one) } else { Ok(self.consts.minus_one) };
        }

        let n = e.to_i64()
            .and_then(|n| i32::try_from(n).ok())
            .ok_or_else(|| Error::new(kind::ExponentTooLarge))?;
        let bits = b.numer().bit_len().max(b.denom().bit_len());
        if bits.saturating_mul(u64::from(n.unsigned_abs())) > MAX_POWER_BITS {
            return Err(Error::new(kind::ExponentTooLarge));
        }
        let r = b.pow(n)?;
        self.rational_node(r)
    }

    /// `a^(p/q)` for an integer `a > 1` and `|p| < q`.
    ///
    /// Perfect `q`th powers are pulled out of `a^|p|`, and the remaining radical gets the
    /// smallest possible root.
    fn power_radical(&mut self, base: NodeRef, b: &Rational, e: &Rational) -> Result<NodeRef> {
        let (Some(p), Some(q)) = (e.numer().to_u32(), e.denom().to_u32()) else {
            let expo = self.rational_node(e.clone())?;
            return self.apply(Keyword::Power, &[base, expo]);
        };
        if b.numer().bit_len().saturating_mul(u64::from(p)) > MAX_RADICAL_BITS {
            let expo = self.rational_node(e.clone())?;
            return self.apply(Keyword::Power, &[base, expo]);
        }

        let n = b.numer().pow(p);
        let factorization = factor_small(&n);

        let mut outside = Magnitude::one();
        let mut inside = Magnitude::one();
        let mut root = q;
        for &(prime, multiplicity) in &factorization.factors {
            let prime = Magnitude::from_u32(prime);
            outside = outside.mul(&prime.pow(multiplicity / q));
            let left = multiplicity % q;
            if left > 0 {
                inside = inside.mul(&prime.pow(left));
                root = gcd_u32(root, left);
            }
        }
        if !factorization.cofactor.is_one() {
            match factorization.cofactor.root(q) {
                Some(r) => outside = outside.mul(&r),
                None => {
                    inside = inside.mul(&factorization.cofactor);
                    root = 1;
                },
            }
        }

        // d^(k/q) with every multiplicity divisible by g is (d^(1/g))^(k/(q/g))
        let q_reduced = q / root.max(1);
        if root > 1 {
            inside = inside.root(root).unwrap_or(inside);
        }

        let mut coeff = Rational::from_integer(Sign::Plus, outside);
        if e.is_negative() {
            coeff = coeff.recip()?;
        }
        let coeff = self.rational_node(coeff)?;
        if inside.is_one() {
            return Ok(coeff);
        }

        let sign = if e.is_negative() { -1 } else { 1 };
        let inside = self.rational_node(Rational::from_integer(Sign::Plus, inside))?;
        let expo = self.fraction(sign, i64::from(q_reduced))?;
        let radical = self.apply(Keyword::Power, &[inside, expo])?;
        self.mul_nodes(coeff, radical)
    }

    /// `(-1)^r`, normalized so that `r` lies in `(-1/2, 1/2]`.
    ///
    /// `(-1)^(1/2)` is the imaginary unit. Doubles are evaluated to `cos(pi*r) + i*sin(pi*r)`.
    pub(crate) fn power_minus_one(&mut self, expo: NodeRef) -> Result<NodeRef> {
        if let Some(d) = self.double(expo) {
            let turns = d.rem_euclid(2.0);
            let (re, im) = match turns {
                t if t == 0.0 => (1.0, 0.0),
                t if t == 0.5 => (0.0, 1.0),
                t if t == 1.0 => (-1.0, 0.0),
                t if t == 1.5 => (0.0, -1.0),
                t => ((std::f64::consts::PI * t).cos(), (std::f64::consts::PI * t).sin()),
            };
            return self.complex_double(re, im);
        }

        let r = self.rational_value(expo);
        let two = Rational::from_i64(2);
        let one = Rational::one();
        // reduce into (-1, 1]
        let shift = r.add(&one).div(&two)?.floor().mul(&two);
        let r = r.sub(&shift);

        if r.is_zero() {
            return Ok(self.consts.one);
        }
        if r.is_one() {
            return Ok(self.consts.minus_one);
        }
        if r.is_half() {
            return Ok(self.consts.imaginary_unit);
        }

        let half = Rational::new_i64(1, 2)?;
        let minus_one = self.consts.minus_one;
        if r == half.neg() {
            let i = self.consts.imaginary_unit;
            return self.apply(Keyword::Multiply, &[minus_one, i]);
        }

        // (-1)^r = -(-1)^(r-1)
        let (r, negate) = if r > half {
            (r.sub(&one), true)
        } else if r < half.neg() {
            (r.add(&one), true)
        } else {
            (r, false)
        };

        let expo = self.rational_node(r)?;
        let p = self.apply(Keyword::Power, &[minus_one, expo])?;
        if negate {
            self.apply(Keyword::Multiply, &[minus_one, p])
        } else {
            Ok(p)
        }
    }

    /// Raises doubles. A negative base to a fractional power has a complex result.
    fn power_doubles(&mut self, base: NodeRef, expo: NodeRef) -> Result<NodeRef> {
        let b = self.to_f64(base).unwrap_or(0.0);
        let e = self.to_f64(expo).unwrap_or(0.0);

        if b == 0.0 && e < 0.0 {
            return Err(Error::new(kind::DivideByZero));
        }
        if b < 0.0 && e.fract() != 0.0 {
            let magnitude = self.double_node((-b).powf(e))?;
            let turns = self.double_node(e)?;
            let sign = self.power_minus_one(turns)?;
            return self.mul_nodes(magnitude, sign);
        }
        self.double_node(b.powf(e))
    }

    /// Returns `a + b*i` with double parts, dropping zero parts.
    pub(crate) fn complex_double(&mut self, re: f64, im: f64) -> Result<NodeRef> {
        let re = self.double_node(re)?;
        if im == 0.0 {
            return Ok(re);
        }
        let im = self.double_node(im)?;
        let i = self.consts.imaginary_unit;
        let im = self.mul_nodes(im, i)?;
        if self.is_zero(re) {
            return Ok(im);
        }
        self.add_nodes(re, im)
    }

    /// Splits a complex number `a + b*i` with numeric parts into `(a, b)`.
    pub(crate) fn complex_parts(&self, p: NodeRef) -> Option<(NodeRef, NodeRef)> {
        let zero = self.consts.zero;
        let imaginary = |interp: &Self, t: NodeRef| -> Option<NodeRef> {
            if interp.is_imaginary_unit(t) {
                return Some(interp.consts.one);
            }
            match interp.args(t)[..] {
                [c, i] if interp.is_head(t, Keyword::Multiply)
                    && interp.is_num(c)
                    && interp.is_imaginary_unit(i) => Some(c),
                _ => None,
            }
        };

        if let Some(b) = imaginary(self, p) {
            return Some((zero, b));
        }
        if self.is_head(p, Keyword::Add) {
            if let [a, t] = self.args(p)[..] {
                if self.is_num(a) {
                    return imaginary(self, t).map(|b| (a, b));
                }
                // imaginary terms sort after real ones, but numbers sort last
                if self.is_num(t) {
                    return imaginary(self, a).map(|b| (t, b));
                }
            }
        }
        None
    }

    /// Raises a complex number `re + im*i` to a numeric power.
    fn power_complex(&mut self, z: NodeRef, re: NodeRef, im: NodeRef, expo: NodeRef) -> Result<NodeRef> {
        if self.is_double(re) || self.is_double(im) || self.is_double(expo) {
            let (a, b) = (self.to_f64(re).unwrap_or(0.0), self.to_f64(im).unwrap_or(0.0));
            let e = self.to_f64(expo).unwrap_or(0.0);
            let (r, theta) = (a.hypot(b), b.atan2(a));
            if r == 0.0 && e < 0.0 {
                return Err(Error::new(kind::DivideByZero));
            }
            let (r, theta) = (r.powf(e), theta * e);
            return self.complex_double(r * theta.cos(), r * theta.sin());
        }

        if let Some(n) = self.small_integer(expo) {
            let w = self.with_expanding(true, |interp| {
                let mut w = interp.consts.one;
                for _ in 0..n.unsigned_abs() {
                    interp.check_interrupt()?;
                    w = interp.multiply_termwise(w, z)?;
                }
                Ok(w)
            })?;
            if n >= 0 {
                return Ok(w);
            }
            return self.complex_reciprocal(w);
        }

        // z^r = |z|^r * (-1)^(r * arg(z) / pi)
        self.push(z)?;
        self.mag()?;
        let mag = self.pop()?;
        self.push(z)?;
        self.arg()?;
        let arg = self.pop()?;
        let pi = self.keyword(Keyword::Pi);
        let turns = self.div_nodes(arg, pi)?;
        if !self.is_rational(turns) {
            return self.apply(Keyword::Power, &[z, expo]);
        }
        let mag = self.pow_nodes(mag, expo)?;
        let turns = self.multiply_numbers(turns, expo)?;
        let minus_one = self.consts.minus_one;
        let sign = self.pow_nodes(minus_one, turns)?;
        self.mul_nodes(mag, sign)
    }

    /// `1/(a + b*i) = (a - b*i)/(a^2 + b^2)`
    fn complex_reciprocal(&mut self, w: NodeRef) -> Result<NodeRef> {
        let Some((a, b)) = self.complex_parts(w) else {
            let minus_one = self.consts.minus_one;
            return self.pow_nodes(w, minus_one);
        };
        let a2 = self.multiply_numbers(a, a)?;
        let b2 = self.multiply_numbers(b, b)?;
        let norm = self.add_numbers(a2, b2)?;
        let re = self.div_nodes(a, norm)?;
        let im = self.div_nodes(b, norm)?;
        let im = self.neg_node(im)?;
        let i = self.consts.imaginary_unit;
        let im = self.mul_nodes(im, i)?;
        self.add_nodes(re, im)
    }
}

fn gcd_u32(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

#[cfg(test)]
mod tests {
    use crate::Interpreter;

    fn eval(source: &str) -> String {
        Interpreter::new().eval_str(source).unwrap()
    }

    #[test]
    fn integer_powers() {
        assert_eq!(eval("2^10"), "1024");
        assert_eq!(eval("2^(-2)"), "1/4");
        assert_eq!(eval("(2/3)^2"), "4/9");
        assert_eq!(eval("0^0"), "1");
    }

    #[test]
    fn radicals() {
        assert_eq!(eval("8^(1/3)"), "2");
        assert_eq!(eval("4^(1/6)"), "2^(1/3)");
        assert_eq!(eval("2^(3/2) - 2*sqrt(2)"), "0");
        assert_eq!(eval("(1/4)^(1/2)"), "1/2");
    }

    #[test]
    fn powers_of_minus_one() {
        assert_eq!(eval("(-1)^2"), "1");
        assert_eq!(eval("i^2"), "-1");
        assert_eq!(eval("(-1)^(3/2) + i"), "0");
        assert_eq!(eval("(-1)^(-1/2)"), "-i");
        assert_eq!(eval("i^3"), "-i");
        assert_eq!(eval("1/i"), "-i");
        assert_eq!(eval("exp(-i*pi/2)"), "-i");
        assert_eq!(eval("(-1)^(1/3)"), "(-1)^(1/3)");
    }

    #[test]
    fn symbolic() {
        assert_eq!(eval("x^0"), "1");
        assert_eq!(eval("x^1"), "x");
        assert_eq!(eval("(x^2)^3"), "x^6");
        assert_eq!(eval("(x*y)^2"), "x^2*y^2");
        assert_eq!(eval("(x + 1)^2"), "x^2 + 2*x + 1");
    }

    #[test]
    fn products_of_equal_sums() {
        assert_eq!(eval("(x + 1)*(x + 1)"), "x^2 + 2*x + 1");
        assert_eq!(eval("(x + y)*(x + y)"), "x^2 + 2*x*y + y^2");
        assert_eq!(eval("(a + b)^3"), "a^3 + 3*a^2*b + 3*a*b^2 + b^3");
        assert_eq!(eval("noexpand((x + 1)*(x + 1))"), "(x + 1)^2");
    }

    #[test]
    fn exponentials() {
        assert_eq!(eval("exp(log(x))"), "x");
        assert_eq!(eval("exp(i*pi)"), "-1");
        assert_eq!(eval("exp(0)"), "1");
    }

    #[test]
    fn complex_numbers() {
        assert_eq!(eval("(1 + i)^2"), "2*i");
        assert_eq!(eval("1/(1 + i)"), "1/2 - i/2");
    }

    #[test]
    fn divide_by_zero() {
        let mut interp = Interpreter::new();
        let err = interp.eval_str("1/0").unwrap_err();
        assert!(err.is::<crate::error::kind::DivideByZero>());
    }
}
