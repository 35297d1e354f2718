//! Number-theoretic and numeric functions: `abs`, `floor`, `ceiling`, `mod`, `gcd`, `lcm`,
//! `isprime`, `choose`, `factorial`, `numerator`, `denominator`, `float` and `number`.

use cas_num::{Magnitude, Rational, Sign};
use crate::{
    error::{kind, Error, Result},
    interp::Interpreter,
    keyword::Keyword,
    node::{Node, NodeRef},
};

/// The largest argument `factorial` computes exactly.
const MAX_FACTORIAL: i64 = 100_000;

/// Coefficients of the Lanczos approximation of the gamma function, with `g = 7`.
const LANCZOS: [f64; 9] = [
    0.999_999_999_999_809_9,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_6,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_572e-6,
    1.505_632_735_149_311_6e-7,
];

/// The gamma function for real arguments.
fn gamma(x: f64) -> f64 {
    if x < 0.5 {
        // reflection formula
        std::f64::consts::PI / ((std::f64::consts::PI * x).sin() * gamma(1.0 - x))
    } else {
        let x = x - 1.0;
        let t = x + 7.5;
        let sum = LANCZOS[1..].iter().enumerate()
            .fold(LANCZOS[0], |acc, (i, &c)| acc + c / (x + i as f64 + 1.0));
        (2.0 * std::f64::consts::PI).sqrt() * t.powf(x + 0.5) * (-t).exp() * sum
    }
}

impl Interpreter {
    /// Pops `x` and pushes `abs(x)`. The absolute value of a vector is its length.
    pub(crate) fn abs(&mut self) -> Result<()> {
        let p = self.pop()?;
        if let Some(t) = self.tensor(p) {
            if t.rank() != 1 {
                return Err(Error::new(kind::InvalidArgument {
                    function: "abs",
                    expected: "a scalar or a vector",
                }));
            }
            let elems = t.elems.clone();
            let mut sum = self.consts.zero;
            for elem in elems {
                let conj = self.call1(Self::conj, elem)?;
                let square = self.mul_nodes(elem, conj)?;
                sum = self.add_nodes(sum, square)?;
            }
            let half = self.fraction(1, 2)?;
            let length = self.pow_nodes(sum, half)?;
            return self.push(length);
        }

        self.push(p)?;
        self.unary_rules(Keyword::Abs, &[
            Self::abs_of_number,
            Self::abs_of_constant,
            Self::abs_of_complex,
            Self::abs_of_negative,
            Self::abs_of_product,
            Self::abs_of_power,
        ])
    }

    /// `abs(-a) = a` for numbers
    fn abs_of_number(&mut self, p: NodeRef) -> Result<Option<NodeRef>> {
        match self.node(p) {
            Node::Rational(r) => {
                let r = r.abs();
                self.rational_node(r).map(Some)
            },
            Node::Double(d) => {
                let d = d.abs();
                self.double_node(d).map(Some)
            },
            _ => Ok(None),
        }
    }

    /// `abs(pi) = pi`
    fn abs_of_constant(&mut self, p: NodeRef) -> Result<Option<NodeRef>> {
        let positive = self.is_keyword(p, Keyword::Pi) || self.is_keyword(p, Keyword::Exp1);
        Ok(positive.then_some(p))
    }

    /// `abs(z) = mag(z)` for complex `z`
    fn abs_of_complex(&mut self, p: NodeRef) -> Result<Option<NodeRef>> {
        if !self.contains_imaginary(p) {
            return Ok(None);
        }
        self.call1(Self::mag, p).map(Some)
    }

    /// `abs(-a) = abs(a)`
    fn abs_of_negative(&mut self, p: NodeRef) -> Result<Option<NodeRef>> {
        if !self.is_negative(p) {
            return Ok(None);
        }
        let q = self.neg_node(p)?;
        self.call1(Self::abs, q).map(Some)
    }

    /// `abs(a*b) = abs(a)*abs(b)`
    fn abs_of_product(&mut self, p: NodeRef) -> Result<Option<NodeRef>> {
        if !self.is_head(p, Keyword::Multiply) {
            return Ok(None);
        }
        let factors = self.args(p);
        let n = factors.len();
        for factor in factors {
            self.push(factor)?;
            self.abs()?;
        }
        self.multiply_factors(n)?;
        self.pop().map(Some)
    }

    /// `abs(a^(2n)) = a^(2n)`
    /// `abs(b^x) = b^x` for a positive base
    fn abs_of_power(&mut self, p: NodeRef) -> Result<Option<NodeRef>> {
        if !self.is_head(p, Keyword::Power) {
            return Ok(None);
        }
        let base = self.cadr(p);
        let expo = self.caddr(p);
        let even = self.rational(expo).map_or(false, |r| r.is_integer() && r.is_even());
        let positive_base = self.is_positive_number(base) || self.is_keyword(base, Keyword::Exp1);
        Ok((even || positive_base).then_some(p))
    }

    /// Pops `x` and pushes the largest integer not greater than `x`.
    pub(crate) fn floor(&mut self) -> Result<()> {
        self.unary_rules(Keyword::Floor, &[Self::floor_of_number])
    }

    fn floor_of_number(&mut self, p: NodeRef) -> Result<Option<NodeRef>> {
        match self.node(p) {
            Node::Rational(r) => {
                let r = r.floor();
                self.rational_node(r).map(Some)
            },
            Node::Double(d) => {
                let d = d.floor();
                self.double_node(d).map(Some)
            },
            _ => Ok(None),
        }
    }

    /// Pops `x` and pushes the smallest integer not less than `x`.
    pub(crate) fn ceiling(&mut self) -> Result<()> {
        self.unary_rules(Keyword::Ceiling, &[Self::ceiling_of_number])
    }

    fn ceiling_of_number(&mut self, p: NodeRef) -> Result<Option<NodeRef>> {
        match self.node(p) {
            Node::Rational(r) => {
                let r = r.ceil();
                self.rational_node(r).map(Some)
            },
            Node::Double(d) => {
                let d = d.ceil();
                self.double_node(d).map(Some)
            },
            _ => Ok(None),
        }
    }

    /// `mod(a, b)`: the remainder of `a/b` with the sign of `a`.
    pub(crate) fn eval_mod(&mut self, p1: NodeRef) -> Result<()> {
        let a = self.eval_arg(p1, 1)?;
        let b = self.eval_arg(p1, 2)?;

        if self.is_num(a) && self.is_num(b) {
            if self.is_zero(b) {
                return Err(Error::new(kind::DivideByZero));
            }
            let p = match (self.rational(a), self.rational(b)) {
                (Some(x), Some(y)) => {
                    let r = x.rem(y)?;
                    self.rational_node(r)?
                },
                _ => {
                    let x = self.to_f64(a).unwrap_or(0.0);
                    let y = self.to_f64(b).unwrap_or(1.0);
                    self.double_node(x % y)?
                },
            };
            return self.push(p);
        }

        let p = self.apply(Keyword::Mod, &[a, b])?;
        self.push(p)
    }

    /// `gcd(a, b, ...)`
    pub(crate) fn eval_gcd(&mut self, p1: NodeRef) -> Result<()> {
        let args = self.args(p1);
        let mut result = None;
        for arg in args {
            let value = self.eval_value(arg)?;
            result = Some(match result {
                Some(g) => self.gcd_pair(g, value)?,
                None => value,
            });
        }
        let p = result.unwrap_or(self.consts.zero);
        self.push(p)
    }

    /// `lcm(a, b, ...)`
    pub(crate) fn eval_lcm(&mut self, p1: NodeRef) -> Result<()> {
        let args = self.args(p1);
        let mut result = None;
        for arg in args {
            let value = self.eval_value(arg)?;
            result = Some(match result {
                Some(l) => self.lcm_pair(l, value)?,
                None => value,
            });
        }
        let p = result.unwrap_or(self.consts.one);
        self.push(p)
    }

    /// The greatest common divisor of two expressions.
    ///
    /// Numbers use the rational gcd, polynomials the Euclidean algorithm, and monomials take the
    /// smaller power of every common base.
    pub(crate) fn gcd_pair(&mut self, a: NodeRef, b: NodeRef) -> Result<NodeRef> {
        // gcd(a, a) = a
        if self.equal(a, b) {
            return Ok(a);
        }

        // gcd(0, b) = abs(b)
        if self.is_zero(a) {
            return self.call1(Self::abs, b);
        }
        if self.is_zero(b) {
            return self.call1(Self::abs, a);
        }

        if let (Some(x), Some(y)) = (self.rational(a), self.rational(b)) {
            let g = x.gcd(y);
            return self.rational_node(g);
        }
        if self.is_num(a) && self.is_num(b) {
            return Err(Error::new(kind::InvalidArgument {
                function: "gcd",
                expected: "exact numbers",
            }));
        }

        if self.is_head(a, Keyword::Add) || self.is_head(b, Keyword::Add) {
            return match self.poly_gcd(a, b)? {
                Some(g) => Ok(g),
                None => self.apply(Keyword::Gcd, &[a, b]),
            };
        }

        self.gcd_monomials(a, b)
    }

    /// `gcd(c1*x^m*y, c2*x^n) = gcd(c1, c2)*x^min(m, n)`
    fn gcd_monomials(&mut self, a: NodeRef, b: NodeRef) -> Result<NodeRef> {
        let (c1, f1) = self.split_term(a);
        let (c2, f2) = self.split_term(b);

        let mut factors = Vec::new();
        factors.push(match (self.rational(c1), self.rational(c2)) {
            (Some(x), Some(y)) => {
                let g = x.gcd(y);
                self.rational_node(g)?
            },
            _ => self.consts.one,
        });

        for &fa in &f1 {
            let (base, e1) = self.base_and_exponent(fa);
            let Some(e2) = f2.iter()
                .map(|&fb| self.base_and_exponent(fb))
                .find(|&(other, _)| self.equal(base, other))
                .map(|(_, e)| e)
            else {
                continue;
            };
            let (Some(x), Some(y)) = (self.rational(e1).cloned(), self.rational(e2).cloned()) else {
                if self.equal(e1, e2) {
                    factors.push(fa);
                }
                continue;
            };
            let e = match (x.is_positive(), y.is_positive()) {
                (true, true) => x.min(y),
                (false, false) => x.max(y),
                _ => continue,
            };
            let e = self.rational_node(e)?;
            factors.push(self.pow_nodes(base, e)?);
        }

        let n = factors.len();
        for factor in factors {
            self.push(factor)?;
        }
        self.multiply_factors(n)?;
        self.pop()
    }

    /// `lcm(a, b) = a*b/gcd(a, b)`
    fn lcm_pair(&mut self, a: NodeRef, b: NodeRef) -> Result<NodeRef> {
        let g = self.gcd_pair(a, b)?;
        let product = self.mul_nodes(a, b)?;
        let l = self.div_nodes(product, g)?;
        if self.is_num(l) {
            return self.call1(Self::abs, l);
        }
        Ok(l)
    }

    /// Pops `n` and pushes `1` if it is prime, `0` otherwise.
    pub(crate) fn isprime(&mut self) -> Result<()> {
        let p = self.pop()?;
        match self.rational(p) {
            Some(r) if r.is_integer() && !r.is_negative() => {
                let prime = r.numer().is_prime();
                self.push_bool(prime)
            },
            _ => Err(Error::new(kind::InvalidArgument {
                function: "isprime",
                expected: "a nonnegative integer",
            })),
        }
    }

    /// `choose(n, k)`: the binomial coefficient.
    pub(crate) fn eval_choose(&mut self, p1: NodeRef) -> Result<()> {
        let n = self.eval_arg(p1, 1)?;
        let k = self.eval_arg(p1, 2)?;

        let (Some(n_value), Some(k_value)) = (self.small_integer(n), self.small_integer(k)) else {
            let p = self.apply(Keyword::Choose, &[n, k])?;
            return self.push(p);
        };
        if n_value < 0 {
            return Err(Error::new(kind::InvalidArgument {
                function: "choose",
                expected: "a nonnegative integer",
            }));
        }
        if k_value < 0 || k_value > n_value {
            return self.push(self.consts.zero);
        }

        // n!/(k!(n-k)!) = prod (n-k+i)/i
        let k_value = k_value.min(n_value - k_value);
        let mut result = Rational::one();
        for i in 1..=k_value {
            self.check_interrupt()?;
            result = result.mul(&Rational::from_i64(n_value - k_value + i))
                .div(&Rational::from_i64(i))?;
        }
        let p = self.rational_node(result)?;
        self.push(p)
    }

    /// Pops `n` and pushes `n!`. Doubles use the gamma function.
    pub(crate) fn factorial(&mut self) -> Result<()> {
        self.unary_rules(Keyword::Factorial, &[Self::factorial_of_integer, Self::factorial_of_double])
    }

    fn factorial_of_integer(&mut self, p: NodeRef) -> Result<Option<NodeRef>> {
        let Some(r) = self.rational(p) else {
            return Ok(None);
        };
        let n = match r.to_i64() {
            Some(n) if r.is_integer() && n >= 0 => n,
            _ => return Err(Error::new(kind::InvalidArgument {
                function: "factorial",
                expected: "a nonnegative integer",
            })),
        };
        if n > MAX_FACTORIAL {
            return Err(Error::new(kind::ExponentTooLarge));
        }

        let mut product = Magnitude::one();
        for i in 2..=n as u64 {
            if i % 1024 == 0 {
                self.check_interrupt()?;
            }
            product = product.mul(&Magnitude::from_u64(i));
        }
        self.rational_node(Rational::from_integer(Sign::Plus, product)).map(Some)
    }

    fn factorial_of_double(&mut self, p: NodeRef) -> Result<Option<NodeRef>> {
        let Some(d) = self.double(p) else {
            return Ok(None);
        };
        if d < 0.0 && d.fract() == 0.0 {
            return Err(Error::new(kind::InvalidArgument {
                function: "factorial",
                expected: "a number that is not a negative integer",
            }));
        }
        self.double_node(gamma(d + 1.0)).map(Some)
    }

    /// Pops `x` and pushes its numerator.
    pub(crate) fn numerator(&mut self) -> Result<()> {
        let p = self.pop()?;
        let (num, _) = self.split_fraction(p)?;
        self.push(num)
    }

    /// Pops `x` and pushes its denominator.
    pub(crate) fn denominator(&mut self) -> Result<()> {
        let p = self.pop()?;
        let (_, den) = self.split_fraction(p)?;
        self.push(den)
    }

    /// Splits an expression into a numerator and a denominator. Sums are brought over a common
    /// denominator first.
    pub(crate) fn split_fraction(&mut self, p: NodeRef) -> Result<(NodeRef, NodeRef)> {
        if let Some(r) = self.rational(p) {
            let (num, den) = (r.numerator(), r.denominator());
            return Ok((self.rational_node(num)?, self.rational_node(den)?));
        }

        if self.is_head(p, Keyword::Add) {
            let terms = self.args(p);
            let mut parts = Vec::with_capacity(terms.len());
            let mut den = self.consts.one;
            for term in terms {
                let (n, d) = self.split_fraction(term)?;
                den = self.lcm_pair(den, d)?;
                parts.push((n, d));
            }
            let mut num = self.consts.zero;
            for (n, d) in parts {
                let scale = self.div_nodes(den, d)?;
                let term = self.mul_nodes(n, scale)?;
                num = self.add_nodes(num, term)?;
            }
            return Ok((num, den));
        }

        let factors = if self.is_head(p, Keyword::Multiply) { self.args(p) } else { vec![p] };
        let mut num = self.consts.one;
        let mut den = self.consts.one;
        for factor in factors {
            if let Some(r) = self.rational(factor) {
                let (n, d) = (r.numerator(), r.denominator());
                let (n, d) = (self.rational_node(n)?, self.rational_node(d)?);
                num = self.mul_nodes(num, n)?;
                den = self.mul_nodes(den, d)?;
                continue;
            }
            let reciprocal = self.is_head(factor, Keyword::Power)
                && !self.is_minus_one(self.cadr(factor))
                && self.is_negative_number(self.caddr(factor));
            if reciprocal {
                let q = self.pow_nodes(factor, self.consts.minus_one)?;
                den = self.mul_nodes(den, q)?;
            } else {
                num = self.mul_nodes(num, factor)?;
            }
        }
        Ok((num, den))
    }

    /// Pops `x` and pushes it with every number converted to a double, evaluated again.
    pub(crate) fn float(&mut self) -> Result<()> {
        let p = self.pop()?;
        let q = self.floatify(p)?;
        let q = self.eval_value(q)?;
        // a second pass catches numbers created by the evaluation, such as sqrt(2.0) of 2^(1/2)
        let q = self.floatify(q)?;
        let q = self.eval_value(q)?;
        self.push(q)
    }

    fn floatify(&mut self, p: NodeRef) -> Result<NodeRef> {
        match self.node(p) {
            Node::Rational(r) => {
                let d = r.to_f64();
                self.double_node(d)
            },
            Node::Keyword(Keyword::Pi) => self.double_node(std::f64::consts::PI),
            Node::Keyword(Keyword::Exp1) => self.double_node(std::f64::consts::E),
            Node::Tensor(t) => {
                let (dims, elems) = (t.dims.clone(), t.elems.clone());
                let elems = elems.into_iter()
                    .map(|e| self.floatify(e))
                    .collect::<Result<Vec<_>>>()?;
                self.tensor_node(dims, elems)
            },
            Node::Cons { .. } => {
                // integer exponents stay exact, x^2 does not become x^2.0
                if self.is_head(p, Keyword::Power) && self.is_integer(self.caddr(p)) {
                    let base = self.floatify(self.cadr(p))?;
                    let expo = self.caddr(p);
                    return self.apply(Keyword::Power, &[base, expo]);
                }
                let items = self.items(p);
                let mut floated = Vec::with_capacity(items.len());
                floated.push(items[0]);
                for &item in &items[1..] {
                    floated.push(self.floatify(item)?);
                }
                self.list(&floated)
            },
            _ => Ok(p),
        }
    }

    /// Pops `x` and pushes `1` if it is a number, `0` otherwise.
    pub(crate) fn number(&mut self) -> Result<()> {
        let p = self.pop()?;
        let is_num = self.is_num(p);
        self.push_bool(is_num)
    }
}

#[cfg(test)]
mod tests {
    use assert_float_eq::assert_float_relative_eq;
    use crate::{error::kind, Interpreter};
    use super::gamma;

    fn eval(source: &str) -> String {
        Interpreter::new().eval_str(source).unwrap()
    }

    #[test]
    fn absolute_value() {
        assert_eq!(eval("abs(-3/4)"), "3/4");
        assert_eq!(eval("abs(-2*x)"), "2*abs(x)");
        assert_eq!(eval("abs(3 + 4*i)"), "5");
        assert_eq!(eval("abs((3, 4))"), "5");
    }

    #[test]
    fn rounding() {
        assert_eq!(eval("floor(7/2)"), "3");
        assert_eq!(eval("floor(-7/2)"), "-4");
        assert_eq!(eval("ceiling(7/2)"), "4");
        assert_eq!(eval("floor(2.5)"), "2.0");
    }

    #[test]
    fn remainder() {
        assert_eq!(eval("mod(7, 3)"), "1");
        assert_eq!(eval("mod(-7, 3)"), "-1");
        assert!(Interpreter::new().eval_str("mod(1, 0)").unwrap_err().is::<kind::DivideByZero>());
    }

    #[test]
    fn gcd_and_lcm() {
        assert_eq!(eval("gcd(12, 18)"), "6");
        assert_eq!(eval("gcd(0, -5)"), "5");
        assert_eq!(eval("gcd(x, x)"), "x");
        assert_eq!(eval("gcd(6*x^2*y, 4*x^3)"), "2*x^2");
        assert_eq!(eval("lcm(4, 6)"), "12");
    }

    #[test]
    fn primes_and_combinatorics() {
        assert_eq!(eval("isprime(97)"), "1");
        assert_eq!(eval("isprime(91)"), "0");
        assert_eq!(eval("choose(5, 2)"), "10");
        assert_eq!(eval("choose(5, 7)"), "0");
        assert_eq!(eval("10!"), "3628800");
        assert_eq!(eval("factorial(0)"), "1");
    }

    #[test]
    fn fractions() {
        assert_eq!(eval("numerator(2/3)"), "2");
        assert_eq!(eval("denominator(x/(2*y))"), "2*y");
        assert_eq!(eval("numerator(x/(2*y))"), "x");
        assert_eq!(eval("denominator(1/x + 1/y)"), "x*y");
    }

    #[test]
    fn floating() {
        assert_eq!(eval("float(1/4)"), "0.25");
        assert_eq!(eval("float(pi)"), "3.14159");
        assert_eq!(eval("float(x^2)"), "x^2");
        assert_eq!(eval("number(2)"), "1");
        assert_eq!(eval("number(x)"), "0");
    }

    #[test]
    fn gamma_matches_factorials() {
        assert_float_relative_eq!(gamma(5.0), 24.0, 1e-12);
        assert_float_relative_eq!(gamma(0.5), std::f64::consts::PI.sqrt(), 1e-12);
    }
}
